use super::*;
use crate::error::RunappError;
use crate::escalation::{Escalator, ShutdownOutcome, SignalPlan, SignalTarget};
use crate::signal::Signal;
use std::time::Duration;

fn shell(script: &str) -> AppCommand {
    AppCommand::new("/bin/sh", ["-c", script])
}

#[tokio::test]
async fn test_spawn_and_wait_for_success() {
    let mut process = ManagedProcess::spawn(&shell("exit 0")).unwrap();
    assert!(process.pid() > 0);

    let outcome = process.wait().await.unwrap();
    assert_eq!(outcome, ExitOutcome::Success);
    assert_eq!(process.state(), ProcessState::Exited);
    assert!(process.has_exited());
}

#[tokio::test]
async fn test_wait_reports_exit_code_and_caches_it() {
    let mut process = ManagedProcess::spawn(&shell("exit 7")).unwrap();

    assert_eq!(process.wait().await.unwrap(), ExitOutcome::Code(7));
    assert_eq!(process.wait().await.unwrap(), ExitOutcome::Code(7));
}

#[tokio::test]
async fn test_spawn_failure_names_the_program() {
    let command = AppCommand::new("/nonexistent/app", Vec::<String>::new());
    match ManagedProcess::spawn(&command) {
        Err(RunappError::Spawn { program, .. }) => assert_eq!(program, "/nonexistent/app"),
        Err(e) => panic!("Unexpected error: {}", e),
        Ok(_) => panic!("Spawning a missing program should fail"),
    }
}

#[tokio::test]
async fn test_running_until_signalled() {
    let mut process = ManagedProcess::spawn(&shell("exec sleep 30")).unwrap();
    assert_eq!(process.state(), ProcessState::Running);

    process.signal(Signal::TERM).await.unwrap();

    let outcome = process.wait().await.unwrap();
    assert_eq!(outcome, ExitOutcome::Signaled(libc::SIGTERM));
}

#[tokio::test]
async fn test_kill_is_unconditional() {
    let mut process = ManagedProcess::spawn(&shell("trap '' TERM INT; exec sleep 30")).unwrap();

    process.kill().await.unwrap();

    let outcome = process.wait().await.unwrap();
    assert_eq!(outcome, ExitOutcome::Signaled(libc::SIGKILL));
}

#[tokio::test]
async fn test_signal_after_exit_is_refused() {
    let mut process = ManagedProcess::spawn(&shell("exit 0")).unwrap();
    process.wait().await.unwrap();

    assert!(process.signal(Signal::TERM).await.is_err());
    assert!(process.kill().await.is_err());
}

#[tokio::test]
async fn test_escalation_against_real_child() {
    let mut process = ManagedProcess::spawn(&shell("exec sleep 30")).unwrap();
    let plan = SignalPlan::for_received(Signal::TERM, &[Signal::TERM]);

    let outcome = Escalator::new(Duration::from_secs(2))
        .escalate(&process, &plan)
        .await
        .unwrap();

    assert_eq!(outcome, ShutdownOutcome::StoppedBySignal(Signal::TERM));
    assert_eq!(
        process.settle(Duration::from_secs(5)).await,
        Some(ExitOutcome::Signaled(libc::SIGTERM))
    );
}

#[tokio::test]
async fn test_escalation_after_exit_reports_already_exited() {
    let mut process = ManagedProcess::spawn(&shell("exit 0")).unwrap();
    process.wait().await.unwrap();

    let outcome = Escalator::default()
        .escalate(&process, &SignalPlan::new(vec![Signal::TERM]))
        .await
        .unwrap();

    assert_eq!(outcome, ShutdownOutcome::AlreadyExited);
}

#[tokio::test]
async fn test_settle_gives_up_after_grace() {
    let mut process = ManagedProcess::spawn(&shell("exec sleep 30")).unwrap();

    let outcome = process.settle(Duration::from_millis(100)).await;
    assert_eq!(outcome, None);

    process.kill().await.unwrap();
    assert_eq!(
        process.wait().await.unwrap(),
        ExitOutcome::Signaled(libc::SIGKILL)
    );
}
