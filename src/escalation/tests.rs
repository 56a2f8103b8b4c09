use super::*;
use crate::error::RunappError;
use crate::signal::Signal;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reaction {
    Accept,
    Refuse,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Signal(Signal),
    Kill,
}

/// Stand-in process whose reaction to each signal is scripted
struct MockTarget {
    reactions: HashMap<Signal, Reaction>,
    kill_succeeds: bool,
    exited: AtomicBool,
    attempts: Mutex<Vec<Attempt>>,
}

impl MockTarget {
    fn new(reactions: &[(Signal, Reaction)]) -> Self {
        Self {
            reactions: reactions.iter().copied().collect(),
            kill_succeeds: true,
            exited: AtomicBool::new(false),
            attempts: Mutex::new(Vec::new()),
        }
    }

    fn with_failing_kill(mut self) -> Self {
        self.kill_succeeds = false;
        self
    }

    fn attempts(&self) -> Vec<Attempt> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SignalTarget for MockTarget {
    fn pid(&self) -> u32 {
        4242
    }

    fn has_exited(&self) -> bool {
        self.exited.load(Ordering::SeqCst)
    }

    async fn signal(&self, signal: Signal) -> io::Result<()> {
        self.attempts.lock().unwrap().push(Attempt::Signal(signal));
        match self.reactions.get(&signal).copied().unwrap_or(Reaction::Ignore) {
            Reaction::Accept => Ok(()),
            Reaction::Refuse => Err(io::Error::from_raw_os_error(libc::EPERM)),
            Reaction::Ignore => std::future::pending().await,
        }
    }

    async fn kill(&self) -> io::Result<()> {
        self.attempts.lock().unwrap().push(Attempt::Kill);
        if self.kill_succeeds {
            Ok(())
        } else {
            Err(io::Error::from_raw_os_error(libc::ESRCH))
        }
    }
}

fn term_plan(received: Signal) -> SignalPlan {
    SignalPlan::for_received(received, &[Signal::TERM])
}

#[tokio::test(start_paused = true)]
async fn test_first_signal_accepted() {
    let target = MockTarget::new(&[(Signal::INT, Reaction::Accept)]);
    let start = Instant::now();

    let outcome = Escalator::default()
        .escalate(&target, &term_plan(Signal::INT))
        .await
        .unwrap();

    assert_eq!(outcome, ShutdownOutcome::StoppedBySignal(Signal::INT));
    assert_eq!(target.attempts(), vec![Attempt::Signal(Signal::INT)]);
    assert!(start.elapsed() < DEFAULT_SIGNAL_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn test_ignored_signal_escalates_after_timeout() {
    let target = MockTarget::new(&[
        (Signal::INT, Reaction::Ignore),
        (Signal::TERM, Reaction::Accept),
    ]);
    let start = Instant::now();

    let outcome = Escalator::default()
        .escalate(&target, &term_plan(Signal::INT))
        .await
        .unwrap();

    assert_eq!(outcome, ShutdownOutcome::StoppedBySignal(Signal::TERM));
    assert_eq!(
        target.attempts(),
        vec![Attempt::Signal(Signal::INT), Attempt::Signal(Signal::TERM)]
    );
    assert!(start.elapsed() >= DEFAULT_SIGNAL_TIMEOUT);
    assert!(start.elapsed() < DEFAULT_SIGNAL_TIMEOUT * 2);
}

#[tokio::test(start_paused = true)]
async fn test_refused_signal_escalates_without_waiting() {
    let target = MockTarget::new(&[
        (Signal::TERM, Reaction::Refuse),
        (Signal::HUP, Reaction::Accept),
    ]);
    let plan = SignalPlan::for_received(Signal::TERM, &[Signal::HUP]);
    let start = Instant::now();

    let outcome = Escalator::default().escalate(&target, &plan).await.unwrap();

    assert_eq!(outcome, ShutdownOutcome::StoppedBySignal(Signal::HUP));
    assert!(start.elapsed() < DEFAULT_SIGNAL_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn test_each_step_gets_a_fresh_window() {
    let target = MockTarget::new(&[]);
    let plan = SignalPlan::for_received(Signal::TERM, &[Signal::TERM, Signal::HUP]);
    let escalator = Escalator::new(Duration::from_millis(500));
    let start = Instant::now();

    let outcome = escalator.escalate(&target, &plan).await.unwrap();

    assert_eq!(outcome, ShutdownOutcome::ForceKilled);
    assert!(start.elapsed() >= Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn test_all_signals_ignored_force_kills() {
    let target = MockTarget::new(&[]);

    let outcome = Escalator::default()
        .escalate(&target, &term_plan(Signal::INT))
        .await
        .unwrap();

    assert_eq!(outcome, ShutdownOutcome::ForceKilled);
    assert_eq!(
        target.attempts(),
        vec![
            Attempt::Signal(Signal::INT),
            Attempt::Signal(Signal::TERM),
            Attempt::Kill
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_kill_is_fatal_and_final() {
    let target = MockTarget::new(&[
        (Signal::TERM, Reaction::Refuse),
        (Signal::HUP, Reaction::Ignore),
    ])
    .with_failing_kill();
    let plan = SignalPlan::for_received(Signal::TERM, &[Signal::HUP]);

    let result = Escalator::default().escalate(&target, &plan).await;

    match result {
        Err(RunappError::KillFailed { pid, .. }) => assert_eq!(pid, 4242),
        other => panic!("Expected KillFailed, got {:?}", other),
    }
    assert_eq!(target.attempts().last(), Some(&Attempt::Kill));
    assert_eq!(target.attempts().len(), plan.step_count());
}

#[tokio::test(start_paused = true)]
async fn test_attempts_bounded_by_plan_length() {
    let candidates = [Signal::TERM, Signal::HUP, Signal::USR1, Signal::USR2, Signal::QUIT];

    for len in 0..=candidates.len() {
        let reactions: Vec<_> = candidates.iter().map(|s| (*s, Reaction::Refuse)).collect();
        let target = MockTarget::new(&reactions);
        let plan = SignalPlan::new(candidates[..len].to_vec());

        let outcome = Escalator::default().escalate(&target, &plan).await.unwrap();

        assert_eq!(outcome, ShutdownOutcome::ForceKilled);
        assert_eq!(target.attempts().len(), len + 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_exited_target_is_left_alone() {
    let target = MockTarget::new(&[(Signal::TERM, Reaction::Accept)]);
    target.exited.store(true, Ordering::SeqCst);

    let outcome = Escalator::default()
        .escalate(&target, &term_plan(Signal::TERM))
        .await
        .unwrap();

    assert_eq!(outcome, ShutdownOutcome::AlreadyExited);
    assert!(target.attempts().is_empty());
}

#[test]
fn test_outcome_display() {
    assert_eq!(
        ShutdownOutcome::StoppedBySignal(Signal::INT).to_string(),
        "stopped with signal (SIGINT)"
    );
    assert_eq!(ShutdownOutcome::ForceKilled.to_string(), "force killed");
}
