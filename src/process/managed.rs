use super::command::AppCommand;
use super::relay::spawn_relay;
use super::types::{ExitOutcome, ProcessState};
use crate::error::{Result, RunappError};
use crate::escalation::SignalTarget;
use crate::signal::Signal;
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// The single child process owned by a supervisor run.
///
/// Spawning starts three background tasks: one waits for the child to exit and
/// reports through a oneshot channel, two copy its stdout and stderr to ours.
/// The handle itself only keeps the pid, so signals can be sent while the
/// wait task owns the `Child`.
pub struct ManagedProcess {
    pid: u32,
    exited: Arc<AtomicBool>,
    exit_receiver: Option<oneshot::Receiver<io::Result<ExitOutcome>>>,
    outcome: Option<ExitOutcome>,
    relays: Vec<JoinHandle<()>>,
}

impl ManagedProcess {
    /// Spawn `command` with stdin closed and both output streams relayed.
    pub fn spawn(command: &AppCommand) -> Result<Self> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunappError::Spawn {
                program: command.program.display().to_string(),
                source,
            })?;

        let pid = child
            .id()
            .ok_or_else(|| RunappError::system("Child exited before its pid was read"))?;

        let mut relays = Vec::with_capacity(2);
        match child.stdout.take() {
            Some(stdout) => relays.push(spawn_relay("stdout", stdout, tokio::io::stdout())),
            None => warn!(pid, "Cannot open pipe to app's stdout"),
        }
        match child.stderr.take() {
            Some(stderr) => relays.push(spawn_relay("stderr", stderr, tokio::io::stderr())),
            None => warn!(pid, "Cannot open pipe to app's stderr"),
        }

        let exited = Arc::new(AtomicBool::new(false));
        let (exit_sender, exit_receiver) = oneshot::channel();

        let exited_flag = Arc::clone(&exited);
        tokio::spawn(async move {
            let result = child.wait().await.map(ExitOutcome::from);
            exited_flag.store(true, Ordering::SeqCst);
            debug!(pid, "Exit wait task finished");
            let _ = exit_sender.send(result);
        });

        Ok(Self {
            pid,
            exited,
            exit_receiver: Some(exit_receiver),
            outcome: None,
            relays,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn state(&self) -> ProcessState {
        if self.exited.load(Ordering::SeqCst) {
            ProcessState::Exited
        } else {
            ProcessState::Running
        }
    }

    /// Wait for the child to exit.
    ///
    /// Cancel safe: dropping the future before it completes leaves the exit
    /// report in place for the next call. Once observed, the outcome is cached.
    pub async fn wait(&mut self) -> Result<ExitOutcome> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome);
        }

        let receiver = self
            .exit_receiver
            .as_mut()
            .ok_or_else(|| RunappError::system("Exit status already consumed"))?;

        let result = receiver.await;
        self.exit_receiver = None;

        let outcome = result
            .map_err(|_| RunappError::system("Exit channel closed unexpectedly"))??;
        self.outcome = Some(outcome);
        Ok(outcome)
    }

    /// Give the child up to `grace` to be reaped and its output relays to
    /// drain. Returns the exit outcome if it was observed in time.
    pub async fn settle(&mut self, grace: Duration) -> Option<ExitOutcome> {
        let deadline = Instant::now() + grace;

        let outcome = match timeout_at(deadline, self.wait()).await {
            Ok(Ok(outcome)) => {
                debug!(pid = self.pid, "App reaped with {}", outcome);
                Some(outcome)
            }
            Ok(Err(e)) => {
                warn!(pid = self.pid, "Cannot collect app exit status: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    pid = self.pid,
                    grace_ms = grace.as_millis() as u64,
                    "App not reaped within grace period"
                );
                None
            }
        };

        for relay in self.relays.drain(..) {
            if timeout_at(deadline, relay).await.is_err() {
                debug!(pid = self.pid, "Output relay still open after grace period");
            }
        }

        outcome
    }

    async fn deliver(&self, signal: Signal) -> io::Result<()> {
        if self.exited.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "process already finished",
            ));
        }

        let pid = self.pid as libc::pid_t;
        tokio::task::spawn_blocking(move || send_signal(pid, signal))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }
}

fn send_signal(pid: libc::pid_t, signal: Signal) -> io::Result<()> {
    // SAFETY: kill(2) takes plain integers and touches no memory of ours.
    let rc = unsafe { libc::kill(pid, signal.as_raw()) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[async_trait]
impl SignalTarget for ManagedProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn has_exited(&self) -> bool {
        self.state() == ProcessState::Exited
    }

    async fn signal(&self, signal: Signal) -> io::Result<()> {
        self.deliver(signal).await
    }

    async fn kill(&self) -> io::Result<()> {
        self.deliver(Signal::KILL).await
    }
}
