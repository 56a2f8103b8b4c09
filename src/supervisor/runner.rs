use super::listener::TerminationListener;
use crate::config::RunappConfig;
use crate::error::Result;
use crate::escalation::{Escalator, ShutdownOutcome, SignalPlan};
use crate::process::{AppCommand, ExitOutcome, ManagedProcess};
use crate::signal::Signal;
use crate::status::AppExitStatus;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

/// Runs one command to completion, relaying termination requests to it
#[derive(Debug, Clone)]
pub struct Supervisor {
    pub(super) escalator: Escalator,
    pub(super) fallback: Vec<Signal>,
}

/// Whichever happened first
enum Race {
    Exited(Result<ExitOutcome>),
    Terminated(Signal),
}

impl Supervisor {
    pub fn new(signal_timeout: Duration, fallback: Vec<Signal>) -> Self {
        Self {
            escalator: Escalator::new(signal_timeout),
            fallback,
        }
    }

    pub fn from_config(config: &RunappConfig) -> Result<Self> {
        Ok(Self::new(config.signal_timeout(), config.fallback_signals()?))
    }

    /// Run `command` until it exits or a termination signal has been dealt
    /// with, and report how it went.
    pub async fn run(&self, command: &AppCommand) -> AppExitStatus {
        // Handlers go in before the child exists so no signal slips through.
        let mut listener = match TerminationListener::register() {
            Ok(listener) => listener,
            Err(e) => {
                error!("{}", e);
                return AppExitStatus::CannotStartApp;
            }
        };

        self.supervise(command, listener.recv()).await
    }

    /// Spawn `command` and race its exit against `termination`.
    pub async fn supervise<F>(&self, command: &AppCommand, termination: F) -> AppExitStatus
    where
        F: Future<Output = Signal>,
    {
        let mut process = match ManagedProcess::spawn(command) {
            Ok(process) => process,
            Err(e) => {
                error!("{}", e);
                return AppExitStatus::CannotStartApp;
            }
        };
        info!(pid = process.pid(), command = %command, "App started");

        tokio::pin!(termination);
        let race = tokio::select! {
            exit = process.wait() => Race::Exited(exit),
            signal = &mut termination => Race::Terminated(signal),
        };

        let status = match race {
            Race::Exited(Ok(outcome)) if outcome.success() => {
                info!(pid = process.pid(), "App stopped");
                AppExitStatus::Ok
            }
            Race::Exited(Ok(outcome)) => {
                info!(pid = process.pid(), "App stopped with error ({})", outcome);
                AppExitStatus::AppStoppedWithError
            }
            Race::Exited(Err(e)) => {
                error!(pid = process.pid(), "Lost track of app: {}", e);
                AppExitStatus::AppStoppedWithError
            }
            Race::Terminated(received) => {
                info!(pid = process.pid(), signal = %received, "Received signal ({})", received);

                let plan = SignalPlan::for_received(received, &self.fallback);
                let result = self.escalator.escalate(&process, &plan).await;
                match status_after_escalation(result, received) {
                    // Fatal: the caller exits without further cleanup.
                    AppExitStatus::FailedToKillApp => return AppExitStatus::FailedToKillApp,
                    status => status,
                }
            }
        };

        process.settle(self.escalator.signal_timeout()).await;
        info!(status = status.code(), "Finished: {}", status);
        status
    }
}

/// Turn the result of an escalation into our exit status. A failed final
/// kill is the only error `escalate` returns, and it is fatal.
pub fn status_after_escalation(
    result: Result<ShutdownOutcome>,
    received: Signal,
) -> AppExitStatus {
    match result {
        Ok(outcome) => {
            info!("App {}", outcome);
            exit_status_for(outcome, received)
        }
        Err(e) => {
            error!("{}", e);
            AppExitStatus::FailedToKillApp
        }
    }
}

/// Map an escalation outcome to our exit status.
///
/// Only the signal we were sent, or SIGINT, count as a clean stop. A child
/// that needed a fallback signal or a kill is reported as such.
pub fn exit_status_for(outcome: ShutdownOutcome, received: Signal) -> AppExitStatus {
    match outcome {
        ShutdownOutcome::StoppedBySignal(signal) if signal == received => AppExitStatus::Ok,
        ShutdownOutcome::StoppedBySignal(Signal::INT) => AppExitStatus::Ok,
        ShutdownOutcome::StoppedBySignal(_) | ShutdownOutcome::ForceKilled => {
            AppExitStatus::InsufficientSignalError
        }
        ShutdownOutcome::AlreadyExited => AppExitStatus::Ok,
    }
}
