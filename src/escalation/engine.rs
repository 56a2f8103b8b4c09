use super::plan::{EscalationStep, SignalPlan};
use super::target::SignalTarget;
use super::types::ShutdownOutcome;
use crate::error::{Result, RunappError};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Window each signal gets before escalating to the next one
pub const DEFAULT_SIGNAL_TIMEOUT: Duration = Duration::from_secs(2);

/// Sends the signals of a plan in order until one is accepted
#[derive(Debug, Clone)]
pub struct Escalator {
    signal_timeout: Duration,
}

impl Default for Escalator {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNAL_TIMEOUT)
    }
}

impl Escalator {
    pub fn new(signal_timeout: Duration) -> Self {
        Self { signal_timeout }
    }

    pub fn signal_timeout(&self) -> Duration {
        self.signal_timeout
    }

    /// Walk `plan` against `target`.
    ///
    /// A signal counts as successful as soon as delivery is accepted within
    /// the window; a refused or slow delivery moves on to the next step. Makes
    /// at most `plan.step_count()` attempts. The only error is a failed final
    /// kill, after which nothing else is tried.
    pub async fn escalate<T>(&self, target: &T, plan: &SignalPlan) -> Result<ShutdownOutcome>
    where
        T: SignalTarget + ?Sized,
    {
        let pid = target.pid();
        let timeout_ms = self.signal_timeout.as_millis() as u64;
        info!(pid, plan = %plan, "Escalating shutdown");

        let mut steps = plan.steps();
        let mut attempt = 0usize;

        loop {
            if target.has_exited() {
                info!(pid, attempt, "App already exited, nothing left to stop");
                return Ok(ShutdownOutcome::AlreadyExited);
            }

            attempt += 1;
            match steps.next().unwrap_or(EscalationStep::ForceKill) {
                EscalationStep::Deliver(signal) => {
                    info!(pid, attempt, %signal, "Attempting to stop app with signal ({})", signal);

                    match timeout(self.signal_timeout, target.signal(signal)).await {
                        Ok(Ok(())) => {
                            info!(pid, %signal, "App accepted signal ({})", signal);
                            return Ok(ShutdownOutcome::StoppedBySignal(signal));
                        }
                        Ok(Err(e)) => {
                            warn!(pid, attempt, %signal, "Failed to deliver signal: {}", e);
                        }
                        Err(_) => {
                            warn!(pid, attempt, %signal, timeout_ms, "Signal delivery timed out");
                        }
                    }
                }
                EscalationStep::ForceKill => {
                    info!(pid, attempt, "Signals exhausted, killing app");

                    return match target.kill().await {
                        Ok(()) => {
                            info!(pid, "App force killed");
                            Ok(ShutdownOutcome::ForceKilled)
                        }
                        Err(source) => {
                            error!(pid, "Failed to kill app: {}", source);
                            Err(RunappError::KillFailed { pid, source })
                        }
                    };
                }
            }
        }
    }
}
