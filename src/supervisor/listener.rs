use crate::error::{Result, RunappError};
use crate::signal::Signal;
use tokio::signal::unix::{signal, SignalKind};
use tracing::debug;

/// Watches for the "please stop" signals a container runtime sends.
///
/// Registration installs the handlers immediately, so create the listener
/// before spawning the child; anything that arrives in between is queued.
pub struct TerminationListener {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

impl TerminationListener {
    /// Register for SIGINT and SIGTERM
    pub fn register() -> Result<Self> {
        let interrupt =
            signal(SignalKind::interrupt()).map_err(|source| RunappError::SignalRegistration {
                signal: Signal::INT.to_string(),
                source,
            })?;
        let terminate =
            signal(SignalKind::terminate()).map_err(|source| RunappError::SignalRegistration {
                signal: Signal::TERM.to_string(),
                source,
            })?;

        debug!("Termination signal handlers registered");
        Ok(Self {
            interrupt,
            terminate,
        })
    }

    /// Wait for the next termination signal. Neither arrival has priority.
    pub async fn recv(&mut self) -> Signal {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Signal::INT,
            Some(()) = self.terminate.recv() => Signal::TERM,
            else => std::future::pending().await,
        }
    }
}
