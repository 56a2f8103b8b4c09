use crate::signal::Signal;
use std::fmt;

/// How an escalation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The OS accepted this signal
    StoppedBySignal(Signal),
    /// Every signal was ignored or refused; SIGKILL was sent
    ForceKilled,
    /// The process was gone before a step was attempted
    AlreadyExited,
}

impl fmt::Display for ShutdownOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownOutcome::StoppedBySignal(signal) => {
                write!(f, "stopped with signal ({})", signal)
            }
            ShutdownOutcome::ForceKilled => write!(f, "force killed"),
            ShutdownOutcome::AlreadyExited => write!(f, "already exited"),
        }
    }
}
