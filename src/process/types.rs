use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// Whether the child is still running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Exited,
}

/// How the child ended, as reported by `wait(2)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Code(i32),
    Signaled(i32),
}

impl ExitOutcome {
    pub fn success(self) -> bool {
        self == ExitOutcome::Success
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(0), _) => ExitOutcome::Success,
            (Some(code), _) => ExitOutcome::Code(code),
            (None, Some(signal)) => ExitOutcome::Signaled(signal),
            // Stopped/continued states are never reported by wait() without WUNTRACED
            (None, None) => ExitOutcome::Code(-1),
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Success => write!(f, "exit status 0"),
            ExitOutcome::Code(code) => write!(f, "exit status {}", code),
            ExitOutcome::Signaled(signal) => write!(f, "killed by signal {}", signal),
        }
    }
}
