//! Signal identifiers understood by the supervisor.

use crate::error::{Result, RunappError};
use std::fmt;
use std::str::FromStr;

/// A deliverable POSIX signal, stored as its platform number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signal(libc::c_int);

const NAMED: &[(&str, libc::c_int)] = &[
    ("HUP", libc::SIGHUP),
    ("INT", libc::SIGINT),
    ("QUIT", libc::SIGQUIT),
    ("KILL", libc::SIGKILL),
    ("USR1", libc::SIGUSR1),
    ("USR2", libc::SIGUSR2),
    ("TERM", libc::SIGTERM),
];

impl Signal {
    pub const HUP: Signal = Signal(libc::SIGHUP);
    pub const INT: Signal = Signal(libc::SIGINT);
    pub const QUIT: Signal = Signal(libc::SIGQUIT);
    pub const KILL: Signal = Signal(libc::SIGKILL);
    pub const USR1: Signal = Signal(libc::SIGUSR1);
    pub const USR2: Signal = Signal(libc::SIGUSR2);
    pub const TERM: Signal = Signal(libc::SIGTERM);

    /// Wrap a raw signal number. Numbers outside `1..=64` are rejected.
    pub fn from_raw(number: libc::c_int) -> Result<Self> {
        if (1..=64).contains(&number) {
            Ok(Self(number))
        } else {
            Err(RunappError::invalid_signal(number.to_string()))
        }
    }

    pub fn as_raw(self) -> libc::c_int {
        self.0
    }

    fn short_name(self) -> Option<&'static str> {
        NAMED
            .iter()
            .find(|(_, number)| *number == self.0)
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.short_name() {
            Some(name) => write!(f, "SIG{}", name),
            None => write!(f, "signal {}", self.0),
        }
    }
}

impl FromStr for Signal {
    type Err = RunappError;

    /// Accepts `TERM`, `SIGTERM`, `sigterm` or `15`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<libc::c_int>() {
            return Self::from_raw(number);
        }

        let upper = trimmed.to_ascii_uppercase();
        let name = upper.strip_prefix("SIG").unwrap_or(&upper);
        NAMED
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, number)| Signal(*number))
            .ok_or_else(|| RunappError::invalid_signal(trimmed))
    }
}
