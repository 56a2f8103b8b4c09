use std::fmt;
use std::process::ExitCode;

/// Exit status reported to the container runtime.
///
/// The numeric values are part of the external interface and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AppExitStatus {
    Ok = 0,
    /// The child exited on its own with a non-zero status.
    AppStoppedWithError = 1,
    CannotStartApp = 2,
    /// The final forced kill failed. Fatal.
    FailedToKillApp = 3,
    MissingArgument = 4,
    /// Escalation stopped the child, but not with the signal it was asked to honour.
    InsufficientSignalError = 5,
    /// Reserved.
    InvalidCommand = 6,
    BadFlag = 7,
}

impl AppExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for AppExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AppExitStatus::Ok => "ok",
            AppExitStatus::AppStoppedWithError => "app stopped with error",
            AppExitStatus::CannotStartApp => "cannot start app",
            AppExitStatus::FailedToKillApp => "failed to kill app",
            AppExitStatus::MissingArgument => "missing argument",
            AppExitStatus::InsufficientSignalError => "initial signal insufficient to stop app",
            AppExitStatus::InvalidCommand => "invalid command",
            AppExitStatus::BadFlag => "bad flag",
        };
        f.write_str(text)
    }
}

impl From<AppExitStatus> for ExitCode {
    fn from(status: AppExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}
