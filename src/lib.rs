pub mod build_info;
pub mod config;
pub mod error;
pub mod escalation;
pub mod process;
pub mod signal;
pub mod status;
pub mod supervisor;

pub use build_info::BuildInfo;
pub use config::{LogConfig, LogFormat, RunappConfig, SignalConfig};
pub use error::{Result, RunappError};
pub use escalation::{
    EscalationStep, Escalator, ShutdownOutcome, SignalPlan, SignalTarget, DEFAULT_SIGNAL_TIMEOUT,
};
pub use process::{AppCommand, ExitOutcome, ManagedProcess, ProcessState};
pub use signal::Signal;
pub use status::AppExitStatus;
pub use supervisor::{exit_status_for, status_after_escalation, Supervisor, TerminationListener};
