mod command;
mod managed;
mod relay;
mod types;

#[cfg(test)]
mod tests;

pub use command::AppCommand;
pub use managed::ManagedProcess;
pub use types::{ExitOutcome, ProcessState};
