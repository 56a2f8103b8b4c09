mod listener;
mod runner;


pub use listener::TerminationListener;
pub use runner::{exit_status_for, status_after_escalation, Supervisor};
