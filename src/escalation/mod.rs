//! Timed shutdown escalation.
//!
//! An [`Escalator`] walks a [`SignalPlan`] one signal at a time, giving each
//! delivery a fixed window, and falls back to `SIGKILL` once the plan runs out.

mod engine;
mod plan;
mod target;
mod types;

#[cfg(test)]
mod tests;

pub use engine::{Escalator, DEFAULT_SIGNAL_TIMEOUT};
pub use plan::{EscalationStep, SignalPlan};
pub use target::SignalTarget;
pub use types::ShutdownOutcome;
