use crate::signal::Signal;
use std::fmt;
use std::iter;

/// One step of an escalation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationStep {
    Deliver(Signal),
    ForceKill,
}

/// Ordered signals to try before the final kill. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalPlan {
    signals: Vec<Signal>,
}

impl SignalPlan {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self { signals }
    }

    /// The plan used on a termination request: the signal the environment
    /// sent us first, then the fallbacks.
    pub fn for_received(received: Signal, fallback: &[Signal]) -> Self {
        let mut signals = Vec::with_capacity(fallback.len() + 1);
        signals.push(received);
        signals.extend_from_slice(fallback);
        Self { signals }
    }

    /// Every step in order. The last step is always [`EscalationStep::ForceKill`].
    pub fn steps(&self) -> impl Iterator<Item = EscalationStep> + '_ {
        self.signals
            .iter()
            .copied()
            .map(EscalationStep::Deliver)
            .chain(iter::once(EscalationStep::ForceKill))
    }

    pub fn step_count(&self) -> usize {
        self.signals.len() + 1
    }
}

impl fmt::Display for SignalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for signal in &self.signals {
            write!(f, "{} -> ", signal)?;
        }
        write!(f, "{}", Signal::KILL)
    }
}
