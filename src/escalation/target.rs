use crate::signal::Signal;
use async_trait::async_trait;
use std::io;

/// Something that can be asked to stop: the supervised child, or a stand-in
/// in tests.
#[async_trait]
pub trait SignalTarget: Send + Sync {
    fn pid(&self) -> u32;

    /// True once the target is known to be gone. Escalation stops early when
    /// this flips.
    fn has_exited(&self) -> bool;

    /// Deliver `signal`. `Ok` means the OS accepted it, not that the target
    /// exited.
    async fn signal(&self, signal: Signal) -> io::Result<()>;

    /// Unconditional kill.
    async fn kill(&self) -> io::Result<()>;
}
