use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Copy one of the child's output pipes to our own stream until the pipe
/// closes. The task ends on its own when the child (and anything that
/// inherited the pipe) exits.
pub(super) fn spawn_relay<R, W>(
    stream: &'static str,
    mut reader: R,
    mut writer: W,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(bytes) => debug!(stream, bytes, "Output relay finished"),
            Err(e) => warn!(stream, error = %e, "Output relay failed"),
        }

        if let Err(e) = writer.flush().await {
            debug!(stream, error = %e, "Failed to flush relayed output");
        }
    })
}
