use std::future::Future;
use std::io;

use tokio_util::sync::CancellationToken;

use crate::error::{Result, TransportError};

/// Runs one suspending I/O step, aborting it if `cancel` fires first.
///
/// A read that hits end of stream while more bytes were expected is
/// reported as [`TransportError::PrematureClose`].
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match cancel.run_until_cancelled(fut).await {
        None => Err(TransportError::Cancelled),
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
            Err(TransportError::PrematureClose)
        }
        Some(Err(e)) => Err(e.into()),
    }
}
