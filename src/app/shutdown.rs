//! Ctrl-C handling.

use log::{error, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `cancel` on the first Ctrl-C.
///
/// The returned task finishes once either the signal arrives or the token is
/// cancelled elsewhere; abort it when the run completes normally.
pub fn cancel_on_ctrl_c(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    warn!("Interrupt received, cancelling batch");
                    cancel.cancel();
                }
                Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
            },
            _ = cancel.cancelled() => {}
        }
    })
}
