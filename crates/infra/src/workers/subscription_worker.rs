use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::warn;

use gridcat_events::Subscription;

use super::WorkerHandle;

/// Generic consumer loop over one bus subscription.
///
/// - Applies a handler to every received message
/// - Handler failures are logged and the loop keeps going
/// - Supports graceful shutdown
#[derive(Debug)]
pub struct SubscriptionWorker;

impl SubscriptionWorker {
    /// Spawn a worker thread that drains `subscription` into `handler`.
    ///
    /// `handler` must tolerate duplicates and gaps (best-effort delivery).
    pub fn spawn<M, H, E>(name: &'static str, subscription: Subscription<M>, mut handler: H) -> WorkerHandle
    where
        M: Send + 'static,
        H: FnMut(M) -> Result<(), E> + Send + 'static,
        E: core::fmt::Display + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, subscription, shutdown_rx, &mut handler))
            .expect("failed to spawn subscription worker thread");

        WorkerHandle::new(name, shutdown_tx, join)
    }
}

fn worker_loop<M, H, E>(
    name: &'static str,
    sub: Subscription<M>,
    shutdown_rx: mpsc::Receiver<()>,
    handler: &mut H,
) where
    H: FnMut(M) -> Result<(), E>,
    E: core::fmt::Display,
{
    let tick = Duration::from_millis(250);

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match sub.recv_timeout(tick) {
            Ok(msg) => {
                if let Err(err) = handler(msg) {
                    warn!(worker = name, error = %err, "subscription worker handler failed");
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}
