use crate::bus::Event;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

/// Lag-tolerant receiving for bus subscriptions.
pub trait EventReceiverExt<T> {
    /// Waits for the next event; `None` once every sender is gone.
    ///
    /// A subscriber that fell behind resumes at the oldest retained event and
    /// logs how many it missed.
    fn next_event(&mut self) -> impl Future<Output = Option<Arc<T>>> + Send;
}

impl<T: Event> EventReceiverExt<T> for broadcast::Receiver<Arc<T>> {
    async fn next_event(&mut self) -> Option<Arc<T>> {
        let mut skipped = 0u64;

        loop {
            match self.recv().await {
                Ok(event) => {
                    if skipped > 0 {
                        warn!(event = std::any::type_name::<T>(), skipped, "Subscriber lagged");
                    }
                    return Some(event);
                },
                Err(broadcast::error::RecvError::Lagged(n)) => skipped = skipped.saturating_add(n),
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
