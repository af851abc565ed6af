use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tracing::{trace, warn};

const DEFAULT_CAPACITY: usize = 256;

/// Anything that can travel over the bus.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

#[derive(Debug)]
struct Channel {
    capacity: usize,
    sender: Box<dyn Any + Send + Sync>,
}

#[derive(Debug, Default)]
struct BusInner {
    channels: RwLock<FxHashMap<TypeId, Channel>>,
    closed: AtomicBool,
}

/// Shared, cloneable broadcast registry.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `T` with the default buffer.
    ///
    /// # Errors
    /// [`EventBusError::Closed`] after [`EventBus::shutdown`].
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity::<T>(DEFAULT_CAPACITY)
    }

    /// Subscribes to `T`, creating its channel with `capacity` if needed.
    ///
    /// The first caller fixes the capacity; later mismatches are only logged.
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        if capacity == 0 {
            return Err(EventBusError::InvalidCapacity {
                message: "capacity must be at least 1".into(),
                context: Some(type_name::<T>().into()),
            });
        }
        Ok(self.sender::<T>(capacity)?.subscribe())
    }

    /// Publishes `event` to every current subscriber of `T`.
    ///
    /// Returns how many subscribers received it; zero is not an error.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        let sender = self.sender::<T>(DEFAULT_CAPACITY)?;

        let delivered = sender.send(Arc::new(event)).unwrap_or(0);
        trace!(event = type_name::<T>(), delivered, "Event published");
        Ok(delivered)
    }

    #[must_use]
    pub fn subscriber_count<T: Event>(&self) -> usize {
        self.inner
            .channels
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|c| c.sender.downcast_ref::<broadcast::Sender<Arc<T>>>())
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Drops every channel so pending receivers observe the end of stream.
    ///
    /// Returns the number of channels closed. Later calls fail with
    /// [`EventBusError::Closed`].
    pub fn shutdown(&self) -> usize {
        self.inner.closed.store(true, Ordering::Release);
        let mut channels = self.inner.channels.write();
        let count = channels.len();
        channels.clear();
        count
    }

    fn sender<T: Event>(&self, capacity: usize) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(EventBusError::Closed {
                message: type_name::<T>().into(),
                context: None,
            });
        }

        let id = TypeId::of::<T>();
        if let Some(channel) = self.inner.channels.read().get(&id) {
            return downcast::<T>(channel, capacity);
        }

        let mut channels = self.inner.channels.write();
        let channel = channels.entry(id).or_insert_with(|| {
            trace!(event = type_name::<T>(), capacity, "Opening channel");
            let (tx, _) = broadcast::channel::<Arc<T>>(capacity);
            Channel { capacity, sender: Box::new(tx) }
        });
        downcast::<T>(channel, capacity)
    }
}

fn downcast<T: Event>(
    channel: &Channel,
    requested: usize,
) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
    if channel.capacity != requested && requested != DEFAULT_CAPACITY {
        warn!(
            event = type_name::<T>(),
            existing = channel.capacity,
            requested,
            "Channel already open with a different capacity"
        );
    }

    channel.sender.downcast_ref::<broadcast::Sender<Arc<T>>>().cloned().ok_or_else(|| {
        EventBusError::TypeMismatch { message: type_name::<T>().into(), context: None }
    })
}
