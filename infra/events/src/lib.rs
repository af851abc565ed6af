//! # Event Bus
//!
//! Typed fan-out of domain events between slices. Channels are keyed by the
//! event's [`TypeId`](std::any::TypeId) and created lazily on first use.
//!
//! Publishing never blocks: events without subscribers are dropped, and slow
//! subscribers skip ahead (see [`EventReceiverExt`]).
//!
//! # Example
//!
//! ```rust
//! use unireg_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Debug)]
//! struct SeatTaken { course: &'static str }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let mut rx = bus.subscribe::<SeatTaken>()?;
//!
//!     bus.publish(SeatTaken { course: "CS101" })?;
//!     assert_eq!(rx.next_event().await.map(|e| e.course), Some("CS101"));
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
