//! Event Module - change propagation between store and views (v0.1)
//!
//! Key types:
//! - `ChangeBus`: Topic-based publish/subscribe, generic over the event type
//! - `ChangeEvent`: Closed event enum (`StoreChanged` | `PresentationChanged`)
//! - `Topic`: Topics of `ChangeEvent`
//! - `BusEvent`: Trait tying an event type to its topic type

mod bus;
mod kind;

// Re-export all public types
pub use bus::{ChangeBus, Delivery, Listener, SubscriptionId};
pub use kind::{BusEvent, ChangeEvent, Topic};
