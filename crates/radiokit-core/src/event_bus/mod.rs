//! # Event Bus Module
//!
//! Publish/subscribe channel for viewer events. Persistence and remote
//! service failures are surfaced to the user through `Notification`
//! events published here, never by blocking the canvas.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use radiokit_core::event_bus::{
//!     event_bus, EventCategory, EventFilter, Notification, ViewerEvent,
//! };
//!
//! let subscription = event_bus().subscribe(
//!     EventFilter::Categories(vec![EventCategory::Notification]),
//!     |event| {
//!         if let ViewerEvent::Notification(n) = event {
//!             println!("{}", n.message);
//!         }
//!     },
//! );
//!
//! event_bus().publish(ViewerEvent::Notification(Notification::warning("Save failed")));
//! event_bus().unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
