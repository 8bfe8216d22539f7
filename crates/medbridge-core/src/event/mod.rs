//! Room event bus.
//!
//! Provides a `RoomEventBus` that distributes `RoomEvent` messages to all
//! subscribers via a `tokio::sync::broadcast` channel.

pub mod bus;

pub use bus::RoomEventBus;
