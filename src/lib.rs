//! Conversational storefront bot.
//!
//! The interesting part of this crate is not the storefront, it is the guard
//! pipeline in front of it: every inbound update passes through a fault
//! interceptor and a per-sender rate limiter before any business handler
//! runs. See `lovebot-guard` for the pipeline itself; this crate wires it to
//! configuration, a transport seam and a lifecycle.

pub mod app;
pub mod transport;

pub use app::{BotApp, EventHandler, LoggingHandler};
pub use transport::{memory_updates, MemoryNotifier, MemoryUpdateSource, Outbound, UpdateSource};
