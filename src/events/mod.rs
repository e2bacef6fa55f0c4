//! Dispatch events and listeners.
//!
//! The registry reports what it does as [`DispatchEvent`]s instead of
//! printing. Attach an [`EventLog`] to inspect them or a
//! [`NarrationListener`] to print a running commentary.

pub mod dispatch_event;
pub mod listener;

pub use dispatch_event::{DispatchEvent, DispatchEventKind};
pub use listener::{DispatchListener, EventLog, NarrationListener};
