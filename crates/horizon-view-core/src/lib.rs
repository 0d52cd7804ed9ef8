//! Core systems for Horizon View.
//!
//! This crate provides the foundational components shared by the collection
//! view engine:
//!
//! - **Signal/Slot System**: Type-safe observer registration and emission
//! - **Logging**: Tracing targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_view_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
