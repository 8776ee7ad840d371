//! Desktop notification delivery
//!
//! Native notifications go through `terminal-notifier` on macOS; everywhere
//! else, and whenever the notifier fails, an OSC 777 sequence is written to
//! the terminal instead.

pub mod dispatcher;
pub mod osc;

pub use dispatcher::{Channel, DeliveryError, DeliveryOutcome, Dispatcher, Notification};
pub use osc::{format_osc777, write_osc777};
