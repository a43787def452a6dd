//! Global pointer tracking
//!
//! Samples the primary button and cursor position, and turns presses into
//! clicks for the recording session.

pub mod device;
pub mod listener;
pub mod queue;

pub use device::{system_pointer, PassivePointer, PointerDevice, PressEdge, ScriptedPointer};
pub use listener::{ClickSink, PointerListener, POLL_INTERVAL};
pub use queue::{click_queue, ClickReceiver, ClickSample, ClickSender, CLICK_QUEUE_CAPACITY};
