pub mod client;
pub mod messages;

pub use client::{event_subject, NatsNotifier};
pub use messages::LifecycleMessage;
