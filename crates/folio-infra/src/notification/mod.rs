//! Notification sinks for lifecycle events.

mod log;
mod memory;

pub use self::log::LogNotificationSink;
pub use memory::InMemoryNotificationSink;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisNotificationSink};
