//! Backends for [`WaitlistStore`](super::repository::WaitlistStore).

pub mod file;
pub mod memory;
pub mod redis_store;

pub use file::{FileWaitlistStore, WaitlistDocument};
pub use memory::MemoryWaitlistStore;
pub use redis_store::RedisWaitlistStore;
