//! Cache provider implementations

pub mod noop;
pub mod redis;

pub use noop::NoOpCacheService;
pub use self::redis::RedisCacheService;
