//! # Cache Module
//!
//! Volatile key-value cache sitting in front of the authoritative build config.
//!
//! ## Architecture
//!
//! ```text
//! CacheProvider (enum)            <- Zero-cost dispatch, no vtable
//!   ├── Redis(RedisCacheService)  <- ConnectionManager-based async Redis
//!   └── NoOp(NoOpCacheService)    <- Always-miss, always-succeed (cache disabled)
//! ```
//!
//! Consumers never talk to a provider directly: the reconnect supervisor wraps
//! the provider in a [`SupervisedCache`](crate::resilience::SupervisedCache) so
//! that connection failures feed the reconnect state machine.

pub mod errors;
pub mod provider;
pub mod providers;
pub mod traits;

pub use errors::{CacheError, CacheResult};
pub use provider::CacheProvider;
pub use providers::{NoOpCacheService, RedisCacheService};
pub use traits::CacheService;
