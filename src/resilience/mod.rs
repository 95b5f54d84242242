//! # Resilience Module
//!
//! Keeps the cache connection alive without involving callers.
//!
//! - **Backoff**: the bounded exponential delay law between reconnect attempts
//! - **Supervisor**: a background task that reacts to connection errors by
//!   probing the backend on the backoff schedule until it answers or the
//!   attempt budget is spent
//!
//! ## Usage
//!
//! ```rust,no_run
//! use version_checker::cache::NoOpCacheService;
//! use version_checker::resilience::{BackoffPolicy, ConnectionSupervisor, SupervisorOptions};
//!
//! # async fn example() {
//! let supervisor = ConnectionSupervisor::start(
//!     NoOpCacheService::new(),
//!     BackoffPolicy::default(),
//!     SupervisorOptions::default(),
//! );
//!
//! // Operations through this handle report connection failures to the supervisor
//! let cache = supervisor.client();
//! # let _ = cache;
//! supervisor.shutdown().await;
//! # }
//! ```

pub mod backoff;
pub mod supervisor;

pub use backoff::BackoffPolicy;
pub use supervisor::{ConnectionState, ConnectionSupervisor, SupervisedCache, SupervisorOptions};
