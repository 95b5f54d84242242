//! Shared test doubles for integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use version_checker::cache::{CacheError, CacheResult, CacheService};
use version_checker::config::VersionCheckerConfig;

#[derive(Default)]
struct MockState {
    entries: Mutex<HashMap<String, (String, Duration)>>,
    get_fails: AtomicBool,
    set_fails: AtomicBool,
    delete_fails: AtomicBool,
    ping_fails: AtomicBool,
    ping_reply: Mutex<Option<String>>,
    gets: AtomicUsize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
    ping_times: Mutex<Vec<Instant>>,
}

/// In-memory cache with switchable failures
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect another.
#[derive(Clone, Default)]
pub struct MockCache {
    state: Arc<MockState>,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose every operation fails with a connection error
    pub fn unreachable() -> Self {
        let cache = Self::new();
        cache.set_down(true);
        cache
    }

    pub fn set_down(&self, down: bool) {
        self.fail_gets(down);
        self.fail_sets(down);
        self.fail_deletes(down);
        self.fail_pings(down);
    }

    pub fn fail_gets(&self, fail: bool) {
        self.state.get_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sets(&self, fail: bool) {
        self.state.set_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.state.delete_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_pings(&self, fail: bool) {
        self.state.ping_fails.store(fail, Ordering::SeqCst);
    }

    pub fn set_ping_reply(&self, reply: &str) {
        *self.state.ping_reply.lock() = Some(reply.to_string());
    }

    /// Seed an entry without counting it as a write
    pub fn seed(&self, key: &str, value: &str) {
        self.state
            .entries
            .lock()
            .insert(key.to_string(), (value.to_string(), Duration::from_secs(3600)));
    }

    pub fn entry(&self, key: &str) -> Option<(String, Duration)> {
        self.state.entries.lock().get(key).cloned()
    }

    pub fn gets(&self) -> usize {
        self.state.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.state.sets.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.state.deletes.load(Ordering::SeqCst)
    }

    pub fn ping_times(&self) -> Vec<Instant> {
        self.state.ping_times.lock().clone()
    }

    pub fn ping_count(&self) -> usize {
        self.state.ping_times.lock().len()
    }
}

fn refused(op: &str) -> CacheError {
    CacheError::ConnectionError(format!("{op}: connection refused"))
}

impl CacheService for MockCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.state.gets.fetch_add(1, Ordering::SeqCst);
        if self.state.get_fails.load(Ordering::SeqCst) {
            return Err(refused("GET"));
        }
        Ok(self.state.entries.lock().get(key).map(|(v, _)| v.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.state.sets.fetch_add(1, Ordering::SeqCst);
        if self.state.set_fails.load(Ordering::SeqCst) {
            return Err(refused("SET"));
        }
        self.state
            .entries
            .lock()
            .insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.state.deletes.fetch_add(1, Ordering::SeqCst);
        if self.state.delete_fails.load(Ordering::SeqCst) {
            return Err(refused("DEL"));
        }
        self.state.entries.lock().remove(key);
        Ok(())
    }

    async fn ping(&self) -> CacheResult<String> {
        self.state.ping_times.lock().push(Instant::now());
        if self.state.ping_fails.load(Ordering::SeqCst) {
            return Err(refused("PING"));
        }
        Ok(self
            .state
            .ping_reply
            .lock()
            .clone()
            .unwrap_or_else(|| "PONG".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Default config seeded with the two stock projects
pub fn test_config() -> VersionCheckerConfig {
    let mut config = VersionCheckerConfig::default();
    config.environment = "test".to_string();
    config
        .projects
        .insert("chrome".to_string(), "120.0.6099.71".to_string());
    config
        .projects
        .insert("brave-core".to_string(), "1.61.100".to_string());
    config
}
