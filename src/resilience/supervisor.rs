//! # Connection Supervisor
//!
//! Owns the reconnect state machine for the cache backend.
//!
//! ```text
//! Connected --error event--> Reconnecting{0, d0}
//! Reconnecting{n, dn} --ping ok--> Connected
//! Reconnecting{n, dn} --ping failed, n+1 < max--> Reconnecting{n+1, dn+1}
//! Reconnecting{n, dn} --ping failed, n+1 = max--> Exhausted{max}
//! Exhausted --error event (restart enabled)--> Reconnecting{0, d0}
//! ```
//!
//! The supervisor never gates callers. Operations against a down backend fail
//! fast and the resolver degrades; the supervisor only decides when to probe.

use super::backoff::BackoffPolicy;
use crate::cache::{CacheResult, CacheService};
use crate::config::ReconnectConfig;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Observable connection state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Last known interaction with the backend succeeded
    Connected,
    /// A probe is scheduled; `attempt` is zero-based
    Reconnecting { attempt: u32, next_delay: Duration },
    /// Every attempt of the last cycle failed and no probe is scheduled
    Exhausted { attempts: u32 },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Reconnecting {
                attempt,
                next_delay,
            } => write!(
                f,
                "reconnecting (attempt {}, next in {}ms)",
                attempt + 1,
                next_delay.as_millis()
            ),
            ConnectionState::Exhausted { attempts } => {
                write!(f, "exhausted after {attempts} attempts")
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SupervisorOptions {
    /// Whether an error event after exhaustion starts a fresh cycle
    pub restart_after_exhaustion: bool,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            restart_after_exhaustion: true,
        }
    }
}

impl SupervisorOptions {
    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self {
            restart_after_exhaustion: config.restart_after_exhaustion,
        }
    }
}

#[derive(Debug)]
enum SupervisorEvent {
    ConnectionError(String),
    Shutdown,
}

/// Handle to the supervisor task
///
/// Created with [`ConnectionSupervisor::start`], which must run inside a
/// tokio runtime.
pub struct ConnectionSupervisor<C> {
    client: Arc<C>,
    policy: BackoffPolicy,
    events: mpsc::UnboundedSender<SupervisorEvent>,
    state: watch::Receiver<ConnectionState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<C> fmt::Debug for ConnectionSupervisor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSupervisor")
            .field("policy", &self.policy)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl<C> ConnectionSupervisor<C>
where
    C: CacheService + 'static,
{
    /// Spawn the supervisor task and eagerly ping the backend
    ///
    /// The state starts as `Connected`; a failed eager ping is treated as an
    /// error event.
    pub fn start(client: C, policy: BackoffPolicy, options: SupervisorOptions) -> Arc<Self> {
        let client = Arc::new(client);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connected);

        info!(
            provider = client.provider_name(),
            base_delay_ms = policy.base_delay().as_millis() as u64,
            max_delay_ms = policy.max_delay().as_millis() as u64,
            max_attempts = policy.max_attempts(),
            restart_after_exhaustion = options.restart_after_exhaustion,
            "Connection supervisor starting"
        );

        let worker = SupervisorTask {
            client: Arc::clone(&client),
            policy,
            options,
            events: events_rx,
            state: state_tx,
        };
        let handle = tokio::spawn(worker.run());

        Arc::new(Self {
            client,
            policy,
            events: events_tx,
            state: state_rx,
            task: Mutex::new(Some(handle)),
        })
    }

    /// Cache handle whose connection failures feed this supervisor
    pub fn client(&self) -> SupervisedCache<C> {
        SupervisedCache {
            inner: Arc::clone(&self.client),
            events: self.events.clone(),
        }
    }

    /// The wrapped client, bypassing error reporting
    pub fn inner(&self) -> &Arc<C> {
        &self.client
    }

    pub fn policy(&self) -> BackoffPolicy {
        self.policy
    }

    /// Raise a connection error event
    pub fn report_error(&self, reason: impl Into<String>) {
        let _ = self
            .events
            .send(SupervisorEvent::ConnectionError(reason.into()));
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Cancel any pending reconnect and stop the task
    pub async fn shutdown(&self) {
        let _ = self.events.send(SupervisorEvent::Shutdown);
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Connection supervisor task ended abnormally");
            }
        }
    }

    /// Whether the supervisor task is still running
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

/// A probe scheduled for `deadline`
#[derive(Debug, Clone, Copy)]
struct PendingProbe {
    attempt: u32,
    deadline: Instant,
}

struct SupervisorTask<C> {
    client: Arc<C>,
    policy: BackoffPolicy,
    options: SupervisorOptions,
    events: mpsc::UnboundedReceiver<SupervisorEvent>,
    state: watch::Sender<ConnectionState>,
}

impl<C: CacheService> SupervisorTask<C> {
    async fn run(mut self) {
        let mut pending = match self.client.ping().await {
            Ok(_) => {
                info!(
                    provider = self.client.provider_name(),
                    "Cache connection established"
                );
                None
            }
            Err(e) => {
                warn!(error = %e, "Eager cache connect failed");
                self.schedule(0)
            }
        };

        loop {
            match pending {
                Some(probe) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(probe.deadline) => {
                            pending = self.probe(probe.attempt).await;
                        }
                        event = self.events.recv() => match event {
                            Some(SupervisorEvent::ConnectionError(reason)) => {
                                debug!(
                                    reason = %reason,
                                    attempt = probe.attempt + 1,
                                    "Reconnect already in progress, error event coalesced"
                                );
                            }
                            Some(SupervisorEvent::Shutdown) | None => break,
                        },
                    }
                }
                None => match self.events.recv().await {
                    Some(SupervisorEvent::ConnectionError(reason)) => {
                        pending = self.on_error_event(&reason);
                    }
                    Some(SupervisorEvent::Shutdown) | None => break,
                },
            }
        }

        debug!("Connection supervisor stopped");
    }

    fn on_error_event(&self, reason: &str) -> Option<PendingProbe> {
        let current = self.state.borrow().clone();
        match current {
            ConnectionState::Exhausted { attempts } if !self.options.restart_after_exhaustion => {
                debug!(
                    reason = %reason,
                    attempts = attempts,
                    "Error event ignored, reconnect budget exhausted"
                );
                None
            }
            _ => {
                warn!(reason = %reason, previous_state = %current, "Cache connection error");
                self.schedule(0)
            }
        }
    }

    fn schedule(&self, attempt: u32) -> Option<PendingProbe> {
        let Some(delay) = self.policy.delay_for(attempt) else {
            self.exhaust(attempt);
            return None;
        };

        info!(
            attempt = attempt + 1,
            max_attempts = self.policy.max_attempts(),
            delay_ms = delay.as_millis() as u64,
            "Scheduling cache reconnect attempt"
        );
        self.state.send_replace(ConnectionState::Reconnecting {
            attempt,
            next_delay: delay,
        });

        Some(PendingProbe {
            attempt,
            deadline: Instant::now() + delay,
        })
    }

    async fn probe(&self, attempt: u32) -> Option<PendingProbe> {
        match self.client.ping().await {
            Ok(_) => {
                info!(attempt = attempt + 1, "Cache connection recovered");
                self.state.send_replace(ConnectionState::Connected);
                None
            }
            Err(e) => {
                warn!(
                    attempt = attempt + 1,
                    error = %e,
                    "Cache reconnect attempt failed"
                );
                self.schedule(attempt + 1)
            }
        }
    }

    fn exhaust(&self, attempts: u32) {
        error!(
            attempts = attempts,
            "Cache reconnect attempts exhausted, giving up until the next error event"
        );
        self.state
            .send_replace(ConnectionState::Exhausted { attempts });
    }
}

/// Cache handle that reports connection failures to its supervisor
///
/// Backend errors (the server answered, just not usefully) are passed
/// through without raising an error event.
pub struct SupervisedCache<C> {
    inner: Arc<C>,
    events: mpsc::UnboundedSender<SupervisorEvent>,
}

impl<C> Clone for SupervisedCache<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            events: self.events.clone(),
        }
    }
}

impl<C> fmt::Debug for SupervisedCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupervisedCache").finish_non_exhaustive()
    }
}

impl<C> SupervisedCache<C> {
    fn observe<T>(&self, operation: &str, result: CacheResult<T>) -> CacheResult<T> {
        if let Err(e) = &result {
            if e.is_connection_failure() {
                let _ = self.events.send(SupervisorEvent::ConnectionError(format!(
                    "{operation}: {e}"
                )));
            }
        }
        result
    }
}

impl<C: CacheService> CacheService for SupervisedCache<C> {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let result = self.inner.get(key).await;
        self.observe("GET", result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let result = self.inner.set(key, value, ttl).await;
        self.observe("SET", result)
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let result = self.inner.delete(key).await;
        self.observe("DEL", result)
    }

    async fn ping(&self) -> CacheResult<String> {
        let result = self.inner.ping().await;
        self.observe("PING", result)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Switchable {
        down: AtomicBool,
        pings: AtomicUsize,
    }

    impl CacheService for Switchable {
        async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            if self.down.load(Ordering::SeqCst) {
                Err(CacheError::ConnectionError("refused".to_string()))
            } else {
                Ok(None)
            }
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::BackendError("READONLY".to_string()))
        }

        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Ok(())
        }

        async fn ping(&self) -> CacheResult<String> {
            self.pings.fetch_add(1, Ordering::SeqCst);
            if self.down.load(Ordering::SeqCst) {
                Err(CacheError::ConnectionError("refused".to_string()))
            } else {
                Ok("PONG".to_string())
            }
        }

        fn provider_name(&self) -> &'static str {
            "switchable"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn healthy_backend_stays_connected() {
        let supervisor = ConnectionSupervisor::start(
            Switchable::default(),
            BackoffPolicy::default(),
            SupervisorOptions::default(),
        );
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(supervisor.state(), ConnectionState::Connected);
        assert_eq!(supervisor.inner().pings.load(Ordering::SeqCst), 1);
        supervisor.shutdown().await;
        assert!(!supervisor.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_on_first_successful_probe() {
        let backend = Switchable::default();
        backend.down.store(true, Ordering::SeqCst);
        let supervisor =
            ConnectionSupervisor::start(backend, BackoffPolicy::default(), SupervisorOptions::default());

        let mut state = supervisor.subscribe();
        state
            .wait_for(|s| matches!(s, ConnectionState::Reconnecting { attempt: 1, .. }))
            .await
            .unwrap();

        supervisor.inner().down.store(false, Ordering::SeqCst);
        state.wait_for(ConnectionState::is_connected).await.unwrap();

        supervisor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn backend_errors_are_not_error_events() {
        let supervisor = ConnectionSupervisor::start(
            Switchable::default(),
            BackoffPolicy::default(),
            SupervisorOptions::default(),
        );
        let cache = supervisor.client();

        assert!(cache.set("chrome", "1.0", Duration::from_secs(1)).await.is_err());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(supervisor.state(), ConnectionState::Connected);

        supervisor.inner().down.store(true, Ordering::SeqCst);
        assert!(cache.get("chrome").await.is_err());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(matches!(
            supervisor.state(),
            ConnectionState::Reconnecting { attempt: 0, .. }
        ));

        supervisor.shutdown().await;
    }

    #[test]
    fn state_display() {
        let state = ConnectionState::Reconnecting {
            attempt: 2,
            next_delay: Duration::from_millis(4000),
        };
        assert_eq!(state.to_string(), "reconnecting (attempt 3, next in 4000ms)");
        assert_eq!(
            ConnectionState::Exhausted { attempts: 5 }.to_string(),
            "exhausted after 5 attempts"
        );
    }
}
