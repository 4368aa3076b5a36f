//! DispatchLoop - background listener feeding the attribute cache

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use attribute_cache::AttributeCache;
use contracts::{BusConnector, DispatchConfig, NotificationSource, Received};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::error::DispatchError;
use crate::metrics::DispatchMetrics;

/// Lifecycle of a dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Created, no connection yet
    Idle,
    /// Connection established, not listening
    Connected,
    /// Dispatch thread running
    Listening,
    /// Terminal; the loop cannot be restarted
    Stopped,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connected => "connected",
            Self::Listening => "listening",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// How `stop()` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The dispatch thread has exited (or never ran)
    Completed,
    /// The thread did not exit within `stop_timeout` and was detached.
    /// It will not write to the cache when it wakes.
    TimedOut,
}

struct Worker {
    handle: JoinHandle<()>,
    running: Arc<AtomicBool>,
    /// Disconnects when the worker exits
    exited: Receiver<()>,
}

/// Listens for update notifications and writes them to the cache
///
/// ```ignore
/// let mut dispatch = DispatchLoop::new("position", config, Arc::clone(&cache));
/// dispatch.connect(&mut connector)?;
/// dispatch.listen()?;
/// // ...
/// dispatch.stop()?;
/// ```
pub struct DispatchLoop {
    name: String,
    config: DispatchConfig,
    cache: Arc<AttributeCache>,
    metrics: Arc<DispatchMetrics>,
    state: LoopState,
    source: Option<Box<dyn NotificationSource>>,
    worker: Option<Worker>,
}

impl DispatchLoop {
    pub fn new(name: impl Into<String>, config: DispatchConfig, cache: Arc<AttributeCache>) -> Self {
        Self {
            name: name.into(),
            config,
            cache,
            metrics: Arc::new(DispatchMetrics::new()),
            state: LoopState::Idle,
            source: None,
            worker: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// True while the dispatch thread is alive
    ///
    /// Turns false on its own when the source closes.
    pub fn is_listening(&self) -> bool {
        self.state == LoopState::Listening
            && self
                .worker
                .as_ref()
                .is_some_and(|worker| !worker.handle.is_finished())
    }

    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// `Idle → Connected`
    ///
    /// # Errors
    /// A connector failure is returned as-is and the loop stays `Idle`.
    #[instrument(name = "dispatch_connect", skip(self, connector), fields(dispatch = %self.name))]
    pub fn connect(&mut self, connector: &mut dyn BusConnector) -> Result<(), DispatchError> {
        if self.state != LoopState::Idle {
            return Err(DispatchError::invalid_state("connect", self.state));
        }

        let source = connector.connect()?;
        debug!(source = source.name(), "Bus connected");
        self.source = Some(source);
        self.state = LoopState::Connected;
        Ok(())
    }

    /// `Connected → Listening`: spawn the dispatch thread
    #[instrument(name = "dispatch_listen", skip(self), fields(dispatch = %self.name))]
    pub fn listen(&mut self) -> Result<(), DispatchError> {
        let source = match (self.state, self.source.take()) {
            (LoopState::Connected, Some(source)) => source,
            (state, _) => return Err(DispatchError::invalid_state("listen", state)),
        };

        let running = Arc::new(AtomicBool::new(true));
        let (exit_tx, exited) = channel::bounded(0);
        let context = WorkerContext {
            name: self.name.clone(),
            source,
            cache: Arc::clone(&self.cache),
            metrics: Arc::clone(&self.metrics),
            running: Arc::clone(&running),
            receive_timeout: self.config.receive_timeout(),
            _exit: exit_tx,
        };

        let handle = thread::Builder::new()
            .name(format!("dispatch-{}", self.name))
            .spawn(move || context.run())
            .map_err(|e| {
                // the source went down with the closure
                self.state = LoopState::Stopped;
                DispatchError::Spawn(e)
            })?;

        self.worker = Some(Worker {
            handle,
            running,
            exited,
        });
        self.state = LoopState::Listening;
        info!(
            receive_timeout_ms = self.config.receive_timeout_ms,
            "Dispatch loop listening"
        );
        Ok(())
    }

    /// Move to `Stopped`, waiting at most `stop_timeout` for the thread
    ///
    /// Callable from any state; stopping twice is a no-op.
    ///
    /// # Errors
    /// [`DispatchError::WorkerPanicked`] if the thread died by panic. The
    /// loop is `Stopped` either way.
    #[instrument(name = "dispatch_stop", skip(self), fields(dispatch = %self.name, state = %self.state))]
    pub fn stop(&mut self) -> Result<StopOutcome, DispatchError> {
        self.state = LoopState::Stopped;
        self.source = None;

        let Some(worker) = self.worker.take() else {
            return Ok(StopOutcome::Completed);
        };

        worker.running.store(false, Ordering::Release);
        let stop_timeout = self.config.stop_timeout();
        match worker.exited.recv_timeout(stop_timeout) {
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    stop_timeout_ms = self.config.stop_timeout_ms,
                    "Dispatch thread did not exit in time, detaching"
                );
                Ok(StopOutcome::TimedOut)
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    error!("Dispatch thread panicked");
                    return Err(DispatchError::WorkerPanicked {
                        name: self.name.clone(),
                    });
                }
                info!(metrics = ?self.metrics.snapshot(), "Dispatch loop stopped");
                Ok(StopOutcome::Completed)
            }
        }
    }
}

impl Drop for DispatchLoop {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.stop() {
                error!(dispatch = %self.name, error = %e, "Stop on drop failed");
            }
        }
    }
}

/// Everything the dispatch thread owns
struct WorkerContext {
    name: String,
    source: Box<dyn NotificationSource>,
    cache: Arc<AttributeCache>,
    metrics: Arc<DispatchMetrics>,
    running: Arc<AtomicBool>,
    receive_timeout: Duration,
    _exit: Sender<()>,
}

impl WorkerContext {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn run(mut self) {
        debug!(dispatch = %self.name, source = self.source.name(), "Dispatch thread started");

        while self.is_running() {
            match self.source.receive(self.receive_timeout) {
                Ok(Received::Message(payload)) => {
                    // stop may have been requested while blocked in receive
                    if !self.is_running() {
                        debug!(dispatch = %self.name, "Stop requested, notification discarded");
                        break;
                    }
                    self.handle_notification(&payload);
                }
                Ok(Received::Timeout) => trace!(dispatch = %self.name, "Receive timeout"),
                Ok(Received::Closed) => {
                    info!(dispatch = %self.name, "Notification source closed");
                    break;
                }
                Err(e) => {
                    self.metrics.inc_receive_errors();
                    warn!(dispatch = %self.name, error = %e, "Receive failed, backing off");
                    thread::sleep(self.receive_timeout);
                }
            }
        }

        debug!(dispatch = %self.name, "Dispatch thread stopped");
    }

    fn handle_notification(&self, payload: &[u8]) {
        self.metrics.inc_received();
        observability::record_notification_received();

        match wire_codec::decode_update(payload) {
            Ok((mask, snapshot)) => {
                self.cache.apply(&snapshot);
                self.metrics.add_values_written(snapshot.len() as u64);
                self.metrics.inc_applied();
                debug!(
                    dispatch = %self.name,
                    changed = %mask,
                    values = snapshot.len(),
                    "Notification applied"
                );
            }
            Err(e) => {
                // Continue listening - one bad message must not end the loop
                self.metrics.inc_decode_failures();
                observability::record_decode_failure(e.kind());
                warn!(
                    dispatch = %self.name,
                    error = %e,
                    bytes = payload.len(),
                    "Discarding notification"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_bus::channel_bus;
    use bytes::Bytes;
    use contracts::{AttributeKey, ContractError, Snapshot};
    use std::time::Instant;

    fn test_config() -> DispatchConfig {
        DispatchConfig {
            receive_timeout_ms: 10,
            stop_timeout_ms: 1000,
            channel_capacity: 16,
        }
    }

    fn update(key: AttributeKey, value: f64) -> Bytes {
        let snapshot = Snapshot::new().with(key, value);
        wire_codec::encode_update(key.into(), &snapshot)
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    struct FailingConnector;

    impl BusConnector for FailingConnector {
        fn connect(&mut self) -> Result<Box<dyn NotificationSource>, ContractError> {
            Err(ContractError::bus_connection("service unavailable"))
        }
    }

    #[test]
    fn test_connect_failure_stays_idle() {
        let mut dispatch = DispatchLoop::new("test", test_config(), Arc::default());
        let result = dispatch.connect(&mut FailingConnector);

        assert!(matches!(result, Err(DispatchError::Connect(_))));
        assert_eq!(dispatch.state(), LoopState::Idle);
    }

    #[test]
    fn test_listen_requires_connection() {
        let mut dispatch = DispatchLoop::new("test", test_config(), Arc::default());
        assert!(matches!(
            dispatch.listen(),
            Err(DispatchError::InvalidState {
                operation: "listen",
                state: LoopState::Idle
            })
        ));
    }

    #[test]
    fn test_malformed_notification_is_isolated() {
        let cache = Arc::new(AttributeCache::new());
        let (publisher, mut connector) = channel_bus("test", 16);
        let mut dispatch = DispatchLoop::new("test", test_config(), Arc::clone(&cache));
        dispatch.connect(&mut connector).unwrap();
        dispatch.listen().unwrap();
        assert!(dispatch.is_listening());

        publisher.publish(Bytes::from_static(b"garbage")).unwrap();
        publisher.publish(update(AttributeKey::Latitude, 47.5)).unwrap();

        let metrics = Arc::clone(dispatch.metrics());
        assert!(wait_until(|| metrics.applied() == 1));
        assert_eq!(metrics.decode_failures(), 1);
        assert_eq!(metrics.received(), 2);
        assert_eq!(cache.get(AttributeKey::Latitude), 47.5);
        assert!(dispatch.is_listening());

        assert_eq!(dispatch.stop().unwrap(), StopOutcome::Completed);
    }

    #[test]
    fn test_no_writes_after_stop() {
        let cache = Arc::new(AttributeCache::new());
        let (publisher, mut connector) = channel_bus("test", 16);
        let mut dispatch = DispatchLoop::new("test", test_config(), Arc::clone(&cache));
        dispatch.connect(&mut connector).unwrap();
        dispatch.listen().unwrap();

        publisher.publish(update(AttributeKey::Speed, 3.0)).unwrap();
        assert!(wait_until(|| cache.write_count() == 1));

        assert_eq!(dispatch.stop().unwrap(), StopOutcome::Completed);
        let writes = cache.write_count();

        // the source went away with the thread
        assert!(publisher.publish(update(AttributeKey::Speed, 4.0)).is_err());
        thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.write_count(), writes);
        assert_eq!(cache.get(AttributeKey::Speed), 3.0);
    }

    #[test]
    fn test_stopped_is_terminal() {
        let (_publisher, mut connector) = channel_bus("test", 1);
        let mut dispatch = DispatchLoop::new("test", test_config(), Arc::default());
        dispatch.connect(&mut connector).unwrap();
        dispatch.listen().unwrap();
        dispatch.stop().unwrap();

        assert_eq!(dispatch.state(), LoopState::Stopped);
        assert!(!dispatch.is_listening());
        assert!(dispatch.listen().is_err());
        let (_publisher, mut connector) = channel_bus("again", 1);
        assert!(matches!(
            dispatch.connect(&mut connector),
            Err(DispatchError::InvalidState { .. })
        ));
        assert_eq!(dispatch.stop().unwrap(), StopOutcome::Completed);
    }

    #[test]
    fn test_stop_before_listen() {
        let (_publisher, mut connector) = channel_bus("test", 1);
        let mut dispatch = DispatchLoop::new("test", test_config(), Arc::default());
        dispatch.connect(&mut connector).unwrap();
        assert_eq!(dispatch.stop().unwrap(), StopOutcome::Completed);
        assert_eq!(dispatch.state(), LoopState::Stopped);
    }

    #[test]
    fn test_closed_source_ends_worker() {
        let (publisher, mut connector) = channel_bus("test", 1);
        let mut dispatch = DispatchLoop::new("test", test_config(), Arc::default());
        dispatch.connect(&mut connector).unwrap();
        dispatch.listen().unwrap();

        drop(publisher);
        assert!(wait_until(|| !dispatch.is_listening()));
        assert_eq!(dispatch.state(), LoopState::Listening);
        assert_eq!(dispatch.stop().unwrap(), StopOutcome::Completed);
    }

    /// Ignores the receive timeout and blocks for a long time
    struct StuckSource {
        entered: Sender<()>,
        block_for: Duration,
    }

    impl NotificationSource for StuckSource {
        fn name(&self) -> &str {
            "stuck"
        }

        fn receive(&mut self, _timeout: Duration) -> Result<Received, ContractError> {
            let _ = self.entered.try_send(());
            thread::sleep(self.block_for);
            Ok(Received::Message(update(AttributeKey::Altitude, 100.0)))
        }
    }

    struct StuckConnector(Option<StuckSource>);

    impl BusConnector for StuckConnector {
        fn connect(&mut self) -> Result<Box<dyn NotificationSource>, ContractError> {
            self.0
                .take()
                .map(|source| Box::new(source) as Box<dyn NotificationSource>)
                .ok_or_else(|| ContractError::bus_connection("used"))
        }
    }

    #[test]
    fn test_stop_timeout_detaches_without_late_writes() {
        let cache = Arc::new(AttributeCache::new());
        let (entered_tx, entered_rx) = channel::bounded(1);
        let mut connector = StuckConnector(Some(StuckSource {
            entered: entered_tx,
            block_for: Duration::from_millis(200),
        }));
        let config = DispatchConfig {
            stop_timeout_ms: 20,
            ..test_config()
        };
        let mut dispatch = DispatchLoop::new("stuck", config, Arc::clone(&cache));
        dispatch.connect(&mut connector).unwrap();
        dispatch.listen().unwrap();

        entered_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(dispatch.stop().unwrap(), StopOutcome::TimedOut);
        assert_eq!(dispatch.state(), LoopState::Stopped);

        // the detached thread wakes up with a message and must drop it
        thread::sleep(Duration::from_millis(400));
        assert_eq!(cache.write_count(), 0);
        assert_eq!(cache.get(AttributeKey::Altitude), 0.0);
    }

    /// Fails every receive
    struct BrokenSource;

    impl NotificationSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        fn receive(&mut self, _timeout: Duration) -> Result<Received, ContractError> {
            Err(ContractError::bus_receive("broken", "link down"))
        }
    }

    struct BrokenConnector;

    impl BusConnector for BrokenConnector {
        fn connect(&mut self) -> Result<Box<dyn NotificationSource>, ContractError> {
            Ok(Box::new(BrokenSource))
        }
    }

    #[test]
    fn test_receive_errors_are_counted() {
        let mut dispatch = DispatchLoop::new("broken", test_config(), Arc::default());
        dispatch.connect(&mut BrokenConnector).unwrap();
        dispatch.listen().unwrap();

        let metrics = Arc::clone(dispatch.metrics());
        assert!(wait_until(|| metrics.receive_errors() >= 2));
        assert!(dispatch.is_listening());
        assert_eq!(dispatch.stop().unwrap(), StopOutcome::Completed);
    }

    #[test]
    fn test_drop_stops_listening_loop() {
        let (publisher, mut connector) = channel_bus("test", 1);
        let mut dispatch = DispatchLoop::new("test", test_config(), Arc::default());
        dispatch.connect(&mut connector).unwrap();
        dispatch.listen().unwrap();

        drop(dispatch);
        assert!(publisher.publish(Bytes::new()).is_err());
    }
}
