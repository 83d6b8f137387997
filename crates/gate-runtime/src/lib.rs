//! # Ramp Gate Runtime
//!
//! Wires the gate components onto one event dispatcher.
//!
//! ## Startup Sequence
//!
//! 1. Open the whitelist store
//! 2. Initial `reload()` (a failure leaves the cache empty: every request is denied)
//! 3. Register handlers on the dispatcher
//! 4. Spawn the dispatch loop
//! 5. Spawn the broker connection loop
//!
//! ```text
//! broker ──→ rg-01 ──emit──┐
//!                          ▼
//! CRUD ──notifier──→ [ dispatcher ] ──→ admin/test            → AdminTestHandler
//!                          │        ──→ alpr/refresh/lp/...   → WhitelistRefreshHandler (rg-02)
//!                          │        ──→ alpr/ramp/req         → AccessRequestHandler    (rg-03)
//!                          │                                        │
//!                          └────────────── alpr/ramp/cmd ←──────────┘ (via rg-01 publisher)
//! ```

pub mod adapters;
pub mod container;

use std::sync::Arc;

use parking_lot::Mutex;
use rg_01_bus_connection::BusConnection;
use rg_02_whitelist_cache::{
    CacheError, SqliteWhitelistStore, WhitelistCache, WhitelistRefreshHandler, WhitelistStore,
};
use rg_03_access_decision::{
    AccessDecisionEngine, AccessRequestHandler, Clock, CommandPublisher, LocalClock,
};
use shared_bus::{EventDispatcher, EventEmitter, MutationNotifier};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::adapters::{AdminTestHandler, CacheView, MqttCommandPublisher};
pub use crate::container::{ConfigError, GateConfig};

/// Errors that prevent the runtime from starting.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Whitelist store unavailable: {0}")]
    Store(#[from] CacheError),

    #[error("Runtime already started")]
    AlreadyStarted,
}

/// The gate process.
pub struct GateRuntime {
    config: GateConfig,
    dispatcher: Arc<EventDispatcher>,
    cache: Arc<WhitelistCache>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl GateRuntime {
    /// Runtime over the SQLite database named in `config`.
    pub fn open(config: GateConfig) -> Result<Self, RuntimeError> {
        let store = SqliteWhitelistStore::open(&config.db_path)?;
        Ok(Self::new(config, Arc::new(store)))
    }

    /// Runtime over any whitelist store.
    pub fn new(config: GateConfig, store: Arc<dyn WhitelistStore>) -> Self {
        info!("Creating ramp gate runtime");
        let dispatcher = Arc::new(EventDispatcher::with_capacity(config.dispatch_capacity));
        let cache = Arc::new(WhitelistCache::new(store));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            dispatcher,
            cache,
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Handle for the administration layer to call after every committed
    /// whitelist mutation.
    #[must_use]
    pub fn mutation_notifier(&self) -> MutationNotifier {
        MutationNotifier::new(self.dispatcher.emitter())
    }

    /// Producer handle onto the dispatcher, as the broker connection uses.
    #[must_use]
    pub fn emitter(&self) -> EventEmitter {
        self.dispatcher.emitter()
    }

    #[must_use]
    pub fn cache(&self) -> Arc<WhitelistCache> {
        Arc::clone(&self.cache)
    }

    #[must_use]
    pub fn dispatcher(&self) -> Arc<EventDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Start against the configured broker with the local clock.
    pub async fn start(&self) -> Result<(), RuntimeError> {
        let connection = BusConnection::connect(self.config.broker.clone());
        let publisher = Arc::new(MqttCommandPublisher::new(connection.publisher()));

        self.start_with(publisher, Arc::new(LocalClock)).await?;

        let emitter = self.dispatcher.emitter();
        let shutdown = self.shutdown_rx.clone();
        self.tasks
            .lock()
            .push(tokio::spawn(connection.run(emitter, shutdown)));

        info!("Ramp gate running");
        Ok(())
    }

    /// Load the whitelist, register the handlers and start dispatching.
    /// Inbound events come from whoever holds an `emitter()`.
    pub async fn start_with(
        &self,
        publisher: Arc<dyn CommandPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Result<(), RuntimeError> {
        if self.dispatcher.handler_count() > 0 {
            return Err(RuntimeError::AlreadyStarted);
        }

        match self.cache.reload().await {
            Ok(report) => info!(
                version = report.version,
                entries = report.entries,
                "[rg-02] Initial whitelist loaded"
            ),
            Err(e) => error!(
                error = %e,
                "[rg-02] Initial whitelist load failed; all requests will be denied until a reload succeeds"
            ),
        }

        let engine = AccessDecisionEngine::new(
            Arc::new(CacheView::new(Arc::clone(&self.cache))),
            publisher,
            clock,
        )
        .with_matching(self.config.plate_matching);

        self.dispatcher.on(Arc::new(AdminTestHandler));
        self.dispatcher
            .on(Arc::new(WhitelistRefreshHandler::new(Arc::clone(&self.cache))));
        self.dispatcher
            .on(Arc::new(AccessRequestHandler::new(Arc::new(engine))));

        let dispatcher = Arc::clone(&self.dispatcher);
        let shutdown = self.shutdown_rx.clone();
        self.tasks.lock().push(tokio::spawn(async move {
            if let Err(e) = dispatcher.run(shutdown).await {
                error!(error = %e, "[dispatcher] Dispatch loop failed to start");
            }
        }));

        Ok(())
    }

    /// Signal every loop to stop and wait for them.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Task ended abnormally");
            }
        }

        match gate_telemetry::encode_metrics() {
            Ok(text) => info!("Final metrics:\n{}", text),
            Err(e) => warn!(error = %e, "Metrics unavailable"),
        }
        info!("Ramp gate stopped");
    }
}
