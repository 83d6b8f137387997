//! Shared fixtures for the integration scenarios.

pub mod scenarios;
pub mod staleness;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;
    use gate_runtime::{GateConfig, GateRuntime};
    use rg_02_whitelist_cache::WhitelistStore;
    use rg_03_access_decision::{FixedClock, RecordingPublisher};
    use shared_bus::BusEvent;
    use shared_types::topics;

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub struct Gate {
        pub runtime: GateRuntime,
        pub publisher: Arc<RecordingPublisher>,
        pub clock: Arc<FixedClock>,
        sent: AtomicU64,
    }

    /// Topic no handler listens on; used to fence the dispatch loop.
    const BARRIER_TOPIC: &str = "test/barrier";

    impl Gate {
        pub async fn start(store: Arc<dyn WhitelistStore>, today: &str) -> Self {
            let runtime = GateRuntime::new(GateConfig::default(), store);
            let publisher = Arc::new(RecordingPublisher::new());
            let clock = Arc::new(FixedClock::new(date(today)));
            runtime
                .start_with(publisher.clone(), clock.clone())
                .await
                .unwrap();
            Self {
                runtime,
                publisher,
                clock,
                sent: AtomicU64::new(0),
            }
        }

        /// Deliver an access request as the broker would.
        pub async fn request(&self, plate: &str) {
            let payload = serde_json::json!({ "licensePlate": plate }).to_string();
            self.send_raw(topics::ACCESS_REQUEST, payload.into_bytes())
                .await;
        }

        pub async fn send_raw(&self, topic: &str, payload: Vec<u8>) {
            self.sent.fetch_add(1, Ordering::SeqCst);
            self.runtime
                .emitter()
                .emit(BusEvent::from_broker(topic, payload))
                .await
                .unwrap();
        }

        /// Raise a whitelist-changed notification as the CRUD layer does.
        pub async fn notify(&self) {
            self.sent.fetch_add(1, Ordering::SeqCst);
            self.runtime
                .mutation_notifier()
                .notify_whitelist_changed()
                .await
                .unwrap();
        }

        /// Wait until every event sent so far has been fully handled.
        ///
        /// Dispatch is sequential, so once a trailing barrier event starts
        /// everything queued before it has finished.
        pub async fn settle(&self) {
            self.send_raw(BARRIER_TOPIC, Vec::new()).await;
            let target = self.sent.load(Ordering::SeqCst);
            let dispatcher = self.runtime.dispatcher();
            tokio::time::timeout(Duration::from_secs(5), async {
                while dispatcher.events_dispatched() < target {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            })
            .await
            .expect("dispatcher did not catch up");
        }

        /// Open commands published so far.
        pub fn commands(&self) -> usize {
            self.publisher
                .published()
                .iter()
                .filter(|(topic, _)| topic == topics::RAMP_COMMAND)
                .count()
        }
    }
}
