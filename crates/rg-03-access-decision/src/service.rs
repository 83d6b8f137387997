//! # Access Decision Engine
//!
//! ```text
//! payload ──parse──┬─ malformed ──────────────────────→ Denied (no publish)
//!                  │
//!                  └─ plate ──snapshot + today──┬─ match → Granted → publish cmd
//!                                               └─ none  → Denied (no publish)
//! ```
//!
//! Each evaluation is independent. The snapshot is taken once per request,
//! so a reload landing mid-evaluation is not observed.

use std::sync::Arc;

use gate_telemetry::{ACCESS_REQUESTS, COMMANDS_PUBLISHED};
use shared_types::{topics, AccessRequest, ActuationCommand, PlateMatching, PublishError};
use tracing::{error, info, warn};

use crate::domain::{find_authorized, AccessDecision, DenialReason};
use crate::ports::{Clock, CommandPublisher, WhitelistView};

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: AccessDecision,
    /// Version of the snapshot consulted; `None` for malformed requests.
    pub snapshot_version: Option<u64>,
    /// Set when the decision was a grant and the command publish failed.
    /// The grant stands either way.
    pub publish_error: Option<PublishError>,
}

impl Evaluation {
    fn new(decision: AccessDecision, snapshot_version: Option<u64>) -> Self {
        Self {
            decision,
            snapshot_version,
            publish_error: None,
        }
    }
}

pub struct AccessDecisionEngine {
    whitelist: Arc<dyn WhitelistView>,
    publisher: Arc<dyn CommandPublisher>,
    clock: Arc<dyn Clock>,
    matching: PlateMatching,
}

impl AccessDecisionEngine {
    pub fn new(
        whitelist: Arc<dyn WhitelistView>,
        publisher: Arc<dyn CommandPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            whitelist,
            publisher,
            clock,
            matching: PlateMatching::default(),
        }
    }

    #[must_use]
    pub fn with_matching(mut self, matching: PlateMatching) -> Self {
        self.matching = matching;
        self
    }

    #[must_use]
    pub fn matching(&self) -> PlateMatching {
        self.matching
    }

    /// Evaluate a raw access-request payload. Never fails: a malformed
    /// payload is a denial.
    pub async fn evaluate(&self, payload: &[u8]) -> Evaluation {
        match AccessRequest::from_payload(payload) {
            Ok(request) => self.evaluate_request(&request).await,
            Err(e) => {
                ACCESS_REQUESTS.with_label_values(&["malformed"]).inc();
                warn!(
                    error = %e,
                    payload = %String::from_utf8_lossy(payload),
                    "[rg-03] Access denied: malformed request"
                );
                Evaluation::new(
                    AccessDecision::Denied {
                        plate: None,
                        reason: DenialReason::Malformed(e),
                    },
                    None,
                )
            }
        }
    }

    /// Evaluate an already decoded request.
    pub async fn evaluate_request(&self, request: &AccessRequest) -> Evaluation {
        let plate = request.license_plate.as_str();
        let snapshot = self.whitelist.current_snapshot();
        let today = self.clock.today();

        let decision = match find_authorized(&snapshot, plate, today, self.matching) {
            Some(entry) => AccessDecision::Granted {
                plate: plate.to_string(),
                entry_id: entry.id.clone(),
            },
            None => AccessDecision::Denied {
                plate: Some(plate.to_string()),
                reason: DenialReason::NotWhitelisted,
            },
        };
        ACCESS_REQUESTS
            .with_label_values(&[decision.outcome()])
            .inc();

        let mut evaluation = Evaluation::new(decision, Some(snapshot.version()));

        match &evaluation.decision {
            AccessDecision::Granted { entry_id, .. } => {
                info!(
                    plate,
                    entry = %entry_id,
                    date = %today,
                    snapshot = snapshot.version(),
                    "[rg-03] Access granted"
                );
                evaluation.publish_error = self.open_ramp().await.err();
            }
            AccessDecision::Denied { .. } => {
                info!(
                    plate,
                    date = %today,
                    snapshot = snapshot.version(),
                    "[rg-03] Access denied: not whitelisted"
                );
            }
        }

        evaluation
    }

    /// Publish the open command. Failures are logged and returned; the
    /// caller does not retry.
    async fn open_ramp(&self) -> Result<(), PublishError> {
        let result = match ActuationCommand::open_ramp().to_payload() {
            Ok(payload) => self.publisher.publish(topics::RAMP_COMMAND, payload).await,
            Err(e) => Err(PublishError::Encode {
                topic: topics::RAMP_COMMAND.to_string(),
                reason: e.to_string(),
            }),
        };

        match &result {
            Ok(()) => COMMANDS_PUBLISHED.with_label_values(&["ok"]).inc(),
            Err(e) => {
                COMMANDS_PUBLISHED.with_label_values(&["failed"]).inc();
                error!(error = %e, "[rg-03] Open-ramp command not published; grant stands");
            }
        }
        result
    }
}
