//! Pipeline coordinator: trend classification, event emission, gated L2

use std::collections::HashMap;

use tracing::{info, warn};

use super::PipelineStats;
use crate::detector::TrendDetector;
use crate::gate::DiagnosticGate;
use crate::rules::RuleEngine;
use crate::transport::{self, L2DiagnosticPayload, TransportError};
use crate::types::{EarlyFaultEvent, FeatureWindow, GateDecision, PointKey, TrendResult};

/// One outbound message: topic plus serialized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub topic: String,
    pub payload: String,
}

/// What one window produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub trend: TrendResult,
    /// The event built from the trend, absent for incomplete windows
    pub event: Option<EarlyFaultEvent>,
    /// Messages to publish, in emission order
    pub emissions: Vec<Emission>,
}

/// Owns the detector, the gate, the rule engine, and the latest accepted
/// snapshot per key.
///
/// The snapshot handed to the gate is always the one captured by the
/// `update()` that completed in the same `process()` call - the caller
/// thread establishes the happens-before edge by passing it explicitly,
/// never by re-reading shared mutable state.
pub struct EscalationPipeline {
    detector: TrendDetector,
    rules: Box<dyn RuleEngine>,
    latest_snapshots: HashMap<PointKey, FeatureWindow>,
    stats: PipelineStats,
}

impl EscalationPipeline {
    pub fn new(rules: Box<dyn RuleEngine>) -> Self {
        Self {
            detector: TrendDetector::new(),
            rules,
            latest_snapshots: HashMap::new(),
            stats: PipelineStats::default(),
        }
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Latest accepted snapshot for a key, if any window completed
    /// classification for it.
    pub fn latest_snapshot(&self, key: &PointKey) -> Option<&FeatureWindow> {
        self.latest_snapshots.get(key)
    }

    /// Run one validated feature window through the escalation stages.
    pub fn process(&mut self, window: &FeatureWindow) -> PipelineOutcome {
        self.stats.windows_processed += 1;

        let trend = self.detector.update(window);

        // Incomplete windows classified NORMAL/0.0 with no history effect;
        // they also never become the latest snapshot.
        if !window.has_hf_rms() {
            self.stats.incomplete_windows += 1;
            return PipelineOutcome {
                trend,
                event: None,
                emissions: Vec::new(),
            };
        }

        let key = window.key();
        self.latest_snapshots.insert(key, window.clone());

        let event = EarlyFaultEvent {
            asset: window.asset.clone(),
            point: window.point.clone(),
            early_fault: trend.hf_high,
            timestamp: window.timestamp,
            state: trend.level.to_string(),
        };

        let mut emissions = Vec::new();
        match transport::encode_early_fault(&event) {
            Ok(payload) => {
                self.stats.events_emitted += 1;
                emissions.push(Emission {
                    topic: transport::early_fault_topic(&event.asset, &event.point),
                    payload,
                });
            }
            Err(e) => self.log_encode_failure(&event.asset, &event.point, &e),
        }

        if event.early_fault {
            self.stats.early_faults += 1;
            self.escalate(window, &event, &mut emissions);
        }

        PipelineOutcome {
            trend,
            event: Some(event),
            emissions,
        }
    }

    /// Phase 4/5: gate check, then rules on admission only.
    fn escalate(
        &mut self,
        snapshot: &FeatureWindow,
        event: &EarlyFaultEvent,
        emissions: &mut Vec<Emission>,
    ) {
        match DiagnosticGate::check(snapshot, event) {
            GateDecision::Admitted(admitted) => {
                let findings = self.rules.evaluate(&admitted);
                self.stats.l2_admitted += 1;
                info!(
                    asset = %admitted.asset,
                    point = %admitted.point,
                    findings = findings.len(),
                    "L2 diagnostics ran"
                );

                let payload = L2DiagnosticPayload {
                    asset: admitted.asset.clone(),
                    point: admitted.point.clone(),
                    timestamp: admitted.timestamp,
                    findings,
                };
                match transport::encode_l2(&payload) {
                    Ok(encoded) => emissions.push(Emission {
                        topic: transport::l2_topic(&payload.asset, &payload.point),
                        payload: encoded,
                    }),
                    Err(e) => self.log_encode_failure(&payload.asset, &payload.point, &e),
                }
            }
            GateDecision::Blocked(reason) => {
                self.stats.record_block(reason);
                info!(
                    asset = %event.asset,
                    point = %event.point,
                    reason = %reason,
                    "L2 blocked"
                );
            }
        }
    }

    fn log_encode_failure(&self, asset: &str, point: &str, error: &TransportError) {
        warn!(asset = %asset, point = %point, error = %error, "Failed to encode outbound payload");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::StandardRuleSet;
    use crate::types::{feature_keys, SeverityLevel};
    use std::collections::BTreeMap;

    fn window(asset: &str, point: &str, hf: f64, timestamp: f64) -> FeatureWindow {
        let features: BTreeMap<String, f64> =
            [(feature_keys::ACC_HF_RMS_G.to_string(), hf)].into_iter().collect();
        FeatureWindow::new(asset, point, timestamp, features)
    }

    fn pipeline() -> EscalationPipeline {
        EscalationPipeline::new(Box::new(StandardRuleSet))
    }

    #[test]
    fn normal_window_emits_event_without_l2() {
        let mut p = pipeline();
        let outcome = p.process(&window("PUMP_01", "DE", 0.01, 1.0));

        assert_eq!(outcome.trend.level, SeverityLevel::Normal);
        let event = outcome.event.expect("event");
        assert!(!event.early_fault);
        assert_eq!(event.state, "NORMAL");
        assert_eq!(outcome.emissions.len(), 1);
        assert_eq!(
            outcome.emissions[0].topic,
            "vibration/early_fault/PUMP_01/DE"
        );
        assert_eq!(p.stats().l2_admitted, 0);
    }

    #[test]
    fn warning_window_escalates_to_l2() {
        let mut p = pipeline();
        let outcome = p.process(&window("PUMP_01", "DE", 0.15, 1.0));

        assert_eq!(outcome.trend.level, SeverityLevel::Warning);
        assert!(outcome.event.expect("event").early_fault);
        let topics: Vec<&str> = outcome.emissions.iter().map(|e| e.topic.as_str()).collect();
        assert_eq!(
            topics,
            vec![
                "vibration/early_fault/PUMP_01/DE",
                "vibration/l2/PUMP_01/DE"
            ]
        );
        assert_eq!(p.stats().l2_admitted, 1);
        assert_eq!(p.stats().blocked_total(), 0);
    }

    #[test]
    fn incomplete_window_produces_nothing() {
        let mut p = pipeline();
        let bare = FeatureWindow::new("PUMP_01", "DE", 1.0, BTreeMap::new());
        let outcome = p.process(&bare);

        assert!(outcome.event.is_none());
        assert!(outcome.emissions.is_empty());
        assert_eq!(p.stats().incomplete_windows, 1);
        assert!(p.latest_snapshot(&PointKey::new("PUMP_01", "DE")).is_none());
    }

    #[test]
    fn latest_snapshot_tracks_per_key() {
        let mut p = pipeline();
        p.process(&window("PUMP_01", "DE", 0.01, 1.0));
        p.process(&window("PUMP_01", "NDE", 0.02, 2.0));
        p.process(&window("PUMP_01", "DE", 0.03, 3.0));

        let de = p
            .latest_snapshot(&PointKey::new("PUMP_01", "DE"))
            .expect("snapshot");
        assert_eq!(de.timestamp, 3.0);
        let nde = p
            .latest_snapshot(&PointKey::new("PUMP_01", "NDE"))
            .expect("snapshot");
        assert_eq!(nde.timestamp, 2.0);
    }
}
