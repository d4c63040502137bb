//! Diagnostic Gate - admission control for L2 root-cause analysis
//!
//! Deep diagnostics only run when a strict precondition chain holds
//! against the most recent accepted feature snapshot:
//!
//! 1. the triggering event carries a true early-fault flag,
//! 2. event and snapshot identify the same asset and point,
//! 3. the event does not predate the snapshot (equal timestamps accepted).
//!
//! Each check short-circuits to a tagged block reason; on any failure the
//! rule engine is never invoked. The gate is fail-closed and holds no
//! state between calls.

use tracing::debug;

use crate::rules::{DiagnosticFinding, RuleEngine};
use crate::types::{BlockReason, EarlyFaultEvent, FeatureWindow, GateDecision};

/// Stateless admission check in front of the L2 rule engine.
pub struct DiagnosticGate;

impl DiagnosticGate {
    /// Evaluate the precondition chain.
    ///
    /// Pure function of the snapshot and event: the first failed
    /// predicate wins and carries its reason; passing all three forwards
    /// the snapshot unchanged.
    pub fn check(snapshot: &FeatureWindow, event: &EarlyFaultEvent) -> GateDecision {
        // Gate 1 - early fault only
        if !event.early_fault {
            return GateDecision::Blocked(BlockReason::NoFaultFlag);
        }

        // Gate 2 - identity consistency. A trigger on one sensor must
        // never admit diagnostics keyed to another sensor's snapshot.
        if snapshot.asset != event.asset || snapshot.point != event.point {
            return GateDecision::Blocked(BlockReason::IdentityMismatch);
        }

        // Gate 3 - causal order. Same-instant events are in order.
        if event.timestamp < snapshot.timestamp {
            return GateDecision::Blocked(BlockReason::StaleEvent);
        }

        GateDecision::Admitted(snapshot.clone())
    }

    /// Run the admission check and, on success, the rule engine.
    ///
    /// Returns the engine's findings, or an empty list when blocked -
    /// diagnostics never run on a gate failure.
    pub fn run(
        snapshot: &FeatureWindow,
        event: &EarlyFaultEvent,
        engine: &dyn RuleEngine,
    ) -> Vec<DiagnosticFinding> {
        match Self::check(snapshot, event) {
            GateDecision::Admitted(admitted) => {
                debug!(
                    asset = %admitted.asset,
                    point = %admitted.point,
                    timestamp = admitted.timestamp,
                    engine = engine.name(),
                    "Gate admitted early-fault event - running L2 rules"
                );
                engine.evaluate(&admitted)
            }
            GateDecision::Blocked(reason) => {
                debug!(
                    asset = %event.asset,
                    point = %event.point,
                    reason = %reason,
                    "Gate blocked early-fault event"
                );
                Vec::new()
            }
        }
    }
}
