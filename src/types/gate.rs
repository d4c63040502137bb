//! Diagnostic gate input/output types

use serde::{Deserialize, Serialize};

use super::FeatureWindow;

/// Early-fault trigger event from the trend stage.
///
/// Wire shape: `{asset, point, early_fault, timestamp, state}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyFaultEvent {
    pub asset: String,
    pub point: String,
    /// The actual trigger condition. `false` means the event is
    /// informational and must never open the gate.
    pub early_fault: bool,
    /// Event time, seconds since epoch
    pub timestamp: f64,
    /// Severity state at emission time ("NORMAL" / "WATCH" / "WARNING")
    pub state: String,
}

/// Why the gate refused to admit an early-fault event.
///
/// Each variant is one failed precondition in the admission chain; the
/// first failure short-circuits the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    /// Event did not carry a true early-fault flag
    NoFaultFlag,
    /// Event and snapshot identify different asset/point pairs
    IdentityMismatch,
    /// Event timestamp predates the snapshot it should corroborate
    StaleEvent,
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::NoFaultFlag => write!(f, "no early-fault flag"),
            BlockReason::IdentityMismatch => write!(f, "asset/point identity mismatch"),
            BlockReason::StaleEvent => write!(f, "event predates snapshot"),
        }
    }
}

/// Outcome of the admission check: the accepted snapshot forwarded to the
/// rule engine, or the reason nothing may run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateDecision {
    /// All preconditions held; the snapshot passes through unchanged
    Admitted(FeatureWindow),
    /// A precondition failed; deep diagnostics must not run
    Blocked(BlockReason),
}

impl GateDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, GateDecision::Admitted(_))
    }

    /// Block reason, if blocked.
    pub fn block_reason(&self) -> Option<BlockReason> {
        match self {
            GateDecision::Admitted(_) => None,
            GateDecision::Blocked(reason) => Some(*reason),
        }
    }
}
