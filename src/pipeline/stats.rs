//! Pipeline counters for the shutdown debrief and tests

use serde::{Deserialize, Serialize};

use crate::types::BlockReason;

/// Running totals over one pipeline lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Windows received from the source
    pub windows_processed: u64,
    /// Windows missing the HF RMS feature (classified NORMAL, no history)
    pub incomplete_windows: u64,
    /// Early-fault events emitted (one per complete window)
    pub events_emitted: u64,
    /// Events that carried the early-fault flag
    pub early_faults: u64,
    /// Gate admissions (L2 ran)
    pub l2_admitted: u64,
    /// Gate blocks by reason
    pub blocked_no_fault: u64,
    pub blocked_identity: u64,
    pub blocked_stale: u64,
}

impl PipelineStats {
    pub fn record_block(&mut self, reason: BlockReason) {
        match reason {
            BlockReason::NoFaultFlag => self.blocked_no_fault += 1,
            BlockReason::IdentityMismatch => self.blocked_identity += 1,
            BlockReason::StaleEvent => self.blocked_stale += 1,
        }
    }

    /// Total gate blocks across all reasons.
    pub fn blocked_total(&self) -> u64 {
        self.blocked_no_fault + self.blocked_identity + self.blocked_stale
    }
}

impl std::fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} windows ({} incomplete), {} events ({} early-fault), {} L2 admitted, {} blocked",
            self.windows_processed,
            self.incomplete_windows,
            self.events_emitted,
            self.early_faults,
            self.l2_admitted,
            self.blocked_total()
        )
    }
}
