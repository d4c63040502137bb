//! Escalation Pipeline
//!
//! ```text
//! PHASE 1: Feature window ingestion (validated by transport)
//! PHASE 2: Trend classification (TrendDetector, per-key history)
//! PHASE 3: Early-fault event emission (every classified window)
//! PHASE 4: Diagnostic gate (ONLY if the event carries the fault flag)
//! PHASE 5: L2 rule engine + diagnostic emission (ONLY if admitted)
//! ```
//!
//! CRITICAL GUARANTEE: Phase 5 only executes behind an admitted gate.

mod escalation;
mod stats;

pub use escalation::{Emission, EscalationPipeline, PipelineOutcome};
pub use stats::PipelineStats;
