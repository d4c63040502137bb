//! VibraSense: Vibration Early-Fault Escalation
//!
//! Two-stage anomaly pipeline for vibration feature windows from
//! industrial assets.
//!
//! ## Architecture
//!
//! - **Trend Detector**: per-point rolling history + severity classification
//! - **Diagnostic Gate**: fail-closed admission check in front of L2 rules
//! - **Rule Engine**: opaque deep-diagnosis ruleset behind a trait
//! - **Transport**: per-point topic scheme and validated wire payloads

pub mod acquisition;
pub mod config;
pub mod detector;
pub mod gate;
pub mod pipeline;
pub mod rules;
pub mod transport;
pub mod types;

// Re-export configuration
pub use config::MonitorConfig;

// Re-export commonly used types
pub use types::{
    BlockReason, EarlyFaultEvent, FeatureWindow, GateDecision, PointKey, SeverityLevel,
    TrendResult, VelocityZone,
};

// Re-export the core components
pub use detector::TrendDetector;
pub use gate::DiagnosticGate;
pub use rules::{DiagnosticFinding, RuleEngine, StandardRuleSet};

// Re-export the pipeline
pub use pipeline::{EscalationPipeline, PipelineStats};
