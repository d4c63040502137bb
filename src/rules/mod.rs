//! L2 rule engine seam and the standard deep-diagnosis ruleset
//!
//! The gate treats the rule engine as an opaque collaborator behind the
//! `RuleEngine` trait. `StandardRuleSet` is the reference implementation:
//! a handful of signature rules covering the fault families the upstream
//! generators exercise (bearing defects, imbalance/misalignment, thermal).

use serde::{Deserialize, Serialize};

use crate::types::{feature_keys, vibration_thresholds, FeatureWindow};

/// One root-cause hypothesis from the L2 stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticFinding {
    /// Fault family (e.g., "bearing_defect", "imbalance")
    pub fault: String,
    /// Confidence in \[0, 1\]
    pub confidence: f64,
    /// Human-readable evidence summary
    pub evidence: String,
}

/// Deep-diagnosis ruleset invoked once the gate admits.
///
/// Implementations must be pure over the snapshot - the gate guarantees
/// they only ever see an admitted window.
pub trait RuleEngine: Send + Sync {
    /// Engine name for log context
    fn name(&self) -> &str;

    /// Evaluate the admitted snapshot, returning zero or more findings.
    fn evaluate(&self, snapshot: &FeatureWindow) -> Vec<DiagnosticFinding>;
}

/// Standard signature rules over the canonical feature set.
pub struct StandardRuleSet;

impl RuleEngine for StandardRuleSet {
    fn name(&self) -> &str {
        "standard"
    }

    fn evaluate(&self, snapshot: &FeatureWindow) -> Vec<DiagnosticFinding> {
        let hf = snapshot.feature_or_zero(feature_keys::ACC_HF_RMS_G);
        let envelope = snapshot.feature_or_zero(feature_keys::ENVELOPE_RMS);
        let velocity = snapshot.feature_or_zero(feature_keys::OVERALL_VEL_RMS_MM_S);
        let temperature = snapshot.feature_or_zero(feature_keys::TEMPERATURE_C);

        let mut findings = Vec::new();

        // HF energy with envelope confirmation is the classic rolling-element
        // bearing signature; without confirmation it stays a suspicion.
        if hf >= vibration_thresholds::HF_RMS_WARNING_G {
            if envelope > vibration_thresholds::ENVELOPE_HIGH_G {
                findings.push(DiagnosticFinding {
                    fault: "bearing_defect".to_string(),
                    confidence: 0.8,
                    evidence: format!(
                        "HF RMS {hf:.3} g with envelope confirmation ({envelope:.3} g)"
                    ),
                });
            } else {
                findings.push(DiagnosticFinding {
                    fault: "bearing_suspect".to_string(),
                    confidence: 0.5,
                    evidence: format!("HF RMS {hf:.3} g without envelope confirmation"),
                });
            }
        }

        // Broadband velocity without HF content points at low-frequency
        // mechanical causes (imbalance, misalignment, looseness).
        if velocity >= vibration_thresholds::VELOCITY_ZONE_C_MM_S {
            findings.push(DiagnosticFinding {
                fault: "imbalance_or_misalignment".to_string(),
                confidence: if velocity >= vibration_thresholds::VELOCITY_ZONE_D_MM_S {
                    0.7
                } else {
                    0.55
                },
                evidence: format!("Overall velocity {velocity:.2} mm/s"),
            });
        }

        if temperature >= vibration_thresholds::TEMPERATURE_ALARM_C {
            findings.push(DiagnosticFinding {
                fault: "thermal_overload".to_string(),
                confidence: 0.6,
                evidence: format!("Bearing temperature {temperature:.1} °C"),
            });
        }

        findings
    }
}
