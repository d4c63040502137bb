//! Feature window types - the classification input delivered by the
//! upstream feature extractor

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical feature names published by the upstream extraction stage.
///
/// Additional named features may appear in a window; they participate in
/// dominant-feature selection but not in classification.
pub mod feature_keys {
    /// High-frequency acceleration RMS (g) - required for classification
    pub const ACC_HF_RMS_G: &str = "acc_hf_rms_g";
    /// Demodulated envelope RMS (g) - bearing defect confirmation
    pub const ENVELOPE_RMS: &str = "envelope_rms";
    /// Overall velocity RMS (mm/s) - ISO zone banding
    pub const OVERALL_VEL_RMS_MM_S: &str = "overall_vel_rms_mm_s";
    /// Bearing temperature (°C)
    pub const TEMPERATURE_C: &str = "temperature_c";
}

/// Identity of a measurement point: one sensor location on one machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointKey {
    /// Monitored physical machine (e.g., "PUMP_01")
    pub asset: String,
    /// Sensor location on that asset (e.g., "DE" for drive-end bearing)
    pub point: String,
}

impl PointKey {
    pub fn new(asset: impl Into<String>, point: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            point: point.into(),
        }
    }
}

impl std::fmt::Display for PointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.asset, self.point)
    }
}

/// One time-stamped feature snapshot for an (asset, point) pair.
///
/// `features` maps feature name to numeric value. The map is a `BTreeMap`
/// so iteration order is fixed by key name - dominant-feature ties always
/// resolve to the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWindow {
    pub asset: String,
    pub point: String,
    /// Event time, seconds since epoch. Monotonic per key.
    pub timestamp: f64,
    pub features: BTreeMap<String, f64>,
}

impl FeatureWindow {
    pub fn new(
        asset: impl Into<String>,
        point: impl Into<String>,
        timestamp: f64,
        features: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            asset: asset.into(),
            point: point.into(),
            timestamp,
            features,
        }
    }

    /// Identity key for history routing and gate checks.
    pub fn key(&self) -> PointKey {
        PointKey::new(self.asset.clone(), self.point.clone())
    }

    /// Feature value, or the safe default 0.0 when absent.
    pub fn feature_or_zero(&self, name: &str) -> f64 {
        self.features.get(name).copied().unwrap_or(0.0)
    }

    /// Whether the window carries the high-frequency RMS required for
    /// classification.
    pub fn has_hf_rms(&self) -> bool {
        self.features.contains_key(feature_keys::ACC_HF_RMS_G)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_with(pairs: &[(&str, f64)]) -> FeatureWindow {
        let features = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), *v))
            .collect();
        FeatureWindow::new("PUMP_01", "DE", 100.0, features)
    }

    #[test]
    fn feature_or_zero_defaults_missing_keys() {
        let w = window_with(&[(feature_keys::ACC_HF_RMS_G, 0.08)]);
        assert_eq!(w.feature_or_zero(feature_keys::ACC_HF_RMS_G), 0.08);
        assert_eq!(w.feature_or_zero(feature_keys::ENVELOPE_RMS), 0.0);
    }

    #[test]
    fn key_carries_identity() {
        let w = window_with(&[]);
        let key = w.key();
        assert_eq!(key.asset, "PUMP_01");
        assert_eq!(key.point, "DE");
        assert_eq!(key.to_string(), "PUMP_01/DE");
    }
}
