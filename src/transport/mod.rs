//! Wire contract for the pub/sub surround
//!
//! The core operates on in-memory values; when embedded in a deployment
//! the surrounding system carries them over per-point topics:
//!
//! ```text
//! vibration/raw/<ASSET>/<POINT>          raw acceleration windows
//! vibration/features/<ASSET>/<POINT>     extracted feature windows
//! vibration/early_fault/<ASSET>/<POINT>  trend/early-fault events
//! vibration/l2/<ASSET>/<POINT>           deep diagnostic events
//! ```
//!
//! Malformed payloads fail here, before the core's pure functions are
//! invoked - the core itself never sees an invalid window.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::rules::DiagnosticFinding;
use crate::types::{EarlyFaultEvent, FeatureWindow};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid payload: {0}")]
    Invalid(String),
}

// ============================================================================
// Topics
// ============================================================================

/// Topic for raw acceleration windows from a measurement point.
pub fn raw_topic(asset: &str, point: &str) -> String {
    format!("vibration/raw/{asset}/{point}")
}

/// Topic for extracted feature windows.
pub fn features_topic(asset: &str, point: &str) -> String {
    format!("vibration/features/{asset}/{point}")
}

/// Topic for early-fault trend events.
pub fn early_fault_topic(asset: &str, point: &str) -> String {
    format!("vibration/early_fault/{asset}/{point}")
}

/// Topic for L2 diagnostic events.
pub fn l2_topic(asset: &str, point: &str) -> String {
    format!("vibration/l2/{asset}/{point}")
}

// ============================================================================
// Payloads
// ============================================================================

/// Raw window as published by the acquisition edge:
/// `{asset, point, acceleration: [..], temperature, timestamp}`.
///
/// Consumed by the upstream feature extractor, not by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWindowPayload {
    pub asset: String,
    pub point: String,
    pub acceleration: Vec<f64>,
    pub temperature: f64,
    pub timestamp: f64,
}

/// Feature window as published by the upstream extractor - the monitor's
/// input. Same shape as [`FeatureWindow`]; kept separate so wire
/// validation stays in the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureWindowPayload {
    pub asset: String,
    pub point: String,
    pub timestamp: f64,
    pub features: BTreeMap<String, f64>,
}

/// L2 diagnostic event: `{asset, point, timestamp, findings}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L2DiagnosticPayload {
    pub asset: String,
    pub point: String,
    pub timestamp: f64,
    pub findings: Vec<DiagnosticFinding>,
}

// ============================================================================
// Decode / Validate
// ============================================================================

/// Decode and validate a feature-window JSON line into a core value.
pub fn decode_feature_window(line: &str) -> Result<FeatureWindow, TransportError> {
    let payload: FeatureWindowPayload = serde_json::from_str(line)?;
    validate_identity(&payload.asset, &payload.point)?;
    validate_timestamp(payload.timestamp)?;
    for (name, value) in &payload.features {
        if !value.is_finite() {
            return Err(TransportError::Invalid(format!(
                "non-finite value for feature '{name}'"
            )));
        }
    }
    Ok(FeatureWindow::new(
        payload.asset,
        payload.point,
        payload.timestamp,
        payload.features,
    ))
}

/// Decode and validate a raw-window JSON line.
pub fn decode_raw_window(line: &str) -> Result<RawWindowPayload, TransportError> {
    let payload: RawWindowPayload = serde_json::from_str(line)?;
    validate_identity(&payload.asset, &payload.point)?;
    validate_timestamp(payload.timestamp)?;
    if payload.acceleration.is_empty() {
        return Err(TransportError::Invalid(
            "empty acceleration buffer".to_string(),
        ));
    }
    if payload.acceleration.iter().any(|sample| !sample.is_finite()) {
        return Err(TransportError::Invalid(
            "non-finite acceleration sample".to_string(),
        ));
    }
    Ok(payload)
}

/// Encode an early-fault event for its topic.
pub fn encode_early_fault(event: &EarlyFaultEvent) -> Result<String, TransportError> {
    Ok(serde_json::to_string(event)?)
}

/// Encode an L2 diagnostic event for its topic.
pub fn encode_l2(payload: &L2DiagnosticPayload) -> Result<String, TransportError> {
    Ok(serde_json::to_string(payload)?)
}

fn validate_identity(asset: &str, point: &str) -> Result<(), TransportError> {
    if asset.trim().is_empty() {
        return Err(TransportError::Invalid("empty asset id".to_string()));
    }
    if point.trim().is_empty() {
        return Err(TransportError::Invalid("empty point id".to_string()));
    }
    Ok(())
}

fn validate_timestamp(timestamp: f64) -> Result<(), TransportError> {
    if !timestamp.is_finite() || timestamp < 0.0 {
        return Err(TransportError::Invalid(format!(
            "invalid timestamp {timestamp}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_are_scoped_per_point() {
        assert_eq!(raw_topic("PUMP_01", "DE"), "vibration/raw/PUMP_01/DE");
        assert_eq!(
            early_fault_topic("PUMP_01", "DE"),
            "vibration/early_fault/PUMP_01/DE"
        );
        assert_eq!(l2_topic("PUMP_01", "NDE"), "vibration/l2/PUMP_01/NDE");
        assert_eq!(
            features_topic("COMP_02", "P3GX"),
            "vibration/features/COMP_02/P3GX"
        );
    }

    #[test]
    fn decodes_valid_feature_window() {
        let line = r#"{"asset":"PUMP_01","point":"DE","timestamp":100.5,
                       "features":{"acc_hf_rms_g":0.13,"envelope_rms":0.03}}"#;
        let window = decode_feature_window(line).expect("decode");
        assert_eq!(window.asset, "PUMP_01");
        assert_eq!(window.timestamp, 100.5);
        assert_eq!(window.features["acc_hf_rms_g"], 0.13);
    }

    #[test]
    fn rejects_non_json_line() {
        assert!(matches!(
            decode_feature_window("not json"),
            Err(TransportError::Json(_))
        ));
    }

    #[test]
    fn rejects_missing_required_keys() {
        // No features map at all
        let line = r#"{"asset":"PUMP_01","point":"DE","timestamp":100.0}"#;
        assert!(matches!(
            decode_feature_window(line),
            Err(TransportError::Json(_))
        ));
    }

    #[test]
    fn rejects_empty_identity_and_bad_timestamp() {
        let line = r#"{"asset":"","point":"DE","timestamp":1.0,"features":{}}"#;
        assert!(matches!(
            decode_feature_window(line),
            Err(TransportError::Invalid(_))
        ));

        let line = r#"{"asset":"PUMP_01","point":"DE","timestamp":-5.0,"features":{}}"#;
        assert!(matches!(
            decode_feature_window(line),
            Err(TransportError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_non_finite_feature_values() {
        // JSON has no NaN literal; null fails the f64 decode instead
        let line = r#"{"asset":"PUMP_01","point":"DE","timestamp":1.0,
                       "features":{"acc_hf_rms_g":null}}"#;
        assert!(decode_feature_window(line).is_err());
    }

    #[test]
    fn raw_window_requires_samples() {
        let line = r#"{"asset":"PUMP_01","point":"DE","acceleration":[],
                       "temperature":58.0,"timestamp":1.0}"#;
        assert!(matches!(
            decode_raw_window(line),
            Err(TransportError::Invalid(_))
        ));

        let line = r#"{"asset":"PUMP_01","point":"DE","acceleration":[0.01,-0.02],
                       "temperature":58.0,"timestamp":1.0}"#;
        let payload = decode_raw_window(line).expect("decode");
        assert_eq!(payload.acceleration.len(), 2);
    }

    #[test]
    fn early_fault_round_trips_wire_shape() {
        let event = EarlyFaultEvent {
            asset: "PUMP_01".to_string(),
            point: "DE".to_string(),
            early_fault: true,
            timestamp: 100.0,
            state: "WARNING".to_string(),
        };
        let json = encode_early_fault(&event).expect("encode");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["early_fault"], true);
        assert_eq!(value["state"], "WARNING");
        assert_eq!(value["asset"], "PUMP_01");
    }
}
