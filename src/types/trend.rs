//! Trend classification output types

use serde::{Deserialize, Serialize};

/// Severity level from the high-frequency trend check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeverityLevel {
    /// HF RMS within normal range
    Normal,
    /// HF RMS elevated - watch for progression
    Watch,
    /// HF RMS at warning level - early fault suspected
    Warning,
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityLevel::Normal => write!(f, "NORMAL"),
            SeverityLevel::Watch => write!(f, "WATCH"),
            SeverityLevel::Warning => write!(f, "WARNING"),
        }
    }
}

impl Default for SeverityLevel {
    fn default() -> Self {
        SeverityLevel::Normal
    }
}

/// ISO-style velocity severity zone (A = good ... D = unacceptable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VelocityZone {
    A,
    B,
    C,
    D,
}

impl std::fmt::Display for VelocityZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VelocityZone::A => write!(f, "A"),
            VelocityZone::B => write!(f, "B"),
            VelocityZone::C => write!(f, "C"),
            VelocityZone::D => write!(f, "D"),
        }
    }
}

impl Default for VelocityZone {
    fn default() -> Self {
        VelocityZone::A
    }
}

/// Output of one trend classification.
///
/// The condition flags are parallel signals, not states of a single
/// machine: a window can be `hf_high` and zone C and temperature-alarmed
/// all at once. Callers own the result; nothing is retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Severity from the HF RMS thresholds
    pub level: SeverityLevel,
    /// The HF RMS value that drove the level (0.0 when unavailable)
    pub score: f64,
    /// Feature with the greatest absolute value in the window.
    /// `None` when the window was incomplete (no HF RMS).
    pub dominant_feature: Option<String>,
    /// HF RMS crossed the warning threshold.
    /// Computed independently of `level`; the two are currently
    /// equivalent signals with the same boundary.
    pub hf_high: bool,
    /// Envelope RMS exceeded its confirmation threshold
    pub envelope_high: bool,
    /// ISO velocity severity zone
    pub velocity_zone: VelocityZone,
    /// Bearing temperature at/above alarm threshold
    pub temperature_alarm: bool,
}

impl TrendResult {
    /// Result for a window missing the required HF RMS feature:
    /// normal level, zero score, all flags inactive.
    pub fn incomplete() -> Self {
        Self {
            level: SeverityLevel::Normal,
            score: 0.0,
            dominant_feature: None,
            hf_high: false,
            envelope_high: false,
            velocity_zone: VelocityZone::A,
            temperature_alarm: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_display_matches_wire_states() {
        assert_eq!(SeverityLevel::Normal.to_string(), "NORMAL");
        assert_eq!(SeverityLevel::Watch.to_string(), "WATCH");
        assert_eq!(SeverityLevel::Warning.to_string(), "WARNING");
    }

    #[test]
    fn severity_orders_by_escalation() {
        assert!(SeverityLevel::Normal < SeverityLevel::Watch);
        assert!(SeverityLevel::Watch < SeverityLevel::Warning);
        assert!(VelocityZone::A < VelocityZone::D);
    }

    #[test]
    fn incomplete_result_is_inert() {
        let r = TrendResult::incomplete();
        assert_eq!(r.level, SeverityLevel::Normal);
        assert_eq!(r.score, 0.0);
        assert!(r.dominant_feature.is_none());
        assert!(!r.hf_high && !r.envelope_high && !r.temperature_alarm);
        assert_eq!(r.velocity_zone, VelocityZone::A);
    }
}
