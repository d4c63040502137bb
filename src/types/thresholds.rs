//! Vibration trend thresholds and ISO-style velocity zone boundaries

/// Thresholds for vibration trend classification
pub mod vibration_thresholds {
    // === High-Frequency Acceleration Thresholds ===
    /// HF RMS below this is normal (g)
    pub const HF_RMS_WATCH_G: f64 = 0.05;
    /// HF RMS at/above this is a warning (g)
    pub const HF_RMS_WARNING_G: f64 = 0.12;

    // === Envelope Confirmation ===
    /// Envelope RMS above this confirms a bearing-defect signature (g)
    pub const ENVELOPE_HIGH_G: f64 = 0.02;

    // === ISO Velocity Zone Boundaries (mm/s overall RMS) ===
    /// Zone A/B boundary
    pub const VELOCITY_ZONE_B_MM_S: f64 = 1.8;
    /// Zone B/C boundary
    pub const VELOCITY_ZONE_C_MM_S: f64 = 2.8;
    /// Zone C/D boundary
    pub const VELOCITY_ZONE_D_MM_S: f64 = 4.5;

    // === Temperature ===
    /// Bearing temperature alarm threshold (°C)
    pub const TEMPERATURE_ALARM_C: f64 = 80.0;

    // === History ===
    /// Rolling feature-window history kept per measurement point
    pub const HISTORY_CAPACITY: usize = 10;
}
