//! Trend Detector - rolling-history classification of feature windows
//!
//! Every incoming feature window is classified into a severity level plus
//! parallel condition flags (HF alarm, envelope confirmation, ISO velocity
//! zone, temperature alarm). The detector also maintains a bounded rolling
//! history per (asset, point) key; the current classification reads only
//! the incoming window, but history retention is part of the contract for
//! extended trend logic.
//!
//! Windows missing the high-frequency RMS feature classify as
//! NORMAL/0.0 and leave history untouched - an incomplete window must not
//! pollute the rolling history used by later classifications.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::debug;

use crate::config::TrendThresholds;
use crate::types::{
    feature_keys, vibration_thresholds, FeatureWindow, PointKey, SeverityLevel, TrendResult,
    VelocityZone,
};

// ============================================================================
// Config-aware accessors (read from monitor_config.toml when available)
// ============================================================================

fn cfg_thresholds() -> TrendThresholds {
    if crate::config::is_initialized() {
        crate::config::get().thresholds.clone()
    } else {
        TrendThresholds::default()
    }
}

fn cfg_history_capacity() -> usize {
    if crate::config::is_initialized() {
        crate::config::get().history.capacity
    } else {
        vibration_thresholds::HISTORY_CAPACITY
    }
}

// ============================================================================
// Trend Detector
// ============================================================================

/// Per-key rolling buffer. The `Mutex` serializes the append/evict
/// sequence for one measurement point; buffers for distinct keys never
/// share a lock.
type HistoryBuffer = Arc<Mutex<VecDeque<FeatureWindow>>>;

/// Classifies feature windows and maintains per-point rolling history.
///
/// `update()` takes `&self`: the outer map is behind a `RwLock` (write
/// access only on first sight of a new key), and each key's buffer has its
/// own `Mutex`, so concurrent updates on different assets/points do not
/// contend.
pub struct TrendDetector {
    history: RwLock<HashMap<PointKey, HistoryBuffer>>,
    capacity: usize,
}

impl TrendDetector {
    /// Create a detector with the configured history capacity.
    pub fn new() -> Self {
        Self::with_capacity(cfg_history_capacity())
    }

    /// Create a detector with an explicit history capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Classify one feature window.
    ///
    /// Total over any feature map: a window without the HF RMS key yields
    /// `NORMAL`/0.0 with no history effect; every other input maps to a
    /// defined result. The only side effect is the rolling-history append
    /// for the window's key.
    pub fn update(&self, window: &FeatureWindow) -> TrendResult {
        if !window.has_hf_rms() {
            debug!(
                asset = %window.asset,
                point = %window.point,
                timestamp = window.timestamp,
                "Incomplete window (no HF RMS) - skipping history"
            );
            return TrendResult::incomplete();
        }

        self.record(window);
        let result = classify(window);

        debug!(
            asset = %window.asset,
            point = %window.point,
            level = %result.level,
            score = result.score,
            zone = %result.velocity_zone,
            "Classified feature window"
        );

        result
    }

    /// Append the window to its key's rolling buffer, evicting the oldest
    /// entry beyond capacity.
    fn record(&self, window: &FeatureWindow) {
        let key = window.key();
        let buffer = self.buffer_for(key);

        let mut history = buffer.lock().unwrap_or_else(PoisonError::into_inner);
        history.push_back(window.clone());
        if history.len() > self.capacity {
            history.pop_front();
        }
    }

    /// Get or lazily create the buffer for a key.
    fn buffer_for(&self, key: PointKey) -> HistoryBuffer {
        {
            let map = self.history.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(buffer) = map.get(&key) {
                return Arc::clone(buffer);
            }
        }

        let mut map = self.history.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            map.entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(VecDeque::new()))),
        )
    }

    /// Number of windows currently retained for a key.
    pub fn history_len(&self, key: &PointKey) -> usize {
        let map = self.history.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key).map_or(0, |buffer| {
            buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        })
    }

    /// Snapshot of the retained windows for a key, oldest first.
    pub fn history_snapshot(&self, key: &PointKey) -> Vec<FeatureWindow> {
        let map = self.history.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key).map_or_else(Vec::new, |buffer| {
            buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .cloned()
                .collect()
        })
    }
}

impl Default for TrendDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Classify a single window. Pure; assumes the HF RMS key is present.
fn classify(window: &FeatureWindow) -> TrendResult {
    let t = cfg_thresholds();

    // HF trend
    let hf = window.feature_or_zero(feature_keys::ACC_HF_RMS_G);
    let level = if hf < t.hf_rms_watch_g {
        SeverityLevel::Normal
    } else if hf < t.hf_rms_warning_g {
        SeverityLevel::Watch
    } else {
        SeverityLevel::Warning
    };

    // Same boundary as WARNING, re-derived on purpose: the two signals are
    // currently equivalent but not unified.
    let hf_high = hf >= t.hf_rms_warning_g;

    // Envelope confirmation
    let envelope = window.feature_or_zero(feature_keys::ENVELOPE_RMS);
    let envelope_high = envelope > t.envelope_high_g;

    // Velocity ISO zone
    let vel = window.feature_or_zero(feature_keys::OVERALL_VEL_RMS_MM_S);
    let velocity_zone = if vel < t.velocity_zone_b_mm_s {
        VelocityZone::A
    } else if vel < t.velocity_zone_c_mm_s {
        VelocityZone::B
    } else if vel < t.velocity_zone_d_mm_s {
        VelocityZone::C
    } else {
        VelocityZone::D
    };

    // Temperature
    let temp = window.feature_or_zero(feature_keys::TEMPERATURE_C);
    let temperature_alarm = temp >= t.temperature_alarm_c;

    TrendResult {
        level,
        score: hf,
        dominant_feature: dominant_feature(window),
        hf_high,
        envelope_high,
        velocity_zone,
        temperature_alarm,
    }
}

/// Feature with the greatest absolute value.
///
/// Iteration follows the `BTreeMap` key order, and only a strictly greater
/// magnitude displaces the current best - ties resolve to the first key in
/// ascending name order, so repeated calls on the same map always agree.
fn dominant_feature(window: &FeatureWindow) -> Option<String> {
    let mut best: Option<(&String, f64)> = None;
    for (name, value) in &window.features {
        let magnitude = value.abs();
        match best {
            Some((_, best_magnitude)) if magnitude <= best_magnitude => {}
            _ => best = Some((name, magnitude)),
        }
    }
    best.map(|(name, _)| name.clone())
}
