//! Pipeline Regression Tests
//!
//! Drives the full escalation pipeline with a synthetic fault ramp and
//! asserts on severity progression, gated L2 emission, and counter
//! integrity. Mirrors the factory acceptance sequence:
//! quiet baseline, then a linear severity ramp to full fault.

use std::collections::BTreeMap;

use vibrasense::pipeline::EscalationPipeline;
use vibrasense::rules::StandardRuleSet;
use vibrasense::types::{feature_keys, FeatureWindow, PointKey, SeverityLevel};

const FAULT_START_CYCLE: u32 = 40;
const RAMP_CYCLES: u32 = 20;
const TOTAL_CYCLES: u32 = 80;

/// HF RMS for a cycle: quiet noise floor, then a linear ramp.
fn hf_at(cycle: u32) -> f64 {
    if cycle < FAULT_START_CYCLE {
        0.008
    } else {
        let ramp = f64::from(cycle - FAULT_START_CYCLE) / f64::from(RAMP_CYCLES);
        0.008 + ramp.min(1.0) * 0.2
    }
}

fn window_at(point: &str, cycle: u32) -> FeatureWindow {
    let hf = hf_at(cycle);
    let features: BTreeMap<String, f64> = [
        (feature_keys::ACC_HF_RMS_G.to_string(), hf),
        (feature_keys::ENVELOPE_RMS.to_string(), hf * 0.3),
        (feature_keys::OVERALL_VEL_RMS_MM_S.to_string(), 1.2),
        (feature_keys::TEMPERATURE_C.to_string(), 58.0),
    ]
    .into_iter()
    .collect();
    FeatureWindow::new("PUMP_01", point, f64::from(cycle), features)
}

#[test]
fn fault_ramp_escalates_watch_warning_then_l2() {
    let mut pipeline = EscalationPipeline::new(Box::new(StandardRuleSet));

    let mut states = Vec::new();
    let mut first_l2_cycle: Option<u32> = None;
    let mut first_warning_cycle: Option<u32> = None;

    for cycle in 0..TOTAL_CYCLES {
        let outcome = pipeline.process(&window_at("DE", cycle));
        states.push(outcome.trend.level);

        if outcome.trend.level == SeverityLevel::Warning && first_warning_cycle.is_none() {
            first_warning_cycle = Some(cycle);
        }
        if outcome.emissions.iter().any(|e| e.topic.starts_with("vibration/l2/"))
            && first_l2_cycle.is_none()
        {
            first_l2_cycle = Some(cycle);
        }
    }

    eprintln!(
        "ramp: first_warning={first_warning_cycle:?} first_l2={first_l2_cycle:?} stats={}",
        pipeline.stats()
    );

    assert!(states.contains(&SeverityLevel::Watch), "never entered WATCH");
    assert!(
        states.contains(&SeverityLevel::Warning),
        "never entered WARNING"
    );

    let first_warning = first_warning_cycle.expect("WARNING never reached");
    let first_l2 = first_l2_cycle.expect("L2 never triggered");
    assert!(
        first_warning >= FAULT_START_CYCLE,
        "WARNING before fault onset"
    );
    assert_eq!(
        first_l2, first_warning,
        "L2 must follow the first WARNING window, not precede it"
    );

    let stats = pipeline.stats();
    assert_eq!(stats.windows_processed, u64::from(TOTAL_CYCLES));
    assert_eq!(stats.incomplete_windows, 0);
    assert_eq!(stats.events_emitted, u64::from(TOTAL_CYCLES));
    assert!(stats.early_faults > 0);
    // Inline escalation always checks the snapshot that produced the
    // event, so every early fault admits
    assert_eq!(stats.l2_admitted, stats.early_faults);
    assert_eq!(stats.blocked_total(), 0);
}

#[test]
fn early_fault_events_carry_wire_shape() {
    let mut pipeline = EscalationPipeline::new(Box::new(StandardRuleSet));
    let outcome = pipeline.process(&window_at("DE", TOTAL_CYCLES));

    let emission = &outcome.emissions[0];
    assert_eq!(emission.topic, "vibration/early_fault/PUMP_01/DE");

    let value: serde_json::Value = serde_json::from_str(&emission.payload).expect("json payload");
    assert_eq!(value["asset"], "PUMP_01");
    assert_eq!(value["point"], "DE");
    assert_eq!(value["early_fault"], true);
    assert_eq!(value["state"], "WARNING");
    assert!(value["timestamp"].is_number());
}

#[test]
fn incomplete_windows_are_counted_but_inert() {
    let mut pipeline = EscalationPipeline::new(Box::new(StandardRuleSet));
    pipeline.process(&window_at("DE", 10));

    let bare = FeatureWindow::new("PUMP_01", "DE", 11.0, BTreeMap::new());
    let outcome = pipeline.process(&bare);

    assert!(outcome.emissions.is_empty());
    assert_eq!(pipeline.stats().incomplete_windows, 1);

    // The incomplete window must not displace the latest snapshot
    let latest = pipeline
        .latest_snapshot(&PointKey::new("PUMP_01", "DE"))
        .expect("snapshot");
    assert_eq!(latest.timestamp, 10.0);
}

#[test]
fn points_escalate_independently() {
    let mut pipeline = EscalationPipeline::new(Box::new(StandardRuleSet));

    // DE is deep into the fault, NDE is healthy
    for cycle in 0..TOTAL_CYCLES {
        pipeline.process(&window_at("DE", cycle));
    }
    for cycle in 0..10 {
        let mut quiet = window_at("NDE", 0);
        quiet.timestamp = f64::from(cycle);
        pipeline.process(&quiet);
    }

    let mut l2_topics = Vec::new();
    let warning = window_at("DE", TOTAL_CYCLES);
    for emission in pipeline.process(&warning).emissions {
        if emission.topic.starts_with("vibration/l2/") {
            l2_topics.push(emission.topic);
        }
    }
    assert_eq!(l2_topics, vec!["vibration/l2/PUMP_01/DE".to_string()]);

    // NDE never produced an early fault
    let quiet = pipeline
        .latest_snapshot(&PointKey::new("PUMP_01", "NDE"))
        .expect("snapshot");
    assert!(quiet.feature_or_zero(feature_keys::ACC_HF_RMS_G) < 0.05);
}

#[test]
fn l2_payload_reports_confirmed_bearing_defect() {
    let mut pipeline = EscalationPipeline::new(Box::new(StandardRuleSet));

    // Full-severity window: HF warning plus envelope confirmation
    let outcome = pipeline.process(&window_at("DE", TOTAL_CYCLES));
    let l2 = outcome
        .emissions
        .iter()
        .find(|e| e.topic.starts_with("vibration/l2/"))
        .expect("L2 emission");

    let value: serde_json::Value = serde_json::from_str(&l2.payload).expect("json payload");
    let findings = value["findings"].as_array().expect("findings array");
    assert!(!findings.is_empty());
    assert_eq!(findings[0]["fault"], "bearing_defect");
}
