//! Vibration Scenario Simulation
//!
//! Generates synthetic feature windows (or raw acceleration windows) for
//! testing VibraSense. Simulates a developing bearing fault as a severity
//! ramp across one or many measurement points.
//!
//! # Usage
//! ```bash
//! ./simulation --cycles 320 --seed 7 | ./vibrasense --stdin
//! ```

use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::io::{self, Write};
use std::time::Duration;

use vibrasense::transport::{FeatureWindowPayload, RawWindowPayload};
use vibrasense::types::feature_keys;

// ============================================================================
// Signal Constants
// ============================================================================

/// Sample rate of the simulated accelerometer (Hz)
const SAMPLE_RATE_HZ: f64 = 25_600.0;
/// Simulated bearing defect frequency (Hz)
const HF_FREQ_HZ: f64 = 6_000.0;
/// Acceleration noise floor (g RMS)
const BASE_NOISE_G: f64 = 0.008;
/// HF feature gain at full severity (g)
const HF_GAIN_G: f64 = 0.25;
/// Baseline bearing temperature (°C)
const BASE_TEMPERATURE_C: f64 = 58.0;
/// Severity above which impulsive content (envelope energy) appears
const IMPULSE_ONSET: f64 = 0.4;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "vibration-simulation")]
#[command(about = "Vibration scenario generator for VibraSense testing")]
#[command(version = "1.0")]
struct Args {
    /// Number of cycles to generate
    #[arg(long, default_value = "320")]
    cycles: u32,

    /// Asset identifier
    #[arg(long, default_value = "PUMP_01")]
    asset: String,

    /// Scenario: ramp | multi | phased
    #[arg(long, default_value = "ramp")]
    scenario: String,

    /// Cycle at which the fault starts ramping (ramp scenario)
    #[arg(long, default_value = "180")]
    fault_start: u32,

    /// Cycles over which the fault ramps to full severity (ramp scenario)
    #[arg(long, default_value = "20")]
    fault_ramp: u32,

    /// Output format: features | raw
    #[arg(short, long, default_value = "features")]
    format: String,

    /// Samples per raw acceleration window
    #[arg(long, default_value = "1024")]
    samples: usize,

    /// Delay between cycles in milliseconds (0 = no delay)
    #[arg(long, default_value = "0")]
    interval_ms: u64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress mission log (only output windows)
    #[arg(short, long)]
    quiet: bool,
}

// ============================================================================
// Measurement Points
// ============================================================================

/// Machine section a point instruments; scales how strongly the common
/// fault severity shows up at that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointType {
    Motor,
    Gearbox,
    Pump,
}

impl PointType {
    /// Relative HF response of this section to the developing fault
    fn hf_response(self) -> f64 {
        match self {
            PointType::Motor => 0.8,
            PointType::Gearbox => 1.2,
            PointType::Pump => 0.7,
        }
    }
}

/// Point layout of the simulated drivetrain
fn points_for(scenario: &str) -> Vec<(&'static str, PointType)> {
    match scenario {
        "multi" => vec![
            ("P1MT", PointType::Motor),
            ("P2MT", PointType::Motor),
            ("P3GX", PointType::Gearbox),
            ("P4GX", PointType::Gearbox),
            ("P5GX", PointType::Gearbox),
            ("P6GX", PointType::Gearbox),
            ("P7PP", PointType::Pump),
            ("P8PP", PointType::Pump),
        ],
        _ => vec![("DE", PointType::Gearbox)],
    }
}

// ============================================================================
// Scenario Phases
// ============================================================================

/// Phased acceptance scenario: hold each severity for a fixed stretch
const PHASED_SCENARIO: &[(&str, f64, u32)] = &[
    ("NORMAL", 0.0, 20),
    ("WATCH", 0.2, 20),
    ("WARNING", 0.5, 20),
    ("ALARM", 1.0, 20),
    ("CLEAR", 0.1, 20),
];

/// Severity in [0, 1] for a cycle under the chosen scenario
fn severity_at(args: &Args, cycle: u32) -> (f64, Option<&'static str>) {
    match args.scenario.as_str() {
        "multi" => {
            // Slow continuous degradation across the whole train
            ((f64::from(cycle) * 0.01).min(1.0), None)
        }
        "phased" => {
            let mut offset = cycle;
            for (name, severity, duration) in PHASED_SCENARIO {
                if offset < *duration {
                    return (*severity, Some(*name));
                }
                offset -= *duration;
            }
            // Past the script: hold the final phase
            let (name, severity, _) = PHASED_SCENARIO[PHASED_SCENARIO.len() - 1];
            (severity, Some(name))
        }
        _ => {
            // Default ramp: quiet until fault_start, then linear to full
            if cycle < args.fault_start {
                (0.0, None)
            } else {
                let ramp = f64::from(cycle - args.fault_start) / f64::from(args.fault_ramp.max(1));
                (ramp.min(1.0), None)
            }
        }
    }
}

// ============================================================================
// Window Synthesis
// ============================================================================

struct Synthesizer {
    rng: StdRng,
    feature_noise: Normal<f64>,
}

impl Synthesizer {
    fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            feature_noise: Normal::new(0.0, 0.002).unwrap(),
        }
    }

    /// Feature values for one point at one severity, synthesized from the
    /// scenario ground truth (no waveform processing here).
    fn feature_window(
        &mut self,
        asset: &str,
        point: &str,
        point_type: PointType,
        severity: f64,
        timestamp: f64,
    ) -> FeatureWindowPayload {
        let response = severity * point_type.hf_response();
        let jitter = self.feature_noise.sample(&mut self.rng);

        let hf_rms = (BASE_NOISE_G + response * HF_GAIN_G + jitter).max(0.0);
        let envelope_rms = if response > IMPULSE_ONSET {
            0.01 + response * 0.04 + jitter.abs()
        } else {
            0.004 + jitter.abs() * 0.5
        };
        let overall_vel = (1.1 + response * 4.0 + jitter * 50.0).max(0.0);
        let temperature = BASE_TEMPERATURE_C + response * 30.0;

        let features = [
            (feature_keys::ACC_HF_RMS_G, hf_rms),
            (feature_keys::ENVELOPE_RMS, envelope_rms),
            (feature_keys::OVERALL_VEL_RMS_MM_S, overall_vel),
            (feature_keys::TEMPERATURE_C, temperature),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        FeatureWindowPayload {
            asset: asset.to_string(),
            point: point.to_string(),
            timestamp,
            features,
        }
    }

    /// Raw acceleration window: noise floor plus a severity-scaled bearing
    /// tone and impulsive spikes once the defect develops.
    fn raw_window(
        &mut self,
        asset: &str,
        point: &str,
        point_type: PointType,
        severity: f64,
        timestamp: f64,
        samples: usize,
    ) -> RawWindowPayload {
        let response = severity * point_type.hf_response();
        let noise = Normal::new(0.0, BASE_NOISE_G).unwrap();

        let mut acceleration: Vec<f64> = (0..samples)
            .map(|i| {
                let t = i as f64 / SAMPLE_RATE_HZ;
                noise.sample(&mut self.rng)
                    + response * 0.12 * (2.0 * std::f64::consts::PI * HF_FREQ_HZ * t).sin()
            })
            .collect();

        if response > IMPULSE_ONSET {
            for _ in 0..4 {
                let idx = self.rng.gen_range(0..samples);
                acceleration[idx] += response * self.rng.gen_range(0.2..0.5);
            }
        }

        RawWindowPayload {
            asset: asset.to_string(),
            point: point.to_string(),
            acceleration,
            temperature: BASE_TEMPERATURE_C + response * 30.0,
            timestamp,
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn log_mission(cycle: u32, message: &str, quiet: bool) {
    if !quiet {
        eprintln!("[SIM cycle={cycle:04}] {message}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let points = points_for(&args.scenario);
    let mut synth = Synthesizer::new(args.seed);

    let start_epoch = chrono::Utc::now().timestamp() as f64;

    log_mission(0, "VIBRATION SCENARIO SIMULATION", args.quiet);
    log_mission(
        0,
        &format!(
            "asset={} scenario={} cycles={} points={} format={}",
            args.asset,
            args.scenario,
            args.cycles,
            points.len(),
            args.format
        ),
        args.quiet,
    );
    if let Some(seed) = args.seed {
        log_mission(0, &format!("seed={seed}"), args.quiet);
    }

    let stdout = io::stdout();
    let mut stdout_lock = stdout.lock();
    let mut last_phase: Option<&str> = None;

    for cycle in 0..args.cycles {
        let (severity, phase) = severity_at(&args, cycle);

        if phase != last_phase {
            if let Some(name) = phase {
                log_mission(
                    cycle,
                    &format!(">>> PHASE {name} (severity={severity:.2})"),
                    args.quiet,
                );
            }
            last_phase = phase;
        }
        if args.scenario == "ramp" && cycle == args.fault_start {
            log_mission(cycle, ">>> FAULT ONSET - severity ramp begins", args.quiet);
        }

        let timestamp = start_epoch + f64::from(cycle);

        for (point, point_type) in &points {
            let line = match args.format.as_str() {
                "raw" => {
                    let window = synth.raw_window(
                        &args.asset,
                        point,
                        *point_type,
                        severity,
                        timestamp,
                        args.samples,
                    );
                    serde_json::to_string(&window)?
                }
                _ => {
                    let window =
                        synth.feature_window(&args.asset, point, *point_type, severity, timestamp);
                    serde_json::to_string(&window)?
                }
            };
            writeln!(stdout_lock, "{line}")?;
        }
        stdout_lock.flush()?;

        if args.interval_ms > 0 {
            std::thread::sleep(Duration::from_millis(args.interval_ms));
        }
    }

    log_mission(args.cycles, "SIMULATION COMPLETE", args.quiet);
    Ok(())
}
