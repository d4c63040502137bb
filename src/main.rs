//! VibraSense - Vibration Early-Fault Escalation Engine
//!
//! Consumes feature windows (JSON lines), classifies each into a severity
//! trend, and escalates gated early faults to L2 diagnostics. Outbound
//! events are written to stdout as `TOPIC<TAB>JSON` lines.
//!
//! # Usage
//!
//! ```bash
//! # Live from the simulator
//! simulation --cycles 400 | vibrasense --stdin
//!
//! # Replay a recording
//! vibrasense --replay recordings/pump01.jsonl
//! ```
//!
//! # Environment Variables
//!
//! - `VIBRASENSE_CONFIG`: Path to monitor_config.toml
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write as _;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vibrasense::acquisition::{
    AcquisitionError, JsonlReplaySource, StdinWindowSource, WindowSource,
};
use vibrasense::config::{self, MonitorConfig};
use vibrasense::pipeline::EscalationPipeline;
use vibrasense::rules::StandardRuleSet;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "vibrasense")]
#[command(about = "VibraSense Vibration Early-Fault Escalation Engine")]
#[command(version)]
struct CliArgs {
    /// Read feature windows from stdin (JSON lines).
    /// Use with the simulator: simulation | vibrasense --stdin
    #[arg(long)]
    stdin: bool,

    /// Replay feature windows from a JSONL recording
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Path to monitor_config.toml (overrides the search order)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress the shutdown debrief on stderr
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let monitor_config = match &args.config {
        Some(path) => MonitorConfig::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => MonitorConfig::load(),
    };
    info!(site = %monitor_config.deployment.site, "VibraSense starting");
    config::init(monitor_config);

    let mut source: Box<dyn WindowSource> = match &args.replay {
        Some(path) => Box::new(
            JsonlReplaySource::load(path)
                .with_context(|| format!("loading replay from {}", path.display()))?,
        ),
        None => {
            if !args.stdin {
                info!("No source selected - defaulting to --stdin");
            }
            Box::new(StdinWindowSource::new())
        }
    };

    source.connect().await.context("connecting window source")?;

    let mut pipeline = EscalationPipeline::new(Box::new(StandardRuleSet));
    let stdout = std::io::stdout();
    let mut stdout_lock = stdout.lock();

    loop {
        match source.read().await {
            Ok(Some(window)) => {
                let outcome = pipeline.process(&window);
                for emission in &outcome.emissions {
                    writeln!(stdout_lock, "{}\t{}", emission.topic, emission.payload)?;
                }
                stdout_lock.flush()?;
            }
            Ok(None) => {
                info!("Window source drained - shutting down");
                break;
            }
            Err(AcquisitionError::Rejected(e)) => {
                // One bad payload fails the transport layer, not the run
                warn!(error = %e, "Rejected malformed payload");
            }
            Err(e) => {
                return Err(e).context("reading from window source");
            }
        }
    }

    source.disconnect().await.ok();

    if !args.quiet {
        eprintln!("[DEBRIEF] {}", pipeline.stats());
    }

    Ok(())
}
