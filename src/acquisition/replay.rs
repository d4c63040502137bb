//! Feature-window replay from JSONL files
//!
//! Loads a whole recording up front; lines that fail transport validation
//! are logged and skipped rather than aborting the replay.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use async_trait::async_trait;

use super::{AcquisitionError, WindowSource};
use crate::transport;
use crate::types::FeatureWindow;

/// Read feature windows from a JSONL file, skipping invalid lines.
pub fn read_jsonl(path: &Path) -> Result<Vec<FeatureWindow>, AcquisitionError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut windows = Vec::new();
    let mut line_num = 0usize;

    for line_result in reader.lines() {
        line_num += 1;
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match transport::decode_feature_window(line.trim()) {
            Ok(window) => windows.push(window),
            Err(e) => {
                tracing::warn!(line = line_num, error = %e, "Skipping invalid replay line");
            }
        }
    }

    tracing::info!(count = windows.len(), path = %path.display(), "Loaded feature windows from replay file");
    Ok(windows)
}

/// Window source over a pre-loaded JSONL recording.
pub struct JsonlReplaySource {
    windows: VecDeque<FeatureWindow>,
    connected: bool,
}

impl JsonlReplaySource {
    /// Load the recording at `path`.
    pub fn load(path: &Path) -> Result<Self, AcquisitionError> {
        Ok(Self {
            windows: read_jsonl(path)?.into(),
            connected: false,
        })
    }

    /// Windows remaining to be read.
    pub fn remaining(&self) -> usize {
        self.windows.len()
    }
}

#[async_trait]
impl WindowSource for JsonlReplaySource {
    async fn connect(&mut self) -> Result<(), AcquisitionError> {
        self.connected = true;
        Ok(())
    }

    async fn read(&mut self) -> Result<Option<FeatureWindow>, AcquisitionError> {
        if !self.connected {
            return Err(AcquisitionError::ConnectionFailed(
                "Not connected".to_string(),
            ));
        }
        Ok(self.windows.pop_front())
    }

    async fn disconnect(&mut self) -> Result<(), AcquisitionError> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
