//! Stdin Window Source
//!
//! Reads JSON-formatted feature windows from stdin, one per line.
//! Used with the simulation harness: `simulation | vibrasense --stdin`

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

use super::{AcquisitionError, WindowSource};
use crate::transport;
use crate::types::FeatureWindow;

/// Window source that reads JSON lines from stdin.
pub struct StdinWindowSource {
    reader: Option<BufReader<Stdin>>,
    line_buffer: String,
    connected: bool,
}

impl StdinWindowSource {
    pub fn new() -> Self {
        Self {
            reader: None,
            line_buffer: String::with_capacity(2048),
            connected: false,
        }
    }
}

impl Default for StdinWindowSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WindowSource for StdinWindowSource {
    async fn connect(&mut self) -> Result<(), AcquisitionError> {
        if self.connected {
            return Ok(());
        }
        self.reader = Some(BufReader::new(tokio::io::stdin()));
        self.connected = true;
        tracing::info!("Stdin window source connected");
        Ok(())
    }

    async fn read(&mut self) -> Result<Option<FeatureWindow>, AcquisitionError> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| AcquisitionError::ConnectionFailed("Not connected".to_string()))?;

        loop {
            self.line_buffer.clear();
            let bytes_read = reader.read_line(&mut self.line_buffer).await?;
            if bytes_read == 0 {
                // EOF - upstream closed the pipe
                self.connected = false;
                return Ok(None);
            }

            let line = self.line_buffer.trim();
            if line.is_empty() {
                continue;
            }

            return transport::decode_feature_window(line)
                .map(Some)
                .map_err(AcquisitionError::from);
        }
    }

    async fn disconnect(&mut self) -> Result<(), AcquisitionError> {
        self.reader = None;
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
