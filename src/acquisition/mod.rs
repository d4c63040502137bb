//! Feature-window acquisition
//!
//! Sources deliver validated feature windows to the processing loop. The
//! transport layer rejects malformed payloads before the core sees them.

pub mod replay;
pub mod stdin_source;

pub use replay::JsonlReplaySource;
pub use stdin_source::StdinWindowSource;

use async_trait::async_trait;
use thiserror::Error;

use crate::transport::TransportError;
use crate::types::FeatureWindow;

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Payload rejected: {0}")]
    Rejected(#[from] TransportError),
}

/// A stream of feature windows.
///
/// `read` returns `Ok(None)` at end of stream. A `Rejected` error covers
/// one bad payload; the source remains usable and the caller decides
/// whether to continue.
#[async_trait]
pub trait WindowSource: Send {
    async fn connect(&mut self) -> Result<(), AcquisitionError>;

    async fn read(&mut self) -> Result<Option<FeatureWindow>, AcquisitionError>;

    async fn disconnect(&mut self) -> Result<(), AcquisitionError>;

    fn is_connected(&self) -> bool;
}
