// Error types for the difference engine, exporter and region selection
//
// Every failure is local to one operation: the caller reports it and stays
// in a retryable state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RobodocError {
    /// Missing, empty or undecodable image input
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("control region {width}×{height} is too small (both sides must exceed {min} pixels)")]
    RegionTooSmall { width: u32, height: u32, min: u32 },

    /// Destination unwritable or the encoder failed
    #[error("export failed: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, RobodocError>;
