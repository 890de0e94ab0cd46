/*

    Error types for index construction and configuration loading.

    @date: 10 Nov, 2025
    @author: Bartu
*/

use thiserror::Error;

/// Errors that can occur before or while building an index.
///
/// Every variant is raised before any node is written, so a caller never
/// gets a partially built index back.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Triangle soup whose vertex count is not a multiple of three.
    #[error("triangle soup has {len} vertices, which is not a multiple of 3")]
    MalformedSoup { len: usize },

    /// A primitive reported NaN in its bounds.
    #[error("primitive {index} has non-finite bounds")]
    NonFiniteBounds { index: usize },

    /// Array positions must fit in u32 below the INVALID sentinel.
    #[error("{count} primitive references do not fit in 32-bit indices")]
    TooManyPrimitives { count: usize },

    /// Rejected index settings.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
