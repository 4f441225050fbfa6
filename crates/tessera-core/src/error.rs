//! Error types for the engine.

use thiserror::Error;

use crate::coords::TilePos;

/// Engine-wide error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration rejected at construction time
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Out of bounds access
    #[error("Out of bounds: {0}")]
    OutOfBounds(TilePos),

    /// Tile membership disagrees with an object's cached tiles
    #[error("Inconsistent tile map: {0}")]
    Inconsistent(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
