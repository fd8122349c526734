//! Tile-subsystem error type.

use thiserror::Error;

use bm_core::BmError;

/// Errors produced by `bm-tiles`.
#[derive(Debug, Error)]
pub enum TileError {
    /// The caller asked for something no tile set can satisfy: a
    /// non-finite or zero-area box, or a zero pixel width.
    #[error("invalid tile query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Config(#[from] BmError),
}

pub type TileResult<T> = Result<T, TileError>;
