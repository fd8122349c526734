//! Workspace-wide base error type.
//!
//! Sub-crates define their own error enums.  `bm-tiles` wraps `BmError` via
//! `#[from]` so a rejected `MapConfig` surfaces unchanged.

use thiserror::Error;

/// The base error type for `bm-core` and a common variant for sub-crates.
#[derive(Debug, Error)]
pub enum BmError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for all `bm-*` crates.
pub type BmResult<T> = Result<T, BmError>;
