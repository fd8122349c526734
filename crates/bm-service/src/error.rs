//! Service-layer error type.

use thiserror::Error;

use bm_tiles::TileError;

/// Errors produced by `bm-service`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("missing required parameter `{0}`")]
    MissingParam(&'static str),

    #[error("invalid value {value:?} for parameter `{name}`")]
    InvalidParam { name: &'static str, value: String },

    #[error(transparent)]
    Tiles(#[from] TileError),
}

impl ServiceError {
    /// `true` if the caller sent a bad request rather than the service
    /// being misconfigured.  A transport maps these to 4xx responses.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::MissingParam(_)
                | ServiceError::InvalidParam { .. }
                | ServiceError::Tiles(TileError::InvalidQuery(_))
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
