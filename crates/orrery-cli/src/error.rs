//! CLI error types.

use orrery_client::RunnerError;
use orrery_core::{ServiceError, StoreError};
use orrery_proto::LevelId;
use thiserror::Error;

/// Errors surfaced by `orrery` commands.
#[derive(Debug, Error)]
pub enum AppError {
    /// A service operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A quiz run failed.
    #[error(transparent)]
    Quiz(#[from] RunnerError),

    /// Raw store access failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The level is not unlocked for the user.
    #[error("level {level_id} is locked")]
    LevelLocked {
        /// Requested level.
        level_id: LevelId,
    },
}

impl AppError {
    /// Returns true if running the same command again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Service(e) => e.is_retryable(),
            Self::Quiz(e) => e.is_retryable(),
            Self::Store(e) => e.is_transient(),
            Self::LevelLocked { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_level_display() {
        let err = AppError::LevelLocked { level_id: "level_mars".into() };
        assert_eq!(err.to_string(), "level level_mars is locked");
        assert!(!err.is_retryable());
    }

    #[test]
    fn service_errors_keep_their_message() {
        let err = AppError::from(ServiceError::NotOwned { item_id: "avatar_alien".into() });
        assert_eq!(err.to_string(), "not owned: avatar_alien");
    }
}
