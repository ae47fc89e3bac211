//! Service error taxonomy.
//!
//! Every service operation returns one of these. Each is displayable so the
//! UI can show it, and [`ServiceError::is_retryable`] tells whether a retry
//! button makes sense. Nothing is retried automatically.

use std::fmt;

use orrery_proto::{Collection, ProtoError};
use thiserror::Error;

use crate::store::{Condition, StoreError};

/// Kind of entity a [`ServiceError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// User account.
    User,
    /// Learning module.
    Module,
    /// Level or planet level.
    Level,
    /// Quiz question.
    Question,
    /// Achievement.
    Achievement,
    /// Cosmetic item.
    Cosmetic,
}

impl From<Collection> for EntityKind {
    fn from(collection: Collection) -> Self {
        match collection {
            Collection::Users => Self::User,
            Collection::LearningModules => Self::Module,
            Collection::Levels | Collection::PlanetLevels => Self::Level,
            Collection::Questions => Self::Question,
            Collection::Achievements => Self::Achievement,
            Collection::Avatars => Self::Cosmetic,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Module => "module",
            Self::Level => "level",
            Self::Question => "question",
            Self::Achievement => "achievement",
            Self::Cosmetic => "item",
        };
        f.write_str(name)
    }
}

/// Errors from progression, economy and account operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up.
        kind: EntityKind,
        /// Id that was looked up.
        id: String,
    },

    /// Purchase of an item the user already owns.
    #[error("already owned: {item_id}")]
    AlreadyOwned {
        /// Item id.
        item_id: String,
    },

    /// Balance below the item price.
    #[error("insufficient funds: costs {price}, balance {balance}")]
    InsufficientFunds {
        /// Item price.
        price: u64,
        /// Balance at the time of the attempt.
        balance: u64,
    },

    /// Selection of an item the user does not own.
    #[error("not owned: {item_id}")]
    NotOwned {
        /// Item id.
        item_id: String,
    },

    /// Store unreachable or failed transiently.
    #[error("store unavailable: {reason}")]
    TransientIo {
        /// Description of the failure.
        reason: String,
    },

    /// Registration for an existing account.
    #[error("user already registered: {user_id}")]
    AlreadyRegistered {
        /// User id.
        user_id: String,
    },

    /// A stored document is unreadable.
    #[error("corrupt document: {reason}")]
    Corrupt {
        /// Description of the problem.
        reason: String,
    },

    /// A commit precondition with no dedicated variant failed.
    #[error("precondition failed: {reason}")]
    PreconditionFailed {
        /// Description of the failed condition.
        reason: String,
    },
}

impl ServiceError {
    /// Returns true if retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientIo { .. })
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { path } | StoreError::InvalidPath { path } => {
                Self::NotFound { kind: path.collection.into(), id: path.id }
            },
            StoreError::AlreadyExists { path } => match path.collection {
                Collection::Users => Self::AlreadyRegistered { user_id: path.id },
                _ => Self::PreconditionFailed { reason: format!("{path} already exists") },
            },
            StoreError::Rejected(rejection) => match rejection.condition {
                Condition::DoesNotOwn(item_id) => Self::AlreadyOwned { item_id },
                Condition::Owns(item_id) => Self::NotOwned { item_id },
                Condition::BalanceAtLeast(price) => {
                    Self::InsufficientFunds { price, balance: rejection.balance }
                },
                other => Self::PreconditionFailed { reason: format!("{other:?}") },
            },
            StoreError::Unavailable { reason } => Self::TransientIo { reason },
            StoreError::Codec(e) => e.into(),
        }
    }
}

impl From<ProtoError> for ServiceError {
    fn from(err: ProtoError) -> Self {
        Self::Corrupt { reason: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use orrery_proto::DocumentPath;

    use super::*;
    use crate::store::Rejection;

    #[test]
    fn rejections_map_to_taxonomy() {
        let owned = StoreError::Rejected(Rejection {
            condition: Condition::DoesNotOwn("avatar_comet".into()),
            balance: 10,
        });
        assert_eq!(
            ServiceError::from(owned),
            ServiceError::AlreadyOwned { item_id: "avatar_comet".into() }
        );

        let broke = StoreError::Rejected(Rejection {
            condition: Condition::BalanceAtLeast(500),
            balance: 400,
        });
        assert_eq!(
            ServiceError::from(broke),
            ServiceError::InsufficientFunds { price: 500, balance: 400 }
        );

        let unowned = StoreError::Rejected(Rejection {
            condition: Condition::Owns("avatar_alien".into()),
            balance: 0,
        });
        assert_eq!(
            ServiceError::from(unowned),
            ServiceError::NotOwned { item_id: "avatar_alien".into() }
        );
    }

    #[test]
    fn missing_documents_name_their_kind() {
        let err = ServiceError::from(StoreError::NotFound { path: DocumentPath::user("u9") });
        assert_eq!(err.to_string(), "user not found: u9");

        let err = ServiceError::from(StoreError::NotFound {
            path: DocumentPath::new(Collection::Avatars, "avatar_x"),
        });
        assert_eq!(err.to_string(), "item not found: avatar_x");
    }

    #[test]
    fn only_transient_io_is_retryable() {
        let transient = ServiceError::from(StoreError::Unavailable { reason: "offline".into() });
        assert!(transient.is_retryable());

        let corrupt = ServiceError::from(StoreError::Codec(ProtoError::Decode("eof".into())));
        assert!(!corrupt.is_retryable());
        assert!(!ServiceError::NotOwned { item_id: "x".into() }.is_retryable());
    }

    #[test]
    fn duplicate_user_is_already_registered() {
        let err = ServiceError::from(StoreError::AlreadyExists { path: DocumentPath::user("u1") });
        assert_eq!(err, ServiceError::AlreadyRegistered { user_id: "u1".into() });
    }
}
