//! Orrery document records.
//!
//! Every record stored in the progression document store lives here, together
//! with the collection naming scheme and the CBOR codec used to put records
//! on the wire.
//!
//! # Collections
//!
//! ```text
//! users/{userId}                   UserAccount
//! learning_modules/{moduleId}      LearningModule
//! levels/{levelId}                 Level
//! planet_levels/{levelId}          PlanetLevel
//! questions/{questionId}           Question
//! achievements/{achievementId}     Achievement
//! avatars/{avatarId}               CosmeticItem
//! ```
//!
//! The user account is the only document clients mutate. Catalog collections
//! are seeded once and read-only afterwards.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod catalog;
pub mod codec;
pub mod collection;
pub mod error;

pub use account::{AchievementId, CosmeticId, LevelId, ModuleId, QuestionId, UserAccount, UserId};
pub use catalog::{
    Achievement, AchievementTrigger, CosmeticCategory, CosmeticItem, LearningModule, Level,
    PlanetLevel, Question,
};
pub use codec::{decode, encode};
pub use collection::{Collection, DocumentPath, Record};
pub use error::ProtoError;
