//! Catalog records.
//!
//! Static reference data: modules, levels, questions, achievements and
//! avatars. None of these are owned by a user. Lock state is always derived
//! from the user's account, never stored on the catalog record.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::{
    account::{AchievementId, CosmeticId, LevelId, ModuleId, QuestionId},
    collection::{Collection, Record},
};

/// A unit of learning content grouping several levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningModule {
    /// Document key.
    pub id: ModuleId,
    /// Display title.
    pub title: String,
    /// Short description shown on the module card.
    #[serde(default)]
    pub description: String,
    /// Position in the module list (ascending).
    pub order: u32,
}

impl Record for LearningModule {
    const COLLECTION: Collection = Collection::LearningModules;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A playable level within a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Document key.
    pub id: LevelId,
    /// Parent module.
    pub module_id: ModuleId,
    /// Ordinal within the module (ascending).
    pub number: u32,
    /// Display title.
    pub title: String,
    /// Currency granted on first completion when no quiz reward applies.
    pub reward: u64,
}

impl Record for Level {
    const COLLECTION: Collection = Collection::Levels;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A planet stop of the solar-system tour.
///
/// Shares its id with the corresponding [`Level`]. The canonical traversal
/// order of the tour is this collection sorted by `ordinal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetLevel {
    /// Document key (same as the level id).
    pub id: LevelId,
    /// Planet name.
    pub planet: String,
    /// Distance rank from the sun, starting at 1.
    pub ordinal: u32,
    /// Completion reward shown on the planet card; mirrors the level's reward.
    pub reward: u64,
    /// Path of the planet model in remote object storage.
    #[serde(default)]
    pub model_path: String,
}

impl Record for PlanetLevel {
    const COLLECTION: Collection = Collection::PlanetLevels;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A multiple-choice quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Document key.
    pub id: QuestionId,
    /// Level this question belongs to.
    pub level_id: LevelId,
    /// Position in the quiz (ascending).
    pub number: u32,
    /// Question text.
    pub prompt: String,
    /// Answer options in display order.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_option: usize,
    /// Currency earned for answering correctly.
    pub reward: u64,
}

impl Question {
    /// Whether `option` is the correct answer.
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_option
    }
}

impl Record for Question {
    const COLLECTION: Collection = Collection::Questions;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Cosmetic category tag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum CosmeticCategory {
    /// Profile avatar.
    Avatar = 0,
    /// Frame drawn around the avatar.
    Frame = 1,
    /// Profile background.
    Background = 2,
}

/// A purchasable visual customization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosmeticItem {
    /// Document key.
    pub id: CosmeticId,
    /// Display name.
    pub name: String,
    /// Price in currency.
    pub price: u64,
    /// Category tag.
    pub category: CosmeticCategory,
    /// Image path in remote object storage. Empty means the placeholder glyph.
    #[serde(default)]
    pub image_path: String,
}

impl Record for CosmeticItem {
    const COLLECTION: Collection = Collection::Avatars;

    fn id(&self) -> &str {
        &self.id
    }
}

/// What unlocks an achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "level_id", rename_all = "snake_case")]
pub enum AchievementTrigger {
    /// Completing the given level.
    Level(LevelId),
    /// Completing every planet level.
    AllLevels,
}

/// An earnable badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    /// Document key.
    pub id: AchievementId,
    /// Display title.
    pub title: String,
    /// Description of how to earn it.
    #[serde(default)]
    pub description: String,
    /// Unlock condition.
    pub trigger: AchievementTrigger,
}

impl Achievement {
    /// Whether completing `level_id` unlocks this achievement directly.
    pub fn is_triggered_by(&self, level_id: &str) -> bool {
        matches!(&self.trigger, AchievementTrigger::Level(id) if id == level_id)
    }
}

impl Record for Achievement {
    const COLLECTION: Collection = Collection::Achievements;

    fn id(&self) -> &str {
        &self.id
    }
}
