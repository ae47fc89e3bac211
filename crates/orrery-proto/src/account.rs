//! User account record.
//!
//! The account is the single shared mutable document of the system. All of its
//! sets are unlock sets: they only ever grow.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::collection::{Collection, Record};

/// Opaque user identity supplied by the authentication provider.
pub type UserId = String;

/// Learning module identifier.
pub type ModuleId = String;

/// Level identifier (shared by `levels` and `planet_levels`).
pub type LevelId = String;

/// Quiz question identifier.
pub type QuestionId = String;

/// Cosmetic (avatar) identifier.
pub type CosmeticId = String;

/// Achievement identifier.
pub type AchievementId = String;

/// Persisted user profile.
///
/// # Invariants
///
/// - `current_cosmetic_id` is a member of `owned_cosmetic_ids`
/// - `currency_balance` is never negative (enforced by the unsigned type and
///   by the commit primitive refusing overdrafts)
/// - No id is ever removed from any set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Document key.
    pub id: UserId,
    /// Name shown in the profile screen.
    pub display_name: String,
    /// Virtual currency.
    pub currency_balance: u64,
    /// Avatar currently shown for the user.
    pub current_cosmetic_id: CosmeticId,
    /// Purchased (or granted) avatars.
    pub owned_cosmetic_ids: BTreeSet<CosmeticId>,
    /// Modules the user may open.
    pub unlocked_module_ids: BTreeSet<ModuleId>,
    /// Levels the user may play.
    pub unlocked_level_ids: BTreeSet<LevelId>,
    /// Achievements earned.
    pub unlocked_achievement_ids: BTreeSet<AchievementId>,
    /// Levels passed at least once.
    #[serde(default)]
    pub completed_level_ids: BTreeSet<LevelId>,
}

impl UserAccount {
    /// Create a fresh account owning (and wearing) `default_cosmetic`.
    pub fn new(
        id: impl Into<UserId>,
        display_name: impl Into<String>,
        starting_balance: u64,
        default_cosmetic: impl Into<CosmeticId>,
    ) -> Self {
        let default_cosmetic = default_cosmetic.into();
        Self {
            id: id.into(),
            display_name: display_name.into(),
            currency_balance: starting_balance,
            current_cosmetic_id: default_cosmetic.clone(),
            owned_cosmetic_ids: BTreeSet::from([default_cosmetic]),
            unlocked_module_ids: BTreeSet::new(),
            unlocked_level_ids: BTreeSet::new(),
            unlocked_achievement_ids: BTreeSet::new(),
            completed_level_ids: BTreeSet::new(),
        }
    }

    /// Whether the level is playable.
    pub fn is_level_unlocked(&self, level_id: &str) -> bool {
        self.unlocked_level_ids.contains(level_id)
    }

    /// Whether the module can be opened.
    pub fn is_module_unlocked(&self, module_id: &str) -> bool {
        self.unlocked_module_ids.contains(module_id)
    }

    /// Whether the level has been passed before.
    pub fn has_completed(&self, level_id: &str) -> bool {
        self.completed_level_ids.contains(level_id)
    }

    /// Whether the avatar is owned.
    pub fn owns(&self, cosmetic_id: &str) -> bool {
        self.owned_cosmetic_ids.contains(cosmetic_id)
    }

    /// Whether the achievement has been earned.
    pub fn has_achievement(&self, achievement_id: &str) -> bool {
        self.unlocked_achievement_ids.contains(achievement_id)
    }

    /// Check the structural invariants that must hold for every stored
    /// account.
    pub fn is_consistent(&self) -> bool {
        self.owns(&self.current_cosmetic_id)
    }
}

impl Record for UserAccount {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> &str {
        &self.id
    }
}
