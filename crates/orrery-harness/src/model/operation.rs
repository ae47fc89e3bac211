//! Operations for model-based testing.
//!
//! Operations are generated randomly and applied to both the model and the
//! real services. Ids are small indices into fixed tables so random sequences
//! hit the same users, levels and items often.

use arbitrary::Arbitrary;

/// User slot (mapped to `user_{n}`).
pub type UserSlot = u8;

/// Number of distinct users operations refer to.
pub const USER_SLOTS: u8 = 3;

/// Levels operations refer to: the eight planets, then one non-planet level.
pub static LEVELS: [&str; 9] = [
    "level_mercury",
    "level_venus",
    "level_earth",
    "level_mars",
    "level_jupiter",
    "level_saturn",
    "level_uranus",
    "level_neptune",
    "level_sun",
];

/// Number of planet levels at the front of [`LEVELS`].
pub const PLANET_COUNT: usize = 8;

/// Items operations refer to.
pub const ITEMS: [&str; 5] =
    ["avatar_default", "avatar_comet", "avatar_astronaut", "avatar_alien", "frame_orbit"];

/// Modules operations refer to.
pub const MODULES: [&str; 3] = ["module_solar_system", "module_stars", "module_galaxies"];

/// User id for a slot.
pub fn user_id(slot: UserSlot) -> String {
    format!("user_{}", slot % USER_SLOTS)
}

/// Level id for an index.
pub fn level_id(index: u8) -> &'static str {
    LEVELS[usize::from(index) % LEVELS.len()]
}

/// Item id for an index.
pub fn item_id(index: u8) -> &'static str {
    ITEMS[usize::from(index) % ITEMS.len()]
}

/// Module id for an index.
pub fn module_id(index: u8) -> &'static str {
    MODULES[usize::from(index) % MODULES.len()]
}

/// Operations that can be applied to the system.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Create an account.
    Register {
        /// Target user.
        user: UserSlot,
    },

    /// Complete a level with a reward.
    CompleteLevel {
        /// Target user.
        user: UserSlot,
        /// Level index.
        level: u8,
        /// Reward in tens of coins.
        reward: u8,
    },

    /// Buy an item at an explicit price.
    Purchase {
        /// Target user.
        user: UserSlot,
        /// Item index.
        item: u8,
        /// Price in coins.
        price: u16,
    },

    /// Wear an item.
    SetActiveCosmetic {
        /// Target user.
        user: UserSlot,
        /// Item index.
        item: u8,
    },

    /// Credit coins.
    AddCurrency {
        /// Target user.
        user: UserSlot,
        /// Amount in coins.
        amount: u16,
    },

    /// Unlock a level.
    UnlockLevel {
        /// Target user.
        user: UserSlot,
        /// Level index.
        level: u8,
    },

    /// Unlock a module.
    UnlockModule {
        /// Target user.
        user: UserSlot,
        /// Module index.
        module: u8,
    },

    /// Run the solar-system achievement check.
    CheckSolarSystem {
        /// Target user.
        user: UserSlot,
    },
}

/// Result of applying an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Succeeded with nothing to report.
    Ok,

    /// Succeeded; balance afterwards.
    Balance(u64),

    /// Succeeded; whether something changed (or the check held).
    Flag(bool),

    /// Failed with an expected error.
    Error(OperationError),
}

/// Expected errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// User has no account.
    NotFound,
    /// User already has an account.
    AlreadyRegistered,
    /// Item already owned.
    AlreadyOwned,
    /// Balance below price.
    InsufficientFunds,
    /// Item not owned.
    NotOwned,
}

impl OperationResult {
    /// Check if operation succeeded.
    pub fn is_ok(&self) -> bool {
        !self.is_err()
    }

    /// Check if operation failed.
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
