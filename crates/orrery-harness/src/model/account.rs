//! Model account.

use std::collections::BTreeSet;

use orrery_proto::UserAccount;

use super::OperationError;

/// Snapshot of an account for oracle comparison.
///
/// Built from the model and from real `UserAccount`s alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    /// Coins.
    pub balance: u64,
    /// Worn item.
    pub current: String,
    /// Owned items.
    pub owned: BTreeSet<String>,
    /// Unlocked modules.
    pub modules: BTreeSet<String>,
    /// Unlocked levels.
    pub levels: BTreeSet<String>,
    /// Completed levels.
    pub completed: BTreeSet<String>,
    /// Unlocked achievements.
    pub achievements: BTreeSet<String>,
}

impl AccountState {
    /// Whether every set of `self` contains the matching set of `earlier`.
    pub fn extends(&self, earlier: &Self) -> bool {
        self.owned.is_superset(&earlier.owned)
            && self.modules.is_superset(&earlier.modules)
            && self.levels.is_superset(&earlier.levels)
            && self.completed.is_superset(&earlier.completed)
            && self.achievements.is_superset(&earlier.achievements)
    }

    /// The worn item is owned.
    pub fn wears_owned_item(&self) -> bool {
        self.owned.contains(&self.current)
    }
}

impl From<&UserAccount> for AccountState {
    fn from(account: &UserAccount) -> Self {
        Self {
            balance: account.currency_balance,
            current: account.current_cosmetic_id.clone(),
            owned: account.owned_cosmetic_ids.clone(),
            modules: account.unlocked_module_ids.clone(),
            levels: account.unlocked_level_ids.clone(),
            completed: account.completed_level_ids.clone(),
            achievements: account.unlocked_achievement_ids.clone(),
        }
    }
}

/// Reference account: plain fields, obviously correct rules.
#[derive(Debug, Clone)]
pub struct ModelAccount {
    state: AccountState,
}

impl ModelAccount {
    /// Fresh account with the default starting state.
    pub fn new() -> Self {
        Self {
            state: AccountState {
                balance: 1000,
                current: "avatar_default".to_string(),
                owned: BTreeSet::from(["avatar_default".to_string()]),
                modules: BTreeSet::from(["module_solar_system".to_string()]),
                levels: BTreeSet::from(["level_mercury".to_string()]),
                completed: BTreeSet::new(),
                achievements: BTreeSet::new(),
            },
        }
    }

    /// Current state.
    pub fn state(&self) -> &AccountState {
        &self.state
    }

    /// Complete a level; pays only the first time. Returns the balance.
    pub fn complete_level(&mut self, level: &str, reward: u64) -> u64 {
        if self.state.completed.insert(level.to_string()) {
            self.state.balance = self.state.balance.saturating_add(reward);
        }
        self.state.levels.insert(level.to_string());
        self.state.balance
    }

    /// Buy an item. Returns the balance or the reason it failed.
    pub fn purchase(&mut self, item: &str, price: u64) -> Result<u64, OperationError> {
        if self.state.owned.contains(item) {
            return Err(OperationError::AlreadyOwned);
        }
        if self.state.balance < price {
            return Err(OperationError::InsufficientFunds);
        }
        self.state.balance -= price;
        self.state.owned.insert(item.to_string());
        Ok(self.state.balance)
    }

    /// Wear an owned item.
    pub fn set_active(&mut self, item: &str) -> Result<(), OperationError> {
        if !self.state.owned.contains(item) {
            return Err(OperationError::NotOwned);
        }
        self.state.current = item.to_string();
        Ok(())
    }

    /// Credit coins. Returns the balance.
    pub fn add_currency(&mut self, amount: u64) -> u64 {
        self.state.balance = self.state.balance.saturating_add(amount);
        self.state.balance
    }

    /// Unlock a level. Returns whether it was new.
    pub fn unlock_level(&mut self, level: &str) -> bool {
        self.state.levels.insert(level.to_string())
    }

    /// Unlock a module. Returns whether it was new.
    pub fn unlock_module(&mut self, module: &str) -> bool {
        self.state.modules.insert(module.to_string())
    }

    /// Unlock `achievements` if every level of `planets` is completed.
    pub fn check_all_completed(&mut self, planets: &[&str], achievements: &[&str]) -> bool {
        let done = !planets.is_empty() && planets.iter().all(|p| self.state.completed.contains(*p));
        if done {
            self.state.achievements.extend(achievements.iter().map(|a| (*a).to_string()));
        }
        done
    }
}

impl Default for ModelAccount {
    fn default() -> Self {
        Self::new()
    }
}
