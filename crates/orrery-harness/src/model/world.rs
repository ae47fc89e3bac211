//! Model world.
//!
//! Holds one optional model account per user slot and applies operations.
//! It is the oracle the real services are checked against.

use super::{
    account::{AccountState, ModelAccount},
    operation::{
        LEVELS, Operation, OperationError, OperationResult, PLANET_COUNT, USER_SLOTS, UserSlot,
        item_id, level_id, module_id,
    },
};

/// Planet levels required by the solar-system achievement.
fn planets() -> &'static [&'static str] {
    &LEVELS[..PLANET_COUNT]
}

/// Achievements unlocked by completing every planet.
const TOUR_ACHIEVEMENTS: &[&str] = &["achievement_solar_system"];

/// Observable state for oracle comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Per slot, the account if registered.
    pub accounts: Vec<Option<AccountState>>,
}

/// Reference implementation.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    accounts: Vec<Option<ModelAccount>>,
}

impl ModelWorld {
    /// World with every user slot unregistered.
    pub fn new() -> Self {
        Self { accounts: vec![None; usize::from(USER_SLOTS)] }
    }

    /// Apply an operation and return the result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match *op {
            Operation::Register { user } => {
                let slot = self.slot(user);
                if slot.is_some() {
                    return OperationResult::Error(OperationError::AlreadyRegistered);
                }
                *slot = Some(ModelAccount::new());
                OperationResult::Ok
            },
            Operation::CompleteLevel { user, level, reward } => self.with_account(user, |a| {
                OperationResult::Balance(a.complete_level(level_id(level), u64::from(reward) * 10))
            }),
            Operation::Purchase { user, item, price } => {
                self.with_account(user, |a| match a.purchase(item_id(item), u64::from(price)) {
                    Ok(balance) => OperationResult::Balance(balance),
                    Err(e) => OperationResult::Error(e),
                })
            },
            Operation::SetActiveCosmetic { user, item } => {
                self.with_account(user, |a| match a.set_active(item_id(item)) {
                    Ok(()) => OperationResult::Ok,
                    Err(e) => OperationResult::Error(e),
                })
            },
            Operation::AddCurrency { user, amount } => self.with_account(user, |a| {
                OperationResult::Balance(a.add_currency(u64::from(amount)))
            }),
            Operation::UnlockLevel { user, level } => {
                self.with_account(user, |a| OperationResult::Flag(a.unlock_level(level_id(level))))
            },
            Operation::UnlockModule { user, module } => self.with_account(user, |a| {
                OperationResult::Flag(a.unlock_module(module_id(module)))
            }),
            Operation::CheckSolarSystem { user } => self.with_account(user, |a| {
                OperationResult::Flag(a.check_all_completed(planets(), TOUR_ACHIEVEMENTS))
            }),
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            accounts: self.accounts.iter().map(|a| a.as_ref().map(|a| a.state().clone())).collect(),
        }
    }

    fn slot(&mut self, user: UserSlot) -> &mut Option<ModelAccount> {
        let index = usize::from(user % USER_SLOTS);
        &mut self.accounts[index]
    }

    fn with_account(
        &mut self,
        user: UserSlot,
        f: impl FnOnce(&mut ModelAccount) -> OperationResult,
    ) -> OperationResult {
        match self.slot(user) {
            Some(account) => f(account),
            None => OperationResult::Error(OperationError::NotFound),
        }
    }
}

impl Default for ModelWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_user_is_not_found() {
        let mut world = ModelWorld::new();

        let result = world.apply(&Operation::AddCurrency { user: 0, amount: 5 });

        assert_eq!(result, OperationResult::Error(OperationError::NotFound));
    }

    #[test]
    fn reward_paid_once() {
        let mut world = ModelWorld::new();
        world.apply(&Operation::Register { user: 1 });

        let first = world.apply(&Operation::CompleteLevel { user: 1, level: 0, reward: 10 });
        let second = world.apply(&Operation::CompleteLevel { user: 1, level: 0, reward: 10 });

        assert_eq!(first, OperationResult::Balance(1100));
        assert_eq!(second, OperationResult::Balance(1100));
    }

    #[test]
    fn tour_needs_all_planets() {
        let mut world = ModelWorld::new();
        world.apply(&Operation::Register { user: 0 });
        world.apply(&Operation::CompleteLevel { user: 0, level: 8, reward: 1 });
        let check = Operation::CheckSolarSystem { user: 0 };
        assert_eq!(world.apply(&check), OperationResult::Flag(false));

        for level in 0..8 {
            world.apply(&Operation::CompleteLevel { user: 0, level, reward: 1 });
        }
        assert_eq!(world.apply(&check), OperationResult::Flag(true));
    }
}
