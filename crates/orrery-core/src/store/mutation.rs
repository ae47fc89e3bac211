//! Atomic account mutations.
//!
//! A [`Mutation`] is the only way to change a user account. It is a list of
//! preconditions followed by a list of field operations, each optionally
//! guarded by a condition. The store evaluates and applies the whole mutation
//! under the account document's serialization point, so a mutation either
//! applies completely or not at all.
//!
//! ```text
//! commit(users/u1, Mutation)
//!   ├─ requires: DoesNotOwn(avatar_comet), BalanceAtLeast(300)
//!   └─ steps:    Debit(300), GrantCosmetic(avatar_comet)
//! ```
//!
//! # Invariants
//!
//! - No operation removes an id from an unlock set
//! - `Debit` never overdraws: an overdraft rejects the whole mutation
//! - `SelectCosmetic` never selects an unowned item: rejects the whole
//!   mutation
//! - Guards and preconditions are evaluated against the working copy, so a
//!   step sees the effects of every step before it

use orrery_proto::{AchievementId, CosmeticId, LevelId, ModuleId, UserAccount};
use thiserror::Error;

/// A predicate over a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The item is in `owned_cosmetic_ids`.
    Owns(CosmeticId),
    /// The item is not in `owned_cosmetic_ids`.
    DoesNotOwn(CosmeticId),
    /// The level is in `completed_level_ids`.
    HasCompleted(LevelId),
    /// The level is not in `completed_level_ids`.
    NotCompleted(LevelId),
    /// `currency_balance >= amount`.
    BalanceAtLeast(u64),
}

impl Condition {
    /// Evaluate against an account.
    pub fn holds(&self, account: &UserAccount) -> bool {
        match self {
            Self::Owns(id) => account.owns(id),
            Self::DoesNotOwn(id) => !account.owns(id),
            Self::HasCompleted(id) => account.has_completed(id),
            Self::NotCompleted(id) => !account.has_completed(id),
            Self::BalanceAtLeast(amount) => account.currency_balance >= *amount,
        }
    }
}

/// A single field update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOp {
    /// Add to the balance (saturating).
    Credit(u64),
    /// Subtract from the balance. Rejects the mutation on overdraft.
    Debit(u64),
    /// Add to `owned_cosmetic_ids`.
    GrantCosmetic(CosmeticId),
    /// Set `current_cosmetic_id`. Rejects the mutation if not owned.
    SelectCosmetic(CosmeticId),
    /// Add to `unlocked_module_ids`.
    UnlockModule(ModuleId),
    /// Add to `unlocked_level_ids`.
    UnlockLevel(LevelId),
    /// Add to `completed_level_ids`.
    RecordCompletion(LevelId),
    /// Add to `unlocked_achievement_ids`.
    UnlockAchievement(AchievementId),
}

/// A field operation with an optional guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Operation to apply.
    pub op: FieldOp,
    /// Skip the operation (without failing) unless this holds.
    pub only_if: Option<Condition>,
}

/// A precondition failed; nothing was applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("precondition failed: {condition:?} (balance {balance})")]
pub struct Rejection {
    /// The condition that did not hold.
    pub condition: Condition,
    /// Account balance when the mutation was evaluated.
    pub balance: u64,
}

/// A conditional, all-or-nothing update of one user account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mutation {
    requires: Vec<Condition>,
    steps: Vec<Step>,
}

impl Mutation {
    /// Empty mutation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a precondition. The mutation is rejected unless it holds.
    #[must_use]
    pub fn require(mut self, condition: Condition) -> Self {
        self.requires.push(condition);
        self
    }

    /// Append an unconditional step.
    #[must_use]
    pub fn then(mut self, op: FieldOp) -> Self {
        self.steps.push(Step { op, only_if: None });
        self
    }

    /// Append a step that is skipped unless `condition` holds.
    #[must_use]
    pub fn then_if(mut self, condition: Condition, op: FieldOp) -> Self {
        self.steps.push(Step { op, only_if: Some(condition) });
        self
    }

    /// Preconditions in evaluation order.
    pub fn requirements(&self) -> &[Condition] {
        &self.requires
    }

    /// Steps in application order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Apply to `account`.
    ///
    /// On success returns, per step, whether it changed the account (a guard
    /// that did not hold, or an id already present, both report `false`). On
    /// rejection `account` is left untouched.
    pub fn apply(&self, account: &mut UserAccount) -> Result<Vec<bool>, Rejection> {
        let mut working = account.clone();

        for condition in &self.requires {
            if !condition.holds(&working) {
                return Err(Rejection {
                    condition: condition.clone(),
                    balance: working.currency_balance,
                });
            }
        }

        let mut changed = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            if let Some(guard) = &step.only_if {
                if !guard.holds(&working) {
                    changed.push(false);
                    continue;
                }
            }
            changed.push(apply_op(&step.op, &mut working)?);
        }

        *account = working;
        Ok(changed)
    }
}

fn apply_op(op: &FieldOp, account: &mut UserAccount) -> Result<bool, Rejection> {
    let changed = match op {
        FieldOp::Credit(amount) => {
            account.currency_balance = account.currency_balance.saturating_add(*amount);
            *amount > 0
        },
        FieldOp::Debit(amount) => {
            let Some(balance) = account.currency_balance.checked_sub(*amount) else {
                return Err(Rejection {
                    condition: Condition::BalanceAtLeast(*amount),
                    balance: account.currency_balance,
                });
            };
            account.currency_balance = balance;
            *amount > 0
        },
        FieldOp::GrantCosmetic(id) => account.owned_cosmetic_ids.insert(id.clone()),
        FieldOp::SelectCosmetic(id) => {
            if !account.owns(id) {
                return Err(Rejection {
                    condition: Condition::Owns(id.clone()),
                    balance: account.currency_balance,
                });
            }
            let changed = account.current_cosmetic_id != *id;
            account.current_cosmetic_id.clone_from(id);
            changed
        },
        FieldOp::UnlockModule(id) => account.unlocked_module_ids.insert(id.clone()),
        FieldOp::UnlockLevel(id) => account.unlocked_level_ids.insert(id.clone()),
        FieldOp::RecordCompletion(id) => account.completed_level_ids.insert(id.clone()),
        FieldOp::UnlockAchievement(id) => account.unlocked_achievement_ids.insert(id.clone()),
    };
    Ok(changed)
}
