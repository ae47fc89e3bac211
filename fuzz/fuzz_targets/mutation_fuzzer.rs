//! Fuzz target for [`Mutation::apply`]
//!
//! Prevent partial commits and inconsistent accounts
//!
//! # Strategy
//!
//! - Arbitrary requirements and guarded steps over a small id space so
//!   conditions hit owned items and completed levels often
//! - Debits past the balance and selections of unowned items mid-mutation
//!
//! # Invariants
//!
//! - A rejected mutation leaves the account byte-for-byte unchanged
//! - An applied mutation reports one flag per step
//! - Sets only grow
//! - The worn item is always owned
//! - NEVER panic

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use orrery_core::{Condition, FieldOp, Mutation};
use orrery_proto::UserAccount;

const IDS: [&str; 4] = ["avatar_default", "avatar_comet", "level_mercury", "level_venus"];

fn id(index: u8) -> String {
    IDS[usize::from(index) % IDS.len()].to_string()
}

#[derive(Debug, Clone, Arbitrary)]
enum FuzzCondition {
    Owns(u8),
    DoesNotOwn(u8),
    HasCompleted(u8),
    NotCompleted(u8),
    BalanceAtLeast(u16),
}

impl FuzzCondition {
    fn build(&self) -> Condition {
        match *self {
            Self::Owns(i) => Condition::Owns(id(i)),
            Self::DoesNotOwn(i) => Condition::DoesNotOwn(id(i)),
            Self::HasCompleted(i) => Condition::HasCompleted(id(i)),
            Self::NotCompleted(i) => Condition::NotCompleted(id(i)),
            Self::BalanceAtLeast(amount) => Condition::BalanceAtLeast(u64::from(amount)),
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum FuzzOp {
    Credit(u16),
    Debit(u16),
    GrantCosmetic(u8),
    SelectCosmetic(u8),
    UnlockModule(u8),
    UnlockLevel(u8),
    RecordCompletion(u8),
    UnlockAchievement(u8),
}

impl FuzzOp {
    fn build(&self) -> FieldOp {
        match *self {
            Self::Credit(amount) => FieldOp::Credit(u64::from(amount)),
            Self::Debit(amount) => FieldOp::Debit(u64::from(amount)),
            Self::GrantCosmetic(i) => FieldOp::GrantCosmetic(id(i)),
            Self::SelectCosmetic(i) => FieldOp::SelectCosmetic(id(i)),
            Self::UnlockModule(i) => FieldOp::UnlockModule(id(i)),
            Self::UnlockLevel(i) => FieldOp::UnlockLevel(id(i)),
            Self::RecordCompletion(i) => FieldOp::RecordCompletion(id(i)),
            Self::UnlockAchievement(i) => FieldOp::UnlockAchievement(id(i)),
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzStep {
    guard: Option<FuzzCondition>,
    op: FuzzOp,
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzInput {
    balance: u16,
    requires: Vec<FuzzCondition>,
    steps: Vec<FuzzStep>,
}

fuzz_target!(|input: FuzzInput| {
    let mut account = UserAccount::new("u1", "Fuzz", u64::from(input.balance), "avatar_default");

    let mut mutation = Mutation::new();
    for condition in &input.requires {
        mutation = mutation.require(condition.build());
    }
    for step in &input.steps {
        mutation = match &step.guard {
            Some(guard) => mutation.then_if(guard.build(), step.op.build()),
            None => mutation.then(step.op.build()),
        };
    }

    let before = account.clone();
    match mutation.apply(&mut account) {
        Ok(changed) => {
            assert_eq!(changed.len(), input.steps.len());
            assert!(account.owned_cosmetic_ids.is_superset(&before.owned_cosmetic_ids));
            assert!(account.unlocked_level_ids.is_superset(&before.unlocked_level_ids));
            assert!(account.completed_level_ids.is_superset(&before.completed_level_ids));
        },
        Err(_) => assert_eq!(account, before, "rejected mutation modified the account"),
    }

    assert!(account.is_consistent(), "worn item is not owned");
});
