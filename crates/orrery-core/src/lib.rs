//! Orrery core logic.
//!
//! Progression, economy and account services on top of a remote document
//! store. Services are plain values; the store is passed into every call, so
//! the same service runs against the in-memory store in tests, a chaotic
//! wrapper in simulation and the file store in the CLI.
//!
//! ## Architecture
//!
//! ```text
//! orrery-core
//!   ├─ AccountService      (registration, defaults)
//!   ├─ ProgressionService  (unlocks, completion rewards, achievements)
//!   ├─ EconomyService      (currency, purchases, active cosmetic)
//!   ├─ catalog             (ordered catalog reads, lock-state views)
//!   ├─ Store               (get / create / put / list / atomic commit)
//!   └─ Environment         (time, sleep, randomness)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod catalog;
pub mod economy;
pub mod env;
pub mod error;
pub mod progression;
pub mod seed;
pub mod store;

pub use account::{AccountDefaults, AccountService};
pub use catalog::{AchievementView, CosmeticView, LevelOrder, LevelView, ModuleView};
pub use economy::{EconomyService, Purchase};
pub use env::Environment;
pub use error::{EntityKind, ServiceError};
pub use progression::{LevelCompletion, ProgressionService, compute_next_level_unlock};
pub use store::{
    ChaoticStore, CommitOutcome, Condition, FieldOp, MemoryStore, Mutation, Rejection, Store,
    StoreError,
};
