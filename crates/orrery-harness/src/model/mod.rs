//! Reference model for model-based testing.
//!
//! The model captures the rules of accounts, rewards and purchases with plain
//! sets and integers, no store and no commits. It serves as the oracle
//! against which the real services are verified.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Rules not mechanics: Captures WHAT happens, not HOW it is committed
//! - Deterministic: Same inputs produce same outputs

mod account;
pub mod operation;
mod world;

pub use account::{AccountState, ModelAccount};
pub use operation::{Operation, OperationError, OperationResult, UserSlot};
pub use world::{ModelWorld, ObservableState};
