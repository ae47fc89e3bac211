//! Deterministic simulation harness for Orrery.
//!
//! Turmoil-compatible [`SimEnv`] and a latency-injecting [`SimStore`] let
//! several simulated devices share one store in virtual time, so races
//! between devices acting for the same user are reproducible from a seed.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation. Operations are
//! applied to both the model and the real services, and their results and
//! observable states are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod sim_env;
pub mod sim_store;

pub use model::{
    AccountState, ModelAccount, ModelWorld, ObservableState, Operation, OperationError,
    OperationResult, UserSlot,
};
pub use sim_env::SimEnv;
pub use sim_store::SimStore;
