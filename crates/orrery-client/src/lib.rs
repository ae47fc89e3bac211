//! Orrery quiz client.
//!
//! # Architecture
//!
//! The quiz is a pure state machine that:
//! - Receives events from the driver (questions loaded, answers, advances)
//! - Produces actions for the driver to execute (show, reveal, schedule,
//!   submit reward)
//! - Receives time through events, so it runs unchanged in virtual time
//!
//! # Components
//!
//! - [`QuizSession`]: one level's quiz attempt
//! - [`QuizRunner`]: async driver over a store and an [`Environment`]
//! - [`QuizEvent`]: events fed into the session
//! - [`QuizAction`]: actions produced by the session

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod event;
mod runner;
mod session;

pub use error::{QuizError, RunnerError};
pub use event::{QuizAction, QuizEvent, QuizOutcome};
pub use orrery_core::env::Environment;
pub use runner::{AnswerSource, QuizReport, QuizRunner, ScriptedAnswers};
pub use session::{QuizConfig, QuizPhase, QuizSession};
