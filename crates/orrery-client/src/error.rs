//! Quiz error types.

use orrery_core::ServiceError;
use orrery_proto::LevelId;
use thiserror::Error;

use crate::session::QuizPhase;

/// Errors from feeding events into a [`crate::QuizSession`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// Event not valid in the current phase.
    #[error("{event} is not valid while {phase:?}")]
    InvalidPhase {
        /// Event name.
        event: &'static str,
        /// Phase the session was in.
        phase: QuizPhase,
    },

    /// Selected option does not exist for the current question.
    #[error("option {option} out of range ({options} options)")]
    InvalidOption {
        /// Selected option index.
        option: usize,
        /// Number of options of the current question.
        options: usize,
    },
}

impl QuizError {
    /// Returns true if this error indicates a driver bug rather than bad
    /// input.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidPhase { .. } => true,
            Self::InvalidOption { .. } => false,
        }
    }
}

/// Errors from running a whole quiz with [`crate::QuizRunner`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    /// Loading questions or submitting the reward failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The session rejected an event.
    #[error(transparent)]
    Quiz(#[from] QuizError),

    /// The level has no questions.
    #[error("level {level_id} has no questions")]
    NoQuestions {
        /// Level that was loaded.
        level_id: LevelId,
    },

    /// The answer source stopped before the last question.
    #[error("quiz abandoned after {answered} answers")]
    Abandoned {
        /// Questions answered before abandoning.
        answered: usize,
    },
}

impl RunnerError {
    /// Returns true if running the quiz again later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Service(e) => e.is_retryable(),
            Self::Quiz(_) | Self::NoQuestions { .. } | Self::Abandoned { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_option_is_not_fatal() {
        let err = QuizError::InvalidOption { option: 4, options: 3 };
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "option 4 out of range (3 options)");
    }

    #[test]
    fn wrong_phase_is_fatal() {
        let err = QuizError::InvalidPhase { event: "Retry", phase: QuizPhase::InProgress };
        assert!(err.is_fatal());
    }

    #[test]
    fn transient_store_failure_is_retryable() {
        let err = RunnerError::from(ServiceError::TransientIo { reason: "offline".into() });
        assert!(err.is_retryable());
        assert!(!RunnerError::Abandoned { answered: 2 }.is_retryable());
    }
}
