//! Quiz events and actions.

use std::time::Duration;

use orrery_proto::{LevelId, Question};

/// Input to a [`crate::QuizSession`].
///
/// Generic over the environment's instant type so simulations can drive the
/// session in virtual time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent<I> {
    /// Questions for the level arrived.
    QuestionsLoaded {
        /// Questions in display order.
        questions: Vec<Question>,
        /// Whether the user has completed the level before.
        already_completed: bool,
    },

    /// Loading questions failed.
    LoadFailed {
        /// Description of the failure.
        reason: String,
    },

    /// The user picked an option for the current question.
    AnswerSelected {
        /// Option index.
        option: usize,
        /// When the answer was given.
        now: I,
    },

    /// The observation delay scheduled after an answer has elapsed.
    AdvanceDue {
        /// Current time.
        now: I,
    },

    /// Start another attempt.
    Retry,
}

/// Final result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    /// Level played.
    pub level_id: LevelId,
    /// Every question answered correctly.
    pub passed: bool,
    /// Number of correct answers.
    pub correct: usize,
    /// Number of questions.
    pub total: usize,
    /// Sum of rewards of correctly answered questions.
    pub earned: u64,
    /// Whether a reward submission was requested for this attempt.
    pub reward_submitted: bool,
}

/// Output of a [`crate::QuizSession`], executed by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizAction {
    /// Fetch the level's questions and the user's completion state.
    LoadQuestions {
        /// Level to load.
        level_id: LevelId,
    },

    /// Display a question.
    ShowQuestion {
        /// Zero-based position.
        index: usize,
        /// Number of questions.
        total: usize,
        /// The question.
        question: Question,
    },

    /// Display whether the locked answer was right.
    RevealAnswer {
        /// Zero-based position.
        index: usize,
        /// Option the user picked.
        selected: usize,
        /// The correct option.
        correct_option: usize,
    },

    /// Deliver [`QuizEvent::AdvanceDue`] after this delay.
    ScheduleAdvance {
        /// Observation delay.
        after: Duration,
    },

    /// Submit the reward to the progression service.
    SubmitReward {
        /// Passed level.
        level_id: LevelId,
        /// Accumulated reward.
        amount: u64,
    },

    /// The attempt is over.
    Finished(QuizOutcome),

    /// The session cannot continue; offer a retry.
    ShowError {
        /// Description shown to the user.
        reason: String,
    },

    /// Log a message.
    Log {
        /// Message text.
        message: String,
    },
}
