//! Quiz session state machine.
//!
//! Sequences one level's questions, scores answers and decides whether a
//! reward should be submitted. Pure: events in, actions out. Time arrives
//! through events, never from a clock.
//!
//! ```text
//!            QuestionsLoaded (non-empty)
//!  Loading ─────────────────────────────▶ InProgress ──▶ Completed
//!     │  ▲   LoadFailed / empty list          │  ▲           │
//!     ▼  │ Retry                              │  └── Retry ──┘
//!   Error
//! ```
//!
//! # Invariants
//!
//! - Exactly one question is in flight at a time
//! - An answer is locked until the advance fires; later selections are
//!   ignored
//! - An advance arriving before the observation delay is ignored
//! - A reward is requested only on a pass for a level not completed before

use std::{ops::Sub, time::Duration};

use orrery_proto::{LevelId, Question};

use crate::{
    error::QuizError,
    event::{QuizAction, QuizEvent, QuizOutcome},
};

/// Quiz timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    /// How long an answer stays on screen before the next question.
    pub observation_delay: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self { observation_delay: Duration::from_millis(1500) }
    }
}

/// Phase of a quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Waiting for questions.
    Loading,
    /// Questions are being answered.
    InProgress,
    /// Every question was answered.
    Completed,
    /// Questions could not be loaded, or there were none.
    Error,
}

#[derive(Debug, Clone, Copy)]
struct LockedAnswer<I> {
    answered_at: I,
}

/// One level's quiz.
#[derive(Debug, Clone)]
pub struct QuizSession<I> {
    level_id: LevelId,
    config: QuizConfig,
    phase: QuizPhase,
    questions: Vec<Question>,
    already_completed: bool,
    index: usize,
    locked: Option<LockedAnswer<I>>,
    correct: usize,
    earned: u64,
    attempt: u32,
    outcome: Option<QuizOutcome>,
}

impl<I> QuizSession<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// New session in `Loading`.
    pub fn new(level_id: impl Into<LevelId>, config: QuizConfig) -> Self {
        Self {
            level_id: level_id.into(),
            config,
            phase: QuizPhase::Loading,
            questions: Vec::new(),
            already_completed: false,
            index: 0,
            locked: None,
            correct: 0,
            earned: 0,
            attempt: 1,
            outcome: None,
        }
    }

    /// Actions to kick off loading.
    pub fn start(&self) -> Vec<QuizAction> {
        vec![QuizAction::LoadQuestions { level_id: self.level_id.clone() }]
    }

    /// Level being played.
    pub fn level_id(&self) -> &str {
        &self.level_id
    }

    /// Current phase.
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    /// Zero-based index of the question in flight.
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Question in flight, if any.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            QuizPhase::InProgress => self.questions.get(self.index),
            _ => None,
        }
    }

    /// Number of questions.
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Correct answers so far in this attempt.
    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Whether the current answer is locked awaiting the advance.
    pub fn is_answer_locked(&self) -> bool {
        self.locked.is_some()
    }

    /// Attempt number, starting at 1.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Outcome of the finished attempt.
    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }

    /// Process an event and return resulting actions.
    ///
    /// # Errors
    ///
    /// - `QuizError::InvalidPhase` if the event makes no sense in the current
    ///   phase
    /// - `QuizError::InvalidOption` if the selected option does not exist
    pub fn handle(&mut self, event: QuizEvent<I>) -> Result<Vec<QuizAction>, QuizError> {
        match event {
            QuizEvent::QuestionsLoaded { questions, already_completed } => {
                self.handle_loaded(questions, already_completed)
            },
            QuizEvent::LoadFailed { reason } => self.handle_load_failed(reason),
            QuizEvent::AnswerSelected { option, now } => self.handle_answer(option, now),
            QuizEvent::AdvanceDue { now } => self.handle_advance(now),
            QuizEvent::Retry => self.handle_retry(),
        }
    }

    fn expect_phase(&self, event: &'static str, phase: QuizPhase) -> Result<(), QuizError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(QuizError::InvalidPhase { event, phase: self.phase })
        }
    }

    fn handle_loaded(
        &mut self,
        questions: Vec<Question>,
        already_completed: bool,
    ) -> Result<Vec<QuizAction>, QuizError> {
        self.expect_phase("QuestionsLoaded", QuizPhase::Loading)?;

        if questions.is_empty() {
            self.phase = QuizPhase::Error;
            return Ok(vec![QuizAction::ShowError {
                reason: format!("no questions for {}", self.level_id),
            }]);
        }

        self.questions = questions;
        self.already_completed = already_completed;
        Ok(self.begin_attempt())
    }

    fn handle_load_failed(&mut self, reason: String) -> Result<Vec<QuizAction>, QuizError> {
        self.expect_phase("LoadFailed", QuizPhase::Loading)?;

        self.phase = QuizPhase::Error;
        Ok(vec![QuizAction::ShowError { reason }])
    }

    fn handle_answer(&mut self, option: usize, now: I) -> Result<Vec<QuizAction>, QuizError> {
        self.expect_phase("AnswerSelected", QuizPhase::InProgress)?;

        if self.locked.is_some() {
            return Ok(vec![QuizAction::Log {
                message: format!("Ignoring option {option}: answer already locked"),
            }]);
        }

        let Some(question) = self.questions.get(self.index) else {
            return Err(QuizError::InvalidPhase { event: "AnswerSelected", phase: self.phase });
        };
        if option >= question.options.len() {
            return Err(QuizError::InvalidOption { option, options: question.options.len() });
        }

        if question.is_correct(option) {
            self.correct += 1;
            self.earned = self.earned.saturating_add(question.reward);
        }
        let correct_option = question.correct_option;
        self.locked = Some(LockedAnswer { answered_at: now });

        Ok(vec![
            QuizAction::RevealAnswer { index: self.index, selected: option, correct_option },
            QuizAction::ScheduleAdvance { after: self.config.observation_delay },
        ])
    }

    fn handle_advance(&mut self, now: I) -> Result<Vec<QuizAction>, QuizError> {
        self.expect_phase("AdvanceDue", QuizPhase::InProgress)?;

        let Some(locked) = self.locked else {
            return Ok(vec![]);
        };
        if now < locked.answered_at || now - locked.answered_at < self.config.observation_delay {
            return Ok(vec![]);
        }

        self.locked = None;
        self.index += 1;

        if let Some(question) = self.questions.get(self.index) {
            return Ok(vec![QuizAction::ShowQuestion {
                index: self.index,
                total: self.questions.len(),
                question: question.clone(),
            }]);
        }

        Ok(self.complete())
    }

    fn handle_retry(&mut self) -> Result<Vec<QuizAction>, QuizError> {
        match self.phase {
            QuizPhase::Completed => {
                self.attempt += 1;
                if self.outcome.as_ref().is_some_and(|o| o.reward_submitted) {
                    self.already_completed = true;
                }
                Ok(self.begin_attempt())
            },
            QuizPhase::Error => {
                self.attempt += 1;
                self.phase = QuizPhase::Loading;
                Ok(self.start())
            },
            phase => Err(QuizError::InvalidPhase { event: "Retry", phase }),
        }
    }

    fn begin_attempt(&mut self) -> Vec<QuizAction> {
        self.phase = QuizPhase::InProgress;
        self.index = 0;
        self.locked = None;
        self.correct = 0;
        self.earned = 0;
        self.outcome = None;

        let mut actions = vec![QuizAction::Log {
            message: format!(
                "Starting attempt {} of {} ({} questions)",
                self.attempt,
                self.level_id,
                self.questions.len()
            ),
        }];
        if let Some(question) = self.questions.first() {
            actions.push(QuizAction::ShowQuestion {
                index: 0,
                total: self.questions.len(),
                question: question.clone(),
            });
        }
        actions
    }

    fn complete(&mut self) -> Vec<QuizAction> {
        self.phase = QuizPhase::Completed;

        let total = self.questions.len();
        let passed = self.correct == total;
        let reward_submitted = passed && !self.already_completed;

        let outcome = QuizOutcome {
            level_id: self.level_id.clone(),
            passed,
            correct: self.correct,
            total,
            earned: self.earned,
            reward_submitted,
        };
        self.outcome = Some(outcome.clone());

        let mut actions = Vec::with_capacity(3);
        actions.push(QuizAction::Log {
            message: format!("{} finished: {}/{} correct", self.level_id, self.correct, total),
        });
        if reward_submitted {
            actions.push(QuizAction::SubmitReward {
                level_id: self.level_id.clone(),
                amount: self.earned,
            });
        }
        actions.push(QuizAction::Finished(outcome));
        actions
    }
}
