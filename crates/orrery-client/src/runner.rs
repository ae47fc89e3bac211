//! Async quiz driver.
//!
//! Executes the actions of a [`QuizSession`]: loads questions from the
//! store, asks an [`AnswerSource`] for answers, waits out the observation
//! delay through the [`Environment`] and submits rewards to the progression
//! service.

use std::collections::VecDeque;

use orrery_core::{
    Environment, LevelCompletion, ProgressionService, ServiceError, Store, catalog,
    store::records,
};
use orrery_proto::Question;

use crate::{
    error::RunnerError,
    event::{QuizAction, QuizEvent, QuizOutcome},
    session::{QuizConfig, QuizPhase, QuizSession},
};

/// Supplies the user's answers.
pub trait AnswerSource: Send {
    /// Option chosen for `question`, or `None` to abandon the quiz.
    fn answer(&mut self, index: usize, question: &Question) -> Option<usize>;
}

/// Answers from a fixed list, in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAnswers {
    answers: VecDeque<usize>,
}

impl ScriptedAnswers {
    /// Answer with `answers`, one per question.
    pub fn new(answers: impl IntoIterator<Item = usize>) -> Self {
        Self { answers: answers.into_iter().collect() }
    }

    /// Answers not used yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl AnswerSource for ScriptedAnswers {
    fn answer(&mut self, _index: usize, _question: &Question) -> Option<usize> {
        self.answers.pop_front()
    }
}

/// Result of a finished quiz run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizReport {
    /// Outcome of the attempt.
    pub outcome: QuizOutcome,
    /// Progression changes, if a reward was submitted.
    pub completion: Option<LevelCompletion>,
}

/// Runs one quiz attempt end to end.
#[derive(Debug, Clone)]
pub struct QuizRunner<E: Environment> {
    env: E,
    config: QuizConfig,
    progression: ProgressionService,
}

impl<E: Environment> QuizRunner<E> {
    /// Runner using `env` for time.
    pub fn new(env: E, config: QuizConfig) -> Self {
        Self { env, config, progression: ProgressionService::new() }
    }

    /// Timing configuration.
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Play `level_id` for `user_id` with answers from `answers`.
    ///
    /// # Errors
    ///
    /// - `RunnerError::Service` if loading or the reward submission failed
    /// - `RunnerError::NoQuestions` if the level has no questions
    /// - `RunnerError::Abandoned` if `answers` ran out
    pub async fn run<S, A>(
        &self,
        store: &S,
        user_id: &str,
        level_id: &str,
        answers: &mut A,
    ) -> Result<QuizReport, RunnerError>
    where
        S: Store + ?Sized,
        A: AnswerSource,
    {
        let mut session = QuizSession::<E::Instant>::new(level_id, self.config);
        let mut pending: VecDeque<QuizAction> = session.start().into();
        let mut outcome = None;
        let mut completion = None;
        let mut load_error = None;

        while let Some(action) = pending.pop_front() {
            let event = match action {
                QuizAction::LoadQuestions { level_id } => {
                    match load(store, user_id, &level_id).await {
                        Ok((questions, already_completed)) => {
                            Some(QuizEvent::QuestionsLoaded { questions, already_completed })
                        },
                        Err(e) => {
                            let reason = e.to_string();
                            load_error = Some(e);
                            Some(QuizEvent::LoadFailed { reason })
                        },
                    }
                },
                QuizAction::ShowQuestion { index, total, question } => {
                    tracing::debug!("Question {}/{}: {}", index + 1, total, question.prompt);
                    let Some(option) = answers.answer(index, &question) else {
                        tracing::info!(
                            "User {} abandoned {} at question {}",
                            user_id,
                            level_id,
                            index + 1
                        );
                        return Err(RunnerError::Abandoned { answered: index });
                    };
                    Some(QuizEvent::AnswerSelected { option, now: self.env.now() })
                },
                QuizAction::RevealAnswer { index, selected, correct_option } => {
                    tracing::debug!(
                        "Question {}: picked {}, correct {}",
                        index + 1,
                        selected,
                        correct_option
                    );
                    None
                },
                QuizAction::ScheduleAdvance { after } => {
                    self.env.sleep(after).await;
                    Some(QuizEvent::AdvanceDue { now: self.env.now() })
                },
                QuizAction::SubmitReward { level_id, amount } => {
                    let progression = &self.progression;
                    let done = progression.finish_level(store, user_id, &level_id, amount).await?;
                    completion = Some(done);
                    None
                },
                QuizAction::Finished(result) => {
                    outcome = Some(result);
                    None
                },
                QuizAction::ShowError { reason } => {
                    tracing::warn!("Quiz {} failed: {}", level_id, reason);
                    None
                },
                QuizAction::Log { message } => {
                    tracing::debug!("{}", message);
                    None
                },
            };

            if let Some(event) = event {
                pending.extend(session.handle(event)?);
            }
        }

        if session.phase() == QuizPhase::Error {
            return Err(match load_error {
                Some(e) => e.into(),
                None => RunnerError::NoQuestions { level_id: level_id.to_string() },
            });
        }

        match outcome {
            Some(outcome) => Ok(QuizReport { outcome, completion }),
            None => Err(RunnerError::Abandoned { answered: session.current_index() }),
        }
    }
}

async fn load<S: Store + ?Sized>(
    store: &S,
    user_id: &str,
    level_id: &str,
) -> Result<(Vec<Question>, bool), ServiceError> {
    let account = records::fetch_account(store, user_id).await?;
    let questions = catalog::questions_for_level(store, level_id).await?;
    Ok((questions, account.has_completed(level_id)))
}
