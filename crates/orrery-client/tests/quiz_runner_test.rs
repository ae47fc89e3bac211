//! End-to-end quiz runs against an in-memory store in paused tokio time.

#![allow(clippy::unwrap_used)]

use std::{future::Future, time::Duration};

use orrery_client::{
    AnswerSource, Environment, QuizConfig, QuizRunner, RunnerError, ScriptedAnswers,
};
use orrery_core::{
    AccountService, ChaoticStore, MemoryStore, ServiceError, catalog, seed, store::records,
};
use orrery_proto::Question;

#[derive(Clone)]
struct PausedEnv;

impl Environment for PausedEnv {
    type Instant = tokio::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        buffer.fill(0);
    }
}

/// Answers every question correctly.
struct KnowItAll;

impl AnswerSource for KnowItAll {
    fn answer(&mut self, _index: usize, question: &Question) -> Option<usize> {
        Some(question.correct_option)
    }
}

async fn seeded() -> MemoryStore {
    let store = MemoryStore::new();
    seed::seed_catalog(&store, &seed::solar_system()).await.unwrap();
    AccountService::default().register(&store, "u1", "Ada").await.unwrap();
    store
}

fn runner() -> QuizRunner<PausedEnv> {
    QuizRunner::new(PausedEnv, QuizConfig::default())
}

#[tokio::test(start_paused = true)]
async fn passing_quiz_pays_reward_and_unlocks_next_planet() {
    let store = seeded().await;
    let questions = catalog::questions_for_level(&store, "level_mercury").await.unwrap();
    let expected: u64 = questions.iter().map(|q| q.reward).sum();

    let report = runner().run(&store, "u1", "level_mercury", &mut KnowItAll).await.unwrap();

    assert!(report.outcome.passed);
    assert_eq!(report.outcome.earned, expected);
    let completion = report.completion.unwrap();
    assert_eq!(completion.reward_granted, expected);
    assert_eq!(completion.next_level.as_deref(), Some("level_venus"));

    let account = records::fetch_account(&store, "u1").await.unwrap();
    assert_eq!(account.currency_balance, 1000 + expected);
    assert!(account.is_level_unlocked("level_venus"));
}

#[tokio::test(start_paused = true)]
async fn each_answer_waits_out_the_observation_delay() {
    let store = seeded().await;
    let total = catalog::questions_for_level(&store, "level_mercury").await.unwrap().len();
    let started = tokio::time::Instant::now();

    runner().run(&store, "u1", "level_mercury", &mut KnowItAll).await.unwrap();

    let per_question = QuizConfig::default().observation_delay;
    assert!(started.elapsed() >= per_question * u32::try_from(total).unwrap());
}

#[tokio::test(start_paused = true)]
async fn replaying_a_passed_level_pays_nothing() {
    let store = seeded().await;
    runner().run(&store, "u1", "level_mercury", &mut KnowItAll).await.unwrap();
    let before = records::fetch_account(&store, "u1").await.unwrap().currency_balance;

    let report = runner().run(&store, "u1", "level_mercury", &mut KnowItAll).await.unwrap();

    assert!(report.outcome.passed);
    assert!(!report.outcome.reward_submitted);
    assert!(report.completion.is_none());
    assert_eq!(records::fetch_account(&store, "u1").await.unwrap().currency_balance, before);
}

#[tokio::test(start_paused = true)]
async fn one_wrong_answer_fails_without_changes() {
    let store = seeded().await;
    let questions = catalog::questions_for_level(&store, "level_mars").await.unwrap();
    let mut answers = ScriptedAnswers::new(questions.iter().enumerate().map(|(i, q)| {
        if i == 1 { (q.correct_option + 1) % q.options.len() } else { q.correct_option }
    }));

    let report = runner().run(&store, "u1", "level_mars", &mut answers).await.unwrap();

    assert!(!report.outcome.passed);
    assert_eq!(report.outcome.correct, questions.len() - 1);
    assert!(report.completion.is_none());
    let account = records::fetch_account(&store, "u1").await.unwrap();
    assert_eq!(account.currency_balance, 1000);
    assert!(!account.has_completed("level_mars"));
}

#[tokio::test(start_paused = true)]
async fn running_out_of_answers_abandons() {
    let store = seeded().await;
    let mut answers = ScriptedAnswers::new([0]);

    let err = runner().run(&store, "u1", "level_mercury", &mut answers).await.unwrap_err();

    assert_eq!(err, RunnerError::Abandoned { answered: 1 });
    assert!(!records::fetch_account(&store, "u1").await.unwrap().has_completed("level_mercury"));
}

#[tokio::test(start_paused = true)]
async fn level_without_questions_is_an_error() {
    let store = seeded().await;

    let err = runner().run(&store, "u1", "level_sun", &mut KnowItAll).await.unwrap_err();

    assert_eq!(err, RunnerError::NoQuestions { level_id: "level_sun".into() });
}

#[tokio::test(start_paused = true)]
async fn unavailable_store_is_retryable() {
    let store = ChaoticStore::new(seeded().await, 1.0, 3);

    let err = runner().run(&store, "u1", "level_mercury", &mut KnowItAll).await.unwrap_err();

    assert!(matches!(err, RunnerError::Service(ServiceError::TransientIo { .. })));
    assert!(err.is_retryable());
}
