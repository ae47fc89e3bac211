//! Fuzz target for [`QuizSession`] state machine
//!
//! Prevent reward submission outside a clean first pass
//!
//! # Strategy
//!
//! - Event sequences: Arbitrary loads, answers, advances and retries in any
//!   order and any phase
//! - Out-of-range options: Answers beyond the option list
//! - Timing probing: Advances before the observation delay has elapsed
//!
//! # Invariants
//!
//! - `SubmitReward` ONLY after every question of an attempt was correct
//! - `SubmitReward` NEVER for a level loaded as already completed
//! - At most one `SubmitReward` per attempt
//! - `correct` never exceeds `total`
//! - `Completed` phase always carries an outcome
//! - NEVER panic on events in the wrong phase

#![no_main]

use std::{ops::Sub, time::Duration};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use orrery_client::{QuizAction, QuizConfig, QuizEvent, QuizPhase, QuizSession};
use orrery_proto::Question;

/// Represents time as Duration since epoch 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct FuzzInstant(Duration);

impl Sub for FuzzInstant {
    type Output = Duration;

    fn sub(self, other: Self) -> Duration {
        self.0.saturating_sub(other.0)
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum FuzzEvent {
    Load { questions: Vec<FuzzedQuestion>, already_completed: bool },
    LoadFailed,
    Answer { option: u8, advance_millis: u16 },
    Advance { advance_millis: u16 },
    Retry,
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzedQuestion {
    options: u8,
    correct_option: u8,
    reward: u8,
}

impl FuzzedQuestion {
    fn build(&self, level_id: &str, number: usize) -> Question {
        let options = usize::from(self.options % 5);
        Question {
            id: format!("q_{number}"),
            level_id: level_id.to_string(),
            number: number as u32,
            prompt: String::new(),
            options: (0..options).map(|i| format!("option {i}")).collect(),
            correct_option: usize::from(self.correct_option % 5),
            reward: u64::from(self.reward),
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzInput {
    delay_millis: u16,
    events: Vec<FuzzEvent>,
}

const LEVEL: &str = "level_fuzz";

fuzz_target!(|input: FuzzInput| {
    let delay = Duration::from_millis(u64::from(input.delay_millis));
    let config = QuizConfig { observation_delay: delay };
    let mut session = QuizSession::<FuzzInstant>::new(LEVEL, config);
    let _ = session.start();

    let mut now = Duration::ZERO;
    let mut already_completed = false;
    let mut submitted_this_attempt = false;
    let mut attempt = session.attempt();

    for event in input.events {
        let event = match event {
            FuzzEvent::Load { questions, already_completed: done } => {
                if session.phase() == QuizPhase::Loading {
                    already_completed = done;
                }
                let questions =
                    questions.iter().take(16).enumerate().map(|(i, q)| q.build(LEVEL, i)).collect();
                QuizEvent::QuestionsLoaded { questions, already_completed: done }
            },
            FuzzEvent::LoadFailed => QuizEvent::LoadFailed { reason: "fuzz".to_string() },
            FuzzEvent::Answer { option, advance_millis } => {
                now += Duration::from_millis(u64::from(advance_millis));
                QuizEvent::AnswerSelected { option: usize::from(option), now: FuzzInstant(now) }
            },
            FuzzEvent::Advance { advance_millis } => {
                now += Duration::from_millis(u64::from(advance_millis));
                QuizEvent::AdvanceDue { now: FuzzInstant(now) }
            },
            FuzzEvent::Retry => QuizEvent::Retry,
        };

        let Ok(actions) = session.handle(event) else {
            continue;
        };

        if session.attempt() != attempt {
            attempt = session.attempt();
            submitted_this_attempt = false;
        }

        for action in &actions {
            if let QuizAction::SubmitReward { level_id, .. } = action {
                assert_eq!(level_id, LEVEL);
                assert!(!already_completed, "reward submitted for a completed level");
                assert!(!submitted_this_attempt, "reward submitted twice in one attempt");
                assert_eq!(session.correct(), session.total(), "reward without a clean pass");
                submitted_this_attempt = true;
                already_completed = true;
            }
        }

        assert!(session.correct() <= session.total());
        if session.phase() == QuizPhase::Completed {
            let outcome = session.outcome().expect("completed session has an outcome");
            assert_eq!(outcome.passed, outcome.correct == outcome.total);
        }
    }
});
