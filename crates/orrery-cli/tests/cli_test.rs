//! Command flows against a temporary data directory.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use orrery_cli::{AppConfig, AppError, Command, run};
use orrery_client::QuizConfig;
use orrery_core::ServiceError;

fn config(dir: &tempfile::TempDir) -> AppConfig {
    AppConfig {
        data_dir: dir.path().to_path_buf(),
        quiz: QuizConfig { observation_delay: Duration::ZERO },
        ..AppConfig::default()
    }
}

async fn setup(config: &AppConfig) {
    run(config, Command::Init).await.unwrap();
    run(config, Command::Register { user: "u1".into(), name: "Ada".into() }).await.unwrap();
}

#[tokio::test]
async fn new_player_sees_first_level_open() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    setup(&config).await;

    let module = "module_solar_system".into();
    let levels = run(&config, Command::Levels { user: "u1".into(), module }).await.unwrap();

    let lines: Vec<&str> = levels.lines().collect();
    assert_eq!(lines.len(), 8);
    assert!(lines[0].starts_with("[x] level_mercury"));
    assert!(lines[1].starts_with("[ ] level_venus"));
    assert!(lines[0].contains("  60  Mercury"));
}

#[tokio::test]
async fn passing_a_quiz_pays_and_unlocks() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    setup(&config).await;

    let output = run(
        &config,
        Command::Quiz { user: "u1".into(), level: "level_mercury".into(), answers: vec![1, 0, 1] },
    )
    .await
    .unwrap();

    assert!(output.contains("3/3 correct, passed"));
    assert!(output.contains("+60 coins (balance 1060)"));
    assert!(output.contains("unlocked level_venus"));
    assert!(output.contains("achievement unlocked: achievement_mercury"));
}

#[tokio::test]
async fn locked_level_cannot_be_played() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    setup(&config).await;

    let err = run(
        &config,
        Command::Quiz { user: "u1".into(), level: "level_mars".into(), answers: vec![0, 1, 1] },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::LevelLocked { .. }));
}

#[tokio::test]
async fn shopping_flow() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    setup(&config).await;

    let err = run(&config, Command::Equip { user: "u1".into(), item: "avatar_comet".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Service(ServiceError::NotOwned { .. })));

    let buy = Command::Buy { user: "u1".into(), item: "avatar_comet".into() };
    let bought = run(&config, buy).await.unwrap();
    assert_eq!(bought, "Bought avatar_comet for 300 (balance 700)");

    let equip = Command::Equip { user: "u1".into(), item: "avatar_comet".into() };
    let worn = run(&config, equip).await.unwrap();
    assert_eq!(worn, "Now wearing avatar_comet");

    let shop = run(&config, Command::Shop { user: "u1".into() }).await.unwrap();
    assert!(shop.lines().any(|l| l.starts_with("[x] avatar_comet") && l.ends_with("(wearing)")));

    let err = run(&config, Command::Buy { user: "u1".into(), item: "avatar_alien".into() })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Service(ServiceError::InsufficientFunds { price: 750, balance: 700 })
    ));
}

#[tokio::test]
async fn registering_twice_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    setup(&config).await;

    let err = run(&config, Command::Register { user: "u1".into(), name: "Again".into() })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Service(ServiceError::AlreadyRegistered { .. })));
}

#[tokio::test]
async fn grant_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    setup(&config).await;

    let granted = run(&config, Command::Grant { user: "u1".into(), amount: 25 }).await.unwrap();
    assert_eq!(granted, "Balance 1025");

    let status = run(&config, Command::Status { user: "u1".into() }).await.unwrap();
    assert!(status.starts_with("Ada (u1)"));
    assert!(status.contains("balance:      1025"));
}
