//! Progression: content gating, completion rewards and achievements.
//!
//! Every write is exactly one [`Mutation`] committed against the user's
//! account document. Whether a level was already rewarded is decided inside
//! that commit by a `NotCompleted` guard on the credit step, so two devices
//! finishing the same level race on the document and only one of them is
//! paid.
//!
//! ```text
//! finish_level(u1, level_mars, 60)
//!   commit users/u1
//!     ├─ if NotCompleted(level_mars): Credit(60)
//!     ├─ RecordCompletion(level_mars)
//!     ├─ UnlockLevel(level_mars)
//!     ├─ UnlockLevel(level_jupiter)          next in planet order
//!     └─ UnlockAchievement(achievement_mars) Level(level_mars) trigger
//!   commit users/u1
//!     ├─ requires HasCompleted(level_mercury) .. HasCompleted(level_neptune)
//!     └─ UnlockAchievement(achievement_solar_system)
//! ```
//!
//! # Invariants
//!
//! - A level's reward is credited at most once per user
//! - Unlock sets only grow
//! - The solar-system check never unlocks anything unless every planet level
//!   is completed

use orrery_proto::{Achievement, AchievementId, AchievementTrigger, Level, LevelId};

use crate::{
    catalog::{self, LevelOrder},
    error::ServiceError,
    store::{Condition, FieldOp, Mutation, Store, StoreError, records},
};

/// Next level after `current` in `level_order`.
///
/// Returns `None` if `current` is the last entry or is not in the order.
pub fn compute_next_level_unlock(level_order: &[LevelId], current: &str) -> Option<LevelId> {
    let position = level_order.iter().position(|id| id == current)?;
    level_order.get(position + 1).cloned()
}

/// What a level completion changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCompletion {
    /// Completed level.
    pub level_id: LevelId,
    /// Currency actually credited (zero on repeat completions).
    pub reward_granted: u64,
    /// Whether this was the first time the level was completed.
    pub first_completion: bool,
    /// Planet level that follows in canonical order, if any.
    pub next_level: Option<LevelId>,
    /// Achievements unlocked by this completion.
    pub unlocked_achievements: Vec<AchievementId>,
    /// Balance after the completion.
    pub balance: u64,
}

/// Progression operations over a [`Store`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressionService;

impl ProgressionService {
    /// Create the service.
    pub fn new() -> Self {
        Self
    }

    /// Whether the user may play `level_id`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user has no account.
    pub async fn is_level_unlocked<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
        level_id: &str,
    ) -> Result<bool, ServiceError> {
        let account = records::fetch_account(store, user_id).await?;
        Ok(account.is_level_unlocked(level_id))
    }

    /// Unlock a module. Returns whether it was newly unlocked.
    pub async fn unlock_module<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
        module_id: &str,
    ) -> Result<bool, ServiceError> {
        let mutation = Mutation::new().then(FieldOp::UnlockModule(module_id.to_string()));
        let outcome = store.commit(user_id, &mutation).await?;

        if outcome.step_changed(0) {
            tracing::info!("User {} unlocked module {}", user_id, module_id);
        }
        Ok(outcome.step_changed(0))
    }

    /// Unlock a level. Returns whether it was newly unlocked.
    pub async fn unlock_level<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
        level_id: &str,
    ) -> Result<bool, ServiceError> {
        let mutation = Mutation::new().then(FieldOp::UnlockLevel(level_id.to_string()));
        let outcome = store.commit(user_id, &mutation).await?;

        if outcome.step_changed(0) {
            tracing::info!("User {} unlocked level {}", user_id, level_id);
        }
        Ok(outcome.step_changed(0))
    }

    /// Mark a level completed, crediting `reward` on the first completion
    /// only.
    ///
    /// One commit: credit (guarded), record completion, unlock the level.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the user has no account
    /// - `ServiceError::TransientIo` if the store is unavailable; nothing was
    ///   applied
    pub async fn complete_level<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
        level_id: &str,
        reward: u64,
    ) -> Result<LevelCompletion, ServiceError> {
        let mutation = completion_mutation(level_id, reward);
        let outcome = store.commit(user_id, &mutation).await?;

        let completion = LevelCompletion {
            level_id: level_id.to_string(),
            reward_granted: if outcome.step_changed(RECORD_STEP) { reward } else { 0 },
            first_completion: outcome.step_changed(RECORD_STEP),
            next_level: None,
            unlocked_achievements: Vec::new(),
            balance: outcome.account.currency_balance,
        };
        log_completion(user_id, &completion);
        Ok(completion)
    }

    /// Full completion flow after a passed quiz.
    ///
    /// Like [`Self::complete_level`], and in the same commit also unlocks the
    /// next planet level and every achievement triggered by this level. Then
    /// runs the solar-system check.
    ///
    /// A `reward` of zero (a quiz whose questions pay nothing) falls back to
    /// the level's catalog reward.
    pub async fn finish_level<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
        level_id: &str,
        reward: u64,
    ) -> Result<LevelCompletion, ServiceError> {
        let reward = if reward == 0 { level_reward(store, level_id).await? } else { reward };
        let order = catalog::planet_order(store).await?;
        let achievements = catalog::achievements(store).await?;

        let next_level = order.next_after(level_id);
        let triggered: Vec<AchievementId> = achievements
            .iter()
            .filter(|a| a.is_triggered_by(level_id))
            .map(|a| a.id.clone())
            .collect();

        let mut mutation = completion_mutation(level_id, reward);
        if let Some(next) = &next_level {
            mutation = mutation.then(FieldOp::UnlockLevel(next.clone()));
        }
        let achievement_base = mutation.steps().len();
        for id in &triggered {
            mutation = mutation.then(FieldOp::UnlockAchievement(id.clone()));
        }

        let outcome = store.commit(user_id, &mutation).await?;

        let mut unlocked_achievements: Vec<AchievementId> = triggered
            .into_iter()
            .enumerate()
            .filter(|(i, _)| outcome.step_changed(achievement_base + i))
            .map(|(_, id)| id)
            .collect();

        let first_completion = outcome.step_changed(RECORD_STEP);
        let mut balance = outcome.account.currency_balance;

        if let Some((tour, after)) =
            unlock_all_levels_achievements(store, user_id, &order, &achievements).await?
        {
            balance = after;
            unlocked_achievements.extend(tour);
        }

        let completion = LevelCompletion {
            level_id: level_id.to_string(),
            reward_granted: if first_completion { reward } else { 0 },
            first_completion,
            next_level,
            unlocked_achievements,
            balance,
        };
        log_completion(user_id, &completion);
        Ok(completion)
    }

    /// Whether every planet level is completed. When it is, every
    /// `AllLevels` achievement is unlocked in one commit.
    ///
    /// An empty planet catalog never counts as complete.
    pub async fn check_solar_system_achievement<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
    ) -> Result<bool, ServiceError> {
        let order = catalog::planet_order(store).await?;
        let achievements = catalog::achievements(store).await?;

        let unlocked = unlock_all_levels_achievements(store, user_id, &order, &achievements).await?;
        Ok(unlocked.is_some())
    }
}

/// Index of the `RecordCompletion` step in [`completion_mutation`].
const RECORD_STEP: usize = 1;

fn completion_mutation(level_id: &str, reward: u64) -> Mutation {
    Mutation::new()
        .then_if(Condition::NotCompleted(level_id.to_string()), FieldOp::Credit(reward))
        .then(FieldOp::RecordCompletion(level_id.to_string()))
        .then(FieldOp::UnlockLevel(level_id.to_string()))
}

/// Commit the `AllLevels` achievements if every planet level is completed.
///
/// Returns `None` when the tour is incomplete, otherwise the achievements
/// newly unlocked by this call and the resulting balance.
async fn unlock_all_levels_achievements<S: Store + ?Sized>(
    store: &S,
    user_id: &str,
    order: &LevelOrder,
    achievements: &[Achievement],
) -> Result<Option<(Vec<AchievementId>, u64)>, ServiceError> {
    if order.is_empty() {
        return Ok(None);
    }

    let rewarded: Vec<AchievementId> = achievements
        .iter()
        .filter(|a| a.trigger == AchievementTrigger::AllLevels)
        .map(|a| a.id.clone())
        .collect();

    let mut mutation = Mutation::new();
    for id in order.ids() {
        mutation = mutation.require(Condition::HasCompleted(id.clone()));
    }
    for id in &rewarded {
        mutation = mutation.then(FieldOp::UnlockAchievement(id.clone()));
    }

    match store.commit(user_id, &mutation).await {
        Ok(outcome) => {
            let newly: Vec<AchievementId> = rewarded
                .into_iter()
                .enumerate()
                .filter(|(i, _)| outcome.step_changed(*i))
                .map(|(_, id)| id)
                .collect();
            if !newly.is_empty() {
                tracing::info!("User {} completed the solar system tour", user_id);
            }
            Ok(Some((newly, outcome.account.currency_balance)))
        },
        Err(StoreError::Rejected(rejection))
            if matches!(rejection.condition, Condition::HasCompleted(_)) =>
        {
            Ok(None)
        },
        Err(e) => Err(e.into()),
    }
}

fn log_completion(user_id: &str, completion: &LevelCompletion) {
    if completion.first_completion {
        tracing::info!(
            "User {} completed level {} (+{} coins, balance {})",
            user_id,
            completion.level_id,
            completion.reward_granted,
            completion.balance
        );
    } else {
        tracing::debug!("User {} replayed level {}", user_id, completion.level_id);
    }
}

/// The catalog completion reward of `level_id`, zero for unknown levels.
async fn level_reward<S>(store: &S, level_id: &str) -> Result<u64, ServiceError>
where
    S: Store + ?Sized,
{
    let level: Option<Level> = records::fetch(store, level_id).await?;
    Ok(level.map_or(0, |l| l.reward))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        account::AccountService,
        error::EntityKind,
        seed::{self, SOLAR_SYSTEM_ACHIEVEMENT},
        store::MemoryStore,
    };

    const PLANETS: [&str; 8] = [
        "level_mercury",
        "level_venus",
        "level_earth",
        "level_mars",
        "level_jupiter",
        "level_saturn",
        "level_uranus",
        "level_neptune",
    ];

    async fn seeded_store_with_user() -> MemoryStore {
        let store = MemoryStore::new();
        seed::seed_catalog(&store, &seed::solar_system()).await.unwrap();
        AccountService::default().register(&store, "u1", "Ada").await.unwrap();
        store
    }

    fn order(ids: &[&str]) -> Vec<LevelId> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn next_level_follows_order() {
        let levels = order(&PLANETS);

        assert_eq!(
            compute_next_level_unlock(&levels, "level_mercury").as_deref(),
            Some("level_venus")
        );
        assert_eq!(compute_next_level_unlock(&levels, "level_neptune"), None);
        assert_eq!(compute_next_level_unlock(&levels, "level_pluto"), None);
        assert_eq!(compute_next_level_unlock(&[], "level_mercury"), None);
    }

    proptest! {
        #[test]
        fn next_level_is_successor(len in 1usize..20, pick in 0usize..20) {
            let levels: Vec<LevelId> = (0..len).map(|i| format!("level_{i}")).collect();
            let pick = pick % len;

            let next = compute_next_level_unlock(&levels, &levels[pick]);

            prop_assert_eq!(next, levels.get(pick + 1).cloned());
        }
    }

    #[tokio::test]
    async fn reward_is_granted_once() {
        let store = seeded_store_with_user().await;
        let service = ProgressionService::new();

        let first = service.complete_level(&store, "u1", "level_mercury", 100).await.unwrap();
        let second = service.complete_level(&store, "u1", "level_mercury", 100).await.unwrap();

        assert!(first.first_completion);
        assert_eq!(first.reward_granted, 100);
        assert_eq!(first.balance, 1100);
        assert!(!second.first_completion);
        assert_eq!(second.reward_granted, 0);
        assert_eq!(second.balance, first.balance);
    }

    #[tokio::test]
    async fn completing_for_unknown_user_is_not_found() {
        let store = MemoryStore::new();

        let err = ProgressionService::new()
            .complete_level(&store, "ghost", "level_mercury", 100)
            .await
            .unwrap_err();

        assert_eq!(err, ServiceError::NotFound { kind: EntityKind::User, id: "ghost".into() });
    }

    #[tokio::test]
    async fn unlocks_are_idempotent() {
        let store = seeded_store_with_user().await;
        let service = ProgressionService::new();

        assert!(service.unlock_level(&store, "u1", "level_venus").await.unwrap());
        assert!(!service.unlock_level(&store, "u1", "level_venus").await.unwrap());
        assert!(!service.unlock_module(&store, "u1", "module_solar_system").await.unwrap());
        assert!(service.unlock_module(&store, "u1", "module_stars").await.unwrap());
        assert!(service.is_level_unlocked(&store, "u1", "level_venus").await.unwrap());
        assert!(!service.is_level_unlocked(&store, "u1", "level_mars").await.unwrap());
    }

    #[tokio::test]
    async fn finish_level_unlocks_next_planet_and_badge() {
        let store = seeded_store_with_user().await;

        let completion = ProgressionService::new()
            .finish_level(&store, "u1", "level_mercury", 60)
            .await
            .unwrap();

        assert_eq!(completion.next_level.as_deref(), Some("level_venus"));
        assert_eq!(completion.unlocked_achievements, vec!["achievement_mercury".to_string()]);
        let account = records::fetch_account(&store, "u1").await.unwrap();
        assert!(account.is_level_unlocked("level_venus"));
        assert!(account.has_completed("level_mercury"));
        assert_eq!(account.currency_balance, 1060);
    }

    #[tokio::test]
    async fn replaying_a_level_unlocks_nothing_new() {
        let store = seeded_store_with_user().await;
        let service = ProgressionService::new();
        service.finish_level(&store, "u1", "level_mercury", 60).await.unwrap();

        let replay = service.finish_level(&store, "u1", "level_mercury", 60).await.unwrap();

        assert_eq!(replay.reward_granted, 0);
        assert!(replay.unlocked_achievements.is_empty());
        assert_eq!(replay.balance, 1060);
    }

    #[tokio::test]
    async fn solar_system_requires_every_planet() {
        let store = seeded_store_with_user().await;
        let service = ProgressionService::new();

        for level in &PLANETS[..7] {
            service.complete_level(&store, "u1", level, 10).await.unwrap();
        }
        assert!(!service.check_solar_system_achievement(&store, "u1").await.unwrap());
        let account = records::fetch_account(&store, "u1").await.unwrap();
        assert!(!account.has_achievement(SOLAR_SYSTEM_ACHIEVEMENT));

        service.complete_level(&store, "u1", PLANETS[7], 10).await.unwrap();
        assert!(service.check_solar_system_achievement(&store, "u1").await.unwrap());
        assert!(service.check_solar_system_achievement(&store, "u1").await.unwrap());

        let account = records::fetch_account(&store, "u1").await.unwrap();
        assert!(account.has_achievement(SOLAR_SYSTEM_ACHIEVEMENT));
        assert_eq!(account.currency_balance, 1080);
    }

    #[tokio::test]
    async fn last_planet_reports_tour_achievement_once() {
        let store = seeded_store_with_user().await;
        let service = ProgressionService::new();
        for level in &PLANETS[..7] {
            service.finish_level(&store, "u1", level, 10).await.unwrap();
        }

        let last = service.finish_level(&store, "u1", "level_neptune", 10).await.unwrap();
        let again = service.finish_level(&store, "u1", "level_neptune", 10).await.unwrap();

        assert_eq!(last.next_level, None);
        assert!(last.unlocked_achievements.contains(&SOLAR_SYSTEM_ACHIEVEMENT.to_string()));
        assert!(again.unlocked_achievements.is_empty());
    }

    #[tokio::test]
    async fn empty_planet_catalog_is_never_complete() {
        let store = MemoryStore::new();
        AccountService::default().register(&store, "u1", "Ada").await.unwrap();

        let service = ProgressionService::new();
        assert!(!service.check_solar_system_achievement(&store, "u1").await.unwrap());
    }

    #[tokio::test]
    async fn unpaid_quiz_falls_back_to_level_reward() {
        let store = seeded_store_with_user().await;
        let service = ProgressionService::new();

        let sun = service.finish_level(&store, "u1", "level_sun", 0).await.unwrap();
        let mercury = service.finish_level(&store, "u1", "level_mercury", 0).await.unwrap();

        assert_eq!(sun.reward_granted, 100);
        assert_eq!(mercury.reward_granted, 60);
        assert_eq!(mercury.balance, 1160);
    }

    #[tokio::test]
    async fn quiz_reward_takes_precedence_over_level_reward() {
        let store = seeded_store_with_user().await;

        let completion = ProgressionService::new()
            .finish_level(&store, "u1", "level_sun", 15)
            .await
            .unwrap();

        assert_eq!(completion.reward_granted, 15);
        assert_eq!(completion.balance, 1015);
    }
}
