//! Catalog reads and lock-state views.
//!
//! Catalog collections are read whole and filtered/ordered here by the
//! entity's own ordinal fields. Lock state is derived from the user's
//! account at read time and never stored.

use orrery_proto::{
    Achievement, CosmeticItem, LearningModule, Level, LevelId, PlanetLevel, Question, UserAccount,
};

use crate::{
    error::ServiceError,
    progression::compute_next_level_unlock,
    store::{Store, records},
};

/// Module with derived lock state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleView {
    /// Catalog record.
    pub module: LearningModule,
    /// Not in the user's unlocked modules.
    pub locked: bool,
}

/// Level with derived lock and completion state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelView {
    /// Catalog record.
    pub level: Level,
    /// Not in the user's unlocked levels.
    pub locked: bool,
    /// In the user's completed levels.
    pub completed: bool,
}

/// Shop entry with derived ownership state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CosmeticView {
    /// Catalog record.
    pub item: CosmeticItem,
    /// Not owned by the user.
    pub locked: bool,
    /// Currently worn by the user.
    pub active: bool,
}

/// Achievement with derived unlock state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementView {
    /// Catalog record.
    pub achievement: Achievement,
    /// In the user's unlocked achievements.
    pub unlocked: bool,
}

/// Canonical planet traversal order.
///
/// Built from the `planet_levels` catalog sorted by ordinal, so it can never
/// drift from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelOrder {
    ids: Vec<LevelId>,
}

impl LevelOrder {
    /// Order planets by ordinal (ties broken by id).
    pub fn from_planets(mut planets: Vec<PlanetLevel>) -> Self {
        planets.sort_by(|a, b| a.ordinal.cmp(&b.ordinal).then_with(|| a.id.cmp(&b.id)));
        Self { ids: planets.into_iter().map(|p| p.id).collect() }
    }

    /// Level ids in traversal order.
    pub fn ids(&self) -> &[LevelId] {
        &self.ids
    }

    /// Level following `current`, if any.
    pub fn next_after(&self, current: &str) -> Option<LevelId> {
        compute_next_level_unlock(&self.ids, current)
    }

    /// Whether `level_id` is part of the tour.
    pub fn contains(&self, level_id: &str) -> bool {
        self.ids.iter().any(|id| id == level_id)
    }

    /// Number of planet levels.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the tour has no levels.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// All modules, ordered by their ordering key.
pub async fn modules<S: Store + ?Sized>(store: &S) -> Result<Vec<LearningModule>, ServiceError> {
    let mut modules: Vec<LearningModule> = records::fetch_all(store).await?;
    modules.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    Ok(modules)
}

/// Levels of one module, ordered by level number.
pub async fn levels_in_module<S: Store + ?Sized>(
    store: &S,
    module_id: &str,
) -> Result<Vec<Level>, ServiceError> {
    let mut levels: Vec<Level> = records::fetch_all(store).await?;
    levels.retain(|l| l.module_id == module_id);
    levels.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));
    Ok(levels)
}

/// Questions of one level, ordered by question number.
pub async fn questions_for_level<S: Store + ?Sized>(
    store: &S,
    level_id: &str,
) -> Result<Vec<Question>, ServiceError> {
    let mut questions: Vec<Question> = records::fetch_all(store).await?;
    questions.retain(|q| q.level_id == level_id);
    questions.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));
    Ok(questions)
}

/// Canonical planet order from the `planet_levels` collection.
pub async fn planet_order<S: Store + ?Sized>(store: &S) -> Result<LevelOrder, ServiceError> {
    let planets: Vec<PlanetLevel> = records::fetch_all(store).await?;
    Ok(LevelOrder::from_planets(planets))
}

/// All achievements, ordered by id.
pub async fn achievements<S: Store + ?Sized>(store: &S) -> Result<Vec<Achievement>, ServiceError> {
    Ok(records::fetch_all(store).await?)
}

/// All cosmetic items, cheapest first.
pub async fn avatars<S: Store + ?Sized>(store: &S) -> Result<Vec<CosmeticItem>, ServiceError> {
    let mut items: Vec<CosmeticItem> = records::fetch_all(store).await?;
    items.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.id.cmp(&b.id)));
    Ok(items)
}

/// Attach lock state to modules.
pub fn module_views(account: &UserAccount, modules: Vec<LearningModule>) -> Vec<ModuleView> {
    modules
        .into_iter()
        .map(|module| {
            let locked = !account.is_module_unlocked(&module.id);
            ModuleView { module, locked }
        })
        .collect()
}

/// Attach lock and completion state to levels.
pub fn level_views(account: &UserAccount, levels: Vec<Level>) -> Vec<LevelView> {
    levels
        .into_iter()
        .map(|level| {
            let locked = !account.is_level_unlocked(&level.id);
            let completed = account.has_completed(&level.id);
            LevelView { level, locked, completed }
        })
        .collect()
}

/// Attach ownership state to shop items.
pub fn cosmetic_views(account: &UserAccount, items: Vec<CosmeticItem>) -> Vec<CosmeticView> {
    items
        .into_iter()
        .map(|item| {
            let locked = !account.owns(&item.id);
            let active = account.current_cosmetic_id == item.id;
            CosmeticView { item, locked, active }
        })
        .collect()
}

/// Attach unlock state to achievements.
pub fn achievement_views(
    account: &UserAccount,
    achievements: Vec<Achievement>,
) -> Vec<AchievementView> {
    achievements
        .into_iter()
        .map(|achievement| {
            let unlocked = account.has_achievement(&achievement.id);
            AchievementView { achievement, unlocked }
        })
        .collect()
}
