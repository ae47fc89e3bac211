//! Command execution.
//!
//! Every command performs one service call (or a quiz run) against the
//! store and renders a plain-text report. Rendering returns a `String` so
//! the binary alone decides where output goes.

use clap::Subcommand;
use orrery_client::{Environment, QuizRunner, ScriptedAnswers};
use orrery_core::{
    AccountService, EconomyService, ProgressionService, Store, catalog,
    seed::{self, SOLAR_SYSTEM_MODULE},
};

use crate::{AppConfig, error::AppError};

/// `orrery` subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Seed the solar-system catalog
    Init,

    /// Create an account
    Register {
        /// User id
        user: String,
        /// Display name
        name: String,
    },

    /// Show balance, cosmetic and progress
    Status {
        /// User id
        user: String,
    },

    /// List learning modules
    Modules {
        /// User id
        user: String,
    },

    /// List the levels of a module
    Levels {
        /// User id
        user: String,
        /// Module id
        #[arg(default_value = SOLAR_SYSTEM_MODULE)]
        module: String,
    },

    /// List cosmetic items
    Shop {
        /// User id
        user: String,
    },

    /// List achievements
    Achievements {
        /// User id
        user: String,
    },

    /// Play a level's quiz
    Quiz {
        /// User id
        user: String,
        /// Level id
        level: String,
        /// Option index per question, comma separated
        #[arg(long, value_delimiter = ',')]
        answers: Vec<usize>,
    },

    /// Buy a cosmetic item
    Buy {
        /// User id
        user: String,
        /// Item id
        item: String,
    },

    /// Wear an owned cosmetic item
    Equip {
        /// User id
        user: String,
        /// Item id
        item: String,
    },

    /// Credit currency
    Grant {
        /// User id
        user: String,
        /// Amount to credit
        amount: u64,
    },
}

fn mark(open: bool) -> &'static str {
    if open { "[x]" } else { "[ ]" }
}

/// Execute `command` against `store`.
pub async fn execute<S, E>(
    env: &E,
    config: &AppConfig,
    store: &S,
    command: Command,
) -> Result<String, AppError>
where
    S: Store + ?Sized,
    E: Environment,
{
    let accounts = AccountService::new(config.accounts.clone());
    let economy = EconomyService::new();

    let lines = match command {
        Command::Init => {
            let written = seed::seed_catalog(store, &seed::solar_system()).await?;
            vec![format!("Seeded {written} catalog documents")]
        },
        Command::Register { user, name } => {
            let account = accounts.register(store, &user, &name).await?;
            let (id, name) = (&account.id, &account.display_name);
            vec![format!("Registered {id} ({name}) with {} coins", account.currency_balance)]
        },
        Command::Status { user } => {
            let account = accounts.load(store, &user).await?;
            vec![
                format!("{} ({})", account.display_name, account.id),
                format!("balance:      {}", account.currency_balance),
                format!("wearing:      {}", account.current_cosmetic_id),
                format!("owned items:  {}", account.owned_cosmetic_ids.len()),
                format!("completed:    {}", account.completed_level_ids.len()),
                format!("achievements: {}", account.unlocked_achievement_ids.len()),
            ]
        },
        Command::Modules { user } => {
            let account = accounts.load(store, &user).await?;
            let modules = catalog::modules(store).await?;
            catalog::module_views(&account, modules)
                .into_iter()
                .map(|v| format!("{} {:<22} {}", mark(!v.locked), v.module.id, v.module.title))
                .collect()
        },
        Command::Levels { user, module } => {
            let account = accounts.load(store, &user).await?;
            let levels = catalog::levels_in_module(store, &module).await?;
            catalog::level_views(&account, levels)
                .into_iter()
                .map(|v| {
                    let done = if v.completed { " (completed)" } else { "" };
                    let (id, title, reward) = (&v.level.id, &v.level.title, v.level.reward);
                    format!("{} {id:<16} {reward:>4}  {title}{done}", mark(!v.locked))
                })
                .collect()
        },
        Command::Shop { user } => economy
            .shop(store, &user)
            .await?
            .into_iter()
            .map(|v| {
                let worn = if v.active { " (wearing)" } else { "" };
                let (id, price, name) = (&v.item.id, v.item.price, &v.item.name);
                format!("{} {id:<18} {price:>5}  {name}{worn}", mark(!v.locked))
            })
            .collect(),
        Command::Achievements { user } => {
            let account = accounts.load(store, &user).await?;
            let achievements = catalog::achievements(store).await?;
            catalog::achievement_views(&account, achievements)
                .into_iter()
                .map(|v| {
                    let (id, title) = (&v.achievement.id, &v.achievement.title);
                    format!("{} {id:<26} {title}", mark(v.unlocked))
                })
                .collect()
        },
        Command::Quiz { user, level, answers } => {
            if !ProgressionService::new().is_level_unlocked(store, &user, &level).await? {
                return Err(AppError::LevelLocked { level_id: level });
            }

            let runner = QuizRunner::new(env.clone(), config.quiz);
            let mut answers = ScriptedAnswers::new(answers);
            let report = runner.run(store, &user, &level, &mut answers).await?;

            let outcome = report.outcome;
            let verdict = if outcome.passed { "passed" } else { "failed, try again" };
            let (correct, total) = (outcome.correct, outcome.total);
            let mut lines =
                vec![format!("{}: {correct}/{total} correct, {verdict}", outcome.level_id)];
            if let Some(completion) = report.completion {
                let (granted, balance) = (completion.reward_granted, completion.balance);
                lines.push(format!("+{granted} coins (balance {balance})"));
                if let Some(next) = completion.next_level {
                    lines.push(format!("unlocked {next}"));
                }
                for achievement in completion.unlocked_achievements {
                    lines.push(format!("achievement unlocked: {achievement}"));
                }
            } else if outcome.passed {
                lines.push("already completed, no reward".to_string());
            }
            lines
        },
        Command::Buy { user, item } => {
            let receipt = economy.purchase_item(store, &user, &item).await?;
            let (price, balance) = (receipt.price, receipt.balance);
            vec![format!("Bought {} for {price} (balance {balance})", receipt.item_id)]
        },
        Command::Equip { user, item } => {
            let account = economy.set_active_cosmetic(store, &user, &item).await?;
            vec![format!("Now wearing {}", account.current_cosmetic_id)]
        },
        Command::Grant { user, amount } => {
            let balance = economy.add_currency(store, &user, amount).await?;
            vec![format!("Balance {balance}")]
        },
    };

    Ok(lines.join("\n"))
}
