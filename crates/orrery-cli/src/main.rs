//! Orrery command line binary.
//!
//! # Usage
//!
//! ```bash
//! orrery init
//! orrery register u1 Ada
//! orrery quiz u1 level_mercury --answers 1,0,1
//! orrery buy u1 avatar_comet
//! orrery equip u1 avatar_comet
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use orrery_cli::{AppConfig, Command};
use orrery_client::QuizConfig;
use orrery_core::AccountDefaults;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Orrery astronomy learning game
#[derive(Parser, Debug)]
#[command(name = "orrery")]
#[command(about = "Learn the solar system, earn coins, dress up your astronaut")]
#[command(version)]
struct Args {
    /// Directory holding the document store
    #[arg(long, default_value = ".orrery")]
    data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Milliseconds each quiz answer stays on screen
    #[arg(long, default_value = "1500")]
    delay_ms: u64,

    /// Balance of newly registered accounts
    #[arg(long, default_value = "1000")]
    starting_balance: u64,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = AppConfig {
        data_dir: args.data_dir,
        log_level: args.log_level,
        accounts: AccountDefaults { starting_balance: args.starting_balance, ..Default::default() },
        quiz: QuizConfig { observation_delay: Duration::from_millis(args.delay_ms) },
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match orrery_cli::run(&config, args.command).await {
        Ok(output) => {
            #[allow(clippy::print_stdout)]
            {
                println!("{output}");
            }
            Ok(())
        },
        Err(e) => {
            if e.is_retryable() {
                tracing::warn!("Command failed, retry may succeed: {}", e);
            }
            Err(e.into())
        },
    }
}
