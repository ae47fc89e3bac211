//! Orrery command line front end.
//!
//! Runs the progression, economy and quiz logic against a local
//! [`FileStore`]:
//! - Tokio for the async runtime
//! - System time and OS randomness
//! - One CBOR file per document
//!
//! ## Architecture
//!
//! ```text
//! orrery-cli
//!   ├─ SystemEnv     (production Environment impl)
//!   ├─ FileStore     (Store over a data directory)
//!   ├─ Command       (clap subcommands)
//!   └─ execute       (service calls + text rendering)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod commands;
mod error;
mod file_store;
mod system_env;

use std::path::PathBuf;

pub use commands::{Command, execute};
pub use error::AppError;
pub use file_store::FileStore;
use orrery_client::QuizConfig;
use orrery_core::AccountDefaults;
pub use system_env::SystemEnv;

/// Runtime configuration assembled from command line arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the document files.
    pub data_dir: PathBuf,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Starting state of new accounts.
    pub accounts: AccountDefaults,
    /// Quiz timing.
    pub quiz: QuizConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".orrery"),
            log_level: "warn".to_string(),
            accounts: AccountDefaults::default(),
            quiz: QuizConfig::default(),
        }
    }
}

impl AppConfig {
    /// Open the store this configuration points at.
    pub fn open_store(&self) -> FileStore {
        FileStore::open(&self.data_dir)
    }
}

/// Run one command with the production environment.
pub async fn run(config: &AppConfig, command: Command) -> Result<String, AppError> {
    let store = config.open_store();
    tracing::debug!("Using data directory {}", store.root().display());
    execute(&SystemEnv::new(), config, &store, command).await
}
