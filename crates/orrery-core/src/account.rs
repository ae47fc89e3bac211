//! Account registration and loading.

use orrery_proto::{CosmeticId, DocumentPath, LevelId, ModuleId, UserAccount, encode};

use crate::{
    error::ServiceError,
    store::{Store, records},
};

/// Starting state of a freshly registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDefaults {
    /// Initial `currency_balance`.
    pub starting_balance: u64,
    /// Cosmetic owned and worn from the start.
    pub default_cosmetic: CosmeticId,
    /// Module unlocked from the start.
    pub initial_module: ModuleId,
    /// Level unlocked from the start.
    pub initial_level: LevelId,
}

impl Default for AccountDefaults {
    fn default() -> Self {
        Self {
            starting_balance: 1000,
            default_cosmetic: "avatar_default".to_string(),
            initial_module: "module_solar_system".to_string(),
            initial_level: "level_mercury".to_string(),
        }
    }
}

/// Creates and loads user accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountService {
    defaults: AccountDefaults,
}

impl AccountService {
    /// Service creating accounts from `defaults`.
    pub fn new(defaults: AccountDefaults) -> Self {
        Self { defaults }
    }

    /// Defaults applied on registration.
    pub fn defaults(&self) -> &AccountDefaults {
        &self.defaults
    }

    /// Build a new account without storing it.
    pub fn new_account(&self, user_id: &str, display_name: &str) -> UserAccount {
        let mut account = UserAccount::new(
            user_id,
            display_name,
            self.defaults.starting_balance,
            self.defaults.default_cosmetic.clone(),
        );
        account.unlocked_module_ids.insert(self.defaults.initial_module.clone());
        account.unlocked_level_ids.insert(self.defaults.initial_level.clone());
        account
    }

    /// Create the account document for a new user.
    ///
    /// # Errors
    ///
    /// - `ServiceError::AlreadyRegistered` if the user already has an account
    /// - `ServiceError::TransientIo` if the store is unavailable
    pub async fn register<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
        display_name: &str,
    ) -> Result<UserAccount, ServiceError> {
        let account = self.new_account(user_id, display_name);
        store.create(&DocumentPath::user(user_id), encode(&account)?).await?;

        tracing::info!("Registered user {}", user_id);
        Ok(account)
    }

    /// Load an existing account.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user has no account.
    pub async fn load<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
    ) -> Result<UserAccount, ServiceError> {
        Ok(records::fetch_account(store, user_id).await?)
    }
}
