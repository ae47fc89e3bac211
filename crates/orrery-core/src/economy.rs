//! Virtual currency and cosmetic items.
//!
//! # Invariants
//!
//! - The balance never goes negative: a purchase debit is guarded by a
//!   `BalanceAtLeast` precondition in the same commit
//! - The active cosmetic is always owned
//! - A failed purchase changes nothing

use orrery_proto::{CosmeticId, CosmeticItem, UserAccount};

use crate::{
    catalog::{self, CosmeticView},
    error::{EntityKind, ServiceError},
    store::{Condition, FieldOp, Mutation, Store, records},
};

/// Receipt for a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    /// Bought item.
    pub item_id: CosmeticId,
    /// Amount debited.
    pub price: u64,
    /// Balance after the debit.
    pub balance: u64,
}

/// Economy operations over a [`Store`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EconomyService;

impl EconomyService {
    /// Create the service.
    pub fn new() -> Self {
        Self
    }

    /// Buy `item_id` for `price`.
    ///
    /// # Errors
    ///
    /// - `ServiceError::AlreadyOwned` if the user owns the item
    /// - `ServiceError::InsufficientFunds` if the balance is below `price`
    /// - `ServiceError::NotFound` if the user has no account
    pub async fn purchase<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
        item_id: &str,
        price: u64,
    ) -> Result<Purchase, ServiceError> {
        let mutation = Mutation::new()
            .require(Condition::DoesNotOwn(item_id.to_string()))
            .require(Condition::BalanceAtLeast(price))
            .then(FieldOp::Debit(price))
            .then(FieldOp::GrantCosmetic(item_id.to_string()));

        let outcome = store.commit(user_id, &mutation).await.map_err(|e| {
            tracing::debug!("Purchase of {} by {} rejected: {}", item_id, user_id, e);
            ServiceError::from(e)
        })?;

        tracing::info!(
            "User {} bought {} for {} (balance {})",
            user_id,
            item_id,
            price,
            outcome.account.currency_balance
        );
        Ok(Purchase {
            item_id: item_id.to_string(),
            price,
            balance: outcome.account.currency_balance,
        })
    }

    /// Buy a catalog item at its listed price.
    ///
    /// # Errors
    ///
    /// `ServiceError::NotFound` if the item is not in the catalog, otherwise
    /// as [`Self::purchase`].
    pub async fn purchase_item<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
        item_id: &str,
    ) -> Result<Purchase, ServiceError> {
        let item: CosmeticItem = records::fetch(store, item_id).await?.ok_or_else(|| {
            ServiceError::NotFound { kind: EntityKind::Cosmetic, id: item_id.to_string() }
        })?;

        self.purchase(store, user_id, &item.id, item.price).await
    }

    /// Wear an owned item.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotOwned` if the user does not own the item.
    pub async fn set_active_cosmetic<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
        item_id: &str,
    ) -> Result<UserAccount, ServiceError> {
        let mutation = Mutation::new()
            .require(Condition::Owns(item_id.to_string()))
            .then(FieldOp::SelectCosmetic(item_id.to_string()));

        let outcome = store.commit(user_id, &mutation).await?;

        tracing::info!("User {} is now wearing {}", user_id, item_id);
        Ok(outcome.account)
    }

    /// Credit the user unconditionally. Returns the new balance.
    pub async fn add_currency<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
        amount: u64,
    ) -> Result<u64, ServiceError> {
        let outcome = store.commit(user_id, &Mutation::new().then(FieldOp::Credit(amount))).await?;

        tracing::debug!("Credited {} to {}", amount, user_id);
        Ok(outcome.account.currency_balance)
    }

    /// Shop listing with ownership state, cheapest first.
    pub async fn shop<S: Store + ?Sized>(
        &self,
        store: &S,
        user_id: &str,
    ) -> Result<Vec<CosmeticView>, ServiceError> {
        let account = records::fetch_account(store, user_id).await?;
        let items = catalog::avatars(store).await?;
        Ok(catalog::cosmetic_views(&account, items))
    }
}
