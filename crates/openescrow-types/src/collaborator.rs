//! Contracts for the services the engine depends on but does not own.
//!
//! - [`AssetRegistry`]: tracks who owns each unique asset and performs moves
//! - [`PaymentRail`]: moves currency into and out of the engine's escrow
//! - [`AdminPolicy`]: decides who may run recovery operations
//!
//! The registry and the rail are also [`Transactional`]. The engine opens a
//! transaction on both before an operation and either commits or rolls back
//! after it, so a payment failure late in an operation also undoes the asset
//! move that preceded it.

use rust_decimal::Decimal;

use crate::{AccountId, CollectionId, RailError, RegistryError, TokenId};

/// All-or-nothing scope around one engine operation.
///
/// Calls are never nested: `begin` is always followed by exactly one
/// `commit` or `rollback`.
pub trait Transactional {
    /// Start recording changes.
    fn begin(&mut self);
    /// Keep every change since `begin`.
    fn commit(&mut self);
    /// Undo every change since `begin`, newest first.
    fn rollback(&mut self);
}

/// Ownership and custody of unique assets.
pub trait AssetRegistry: Transactional {
    /// Current owner of the asset.
    fn owner_of(
        &self,
        collection: &CollectionId,
        token_id: TokenId,
    ) -> Result<AccountId, RegistryError>;

    /// The single account currently approved to move the asset, if any.
    fn approved_operator(&self, collection: &CollectionId, token_id: TokenId) -> Option<AccountId>;

    /// Move the asset from `from` to `to`, acting as `operator`.
    ///
    /// Fails if `from` is not the owner, or if `operator` is neither the
    /// owner nor the approved operator.
    fn transfer(
        &mut self,
        operator: AccountId,
        collection: &CollectionId,
        token_id: TokenId,
        from: AccountId,
        to: AccountId,
    ) -> Result<(), RegistryError>;
}

/// Currency movements into and out of the engine's escrow balance.
pub trait PaymentRail: Transactional {
    /// Take a payment attached by `from` into escrow.
    fn receive(&mut self, from: AccountId, amount: Decimal) -> Result<(), RailError>;

    /// Pay `amount` out of escrow to `to`.
    fn transfer(&mut self, to: AccountId, amount: Decimal) -> Result<(), RailError>;

    /// Everything the engine currently holds.
    fn escrow_balance(&self) -> Decimal;
}

/// Who counts as the administrator. Policy lives outside the engine.
pub trait AdminPolicy {
    fn is_administrator(&self, account: &AccountId) -> bool;
}

impl<F> AdminPolicy for F
where
    F: Fn(&AccountId) -> bool,
{
    fn is_administrator(&self, account: &AccountId) -> bool {
        self(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_admin_policies() {
        let admin = AccountId::new();
        let policy = move |account: &AccountId| *account == admin;
        assert!(policy.is_administrator(&admin));
        assert!(!policy.is_administrator(&AccountId::new()));
    }
}
