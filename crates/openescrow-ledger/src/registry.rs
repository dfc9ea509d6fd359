//! In-memory asset registry for unique tokens.
//!
//! Ownership and approval follow the usual single-operator model: each token
//! has one owner and at most one approved operator; a transfer clears the
//! approval.

use std::collections::HashMap;

use openescrow_types::{
    AccountId, AssetRegistry, CollectionId, EscrowError, RegistryError, Result, TokenId,
    Transactional,
};

type AssetKey = (CollectionId, TokenId);

/// Prior ownership and approval of one token, for rollback.
#[derive(Debug, Clone)]
struct Undo {
    key: AssetKey,
    owner: AccountId,
    approved: Option<AccountId>,
}

/// Tracks owner and approved operator per (collection, token).
#[derive(Default)]
pub struct InMemoryAssetRegistry {
    /// Current owner per token.
    owners: HashMap<AssetKey, AccountId>,
    /// Approved operator per token.
    approvals: HashMap<AssetKey, AccountId>,
    /// Open transaction journal, newest last.
    journal: Option<Vec<Undo>>,
}

impl InMemoryAssetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token owned by `owner`.
    ///
    /// # Errors
    /// Returns `Internal` if the token already exists.
    pub fn mint(&mut self, collection: &CollectionId, token_id: TokenId, owner: AccountId) -> Result<()> {
        let key = (collection.clone(), token_id);
        if self.owners.contains_key(&key) {
            return Err(EscrowError::Internal(format!(
                "token {collection} {token_id} already minted"
            )));
        }
        self.owners.insert(key, owner);
        Ok(())
    }

    /// Approve `operator` to move the token, acting as `owner`.
    ///
    /// # Errors
    /// Returns `AssetNotFound` for an unknown token and `InvalidSeller` if
    /// `owner` does not own it.
    pub fn approve(
        &mut self,
        owner: AccountId,
        collection: &CollectionId,
        token_id: TokenId,
        operator: AccountId,
    ) -> Result<()> {
        let key = (collection.clone(), token_id);
        let current = self
            .owners
            .get(&key)
            .copied()
            .ok_or_else(|| EscrowError::AssetNotFound {
                collection: collection.clone(),
                token_id,
            })?;
        if current != owner {
            return Err(EscrowError::InvalidSeller(owner));
        }
        self.record(&key);
        self.approvals.insert(key, operator);
        Ok(())
    }

    /// Number of tokens owned by `account` across all collections.
    #[must_use]
    pub fn holdings(&self, account: AccountId) -> usize {
        self.owners.values().filter(|owner| **owner == account).count()
    }

    fn record(&mut self, key: &AssetKey) {
        let Some(journal) = self.journal.as_mut() else {
            return;
        };
        if let Some(owner) = self.owners.get(key).copied() {
            journal.push(Undo {
                key: key.clone(),
                owner,
                approved: self.approvals.get(key).copied(),
            });
        }
    }
}

impl Transactional for InMemoryAssetRegistry {
    fn begin(&mut self) {
        self.journal = Some(Vec::new());
    }

    fn commit(&mut self) {
        self.journal = None;
    }

    fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        tracing::debug!(entries = journal.len(), "Rolling back asset registry");
        for undo in journal.into_iter().rev() {
            match undo.approved {
                Some(operator) => self.approvals.insert(undo.key.clone(), operator),
                None => self.approvals.remove(&undo.key),
            };
            self.owners.insert(undo.key, undo.owner);
        }
    }
}

impl AssetRegistry for InMemoryAssetRegistry {
    fn owner_of(
        &self,
        collection: &CollectionId,
        token_id: TokenId,
    ) -> std::result::Result<AccountId, RegistryError> {
        self.owners
            .get(&(collection.clone(), token_id))
            .copied()
            .ok_or_else(|| RegistryError::TokenNotFound {
                collection: collection.clone(),
                token_id,
            })
    }

    fn approved_operator(&self, collection: &CollectionId, token_id: TokenId) -> Option<AccountId> {
        self.approvals.get(&(collection.clone(), token_id)).copied()
    }

    fn transfer(
        &mut self,
        operator: AccountId,
        collection: &CollectionId,
        token_id: TokenId,
        from: AccountId,
        to: AccountId,
    ) -> std::result::Result<(), RegistryError> {
        let owner = self.owner_of(collection, token_id)?;
        if owner != from {
            return Err(RegistryError::NotOwner {
                collection: collection.clone(),
                token_id,
                from,
            });
        }
        if operator != from && self.approved_operator(collection, token_id) != Some(operator) {
            return Err(RegistryError::NotAuthorized {
                collection: collection.clone(),
                token_id,
                operator,
            });
        }

        let key = (collection.clone(), token_id);
        self.record(&key);
        self.approvals.remove(&key);
        self.owners.insert(key, to);
        Ok(())
    }
}
