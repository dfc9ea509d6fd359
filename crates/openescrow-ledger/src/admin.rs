//! Administrator policy with exactly one privileged account.

use openescrow_types::{AccountId, AdminPolicy};

/// The single account allowed to run recovery operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleAdministrator(pub AccountId);

impl SingleAdministrator {
    #[must_use]
    pub fn new(admin: AccountId) -> Self {
        Self(admin)
    }

    /// Hand the role to another account.
    pub fn transfer_to(&mut self, next: AccountId) {
        tracing::info!(from = %self.0, to = %next, "Administrator changed");
        self.0 = next;
    }
}

impl AdminPolicy for SingleAdministrator {
    fn is_administrator(&self, account: &AccountId) -> bool {
        self.0 == *account
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_admin_passes() {
        let admin = AccountId::new();
        let policy = SingleAdministrator::new(admin);
        assert!(policy.is_administrator(&admin));
        assert!(!policy.is_administrator(&AccountId::new()));
    }

    #[test]
    fn transfer_moves_the_role() {
        let first = AccountId::new();
        let second = AccountId::new();
        let mut policy = SingleAdministrator::new(first);
        policy.transfer_to(second);
        assert!(!policy.is_administrator(&first));
        assert!(policy.is_administrator(&second));
    }
}
