//! Configuration for an OpenEscrow engine instance.

use serde::{Deserialize, Serialize};

use crate::{AccountId, EscrowError, Result, constants};

/// Configuration for a single marketplace engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The account that holds escrowed assets and currency. Sellers approve
    /// this account on the asset registry before listing.
    pub escrow_account: AccountId,
    /// Label of the currency the payment rail moves (e.g., "ETH").
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Sell-book size above which recovery scans are logged at `warn`.
    #[serde(default = "default_recovery_scan_warn_threshold")]
    pub recovery_scan_warn_threshold: usize,
}

fn default_currency() -> String {
    constants::DEFAULT_CURRENCY.to_string()
}

fn default_recovery_scan_warn_threshold() -> usize {
    constants::DEFAULT_RECOVERY_SCAN_WARN_THRESHOLD
}

impl EngineConfig {
    /// Default configuration around a given escrow account.
    #[must_use]
    pub fn new(escrow_account: AccountId) -> Self {
        Self {
            escrow_account,
            currency: default_currency(),
            recovery_scan_warn_threshold: default_recovery_scan_warn_threshold(),
        }
    }

    /// Parse a JSON configuration document.
    ///
    /// # Errors
    /// Returns [`EscrowError::Configuration`] if the document is malformed,
    /// misses `escrow_account`, or names an empty currency.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| EscrowError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check field-level constraints.
    ///
    /// # Errors
    /// Returns [`EscrowError::Configuration`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.currency.trim().is_empty() {
            return Err(EscrowError::Configuration(
                "currency label must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(AccountId::new())
    }
}
