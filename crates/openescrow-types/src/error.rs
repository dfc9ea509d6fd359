//! Error types for the OpenEscrow marketplace engine.
//!
//! All engine errors use the `MK_ERR_` prefix convention for easy grepping in
//! logs. Codes are grouped by subsystem:
//! - 1xx: Offer lifecycle errors
//! - 2xx: Payment errors
//! - 3xx: Asset / escrow custody errors
//! - 4xx: Administration errors
//! - 9xx: General / internal errors
//!
//! Every variant is a distinct condition. Operations check their
//! preconditions in a fixed order, so a failed call reports exactly one.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AccountId, BookKind, CollectionId, OfferId, TokenId};

/// Central error enum for all OpenEscrow operations.
#[derive(Debug, Error)]
pub enum EscrowError {
    // =================================================================
    // Offer Errors (1xx)
    // =================================================================
    /// No offer with this id was ever created in the book.
    #[error("MK_ERR_100: Invalid offer: {book} {id} does not exist")]
    InvalidOffer { book: BookKind, id: OfferId },

    /// The offer was already accepted or cancelled.
    #[error("MK_ERR_101: Offer already ended: {book} {id}")]
    OfferAlreadyEnded { book: BookKind, id: OfferId },

    /// Acceptance attempted at or after the deadline.
    #[error("MK_ERR_102: Offer expired: {book} {id} deadline {deadline}")]
    OfferExpired {
        book: BookKind,
        id: OfferId,
        deadline: DateTime<Utc>,
    },

    /// Cancellation attempted before the deadline.
    #[error("MK_ERR_103: Offer not ended: {book} {id} is live until {deadline}")]
    OfferNotEnded {
        book: BookKind,
        id: OfferId,
        deadline: DateTime<Utc>,
    },

    /// Deadline is not strictly in the future at creation.
    #[error("MK_ERR_104: Invalid deadline: {deadline} is not after {now}")]
    InvalidDeadline {
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// Price of zero (or below).
    #[error("MK_ERR_105: Invalid price: {0}")]
    InvalidPrice(Decimal),

    // =================================================================
    // Payment Errors (2xx)
    // =================================================================
    /// Attached payment differs from the offer price.
    #[error("MK_ERR_200: Invalid amount: expected exactly {expected}, attached {attached}")]
    InvalidAmount { expected: Decimal, attached: Decimal },

    /// The payer cannot cover the attached payment.
    #[error("MK_ERR_201: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// The payment rail reported a failed payout.
    #[error("MK_ERR_202: Currency transfer failed: {reason}")]
    CurrencyTransferFailed { reason: String },

    /// Currency was created or destroyed somewhere. Critical safety alert.
    #[error("MK_ERR_203: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // Asset / Escrow Errors (3xx)
    // =================================================================
    /// Caller is not allowed to act as the seller side of this operation.
    #[error("MK_ERR_300: Invalid seller: {0}")]
    InvalidSeller(AccountId),

    /// Caller is not allowed to act as the buyer side of this operation.
    #[error("MK_ERR_301: Invalid buyer: {0}")]
    InvalidBuyer(AccountId),

    /// The engine is not the approved operator for the asset.
    #[error("MK_ERR_302: Escrow not approved for {collection} {token_id}")]
    NotApproved {
        collection: CollectionId,
        token_id: TokenId,
    },

    /// The asset registry does not know this asset.
    #[error("MK_ERR_303: Asset not found: {collection} {token_id}")]
    AssetNotFound {
        collection: CollectionId,
        token_id: TokenId,
    },

    /// The asset registry refused a transfer.
    #[error("MK_ERR_304: Asset transfer failed: {reason}")]
    AssetTransferFailed { reason: String },

    /// Recovery refused: a live sell offer still claims the asset.
    #[error("MK_ERR_305: {collection} {token_id} is held for live sell {offer_id}")]
    AssetUnderActiveOffer {
        collection: CollectionId,
        token_id: TokenId,
        offer_id: OfferId,
    },

    // =================================================================
    // Administration Errors (4xx)
    // =================================================================
    /// Caller is not the administrator.
    #[error("MK_ERR_400: Unauthorized: {0} is not an administrator")]
    Unauthorized(AccountId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("MK_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("MK_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config document, missing fields, etc.).
    #[error("MK_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EscrowError>;

impl From<serde_json::Error> for EscrowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =====================================================================
// Collaborator errors
// =====================================================================

/// Failure reported by an [`AssetRegistry`](crate::AssetRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("token {collection} {token_id} does not exist")]
    TokenNotFound {
        collection: CollectionId,
        token_id: TokenId,
    },

    #[error("{from} does not own {collection} {token_id}")]
    NotOwner {
        collection: CollectionId,
        token_id: TokenId,
        from: AccountId,
    },

    #[error("{operator} may not move {collection} {token_id}")]
    NotAuthorized {
        collection: CollectionId,
        token_id: TokenId,
        operator: AccountId,
    },
}

/// Failure reported by a [`PaymentRail`](crate::PaymentRail).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RailError {
    #[error("payment to {recipient} rejected: {reason}")]
    Rejected { recipient: AccountId, reason: String },

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = EscrowError::InvalidOffer {
            book: BookKind::Sell,
            id: OfferId(7),
        };
        let msg = format!("{err}");
        assert!(msg.starts_with("MK_ERR_100"), "Got: {msg}");
        assert!(msg.contains("offer:7"));
    }

    #[test]
    fn invalid_amount_display() {
        let err = EscrowError::InvalidAmount {
            expected: Decimal::ONE,
            attached: Decimal::new(15, 1),
        };
        let msg = format!("{err}");
        assert!(msg.contains("MK_ERR_200"));
        assert!(msg.contains('1'));
        assert!(msg.contains("1.5"));
    }

    #[test]
    fn all_errors_have_mk_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(EscrowError::InvalidPrice(Decimal::ZERO)),
            Box::new(EscrowError::Unauthorized(AccountId::new())),
            Box::new(EscrowError::CurrencyTransferFailed {
                reason: "rejected".into(),
            }),
            Box::new(EscrowError::Internal("test".into())),
            Box::new(EscrowError::NotApproved {
                collection: CollectionId::new("c"),
                token_id: TokenId(1),
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("MK_ERR_"),
                "Error missing MK_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn serde_json_error_converts() {
        let bad = serde_json::from_str::<u64>("nope").unwrap_err();
        let err: EscrowError = bad.into();
        assert!(matches!(err, EscrowError::Serialization(_)));
    }
}
