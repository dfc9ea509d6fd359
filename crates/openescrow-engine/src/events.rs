//! Append-only, hash-chained notification log.
//!
//! Each record commits to the previous one:
//!
//! ```text
//! digest[n] = SHA-256(domain || digest[n-1] || n || JSON(event[n]))
//! ```
//!
//! with `digest[-1] = [0; 32]`. An indexer that replays the log can detect a
//! gap or a tampered record with [`EventLog::verify_chain`].

use openescrow_types::{EscrowError, MarketEvent, Result, constants};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One emitted notification with its position and chain digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based position in the log.
    pub sequence: u64,
    /// What happened.
    pub event: MarketEvent,
    /// Chain digest through this record.
    pub digest: [u8; 32],
}

impl EventRecord {
    /// Hex-encoded digest, for logs and APIs.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// The engine's notification log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, extending the hash chain.
    ///
    /// # Errors
    /// Returns `Serialization` if the event cannot be encoded.
    pub fn append(&mut self, event: MarketEvent) -> Result<&EventRecord> {
        let sequence = self.records.len() as u64;
        let digest = chain_digest(&self.head(), sequence, &event)?;
        self.records.push(EventRecord {
            sequence,
            event,
            digest,
        });
        Ok(&self.records[self.records.len() - 1])
    }

    pub(crate) fn pop_last(&mut self) -> Option<EventRecord> {
        self.records.pop()
    }

    /// Digest of the newest record, or zeroes when empty.
    #[must_use]
    pub fn head(&self) -> [u8; 32] {
        self.records.last().map_or([0u8; 32], |r| r.digest)
    }

    /// Every record, oldest first.
    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records from `sequence` onwards (empty if past the end).
    #[must_use]
    pub fn since(&self, sequence: u64) -> &[EventRecord] {
        let start = usize::try_from(sequence).map_or(self.records.len(), |s| s.min(self.records.len()));
        &self.records[start..]
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check that `records` form an unbroken chain starting at `genesis`
    /// (all zeroes for a log read from the beginning).
    ///
    /// # Errors
    /// Returns `Internal` naming the first record whose sequence or digest
    /// does not line up.
    pub fn verify_chain(genesis: [u8; 32], first_sequence: u64, records: &[EventRecord]) -> Result<()> {
        let mut previous = genesis;
        for (expected_sequence, record) in (first_sequence..).zip(records) {
            if record.sequence != expected_sequence {
                return Err(EscrowError::Internal(format!(
                    "event chain gap: expected sequence {expected_sequence}, found {}",
                    record.sequence
                )));
            }
            let digest = chain_digest(&previous, record.sequence, &record.event)?;
            if digest != record.digest {
                return Err(EscrowError::Internal(format!(
                    "event chain digest mismatch at sequence {}",
                    record.sequence
                )));
            }
            previous = digest;
        }
        Ok(())
    }
}

fn chain_digest(previous: &[u8; 32], sequence: u64, event: &MarketEvent) -> Result<[u8; 32]> {
    let mut hasher = Sha256::new();
    hasher.update(constants::EVENT_DIGEST_DOMAIN);
    hasher.update(previous);
    hasher.update(sequence.to_le_bytes());
    hasher.update(serde_json::to_vec(event)?);

    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openescrow_types::{AccountId, CollectionId, OfferId, TokenId};
    use rust_decimal::Decimal;

    fn cancelled(id: u64) -> MarketEvent {
        MarketEvent::SellOfferCancelled {
            offer_id: OfferId(id),
            collection: CollectionId::new("c"),
            token_id: TokenId(1),
        }
    }

    #[test]
    fn append_assigns_sequence_and_chains() {
        let mut log = EventLog::new();
        assert_eq!(log.head(), [0u8; 32]);

        let first = log.append(cancelled(0)).unwrap().clone();
        let second = log.append(cancelled(1)).unwrap().clone();
        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_ne!(first.digest, second.digest);
        assert_eq!(log.head(), second.digest);
        assert_eq!(second.digest_hex().len(), 64);
    }

    #[test]
    fn full_log_verifies() {
        let mut log = EventLog::new();
        log.append(cancelled(0)).unwrap();
        log.append(MarketEvent::FundsRecovered {
            recipient: AccountId::new(),
            amount: Decimal::ONE,
        })
        .unwrap();
        EventLog::verify_chain([0u8; 32], 0, log.records()).unwrap();
    }

    #[test]
    fn partial_read_verifies_from_known_head() {
        let mut log = EventLog::new();
        log.append(cancelled(0)).unwrap();
        let checkpoint = log.head();
        log.append(cancelled(1)).unwrap();
        log.append(cancelled(2)).unwrap();

        let tail = log.since(1);
        assert_eq!(tail.len(), 2);
        EventLog::verify_chain(checkpoint, 1, tail).unwrap();
    }

    #[test]
    fn tampered_record_detected() {
        let mut log = EventLog::new();
        log.append(cancelled(0)).unwrap();
        log.append(cancelled(1)).unwrap();

        let mut records = log.records().to_vec();
        records[1].event = cancelled(99);
        let err = EventLog::verify_chain([0u8; 32], 0, &records).unwrap_err();
        assert!(err.to_string().contains("digest mismatch at sequence 1"));
    }

    #[test]
    fn gap_detected() {
        let mut log = EventLog::new();
        log.append(cancelled(0)).unwrap();
        log.append(cancelled(1)).unwrap();
        log.append(cancelled(2)).unwrap();

        let records = [log.records()[0].clone(), log.records()[2].clone()];
        let err = EventLog::verify_chain([0u8; 32], 0, &records).unwrap_err();
        assert!(err.to_string().contains("gap"));
    }

    #[test]
    fn since_past_end_is_empty() {
        let mut log = EventLog::new();
        log.append(cancelled(0)).unwrap();
        assert!(log.since(5).is_empty());
        assert_eq!(log.since(0).len(), 1);
    }
}
