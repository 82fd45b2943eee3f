use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

use crate::lightning::DecodedInvoice;

/// SHA-256 of the exact metadata bytes a server delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataCommitment([u8; 32]);

impl MetadataCommitment {
    pub fn of(metadata: &[u8]) -> Self {
        Self(Sha256::digest(metadata).into())
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for MetadataCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("invoice carries no description hash")]
    MissingCommitment,
    #[error("metadata hash mismatch: expected {expected}, invoice has {found}")]
    CommitmentMismatch { expected: String, found: String },
    #[error("invoice has no amount")]
    MissingAmount,
    #[error("amount mismatch: invoice {found} msat, expected {expected} msat")]
    AmountMismatch { expected: u64, found: u64 },
}

/// Check a decoded invoice against the metadata it must commit to and the
/// amount that was requested. Nothing may be paid unless this returns `Ok`.
///
/// The commitment is normally the invoice's description hash. A plain
/// description holding the hex digest is also accepted, since older servers
/// put the digest there.
pub fn verify_invoice(
    invoice: &DecodedInvoice,
    metadata: &str,
    expected_amount_msat: u64,
) -> Result<(), VerificationError> {
    let expected = MetadataCommitment::of(metadata.as_bytes());

    let found = match (&invoice.description_hash, &invoice.description) {
        (Some(hash), _) => hash.as_str(),
        (None, Some(description)) => description.as_str(),
        (None, None) => return Err(VerificationError::MissingCommitment),
    };
    if MetadataCommitment::from_hex(found) != Some(expected) {
        return Err(VerificationError::CommitmentMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }

    let amount = invoice.amount_msat.ok_or(VerificationError::MissingAmount)?;
    if amount != expected_amount_msat {
        return Err(VerificationError::AmountMismatch {
            expected: expected_amount_msat,
            found: amount,
        });
    }

    Ok(())
}

pub fn invoice_matches(invoice: &DecodedInvoice, metadata: &str, expected_amount_msat: u64) -> bool {
    verify_invoice(invoice, metadata, expected_amount_msat).is_ok()
}
