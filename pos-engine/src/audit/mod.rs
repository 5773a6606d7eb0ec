//! Sequential audit trail (防篡改审计链)
//!
//! Two integrity mechanisms live here:
//!
//! - [`invoice`]: legally-sequential invoice numbers (gapless within
//!   a year, reset to 1 on year change) and the validator that proves
//!   a stored sequence is intact.
//! - [`chain`]: the Z-report hash chain. Each report's digest covers
//!   its predecessor's digest, so editing or deleting any historical
//!   report invalidates every subsequent one.

pub mod chain;
pub mod invoice;

// Re-exports
pub use chain::{
    ChainIssue, ChainVerification, ZReportDraft, canonical_payload, chain_report, verify_chain,
};
pub use invoice::{
    SequenceIssue, SequenceValidation, next_invoice_number, validate_invoice_sequence,
};
