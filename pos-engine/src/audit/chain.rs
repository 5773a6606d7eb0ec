//! Z-report hash chaining and verification
//!
//! `current_hash = digest(canonical(sequence_number, date, total_sales,
//! previous_hash))`. The canonical rendering is pinned byte-exact
//! (fixed field order, amounts at exactly two decimals): the chain is
//! only meaningful if recomputation reproduces the same bytes.
//! Swapping the digest algorithm is a [`Digest`] impl change; the
//! chain logic never touches the hash internals.

use serde::Serialize;
use shared::models::{StaffBreakdown, VatBreakdown, ZReport};
use shared::{AppError, AppResult, ErrorCode};

use crate::money;
use crate::ports::Digest;

/// Hash label for the first report's missing predecessor
const GENESIS: &str = "genesis";

/// Report content before numbering and hashing
#[derive(Debug, Clone)]
pub struct ZReportDraft {
    pub business_date: String,
    pub order_count: i64,
    pub total_sales: f64,
    pub cash_total: f64,
    pub card_total: f64,
    pub opening_cash: f64,
    pub closing_cash: f64,
    pub vat_breakdowns: Vec<VatBreakdown>,
    pub staff_breakdowns: Vec<StaffBreakdown>,
    pub generated_by: Option<String>,
}

/// Canonical hashed payload. Byte-exact: field order and number
/// formatting are pinned.
pub fn canonical_payload(
    sequence_number: u64,
    business_date: &str,
    total_sales: f64,
    previous_hash: Option<&str>,
) -> String {
    format!(
        "seq={};date={};total={:.2};prev={}",
        sequence_number,
        business_date,
        money::money(total_sales),
        previous_hash.unwrap_or(GENESIS),
    )
}

/// Number, link, and hash a draft into the next report of the chain.
///
/// `previous` must be the tenant's latest archived report; generating
/// two reports concurrently from the same predecessor would fork the
/// chain, so callers serialize appends per tenant.
pub async fn chain_report(
    draft: ZReportDraft,
    previous: Option<&ZReport>,
    digest: &dyn Digest,
    now: i64,
) -> AppResult<ZReport> {
    let sequence_number = previous.map(|p| p.sequence_number + 1).unwrap_or(1);
    let previous_hash = previous.map(|p| p.current_hash.clone());

    let payload = canonical_payload(
        sequence_number,
        &draft.business_date,
        draft.total_sales,
        previous_hash.as_deref(),
    );
    let current_hash = hex::encode(digest.digest(payload.as_bytes()).await?);

    let theoretical_cash = money::money(draft.opening_cash + draft.cash_total);
    let cash_variance = money::money(draft.closing_cash - theoretical_cash);

    Ok(ZReport {
        sequence_number,
        business_date: draft.business_date,
        order_count: draft.order_count,
        total_sales: money::money(draft.total_sales),
        cash_total: money::money(draft.cash_total),
        card_total: money::money(draft.card_total),
        opening_cash: money::money(draft.opening_cash),
        closing_cash: money::money(draft.closing_cash),
        theoretical_cash,
        cash_variance,
        vat_breakdowns: draft.vat_breakdowns,
        staff_breakdowns: draft.staff_breakdowns,
        generated_at: now,
        generated_by: draft.generated_by,
        previous_hash,
        current_hash,
    })
}

/// One chain verification problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainIssue {
    /// Recomputed digest differs from the stored one: the report (or
    /// a predecessor's hash it covers) was altered
    HashMismatch {
        sequence_number: u64,
        expected: String,
        stored: String,
    },
    /// `previous_hash` does not match the predecessor's `current_hash`
    LinkMismatch { sequence_number: u64 },
    /// Sequence numbers are not consecutive
    SequenceJump { expected: u64, found: u64 },
}

/// Result of [`verify_chain`]
#[derive(Debug, Clone)]
pub struct ChainVerification {
    pub total: usize,
    pub verified: usize,
    pub intact: bool,
    pub issues: Vec<ChainIssue>,
}

impl ChainVerification {
    /// Collapse into an error when the chain is broken
    pub fn into_result(self) -> AppResult<()> {
        if self.intact {
            return Ok(());
        }
        Err(AppError::with_message(
            ErrorCode::ChainBroken,
            format!("{} of {} reports failed verification", self.issues.len(), self.total),
        )
        .with_detail(
            "issues",
            serde_json::to_value(&self.issues).unwrap_or_default(),
        ))
    }
}

/// Recompute the whole chain from the first report and compare against
/// the stored hashes. Reports must be passed in archive order.
pub async fn verify_chain(reports: &[ZReport], digest: &dyn Digest) -> AppResult<ChainVerification> {
    let mut issues = Vec::new();
    let mut verified = 0usize;

    for (index, report) in reports.iter().enumerate() {
        let predecessor = index.checked_sub(1).map(|i| &reports[i]);

        if let Some(previous) = predecessor {
            if report.sequence_number != previous.sequence_number + 1 {
                issues.push(ChainIssue::SequenceJump {
                    expected: previous.sequence_number + 1,
                    found: report.sequence_number,
                });
            }
            if report.previous_hash.as_deref() != Some(previous.current_hash.as_str()) {
                issues.push(ChainIssue::LinkMismatch {
                    sequence_number: report.sequence_number,
                });
            }
        } else if report.previous_hash.is_some() {
            // First stored report must be the genesis of the chain
            issues.push(ChainIssue::LinkMismatch {
                sequence_number: report.sequence_number,
            });
        }

        let payload = canonical_payload(
            report.sequence_number,
            &report.business_date,
            report.total_sales,
            report.previous_hash.as_deref(),
        );
        let expected = hex::encode(digest.digest(payload.as_bytes()).await?);
        if expected != report.current_hash {
            issues.push(ChainIssue::HashMismatch {
                sequence_number: report.sequence_number,
                expected,
                stored: report.current_hash.clone(),
            });
        } else {
            verified += 1;
        }
    }

    Ok(ChainVerification {
        total: reports.len(),
        verified,
        intact: issues.is_empty(),
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::Sha256Digest;

    fn draft(date: &str, total: f64) -> ZReportDraft {
        ZReportDraft {
            business_date: date.to_string(),
            order_count: 10,
            total_sales: total,
            cash_total: total / 2.0,
            card_total: total / 2.0,
            opening_cash: 100.0,
            closing_cash: 100.0 + total / 2.0,
            vat_breakdowns: vec![],
            staff_breakdowns: vec![],
            generated_by: Some("ana".to_string()),
        }
    }

    async fn build_chain(days: usize) -> Vec<ZReport> {
        let digest = Sha256Digest;
        let mut reports: Vec<ZReport> = Vec::new();
        for day in 0..days {
            let date = format!("2026-08-{:02}", day + 1);
            let report = chain_report(
                draft(&date, 100.0 + day as f64),
                reports.last(),
                &digest,
                day as i64,
            )
            .await
            .unwrap();
            reports.push(report);
        }
        reports
    }

    #[test]
    fn test_canonical_payload_is_pinned() {
        assert_eq!(
            canonical_payload(3, "2026-08-07", 1234.5, Some("abc")),
            "seq=3;date=2026-08-07;total=1234.50;prev=abc"
        );
        assert_eq!(
            canonical_payload(1, "2026-08-07", 0.0, None),
            "seq=1;date=2026-08-07;total=0.00;prev=genesis"
        );
    }

    #[tokio::test]
    async fn test_first_report_is_genesis() {
        let report = chain_report(draft("2026-08-01", 100.0), None, &Sha256Digest, 0)
            .await
            .unwrap();
        assert_eq!(report.sequence_number, 1);
        assert!(report.previous_hash.is_none());
        assert_eq!(report.current_hash.len(), 64); // SHA256 hex
    }

    #[tokio::test]
    async fn test_chain_links_and_never_resets() {
        let reports = build_chain(5).await;
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.sequence_number, i as u64 + 1);
            if i > 0 {
                assert_eq!(
                    report.previous_hash.as_deref(),
                    Some(reports[i - 1].current_hash.as_str())
                );
            }
        }
    }

    #[tokio::test]
    async fn test_intact_chain_verifies() {
        let reports = build_chain(6).await;
        let verification = verify_chain(&reports, &Sha256Digest).await.unwrap();
        assert!(verification.intact);
        assert_eq!(verification.verified, 6);
        assert!(verification.into_result().is_ok());
    }

    #[tokio::test]
    async fn test_tampering_any_field_is_detected() {
        let mut reports = build_chain(6).await;
        // Shave a sale off day 3 after archiving
        reports[2].total_sales -= 10.0;

        let verification = verify_chain(&reports, &Sha256Digest).await.unwrap();
        assert!(!verification.intact);
        assert!(verification.issues.iter().any(|issue| matches!(
            issue,
            ChainIssue::HashMismatch {
                sequence_number: 3,
                ..
            }
        )));
        assert!(verification.into_result().is_err());
    }

    #[tokio::test]
    async fn test_recomputing_forward_does_not_hide_tampering() {
        let mut reports = build_chain(6).await;
        // Alter day 3 AND recompute its own hash: the link from day 4
        // now exposes the edit
        reports[2].total_sales -= 10.0;
        let payload = canonical_payload(
            reports[2].sequence_number,
            &reports[2].business_date,
            reports[2].total_sales,
            reports[2].previous_hash.as_deref(),
        );
        reports[2].current_hash = hex::encode(
            Sha256Digest.digest(payload.as_bytes()).await.unwrap(),
        );

        let verification = verify_chain(&reports, &Sha256Digest).await.unwrap();
        assert!(!verification.intact);
        assert!(verification
            .issues
            .iter()
            .any(|issue| matches!(issue, ChainIssue::LinkMismatch { sequence_number: 4 })));
    }

    #[tokio::test]
    async fn test_deleting_a_report_is_detected() {
        let mut reports = build_chain(6).await;
        reports.remove(2);

        let verification = verify_chain(&reports, &Sha256Digest).await.unwrap();
        assert!(!verification.intact);
        assert!(verification.issues.iter().any(|issue| matches!(
            issue,
            ChainIssue::SequenceJump {
                expected: 3,
                found: 4
            }
        )));
    }

    #[tokio::test]
    async fn test_cash_variance_computed() {
        let mut d = draft("2026-08-01", 200.0);
        d.opening_cash = 100.0;
        d.cash_total = 100.0;
        d.closing_cash = 195.0;
        let report = chain_report(d, None, &Sha256Digest, 0).await.unwrap();
        assert_eq!(report.theoretical_cash, 200.0);
        assert_eq!(report.cash_variance, -5.0);
    }
}
