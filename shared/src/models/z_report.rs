//! Closing Report Model (Z 报告 / 日结报告)
//!
//! End-of-business-day settlement report. Reports are sequentially
//! numbered (global, never resets) and hash-chained: each report
//! carries the digest of its predecessor, so any later edit or
//! deletion invalidates every subsequent digest. Immutable once
//! archived; only the audit trail constructs the numbering and hashes.

use serde::{Deserialize, Serialize};

/// Tax breakdown by rate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VatBreakdown {
    /// Tax rate (0, 4, 10, 21)
    pub vat_rate: i32,
    /// Net amount (before tax)
    pub net_amount: f64,
    /// Tax amount
    pub vat_amount: f64,
    /// Gross amount (after tax)
    pub gross_amount: f64,
    /// Number of order lines with this tax rate
    pub line_count: i64,
}

/// Per-staff sales breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffBreakdown {
    pub operator_id: String,
    pub operator_name: String,
    pub order_count: i64,
    pub total_sales: f64,
}

/// Z report - end-of-day closing report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZReport {
    /// Global sequence number, monotonic, never resets
    pub sequence_number: u64,
    /// Business date (YYYY-MM-DD)
    pub business_date: String,
    pub order_count: i64,
    pub total_sales: f64,
    pub cash_total: f64,
    pub card_total: f64,
    /// Cash in the drawer at day open
    pub opening_cash: f64,
    /// Counted cash at day close
    pub closing_cash: f64,
    /// Expected cash: opening + cash sales
    pub theoretical_cash: f64,
    /// closing - theoretical
    pub cash_variance: f64,
    pub vat_breakdowns: Vec<VatBreakdown>,
    pub staff_breakdowns: Vec<StaffBreakdown>,
    /// When the report was generated (Unix millis)
    pub generated_at: i64,
    /// Who generated the report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
    /// Digest of the previous report (None for the very first)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_hash: Option<String>,
    /// Digest over this report's canonical content plus `previous_hash`
    pub current_hash: String,
}

impl ZReport {
    /// Whether this is the first report of the chain
    pub fn is_genesis(&self) -> bool {
        self.previous_hash.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_detection() {
        let report = ZReport {
            sequence_number: 1,
            business_date: "2026-08-07".to_string(),
            order_count: 0,
            total_sales: 0.0,
            cash_total: 0.0,
            card_total: 0.0,
            opening_cash: 100.0,
            closing_cash: 100.0,
            theoretical_cash: 100.0,
            cash_variance: 0.0,
            vat_breakdowns: vec![],
            staff_breakdowns: vec![],
            generated_at: 0,
            generated_by: None,
            previous_hash: None,
            current_hash: "abc".to_string(),
        };
        assert!(report.is_genesis());
    }
}
