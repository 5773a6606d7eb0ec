//! Invoice numbering
//!
//! Sequence semantics: within a year, numbers run 1..N with no gaps
//! and no repeats; the sequence resets to 1 when the year changes.

use serde::Serialize;
use shared::models::InvoiceNumber;
use std::collections::BTreeMap;

/// Next invoice number after `last`.
///
/// A missing `last` (first invoice ever) or a year rollover starts a
/// fresh sequence at 1.
pub fn next_invoice_number(last: Option<InvoiceNumber>, current_year: i32) -> InvoiceNumber {
    match last {
        Some(number) if number.year == current_year => {
            InvoiceNumber::new(number.year, number.sequence + 1)
        }
        _ => InvoiceNumber::new(current_year, 1),
    }
}

/// One sequence integrity problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SequenceIssue {
    /// A year's sequence skips a value
    Gap { year: i32, expected: u32, found: u32 },
    /// The same formatted number appears more than once
    Duplicate { number: String },
}

/// Result of [`validate_invoice_sequence`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceValidation {
    pub valid: bool,
    pub issues: Vec<SequenceIssue>,
}

/// Check a stored invoice sequence for gaps and duplicates.
///
/// Each year is validated independently: its sorted sequence must be
/// exactly `1..=N`. Input ordering does not matter.
pub fn validate_invoice_sequence(invoices: &[InvoiceNumber]) -> SequenceValidation {
    let mut by_year: BTreeMap<i32, Vec<u32>> = BTreeMap::new();
    for number in invoices {
        by_year.entry(number.year).or_default().push(number.sequence);
    }

    let mut issues = Vec::new();
    for (year, mut sequences) in by_year {
        sequences.sort_unstable();
        let mut expected = 1u32;
        let mut previous: Option<u32> = None;
        for sequence in sequences {
            if previous == Some(sequence) {
                issues.push(SequenceIssue::Duplicate {
                    number: InvoiceNumber::new(year, sequence).formatted(),
                });
                continue;
            }
            if sequence != expected {
                issues.push(SequenceIssue::Gap {
                    year,
                    expected,
                    found: sequence,
                });
            }
            expected = sequence + 1;
            previous = Some(sequence);
        }
    }

    SequenceValidation {
        valid: issues.is_empty(),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(year: i32, sequences: &[u32]) -> Vec<InvoiceNumber> {
        sequences
            .iter()
            .map(|&s| InvoiceNumber::new(year, s))
            .collect()
    }

    #[test]
    fn test_first_invoice_starts_at_one() {
        let number = next_invoice_number(None, 2026);
        assert_eq!(number, InvoiceNumber::new(2026, 1));
        assert_eq!(number.formatted(), "2026-00001");
    }

    #[test]
    fn test_sequence_increments_by_exactly_one() {
        let number = next_invoice_number(Some(InvoiceNumber::new(2026, 41)), 2026);
        assert_eq!(number, InvoiceNumber::new(2026, 42));
    }

    #[test]
    fn test_year_rollover_resets_to_one() {
        let number = next_invoice_number(Some(InvoiceNumber::new(2025, 977)), 2026);
        assert_eq!(number, InvoiceNumber::new(2026, 1));
    }

    #[test]
    fn test_generated_run_validates_clean() {
        let mut last = None;
        let mut all = Vec::new();
        for _ in 0..50 {
            let next = next_invoice_number(last, 2026);
            all.push(next);
            last = Some(next);
        }
        let validation = validate_invoice_sequence(&all);
        assert!(validation.valid, "{:?}", validation.issues);
    }

    #[test]
    fn test_gap_detected() {
        // 1, 2, 4: 3 is missing
        let validation = validate_invoice_sequence(&numbers(2026, &[1, 2, 4]));
        assert!(!validation.valid);
        assert_eq!(
            validation.issues,
            vec![SequenceIssue::Gap {
                year: 2026,
                expected: 3,
                found: 4
            }]
        );
    }

    #[test]
    fn test_duplicate_detected() {
        let validation = validate_invoice_sequence(&numbers(2026, &[1, 2, 2, 3]));
        assert!(!validation.valid);
        assert_eq!(
            validation.issues,
            vec![SequenceIssue::Duplicate {
                number: "2026-00002".to_string()
            }]
        );
    }

    #[test]
    fn test_sequence_must_start_at_one() {
        let validation = validate_invoice_sequence(&numbers(2026, &[2, 3]));
        assert!(!validation.valid);
        assert!(matches!(
            validation.issues[0],
            SequenceIssue::Gap {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_years_validate_independently() {
        let mut invoices = numbers(2025, &[1, 2, 3]);
        invoices.extend(numbers(2026, &[1, 2]));
        let validation = validate_invoice_sequence(&invoices);
        assert!(validation.valid);

        // A gap in one year does not hide behind the other year
        let mut invoices = numbers(2025, &[1, 3]);
        invoices.extend(numbers(2026, &[1]));
        let validation = validate_invoice_sequence(&invoices);
        assert_eq!(validation.issues.len(), 1);
    }

    #[test]
    fn test_input_ordering_does_not_matter() {
        let shuffled = numbers(2026, &[3, 1, 2]);
        assert!(validate_invoice_sequence(&shuffled).valid);
    }
}
