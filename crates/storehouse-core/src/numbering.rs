//! # Invoice Numbering
//!
//! Human-readable invoice numbers: `<PREFIX>-NNNNNN`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale #1        → INV-000001                                            │
//! │  Sale #42       → INV-000042                                            │
//! │  Purchase #7    → PUR-000007                                            │
//! │  Sale #1234567  → INV-1234567   (padding is a minimum width)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sequence is the invoice row id, which SQLite assigns as the highest
//! existing id + 1 (1 on an empty table). The storage layer inserts the row
//! inside the invoice transaction first, so the id, and therefore the
//! number, is fixed while the write lock is held.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::InvoiceKind;

/// Zero-padded width of the numeric part.
pub const SEQUENCE_WIDTH: usize = 6;

/// A formatted invoice number such as `INV-000001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Formats the number for a given sequence value.
    ///
    /// ## Example
    /// ```rust
    /// use storehouse_core::{InvoiceKind, InvoiceNumber};
    ///
    /// assert_eq!(InvoiceNumber::for_sequence(InvoiceKind::Sale, 1).as_str(), "INV-000001");
    /// assert_eq!(InvoiceNumber::for_sequence(InvoiceKind::Purchase, 42).as_str(), "PUR-000042");
    /// ```
    pub fn for_sequence(kind: InvoiceKind, sequence: i64) -> Self {
        InvoiceNumber(format!(
            "{}-{:0width$}",
            kind.number_prefix(),
            sequence,
            width = SEQUENCE_WIDTH
        ))
    }

    /// The number following the highest existing id, or the first number
    /// when there are no invoices of this kind yet.
    pub fn next_after(kind: InvoiceKind, highest_id: Option<i64>) -> Self {
        Self::for_sequence(kind, highest_id.map_or(1, |id| id + 1))
    }

    /// Extracts the sequence from a formatted number of the given kind.
    ///
    /// Returns `None` for the other kind's prefix or a malformed number.
    pub fn parse_sequence(kind: InvoiceKind, number: &str) -> Option<i64> {
        let digits = number
            .strip_prefix(kind.number_prefix())?
            .strip_prefix('-')?;

        if digits.len() < SEQUENCE_WIDTH || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        digits.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InvoiceNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_number_on_empty_table() {
        assert_eq!(
            InvoiceNumber::next_after(InvoiceKind::Sale, None).as_str(),
            "INV-000001"
        );
        assert_eq!(
            InvoiceNumber::next_after(InvoiceKind::Purchase, None).as_str(),
            "PUR-000001"
        );
    }

    #[test]
    fn test_next_after_highest_id() {
        assert_eq!(
            InvoiceNumber::next_after(InvoiceKind::Sale, Some(9)).as_str(),
            "INV-000010"
        );
    }

    #[test]
    fn test_sequential_numbers_are_monotonic() {
        let numbers: Vec<String> = (1..=3)
            .map(|n| InvoiceNumber::for_sequence(InvoiceKind::Sale, n).into_string())
            .collect();
        assert_eq!(numbers, vec!["INV-000001", "INV-000002", "INV-000003"]);

        let mut sorted = numbers.clone();
        sorted.sort();
        assert_eq!(sorted, numbers);
    }

    #[test]
    fn test_wide_sequence_is_not_truncated() {
        assert_eq!(
            InvoiceNumber::for_sequence(InvoiceKind::Sale, 1_234_567).as_str(),
            "INV-1234567"
        );
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(InvoiceNumber::parse_sequence(InvoiceKind::Sale, "INV-000042"), Some(42));
        assert_eq!(InvoiceNumber::parse_sequence(InvoiceKind::Purchase, "INV-000042"), None);
        assert_eq!(InvoiceNumber::parse_sequence(InvoiceKind::Sale, "INV-42"), None);
        assert_eq!(InvoiceNumber::parse_sequence(InvoiceKind::Sale, "INV-00004x"), None);
    }
}
