//! Common regex patterns for payment-guide reports.

use lazy_static::lazy_static;
use regex::Regex;

/// Currency prefixes removed before a token is parsed. Longest first so that
/// `US$` wins over `$`.
pub const CURRENCY_SYMBOLS: [&str; 6] = ["US$", "R$", "$", "€", "£", "¥"];

lazy_static! {
    // Real-prefixed amount on a report line: "R$ 1.234,56", "R$301,61"
    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        r"R\$\s*([\d.,]+)"
    ).unwrap();

    // Digits with separators only
    pub static ref MONETARY_SHAPE: Regex = Regex::new(
        r"^[\d.,]+$"
    ).unwrap();

    // Explicit amount-paid field: "Valor Pago: R$ 1.234,56"
    pub static ref AMOUNT_PAID_LABEL: Regex = label_pattern("Valor Pago").unwrap();

    // English rendering of the same field: "Amount Paid: 1,234.56"
    pub static ref AMOUNT_PAID_LABEL_EN: Regex = label_pattern("Amount Paid").unwrap();
}

/// Labels searched for explicit amount-paid fields unless configured otherwise.
pub const DEFAULT_AMOUNT_PAID_LABELS: [&str; 2] = ["Valor Pago", "Amount Paid"];

/// Build the pattern for a labeled amount field.
///
/// Label words match case-insensitively with spaces or tabs between them; the
/// value may carry an `R$` prefix and is captured in group 1. Label and value
/// must share a line.
pub fn label_pattern(label: &str) -> Result<Regex, regex::Error> {
    let words: Vec<String> = label.split_whitespace().map(regex::escape).collect();
    Regex::new(&format!(
        r"(?i){}[:\t ]+((?:R\$[\t ]*)?[\d.,]+)",
        words.join(r"[\t ]+")
    ))
}
