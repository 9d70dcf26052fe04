use thiserror::Error;

/// Format an amount as a human-readable currency string.
/// Example: 1500.0 -> "$1500.00", -12.345 -> "$-12.35"
pub fn format_amount(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Parse a decimal string into an amount.
/// Surrounding whitespace is ignored; signs, exponents and `_` between digits are accepted.
/// Example: "50" -> 50.0, " 12.5 " -> 12.5, "1e3" -> 1000.0, "1_000" -> 1000.0
///
/// No range check happens here: zero and negative amounts are valid input.
pub fn parse_amount(input: &str) -> Result<f64, ParseAmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let amount: f64 = strip_digit_separators(trimmed)
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| ParseAmountError::InvalidFormat(input.to_string()))?;

    // "inf" and "nan" parse as f64 but cannot be summed meaningfully
    if !amount.is_finite() {
        return Err(ParseAmountError::NotFinite(input.to_string()));
    }

    Ok(amount)
}

/// Drop `_` separators. Each one must sit between two digits.
fn strip_digit_separators(text: &str) -> Option<String> {
    if !text.contains('_') {
        return Some(text.to_string());
    }

    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        if c == '_' {
            let before = i.checked_sub(1).map(|j| bytes[j]);
            let after = bytes.get(i + 1).copied();
            match (before, after) {
                (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit() => {}
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,

    #[error("not a number: {0:?}")]
    InvalidFormat(String),

    #[error("amount must be a finite number: {0:?}")]
    NotFinite(String),
}
