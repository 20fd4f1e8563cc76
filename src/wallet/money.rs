//! Money parsing and formatting
//!
//! Amounts travel as decimal strings in the API ("25", "19.99") and are
//! stored as integer cents. Floats never touch a balance.

use crate::error::AppError;

/// Upper bound on a single amount, in cents (a trillion units is plenty
/// for a squad wallet and keeps sums far from i64 overflow).
const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000_00;

/// Parse a positive decimal amount into cents.
///
/// Accepts at most two fractional digits. Zero, negatives, and anything
/// non-numeric are rejected.
pub fn parse_amount_cents(input: &str) -> Result<i64, AppError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid_amount(input));
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid_amount(input));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid_amount(input));
    }
    if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid_amount(input));
    }

    let whole_units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid_amount(input))?
    };

    let frac_cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| invalid_amount(input))? * 10,
        _ => frac.parse().map_err(|_| invalid_amount(input))?,
    };

    let cents = whole_units
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac_cents))
        .ok_or_else(|| invalid_amount(input))?;

    if cents <= 0 || cents > MAX_AMOUNT_CENTS {
        return Err(invalid_amount(input));
    }

    Ok(cents)
}

/// Format cents back into a decimal string ("-100.00", "19.99")
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

fn invalid_amount(input: &str) -> AppError {
    AppError::Validation(format!("Invalid amount: '{}'", input.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_whole_and_fractional_amounts() {
        assert_eq!(parse_amount_cents("100").unwrap(), 10_000);
        assert_eq!(parse_amount_cents("19.99").unwrap(), 1_999);
        assert_eq!(parse_amount_cents("0.5").unwrap(), 50);
        assert_eq!(parse_amount_cents("0.05").unwrap(), 5);
        assert_eq!(parse_amount_cents(" 42 ").unwrap(), 4_200);
        assert_eq!(parse_amount_cents(".75").unwrap(), 75);
    }

    #[test]
    fn test_rejects_non_numeric_input() {
        for bad in ["", "abc", "1,50", "12.345", "1.2.3", "NaN", "1e3"] {
            assert!(parse_amount_cents(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert!(parse_amount_cents("0").is_err());
        assert!(parse_amount_cents("0.00").is_err());
        assert!(parse_amount_cents("-5").is_err());
    }

    #[test]
    fn test_rejects_overflowing_amounts() {
        assert!(parse_amount_cents("99999999999999999999").is_err());
    }

    #[test]
    fn test_format_round_trip() {
        assert_eq!(format_cents(10_000), "100.00");
        assert_eq!(format_cents(-10_000), "-100.00");
        assert_eq!(format_cents(1_999), "19.99");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(0), "0.00");
    }
}
