//! Amount coercion to signed decimals.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::str::FromStr;

use super::patterns::{CREDIT_SUFFIX, CURRENCY_TOKEN, THOUSANDS_COMMA, THOUSANDS_DOT};
use crate::models::record::RawAmount;

/// Coerce a raw amount to a decimal. Non-numeric residue yields `None`.
pub fn parse_amount(raw: &RawAmount) -> Option<Decimal> {
    match raw {
        RawAmount::Text(s) => parse_amount_str(s),
        RawAmount::Number(n) if n.is_finite() => Decimal::from_f64(*n),
        RawAmount::Number(_) => None,
    }
}

/// Parse a formatted amount such as `"$1,234.56"`, `"SGD 1 234.56"`,
/// `"(120.00)"` or `"1.234,56"`.
pub fn parse_amount_str(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut negative = false;
    let mut body = trimmed.to_string();

    if CREDIT_SUFFIX.is_match(&body) {
        negative = true;
        body = CREDIT_SUFFIX.replace(&body, "").into_owned();
    }

    body = CURRENCY_TOKEN.replace_all(&body, "").into_owned();
    body.retain(|c| !c.is_whitespace());

    if body.starts_with('(') && body.ends_with(')') {
        negative = true;
        body = body[1..body.len() - 1].to_string();
    }
    if let Some(rest) = body.strip_prefix('-') {
        negative = true;
        body = rest.to_string();
    }
    if let Some(rest) = body.strip_suffix('-') {
        negative = true;
        body = rest.to_string();
    }

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
        return None;
    }

    let normalized = resolve_separators(&body)?;
    let value = Decimal::from_str(&normalized).ok()?;

    Some(if negative { -value } else { value })
}

// Decide which of ',' and '.' is the decimal separator.
fn resolve_separators(body: &str) -> Option<String> {
    let has_comma = body.contains(',');
    let has_dot = body.contains('.');

    let normalized = match (has_comma, has_dot) {
        (true, true) => {
            let comma_pos = body.rfind(',');
            let dot_pos = body.rfind('.');
            match (comma_pos, dot_pos) {
                (Some(c), Some(d)) if c > d => body.replace('.', "").replace(',', "."),
                _ => body.replace(',', ""),
            }
        }
        (true, false) => {
            if THOUSANDS_COMMA.is_match(body) {
                body.replace(',', "")
            } else if body.matches(',').count() == 1 {
                body.replace(',', ".")
            } else {
                return None;
            }
        }
        (false, true) => {
            if body.matches('.').count() == 1 {
                body.to_string()
            } else if THOUSANDS_DOT.is_match(body) {
                body.replace('.', "")
            } else {
                return None;
            }
        }
        (false, false) => body.to_string(),
    };

    Some(normalized)
}

/// Format an amount with comma grouping and two decimals (`1,234.56`).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_separators_and_symbols_removed() {
        let plain = parse_amount_str("1234.56");
        assert_eq!(plain, Some(dec("1234.56")));

        for input in ["$1,234.56", "S$1,234.56", "SGD 1,234.56", "1,234.56 SGD", "US$ 1,234.56", "1 234.56"] {
            assert_eq!(parse_amount_str(input), plain, "input {input}");
        }
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(parse_amount_str("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount_str("1234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount_str("12,345"), Some(dec("12345")));
        assert_eq!(parse_amount_str("1.234.567"), Some(dec("1234567")));
    }

    #[test]
    fn test_negative_forms() {
        assert_eq!(parse_amount_str("(120.00)"), Some(dec("-120.00")));
        assert_eq!(parse_amount_str("-$120.00"), Some(dec("-120.00")));
        assert_eq!(parse_amount_str("120.00-"), Some(dec("-120.00")));
        assert_eq!(parse_amount_str("120.00 CR"), Some(dec("-120.00")));
    }

    #[test]
    fn test_non_numeric_is_none() {
        assert_eq!(parse_amount_str(""), None);
        assert_eq!(parse_amount_str("N/A"), None);
        assert_eq!(parse_amount_str("12.34abc"), None);
        assert_eq!(parse_amount_str("$"), None);
        assert_eq!(parse_amount_str("1.2.3"), None);
    }

    #[test]
    fn test_number_amounts() {
        assert_eq!(parse_amount(&RawAmount::Number(1234.5)), Some(dec("1234.5")));
        assert_eq!(parse_amount(&RawAmount::Number(f64::NAN)), None);
        assert_eq!(parse_amount(&RawAmount::from("$99.90")), Some(dec("99.90")));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("1234.56")), "1,234.56");
        assert_eq!(format_amount(dec("12345678.9")), "12,345,678.90");
        assert_eq!(format_amount(dec("-120")), "-120.00");
        assert_eq!(format_amount(dec("0")), "0.00");
    }
}
