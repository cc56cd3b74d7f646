//! Common regex patterns shared by coercion and strategies.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Runs of whitespace, including line breaks from wrapped labels
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // Currency symbols and ISO codes seen on supplier documents
    pub static ref CURRENCY_TOKEN: Regex = Regex::new(
        r"(?i)(?:S\$|US\$|\bSGD\b|\bUSD\b|\bMYR\b|\bRM\b|\bEUR\b|\bGBP\b|[$€£¥])"
    ).unwrap();

    // Credit marker suffix on statement amounts ("1,200.00 CR")
    pub static ref CREDIT_SUFFIX: Regex = Regex::new(r"(?i)\s*CR\.?$").unwrap();

    // 1,234,567 style grouping
    pub static ref THOUSANDS_COMMA: Regex = Regex::new(r"^\d{1,3}(?:,\d{3})+$").unwrap();

    // 1.234.567 style grouping
    pub static ref THOUSANDS_DOT: Regex = Regex::new(r"^\d{1,3}(?:\.\d{3})+$").unwrap();

    // A money-looking token: optional sign/parentheses/symbol, two decimals
    pub static ref MONEY_TOKEN: Regex = Regex::new(
        r"\(?-?(?:S\$|US\$|\$)?\s?\d{1,3}(?:,\d{3})*\.\d{2}\)?|\(?-?(?:S\$|US\$|\$)?\d+\.\d{2}\)?"
    ).unwrap();
}
