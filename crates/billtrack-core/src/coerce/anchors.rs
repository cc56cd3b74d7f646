//! Anchor helpers: pull a labelled value out of document text.
//!
//! Every helper returns `None` instead of failing so strategies stay total.

use regex::Regex;

use super::patterns::MONEY_TOKEN;

/// First capture group of the first match, trimmed. Empty captures are `None`.
pub fn capture(text: &str, re: &Regex) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First capture group of the last match in the document.
pub fn capture_last(text: &str, re: &Regex) -> Option<String> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|s| !s.is_empty())
        .last()
}

/// Try each pattern in order; the first one that captures wins.
pub fn first_capture(text: &str, patterns: &[&Regex]) -> Option<String> {
    patterns.iter().find_map(|re| capture(text, re))
}

/// The last money-looking token on a line (`"1,234.56"`, `"$12.00"`, `"(5.00)"`).
pub fn last_money_token(line: &str) -> Option<String> {
    MONEY_TOKEN
        .find_iter(line)
        .last()
        .map(|m| m.as_str().trim().to_string())
}

/// Drop thousands separators, leaving the value as text for later coercion.
pub fn strip_grouping(s: &str) -> String {
    s.replace(',', "")
}
