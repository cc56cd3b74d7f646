//! Date coercion to the canonical `dd/mm/yyyy` form.

use chrono::NaiveDate;

use super::patterns::WHITESPACE_RUN;

/// Canonical output format for every date field.
pub const CANONICAL_DATE_FORMAT: &str = "%d/%m/%Y";

/// Formats tried by the normalizer when a field arrives from a strategy or
/// the fallback. Day-first layouts always precede anything ambiguous.
pub const GENERIC_DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%d-%b-%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%d %B %Y",
];

/// Parse `raw` with each format in order and return the first success in
/// canonical form. When nothing parses, the input comes back unchanged.
pub fn parse_date<S: AsRef<str>>(raw: &str, formats: &[S]) -> String {
    match try_parse_date(raw, formats) {
        Some(date) => format_date(date),
        None => raw.to_string(),
    }
}

/// Parse `raw` with each format in order; first success wins.
pub fn try_parse_date<S: AsRef<str>>(raw: &str, formats: &[S]) -> Option<NaiveDate> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return None;
    }

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt.as_ref()).ok())
}

/// Render a date in canonical form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

/// True when `s` is already a canonical `dd/mm/yyyy` date.
pub fn is_canonical_date(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, CANONICAL_DATE_FORMAT).is_ok()
}

// OCR output often carries doubled spaces or a stray trailing period.
fn clean(raw: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(raw.trim(), " ");
    collapsed
        .trim_end_matches(['.', ',', ';'])
        .trim()
        .to_string()
}
