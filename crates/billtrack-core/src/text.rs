//! Turns per-page text from the text-extraction service into one document string.

/// Join page texts in order, skipping pages with no text.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|p| p.as_ref())
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split raw text-layer output on form-feed page breaks.
pub fn split_pages(raw: &str) -> Vec<&str> {
    raw.split('\u{000c}').collect()
}

/// Canonical line structure for every strategy.
///
/// Line endings become `\n`, non-breaking and other exotic spaces become plain
/// spaces, trailing whitespace is removed from each line and leading/trailing
/// blank lines are dropped.
pub fn normalize_document(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let lines: Vec<String> = unified
        .lines()
        .map(|line| {
            line.chars()
                .map(|c| match c {
                    '\u{00a0}' | '\u{2007}' | '\u{202f}' | '\u{2009}' | '\t' => ' ',
                    other => other,
                })
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect();

    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());

    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e].join("\n"),
        _ => String::new(),
    }
}

/// Pages to a single normalized document string.
pub fn document_from_pages<S: AsRef<str>>(pages: &[S]) -> String {
    normalize_document(&join_pages(pages))
}

/// Keep at most `max` characters; 0 means no limit.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    if max == 0 {
        return text;
    }
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_skips_empty() {
        let pages = ["Page one", "   ", "Page three"];
        assert_eq!(join_pages(&pages), "Page one\nPage three");
    }

    #[test]
    fn test_normalize_document() {
        let raw = "\r\n\r\nInvoice No:\u{00a0}1001   \r\nAmount\t12.00\r\n\r\n";
        assert_eq!(normalize_document(raw), "Invoice No: 1001\nAmount 12.00");
    }

    #[test]
    fn test_normalize_blank() {
        assert_eq!(normalize_document("  \n \n"), "");
    }

    #[test]
    fn test_split_pages() {
        assert_eq!(split_pages("a\u{000c}b"), vec!["a", "b"]);
        assert_eq!(split_pages("single"), vec!["single"]);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("héllo", 0), "héllo");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
