//! Line classification for `key = value` text
//!
//! A line is split on its first `=`; key and value are trimmed of ASCII
//! whitespace, so values may themselves contain `=` (timezone rules do).
//! Lines starting with `#` after leading whitespace are comments. An empty
//! value is a valid pair; whether it is a valid *value* is up to the key.

/// One classified input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Empty or whitespace only
    Blank,
    /// `#` comment
    Comment,
    /// `key = value`
    Pair { key: &'a str, value: &'a str },
    /// Anything else (no `=`, or nothing before it)
    Malformed,
}

/// Classify a single line; a trailing `\r` is ignored
pub fn parse_line(line: &str) -> Line<'_> {
    let line = line.strip_suffix('\r').unwrap_or(line).trim();
    if line.is_empty() {
        return Line::Blank;
    }
    if line.starts_with('#') {
        return Line::Comment;
    }
    match line.split_once('=') {
        Some((key, value)) => {
            let key = key.trim();
            if key.is_empty() {
                Line::Malformed
            } else {
                Line::Pair { key, value: value.trim() }
            }
        }
        None => Line::Malformed,
    }
}

/// Classified lines of `text` with 1-based line numbers
pub fn lines(text: &str) -> impl Iterator<Item = (usize, Line<'_>)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.lines().enumerate().map(|(i, line)| (i + 1, parse_line(line)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_lines() {
        assert_eq!(parse_line(""), Line::Blank);
        assert_eq!(parse_line("   \t"), Line::Blank);
        assert_eq!(parse_line("# interval = 5"), Line::Comment);
        assert_eq!(parse_line("  #x"), Line::Comment);
        assert_eq!(parse_line("interval"), Line::Malformed);
        assert_eq!(parse_line("= 5"), Line::Malformed);
    }

    #[test]
    fn splits_on_first_equals() {
        assert_eq!(
            parse_line(" timezone = CET-1CEST,M3.5.0,M10.5.0/3 "),
            Line::Pair { key: "timezone", value: "CET-1CEST,M3.5.0,M10.5.0/3" }
        );
        assert_eq!(parse_line("a=b=c"), Line::Pair { key: "a", value: "b=c" });
        assert_eq!(parse_line("ssid ="), Line::Pair { key: "ssid", value: "" });
    }

    #[test]
    fn crlf_and_bom() {
        let text = "\u{feff}quality = 12\r\n\r\n# note\r\nbroken\r\n";
        let parsed: Vec<_> = lines(text).collect();
        assert_eq!(
            parsed,
            vec![
                (1, Line::Pair { key: "quality", value: "12" }),
                (2, Line::Blank),
                (3, Line::Comment),
                (4, Line::Malformed),
            ]
        );
    }
}
