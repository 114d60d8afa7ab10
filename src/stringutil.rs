//! Text helpers shared by search/matching and plain-text export.

/// Normalize `text` for fuzzy comparison: Unicode-decompose, drop combining
/// marks, and lowercase. `"Café"` and `"cafe"` normalize to the same string.
pub fn normalize(text: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn is_combining_mark(c: char) -> bool {
    matches!(c as u32,
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F)
}

/// Case/accent-insensitive substring search.
pub fn contains(haystack: &str, needle: &str) -> bool {
    normalize(haystack).contains(&normalize(needle))
}

/// Escape `\`, tab, and newline the way the plain-text export format needs,
/// so a field that happens to contain one of those bytes still round-trips
/// through a single tab-delimited line.
pub fn nt_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse [`nt_escape`]: turn `\\`, `\t`, `\n` sequences back into literal
/// backslash, tab, and newline. A trailing lone backslash (no escape code
/// following it) is passed through unchanged.
pub fn nt_unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_strips_accents() {
        assert_eq!(normalize("Café"), "cafe");
    }

    #[test]
    fn contains_is_accent_and_case_insensitive() {
        assert!(contains("My Café Account", "cafe"));
        assert!(contains("MY CAFE ACCOUNT", "Café"));
        assert!(!contains("my cafe account", "bank"));
    }

    #[test]
    fn nt_escape_round_trippable_chars() {
        assert_eq!(nt_escape("a\\b\tc\nd"), "a\\\\b\\tc\\nd");
    }

    #[test]
    fn nt_escape_leaves_plain_text_untouched() {
        assert_eq!(nt_escape("plain text"), "plain text");
    }

    #[test]
    fn nt_unescape_reverses_nt_escape() {
        let original = "a\\b\tc\nd";
        assert_eq!(nt_unescape(&nt_escape(original)), original);
    }

    #[test]
    fn nt_unescape_passes_through_lone_trailing_backslash() {
        assert_eq!(nt_unescape("abc\\"), "abc\\");
    }
}
