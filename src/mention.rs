//! Mention stripping for quote text.
#![allow(dead_code)]

use regex::Regex;
use std::sync::OnceLock;

fn mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Matches "@name" and "@name(123456)" tokens, with western or
    // full-width parentheses around the numeric id.
    RE.get_or_init(|| Regex::new(r"@[^@\s（）()]+(?:[（(]\d{5,}[）)])?").unwrap())
}

/// Remove @-mentions from quote text and collapse leftover whitespace.
/// Applied before storage and rendering so mention markup never ends up
/// on a card.
pub fn strip_mentions(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let stripped = mention_re().replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_plain_mentions() {
        assert_eq!(strip_mentions("@alice hello there"), "hello there");
        assert_eq!(strip_mentions("hello @bob there"), "hello there");
    }

    #[test]
    fn strips_mentions_with_numeric_id() {
        assert_eq!(strip_mentions("@alice(123456789) said hi"), "said hi");
        assert_eq!(strip_mentions("@alice（123456789） said hi"), "said hi");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(strip_mentions("a   @x  b\n c"), "a b c");
        assert_eq!(strip_mentions("   "), "");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(strip_mentions("no mentions here"), "no mentions here");
    }

    #[test]
    fn email_like_text_keeps_local_part() {
        // Only the @-token is removed, surrounding text survives.
        assert_eq!(strip_mentions("mail me at foo@bar.com please"), "mail me at foo please");
    }
}
