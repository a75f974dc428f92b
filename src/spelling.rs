//! Spelling validation

/// Punctuation that speech recognizers insert and that nobody spells aloud
///
/// Transcripts replace these with spaces, so targets such as "x-ray" are
/// compared without them.
pub const SPOKEN_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '-'];

/// Compare a spelling attempt against the target word
///
/// Whitespace, case and [`SPOKEN_PUNCTUATION`] are ignored on both sides.
/// An empty attempt never matches. A whitespace-only attempt counts as
/// empty on purpose, so a blank answer is never judged.
#[must_use]
pub fn spelling_matches(attempt: &str, target: &str) -> bool {
    if attempt.trim().is_empty() {
        return false;
    }
    normalize(attempt) == normalize(target)
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !SPOKEN_PUNCTUATION.contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_spaces_and_case() {
        assert!(spelling_matches(" A p p l e ", "apple"));
        assert!(spelling_matches("ICECREAM", "ice cream"));
    }

    #[test]
    fn empty_never_matches() {
        assert!(!spelling_matches("", "apple"));
        assert!(!spelling_matches("   ", ""));
    }

    #[test]
    fn ignores_hyphens_in_target() {
        assert!(spelling_matches("xray", "X-ray"));
        assert!(spelling_matches("w e l l b e i n g", "well-being"));
        assert!(!spelling_matches("xrey", "x-ray"));
    }

    #[test]
    fn different_letters_do_not_match() {
        assert!(!spelling_matches("aple", "apple"));
        assert!(!spelling_matches("applee", "apple"));
    }
}
