//! Utterance classification
//!
//! Turns one transcribed block of user speech into what the user meant:
//! a hint request, a pause, a repeat request or a spelling attempt.
//!
//! Expected answers follow the pattern `<word> <spelled letters> <word>`,
//! e.g. "apple a p p l e apple". The letters between the leading and
//! trailing target word (the framed span) are joined without separators.
//!
//! Checks run in a fixed priority order and the first match wins:
//! hint keywords, then pause keywords, then standalone repeat phrases,
//! then spelling extraction.

use serde::Serialize;

use crate::spelling::SPOKEN_PUNCTUATION;
use crate::word::Word;
use crate::Result;

/// Keywords requesting the meaning of the word
const MEANING_KEYWORDS: &[&str] = &["meaning", "definition"];

/// Keywords requesting the origin of the word
const ORIGIN_KEYWORDS: &[&str] = &["origin", "root"];

/// Keywords requesting an example sentence
const SENTENCE_KEYWORDS: &[&str] = &["sentence", "example"];

/// Keywords that pause the game
const PAUSE_KEYWORDS: &[&str] = &["pause", "stop", "wait", "hold on"];

/// Filler removed before matching standalone commands
const POLITE_FILLER: &[&str] = &["please", "can you"];

/// Standalone phrases asking to hear the word again
const REPEAT_PHRASES: &[&str] = &[
    "repeat",
    "word again",
    "say the word again",
    "say the word",
    "repeat the word",
    "repeat word",
    "the word",
];

/// Kind of hint requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HintKind {
    Meaning,
    Origin,
    Sentence,
}

impl HintKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Meaning => "meaning",
            Self::Origin => "origin",
            Self::Sentence => "sentence",
        }
    }
}

/// What an utterance means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Utterance {
    /// Nothing was heard
    NoInput,
    /// The user asked for a hint
    Hint(HintKind),
    /// The user asked to pause
    Paused,
    /// The user asked to hear the word again, or only said the word
    RepeatCommand,
    /// The user spelled the word
    SpellingAttempt {
        /// Framed span joined without separators
        text: String,
        /// Framed span joined with single spaces, for display
        heard: String,
    },
    /// The recognition backend failed
    TranscriptionFailed(String),
}

/// Interpret the outcome of a transcription attempt
///
/// Backend failures are kept distinct from silence so callers can tell the
/// user to check the connection rather than to speak up.
#[must_use]
pub fn interpret(transcription: Result<Option<String>>, target: &Word) -> Utterance {
    match transcription {
        Ok(text) => classify(text.as_deref(), target),
        Err(e) => Utterance::TranscriptionFailed(e.to_string()),
    }
}

/// Classify raw transcribed text against the current target word
#[must_use]
pub fn classify(raw_text: Option<&str>, target: &Word) -> Utterance {
    let Some(raw) = raw_text else {
        return Utterance::NoInput;
    };

    let text = normalize_transcript(raw);
    if text.trim().is_empty() {
        return Utterance::NoInput;
    }

    if contains_any(&text, MEANING_KEYWORDS) {
        return Utterance::Hint(HintKind::Meaning);
    }
    if contains_any(&text, ORIGIN_KEYWORDS) {
        return Utterance::Hint(HintKind::Origin);
    }
    if contains_any(&text, SENTENCE_KEYWORDS) {
        return Utterance::Hint(HintKind::Sentence);
    }

    if contains_any(&text, PAUSE_KEYWORDS) {
        return Utterance::Paused;
    }

    if is_repeat_phrase(&text) {
        return Utterance::RepeatCommand;
    }

    extract_spelling(&text, target)
}

/// Lower-case and replace sentence punctuation with spaces
///
/// Punctuating recognizers render spelled letters as "A-P-P-L-E." and
/// wrap the answer in commas. The target word goes through the same
/// mapping so "x-ray" frames as the tokens "x ray".
fn normalize_transcript(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| if SPOKEN_PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

fn is_repeat_phrase(text: &str) -> bool {
    let mut cleaned = text.to_string();
    for filler in POLITE_FILLER {
        cleaned = cleaned.replace(filler, "");
    }
    let cleaned = cleaned.trim();

    REPEAT_PHRASES.iter().any(|phrase| cleaned == *phrase)
}

fn extract_spelling(text: &str, target: &Word) -> Utterance {
    let target = normalize_transcript(target.as_str());
    let frame: Vec<&str> = target.split_whitespace().collect();
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let mut start = 0;
    let mut end = tokens.len();

    if tokens.starts_with(&frame) {
        start = frame.len();
    }
    // The trailing word needs at least one token in front of it
    if tokens.len() > frame.len() && tokens.ends_with(&frame) {
        end = tokens.len() - frame.len();
    }
    let end = end.max(start);

    let span = &tokens[start..end];
    let attempt = span.concat();

    if attempt.is_empty() {
        // Only the word itself was said
        return Utterance::RepeatCommand;
    }

    tracing::debug!(attempt = %attempt, "extracted spelling");

    Utterance::SpellingAttempt {
        text: attempt,
        heard: span.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn word(w: &str) -> Word {
        Word::parse(w).unwrap()
    }

    fn attempt(text: &str, heard: &str) -> Utterance {
        Utterance::SpellingAttempt {
            text: text.to_string(),
            heard: heard.to_string(),
        }
    }

    #[test]
    fn absent_or_empty_is_no_input() {
        let target = word("apple");
        assert_eq!(classify(None, &target), Utterance::NoInput);
        assert_eq!(classify(Some(""), &target), Utterance::NoInput);
        assert_eq!(classify(Some("   "), &target), Utterance::NoInput);
    }

    #[test]
    fn meaning_hint() {
        let target = word("apple");
        for text in [
            "What is the meaning",
            "DEFINITION please",
            "apple definition apple",
            "meaning of the origin",
            "can you give me an example definition",
        ] {
            assert_eq!(
                classify(Some(text), &target),
                Utterance::Hint(HintKind::Meaning),
                "{text}"
            );
        }
    }

    #[test]
    fn origin_hint() {
        let target = word("apple");
        assert_eq!(
            classify(Some("where does it originate"), &target),
            Utterance::Hint(HintKind::Origin)
        );
        assert_eq!(
            classify(Some("what is the root"), &target),
            Utterance::Hint(HintKind::Origin)
        );
        // origin outranks sentence
        assert_eq!(
            classify(Some("origin in a sentence"), &target),
            Utterance::Hint(HintKind::Origin)
        );
    }

    #[test]
    fn sentence_hint() {
        let target = word("apple");
        assert_eq!(
            classify(Some("use it in a sentence"), &target),
            Utterance::Hint(HintKind::Sentence)
        );
        assert_eq!(
            classify(Some("Give me an EXAMPLE"), &target),
            Utterance::Hint(HintKind::Sentence)
        );
    }

    #[test]
    fn hints_outrank_pause() {
        let target = word("apple");
        assert_eq!(
            classify(Some("wait what is the meaning"), &target),
            Utterance::Hint(HintKind::Meaning)
        );
        assert_eq!(
            classify(Some("stop and give an example"), &target),
            Utterance::Hint(HintKind::Sentence)
        );
    }

    #[test]
    fn pause_keywords() {
        let target = word("apple");
        for text in ["pause", "Stop", "wait a second", "hold on", "please stop repeat"] {
            assert_eq!(classify(Some(text), &target), Utterance::Paused, "{text}");
        }
    }

    #[test]
    fn pause_matches_substrings() {
        // Spelled letters of a keyword are not the keyword
        assert_eq!(
            classify(Some("s t o p"), &word("stop")),
            attempt("stop", "s t o p")
        );
        // A keyword inside a longer token still pauses
        assert_eq!(classify(Some("unstoppable"), &word("apple")), Utterance::Paused);
    }

    #[test]
    fn repeat_phrases() {
        let target = word("apple");
        for text in [
            "repeat",
            "Repeat.",
            "word again",
            "say the word again",
            "say the word",
            "repeat the word",
            "repeat word",
            "the word",
            "please repeat the word",
            "can you say the word again please",
        ] {
            assert_eq!(
                classify(Some(text), &target),
                Utterance::RepeatCommand,
                "{text}"
            );
        }
    }

    #[test]
    fn repeat_must_be_standalone() {
        let target = word("apple");
        assert_eq!(
            classify(Some("repeat a p p l e"), &target),
            attempt("repeatapple", "repeat a p p l e")
        );
    }

    #[test]
    fn framed_spelling() {
        let target = word("Apple");
        assert_eq!(
            classify(Some("apple a p p l e apple"), &target),
            attempt("apple", "a p p l e")
        );
    }

    #[test]
    fn leading_word_only() {
        let target = word("apple");
        assert_eq!(
            classify(Some("Apple A P P L E"), &target),
            attempt("apple", "a p p l e")
        );
    }

    #[test]
    fn trailing_word_only() {
        let target = word("apple");
        assert_eq!(
            classify(Some("a p p l e apple"), &target),
            attempt("apple", "a p p l e")
        );
    }

    #[test]
    fn unframed_spelling_keeps_every_token() {
        let target = word("apple");
        assert_eq!(
            classify(Some("a p l e"), &target),
            attempt("aple", "a p l e")
        );
    }

    #[test]
    fn compound_slip_is_concatenated() {
        let target = word("icecream");
        assert_eq!(
            classify(Some("ice cream"), &target),
            attempt("icecream", "ice cream")
        );
    }

    #[test]
    fn hyphenated_target_frames_like_the_transcript() {
        let target = word("X-ray");
        assert_eq!(classify(Some("X-ray"), &target), Utterance::RepeatCommand);
        assert_eq!(classify(Some("x-ray x-ray"), &target), Utterance::RepeatCommand);
        assert_eq!(
            classify(Some("x-ray x r a y x-ray"), &target),
            attempt("xray", "x r a y")
        );
        assert_eq!(
            classify(Some("X-ray. X-R-A-Y."), &target),
            attempt("xray", "x r a y")
        );
    }

    #[test]
    fn multi_word_target_frames_as_a_phrase() {
        let target = word("ice cream");
        assert_eq!(classify(Some("ice cream"), &target), Utterance::RepeatCommand);
        assert_eq!(
            classify(Some("ice cream i c e c r e a m ice cream"), &target),
            attempt("icecream", "i c e c r e a m")
        );
    }

    #[test]
    fn only_the_word_is_a_repeat() {
        let target = word("apple");
        assert_eq!(classify(Some("apple"), &target), Utterance::RepeatCommand);
        assert_eq!(classify(Some("Apple apple"), &target), Utterance::RepeatCommand);
    }

    #[test]
    fn punctuated_transcript() {
        let target = word("apple");
        assert_eq!(
            classify(Some("Apple, A-P-P-L-E, apple."), &target),
            attempt("apple", "a p p l e")
        );
    }

    #[test]
    fn backend_failure_is_distinct() {
        let target = word("apple");
        let outcome = interpret(Err(Error::Stt("network down".to_string())), &target);
        assert!(matches!(outcome, Utterance::TranscriptionFailed(msg) if msg.contains("network down")));
        assert_eq!(interpret(Ok(None), &target), Utterance::NoInput);
        assert_eq!(
            interpret(Ok(Some("repeat".to_string())), &target),
            Utterance::RepeatCommand
        );
    }
}
