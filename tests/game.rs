//! Classifier, validator and session working together

use spelling_bee::{
    GameSession, HintKind, Utterance, Word, WordContext, WordOrder, classify, spelling_matches,
};

mod common;
use common::default_words;

fn word(s: &str) -> Word {
    Word::parse(s).unwrap()
}

fn session() -> GameSession {
    let words = default_words();
    let mut session = GameSession::new();
    session.set_order(WordOrder::Alphabetical, &words).unwrap();
    session
}

/// Classify and score the way the listen endpoint does
fn answer(session: &mut GameSession, heard: Option<&str>) -> Utterance {
    let (target, _) = session.active_turn().unwrap();
    let utterance = classify(heard, &target);
    if let Utterance::SpellingAttempt { text, .. } = &utterance {
        session.check_spelling(text, &target);
    }
    utterance
}

#[test]
fn test_framed_spelling_scores_once() {
    let mut session = session();
    let target = session.advance().unwrap();
    session.begin_turn(&target, WordContext::unavailable());

    let utterance = answer(&mut session, Some("apple a p p l e apple"));
    assert_eq!(
        utterance,
        Utterance::SpellingAttempt {
            text: "apple".to_string(),
            heard: "a p p l e".to_string(),
        }
    );
    assert_eq!(session.score().correct, 1);
    assert_eq!(session.score().incorrect, 0);
}

#[test]
fn test_commands_never_score() {
    let mut session = session();
    let target = session.advance().unwrap();
    session.begin_turn(&target, WordContext::unavailable());

    assert_eq!(answer(&mut session, Some("repeat")), Utterance::RepeatCommand);
    assert_eq!(
        answer(&mut session, Some("please repeat the word")),
        Utterance::RepeatCommand
    );
    assert_eq!(answer(&mut session, Some("")), Utterance::NoInput);
    assert_eq!(answer(&mut session, None), Utterance::NoInput);
    assert_eq!(
        answer(&mut session, Some("can I get the DEFINITION")),
        Utterance::Hint(HintKind::Meaning)
    );
    assert_eq!(answer(&mut session, Some("wait")), Utterance::Paused);

    assert_eq!(session.score().attempts(), 0);
}

#[test]
fn test_validator_edge_cases() {
    assert!(!spelling_matches("", "apple"));
    assert!(spelling_matches(" A p p l e ", "apple"));
    assert!(spelling_matches("icecream", "Ice Cream"));
    assert!(!spelling_matches("aple", "apple"));
}

#[test]
fn test_queue_cycles_and_filters_keep_current_word() {
    let words = default_words();
    let mut session = session();

    let first = session.advance().unwrap();
    assert_eq!(first, word("apple"));
    session.begin_turn(&first, WordContext::unavailable());

    session
        .set_filters(
            spelling_bee::Filters::new(Some("2025".to_string()), None, None),
            &words,
        )
        .unwrap();
    assert_eq!(session.word_count(), 1);
    assert_eq!(session.current_word(), Some(&first));

    assert_eq!(session.advance(), Some(word("cherry")));
    assert_eq!(session.advance(), Some(word("cherry")));

    session.reset();
    assert!(session.current_word().is_none());
    assert!(session.active_turn().is_none());
}
