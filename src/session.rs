//! Game session state
//!
//! One session per live game: the current word and its hints, the score,
//! and a cyclic queue of words. Advancing moves the head of the queue to
//! the tail, so repeated play revisits every word.

use std::collections::VecDeque;

use serde::Serialize;
use uuid::Uuid;

use crate::collab::WordSource;
use crate::spelling::spelling_matches;
use crate::word::{Filters, Word, WordContext, WordOrder};
use crate::Result;

/// Running tally of scored attempts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: u32,
    pub incorrect: u32,
}

impl Score {
    /// Total scored attempts
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.correct + self.incorrect
    }
}

/// Mutable state of one play-through
#[derive(Debug)]
pub struct GameSession {
    id: Uuid,
    current_word: Option<Word>,
    current_context: Option<WordContext>,
    score: Score,
    word_queue: VecDeque<Word>,
    filters: Filters,
    order: WordOrder,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Create a session with an empty queue and no constraints
    #[must_use]
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session_id = %id, "game session created");
        Self {
            id,
            current_word: None,
            current_context: None,
            score: Score::default(),
            word_queue: VecDeque::new(),
            filters: Filters::default(),
            order: WordOrder::default(),
        }
    }

    /// Create a session and fill its queue from `source`
    ///
    /// # Errors
    ///
    /// Returns error if the word source cannot be read
    pub fn load(source: &dyn WordSource) -> Result<Self> {
        let mut session = Self::new();
        session.reload(source)?;
        Ok(session)
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn current_word(&self) -> Option<&Word> {
        self.current_word.as_ref()
    }

    #[must_use]
    pub const fn current_context(&self) -> Option<&WordContext> {
        self.current_context.as_ref()
    }

    #[must_use]
    pub const fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub const fn filters(&self) -> &Filters {
        &self.filters
    }

    #[must_use]
    pub const fn order(&self) -> WordOrder {
        self.order
    }

    /// Number of words in the rotation
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.word_queue.len()
    }

    /// Words in rotation order, head first
    pub fn queued_words(&self) -> impl Iterator<Item = &Word> {
        self.word_queue.iter()
    }

    /// Rotate the queue and make its head the current word
    ///
    /// Returns `None` when the queue is empty, leaving the current word
    /// unchanged. The context of the previous word is dropped; call
    /// [`Self::begin_turn`] once hints for the new word are known.
    pub fn advance(&mut self) -> Option<Word> {
        let word = self.word_queue.pop_front()?;
        self.word_queue.push_back(word.clone());

        if self.current_word.as_ref() != Some(&word) {
            self.current_context = None;
        }
        self.current_word = Some(word.clone());

        tracing::debug!(session_id = %self.id, word = %word, "advanced to next word");
        Some(word)
    }

    /// Attach hints to the current word
    ///
    /// Ignored when `word` is no longer current.
    pub fn begin_turn(&mut self, word: &Word, context: WordContext) {
        if self.current_word.as_ref() == Some(word) {
            self.current_context = Some(context);
        } else {
            tracing::warn!(session_id = %self.id, word = %word, "context for stale word ignored");
        }
    }

    /// Current word together with its hints
    ///
    /// Missing hints fall back to placeholders.
    #[must_use]
    pub fn active_turn(&self) -> Option<(Word, WordContext)> {
        let word = self.current_word.clone()?;
        let context = self
            .current_context
            .clone()
            .unwrap_or_else(WordContext::unavailable);
        Some((word, context))
    }

    /// Score a spelling attempt against `target`
    ///
    /// Every non-empty attempt counts once, including repeats of the same
    /// answer. An empty or whitespace-only attempt is rejected without
    /// scoring; blank answers are never judged.
    pub fn check_spelling(&mut self, attempt: &str, target: &Word) -> bool {
        if attempt.trim().is_empty() {
            return false;
        }

        let correct = spelling_matches(attempt, target.as_str());
        if correct {
            self.score.correct += 1;
        } else {
            self.score.incorrect += 1;
        }

        tracing::info!(
            session_id = %self.id,
            target = %target,
            attempt,
            correct,
            "spelling checked"
        );
        correct
    }

    /// Replace the filters and rebuild the queue
    ///
    /// # Errors
    ///
    /// Returns error if the word source cannot be read; the previous
    /// filters and queue are kept in that case.
    pub fn set_filters(&mut self, filters: Filters, source: &dyn WordSource) -> Result<()> {
        let words = source.load_words(&filters, self.order)?;
        self.filters = filters;
        self.replace_queue(words);
        Ok(())
    }

    /// Replace the order and rebuild the queue
    ///
    /// # Errors
    ///
    /// Returns error if the word source cannot be read; the previous
    /// order and queue are kept in that case.
    pub fn set_order(&mut self, order: WordOrder, source: &dyn WordSource) -> Result<()> {
        let words = source.load_words(&self.filters, order)?;
        self.order = order;
        self.replace_queue(words);
        Ok(())
    }

    /// Rebuild the queue with the current filters and order
    ///
    /// # Errors
    ///
    /// Returns error if the word source cannot be read
    pub fn reload(&mut self, source: &dyn WordSource) -> Result<()> {
        let words = source.load_words(&self.filters, self.order)?;
        self.replace_queue(words);
        Ok(())
    }

    /// Clear the current word and its hints
    pub fn reset(&mut self) {
        self.current_word = None;
        self.current_context = None;
    }

    fn replace_queue(&mut self, words: Vec<Word>) {
        self.word_queue = words.into();
        tracing::info!(
            session_id = %self.id,
            words = self.word_queue.len(),
            filters = ?self.filters,
            order = self.order.as_str(),
            "word queue rebuilt"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::FilterMetadata;

    /// Word source over a fixed list; filters select by a `list` tag
    struct FixedSource {
        words: Vec<(&'static str, &'static str)>,
    }

    impl WordSource for FixedSource {
        fn load_words(&self, filters: &Filters, order: WordOrder) -> Result<Vec<Word>> {
            let mut words: Vec<Word> = self
                .words
                .iter()
                .filter(|(_, list)| filters.list.as_deref().is_none_or(|l| l == *list))
                .filter_map(|(w, _)| Word::parse(w))
                .collect();
            if order == WordOrder::Alphabetical {
                words.sort_by_key(|w| w.as_str().to_lowercase());
            }
            Ok(words)
        }

        fn filter_metadata(&self) -> Result<FilterMetadata> {
            Ok(FilterMetadata::default())
        }
    }

    fn source() -> FixedSource {
        FixedSource {
            words: vec![("cat", "1B"), ("apple", "1B"), ("bee", "2B")],
        }
    }

    fn word(w: &str) -> Word {
        Word::parse(w).unwrap()
    }

    #[test]
    fn advance_on_empty_queue() {
        let mut session = GameSession::new();
        assert!(session.advance().is_none());
        assert!(session.current_word().is_none());
    }

    #[test]
    fn advance_rotates() {
        let mut session = GameSession::load(&source()).unwrap();
        let seen: Vec<String> = (0..4)
            .map(|_| session.advance().unwrap().to_string())
            .collect();
        assert_eq!(seen, ["cat", "apple", "bee", "cat"]);
        assert_eq!(session.word_count(), 3);
        assert_eq!(session.current_word().unwrap().as_str(), "cat");
    }

    #[test]
    fn context_follows_current_word() {
        let mut session = GameSession::load(&source()).unwrap();
        let cat = session.advance().unwrap();
        session.begin_turn(&cat, WordContext {
            meaning: Some("a small feline".to_string()),
            ..WordContext::default()
        });
        let (w, ctx) = session.active_turn().unwrap();
        assert_eq!(w, cat);
        assert_eq!(ctx.meaning(), "a small feline");

        // Stale context is rejected
        session.advance();
        session.begin_turn(&cat, WordContext::default());
        let (w, ctx) = session.active_turn().unwrap();
        assert_eq!(w.as_str(), "apple");
        assert_eq!(ctx, WordContext::unavailable());
    }

    #[test]
    fn check_spelling_scores_every_call() {
        let mut session = GameSession::new();
        let apple = word("apple");

        assert!(session.check_spelling("apple", &apple));
        assert!(session.check_spelling("apple", &apple));
        assert!(!session.check_spelling("aple", &apple));
        assert_eq!(session.score(), Score { correct: 2, incorrect: 1 });
        assert_eq!(session.score().attempts(), 3);
    }

    #[test]
    fn empty_attempt_not_scored() {
        let mut session = GameSession::new();
        assert!(!session.check_spelling("", &word("apple")));
        assert!(!session.check_spelling("  \t", &word("apple")));
        assert_eq!(session.score(), Score::default());
        assert!(session.check_spelling(" A p p l e ", &word("apple")));
        assert_eq!(session.score().correct, 1);
    }

    #[test]
    fn filters_and_order_rebuild_queue() {
        let src = source();
        let mut session = GameSession::load(&src).unwrap();
        let current = session.advance().unwrap();

        session
            .set_filters(Filters::new(None, Some("1B".to_string()), None), &src)
            .unwrap();
        assert_eq!(session.word_count(), 2);

        session.set_order(WordOrder::Alphabetical, &src).unwrap();
        let queued: Vec<&str> = session.queued_words().map(Word::as_str).collect();
        assert_eq!(queued, ["apple", "cat"]);

        // In-flight turn untouched
        assert_eq!(session.current_word(), Some(&current));
        assert_eq!(session.order(), WordOrder::Alphabetical);
        assert_eq!(session.filters().list.as_deref(), Some("1B"));
    }

    #[test]
    fn reset_clears_turn_but_keeps_score() {
        let mut session = GameSession::load(&source()).unwrap();
        let w = session.advance().unwrap();
        session.check_spelling("nope", &w);
        session.reset();
        assert!(session.current_word().is_none());
        assert!(session.current_context().is_none());
        assert_eq!(session.score().incorrect, 1);
    }
}
