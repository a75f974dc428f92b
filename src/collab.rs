//! Capabilities the game consumes from the outside world
//!
//! Each trait has a production adapter (see `voice`, `context`, `words`)
//! and can be replaced with a fake for deterministic tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::word::{FilterMetadata, Filters, Word, WordContext, WordOrder};
use crate::Result;

/// Produces audible speech
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Speak `text` and return once playback has finished
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Records ambient audio and recognizes speech in it
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Listen for up to `max_wait` and return the recognized text
    ///
    /// `Ok(None)` means silence or unintelligible audio.
    ///
    /// # Errors
    ///
    /// Returns error if recording or the recognition backend fails
    async fn transcribe(&self, max_wait: Duration) -> Result<Option<String>>;
}

/// Looks up hint data for a word
///
/// Implementations never fail: on any internal error they return
/// [`WordContext::unavailable`].
#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn context(&self, word: &Word) -> WordContext;
}

/// Filtered, ordered access to the word list
pub trait WordSource: Send + Sync {
    /// Load words matching `filters` in the requested order
    ///
    /// # Errors
    ///
    /// Returns error if the underlying store cannot be read
    fn load_words(&self, filters: &Filters, order: WordOrder) -> Result<Vec<Word>>;

    /// Distinct filter values present in the word list
    ///
    /// # Errors
    ///
    /// Returns error if the underlying store cannot be read
    fn filter_metadata(&self) -> Result<FilterMetadata>;
}
