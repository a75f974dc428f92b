//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use spelling_bee::api::{ApiServer, ApiServerBuilder};
use spelling_bee::words::{self, WordEntry};
use spelling_bee::{
    ContextProvider, Error, GameSession, Result, Speaker, SqliteWordSource, Transcriber, Word,
    WordContext, WordSource,
};

/// Records everything spoken
#[derive(Default)]
pub struct FakeSpeaker {
    spoken: Mutex<Vec<String>>,
    delay: Duration,
}

impl FakeSpeaker {
    /// Speaker whose playback takes `delay`
    #[must_use]
    pub fn slow(delay: Duration) -> Self {
        Self {
            spoken: Mutex::new(Vec::new()),
            delay,
        }
    }

    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().expect("speaker lock").clone()
    }
}

#[async_trait]
impl Speaker for FakeSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.spoken.lock().expect("speaker lock").push(text.to_string());
        Ok(())
    }
}

/// Replays scripted transcriptions in order; silence once exhausted
#[derive(Default)]
pub struct ScriptedTranscriber {
    script: Mutex<VecDeque<Result<Option<String>>>>,
}

impl ScriptedTranscriber {
    #[must_use]
    pub fn new(script: Vec<Result<Option<String>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }

    /// Transcriber that hears each phrase in turn
    #[must_use]
    pub fn hearing(phrases: &[&str]) -> Self {
        Self::new(phrases.iter().map(|p| Ok(Some((*p).to_string()))).collect())
    }

    /// Transcriber whose backend is down
    #[must_use]
    pub fn failing() -> Self {
        Self::new(vec![Err(Error::Stt("connection refused".to_string()))])
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, _max_wait: Duration) -> Result<Option<String>> {
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

/// Fixed hints for every word
pub struct FakeContext;

#[async_trait]
impl ContextProvider for FakeContext {
    async fn context(&self, word: &Word) -> WordContext {
        WordContext {
            meaning: Some(format!("meaning of {word}")),
            origin: Some("Old English".to_string()),
            sentence: None,
        }
    }
}

/// In-memory word list with tagged entries
#[must_use]
pub fn word_source(entries: &[(&str, &str, &str, &str)]) -> SqliteWordSource {
    let source = SqliteWordSource::new(words::init_memory().expect("failed to init test db"));
    for (word, year, list, difficulty) in entries {
        source
            .insert(&WordEntry {
                word: (*word).to_string(),
                year: Some((*year).to_string()),
                list: Some((*list).to_string()),
                difficulty: Some((*difficulty).to_string()),
            })
            .expect("failed to insert word");
    }
    source
}

/// Default word list used by the API tests
#[must_use]
pub fn default_words() -> SqliteWordSource {
    word_source(&[
        ("apple", "2024", "1B", "Easy"),
        ("banana", "2024", "2B", "Easy"),
        ("cherry", "2025", "1B", "Hard"),
    ])
}

/// Build a server over fakes, with words in alphabetical order
pub fn test_server(
    words: SqliteWordSource,
    speaker: Arc<FakeSpeaker>,
    transcriber: ScriptedTranscriber,
) -> ApiServer {
    let words: Arc<dyn WordSource> = Arc::new(words);
    let mut session = GameSession::new();
    session
        .set_order(spelling_bee::WordOrder::Alphabetical, words.as_ref())
        .expect("failed to load words");

    ApiServerBuilder::new(
        session,
        speaker,
        Arc::new(transcriber),
        Arc::new(FakeContext),
        words,
    )
    .listen_duration(Duration::from_millis(10))
    .build()
}
