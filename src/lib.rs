//! Spelling Bee - voice-driven spelling practice
//!
//! The server speaks a word, listens for the spoken answer and judges it.
//! This library provides:
//! - Turn coordination so the microphone never hears the server's own voice
//! - Utterance classification (hints, pause, repeat, spelling attempts)
//! - Spelling validation and session scoring
//! - Adapters for TTS, STT, word context lookup and the sqlite word list
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Browser client (UI)                  │
//! └────────────────────┬────────────────────────────────┘
//!                      │ HTTP
//! ┌────────────────────▼────────────────────────────────┐
//! │                    API layer                         │
//! │  next word │ repeat │ listen │ filters │ wait       │
//! └───────┬──────────────┬───────────────┬──────────────┘
//!         │              │               │
//! ┌───────▼──────┐ ┌─────▼──────┐ ┌──────▼─────────────┐
//! │ GameSession  │ │ Turn       │ │ Utterance          │
//! │ queue, score │ │ Coordinator│ │ classifier         │
//! └───────┬──────┘ └─────┬──────┘ └────────────────────┘
//!         │              │
//! ┌───────▼──────────────▼──────────────────────────────┐
//! │   WordSource │ Speaker │ Transcriber │ Context       │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod collab;
pub mod config;
pub mod context;
pub mod daemon;
pub mod error;
pub mod session;
pub mod spelling;
pub mod turn;
pub mod utterance;
pub mod voice;
pub mod word;
pub mod words;

pub use collab::{ContextProvider, Speaker, Transcriber, WordSource};
pub use config::Config;
pub use context::{LlmContextProvider, StaticContextProvider};
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use session::{GameSession, Score};
pub use spelling::spelling_matches;
pub use turn::{SpeechHandle, TurnCoordinator};
pub use utterance::{HintKind, Utterance, classify, interpret};
pub use word::{FilterMetadata, Filters, Word, WordContext, WordOrder};
pub use words::{DbPool, SqliteWordSource};
