//! Daemon - wires configuration to the game server
//!
//! Builds the speaker, transcriber, hint provider and word source named by
//! the configuration, loads the word queue and serves the HTTP API until
//! interrupted.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::api::ApiServerBuilder;
use crate::collab::{ContextProvider, Speaker, Transcriber, WordSource};
use crate::config::{ApiKeys, ContextConfig, SpeakerBackend, VoiceConfig};
use crate::context::{
    DEFAULT_CONTEXT_MODEL, DEFAULT_CONTEXT_URL, LlmContextProvider, OPENAI_CONTEXT_MODEL,
    OPENAI_CONTEXT_URL, StaticContextProvider,
};
use crate::session::GameSession;
use crate::voice::{
    LogSpeaker, MicrophoneTranscriber, SpeechToText, SttProvider, SynthesizedSpeaker,
    SystemSpeaker, TextToSpeech, UnavailableTranscriber,
};
use crate::words::{self, DbPool, SqliteWordSource};
use crate::{Config, Error, Result};

/// The spelling bee daemon
pub struct Daemon {
    config: Config,
    db: DbPool,
}

fn rewrap(key: &SecretString) -> SecretString {
    SecretString::from(key.expose_secret().to_owned())
}

/// Build the speaker named by the configuration
///
/// # Errors
///
/// Returns error if a TTS backend is selected without its API key
pub fn build_speaker(voice: &VoiceConfig, keys: &ApiKeys) -> Result<Arc<dyn Speaker>> {
    let speaker: Arc<dyn Speaker> = match voice.speaker {
        SpeakerBackend::System => {
            let speaker = match voice.speech_command.as_deref() {
                Some([program, args @ ..]) => SystemSpeaker::new(program.clone(), args.to_vec()),
                _ => SystemSpeaker::platform_default(),
            };
            Arc::new(speaker)
        }
        SpeakerBackend::OpenAI => {
            let key = keys
                .openai
                .as_ref()
                .ok_or_else(|| Error::Config("OPENAI_API_KEY required for the openai speaker".to_string()))?;
            let tts = TextToSpeech::new_openai(
                rewrap(key),
                voice.tts_voice.clone(),
                voice.tts_speed,
                voice.tts_model.clone(),
            )?;
            Arc::new(SynthesizedSpeaker::new(tts))
        }
        SpeakerBackend::ElevenLabs => {
            let key = keys.elevenlabs.as_ref().ok_or_else(|| {
                Error::Config("ELEVENLABS_API_KEY required for the elevenlabs speaker".to_string())
            })?;
            let tts = TextToSpeech::new_elevenlabs(
                rewrap(key),
                voice.tts_voice.clone(),
                voice.tts_model.clone(),
            )?;
            Arc::new(SynthesizedSpeaker::new(tts))
        }
        SpeakerBackend::Log => Arc::new(LogSpeaker),
    };

    tracing::info!(backend = ?voice.speaker, "speaker ready");
    Ok(speaker)
}

/// Build the transcriber named by the configuration
///
/// A missing STT key is not fatal: every listen reports a transcription
/// failure instead.
#[must_use]
pub fn build_transcriber(voice: &VoiceConfig, keys: &ApiKeys) -> Arc<dyn Transcriber> {
    let key = match voice.stt_provider {
        SttProvider::Whisper => keys.openai.as_ref(),
        SttProvider::Deepgram => keys.deepgram.as_ref(),
    };

    let stt = key
        .ok_or_else(|| Error::Config(format!("no API key for {:?} speech recognition", voice.stt_provider)))
        .and_then(|key| SpeechToText::new(voice.stt_provider, rewrap(key), voice.stt_model.clone()));

    match stt {
        Ok(stt) => {
            tracing::info!(provider = ?voice.stt_provider, model = %voice.stt_model, "transcriber ready");
            Arc::new(MicrophoneTranscriber::new(stt))
        }
        Err(e) => {
            tracing::warn!(error = %e, "speech recognition unavailable");
            Arc::new(UnavailableTranscriber::new(e.to_string()))
        }
    }
}

/// Key, API base and model for hint lookups
///
/// The Groq key wins. On the `OpenAI` key an unset URL and model point at
/// `OpenAI`, so that key is never sent to Groq.
fn context_endpoint<'a>(
    context: &ContextConfig,
    keys: &'a ApiKeys,
) -> Option<(&'a SecretString, String, String)> {
    let (key, url, model) = match (&keys.groq, &keys.openai) {
        (Some(key), _) => (key, DEFAULT_CONTEXT_URL, DEFAULT_CONTEXT_MODEL),
        (None, Some(key)) => (key, OPENAI_CONTEXT_URL, OPENAI_CONTEXT_MODEL),
        (None, None) => return None,
    };

    let url = context.base_url.clone().unwrap_or_else(|| url.to_string());
    let model = context.model.clone().unwrap_or_else(|| model.to_string());
    Some((key, url, model))
}

fn llm_context_provider(
    context: &ContextConfig,
    keys: &ApiKeys,
) -> Option<Result<LlmContextProvider>> {
    let (key, url, model) = context_endpoint(context, keys)?;
    Some(LlmContextProvider::new(rewrap(key), url, model))
}

/// Build the hint provider named by the configuration
///
/// Prefers the Groq key, then the `OpenAI` key; without either every hint
/// is a placeholder.
#[must_use]
pub fn build_context_provider(context: &ContextConfig, keys: &ApiKeys) -> Arc<dyn ContextProvider> {
    if !context.enabled {
        tracing::info!("word hints disabled");
        return Arc::new(StaticContextProvider);
    }

    match llm_context_provider(context, keys) {
        Some(Ok(provider)) => {
            tracing::info!(
                url = %provider.base_url(),
                model = %provider.model(),
                "word hints ready"
            );
            Arc::new(provider)
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "word hints unavailable, using placeholders");
            Arc::new(StaticContextProvider)
        }
        None => {
            tracing::warn!("no API key for word hints, using placeholders");
            Arc::new(StaticContextProvider)
        }
    }
}

impl Daemon {
    /// Create a new daemon instance
    ///
    /// # Errors
    ///
    /// Returns error if the word database cannot be opened
    pub fn new(config: Config) -> Result<Self> {
        let db = words::init(&config.database_path)?;
        tracing::info!(path = %config.database_path.display(), "word database initialized");
        Ok(Self { config, db })
    }

    /// Word source over the daemon's database
    #[must_use]
    pub fn word_source(&self) -> SqliteWordSource {
        SqliteWordSource::new(self.db.clone())
    }

    /// Run the daemon until the server stops or ctrl-c is received
    ///
    /// # Errors
    ///
    /// Returns error if a collaborator cannot be built or the server fails
    pub async fn run(self) -> Result<()> {
        let speaker = build_speaker(&self.config.voice, &self.config.api_keys)?;
        let transcriber = build_transcriber(&self.config.voice, &self.config.api_keys);
        let context = build_context_provider(&self.config.context, &self.config.api_keys);
        let words: Arc<dyn WordSource> = Arc::new(self.word_source());

        let session = GameSession::load(words.as_ref())?;
        if session.word_count() == 0 {
            tracing::warn!("word list is empty; add words to the bee_words table");
        }
        tracing::info!(
            session_id = %session.id(),
            words = session.word_count(),
            "game session ready"
        );

        let server = ApiServerBuilder::new(session, speaker, transcriber, context, words)
            .port(self.config.server.port)
            .static_dir(self.config.server.static_dir.clone())
            .listen_duration(self.config.voice.listen_duration)
            .build();

        let mut handle = server.spawn();

        tokio::select! {
            result = &mut handle => {
                result.map_err(|e| Error::Config(format!("API server task failed: {e}")))?
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                handle.abort();
                Ok(())
            }
        }
    }
}
