//! Configuration management for the spelling bee trainer
//!
//! Precedence is env > TOML file > default.

pub mod file;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::voice::SttProvider;
use crate::{Error, Result};

use file::SpellbeeConfigFile;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default recording length for one listen
pub const DEFAULT_LISTEN_SECS: u64 = 10;

/// Spelling bee configuration
#[derive(Debug)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Path to the sqlite word database
    pub database_path: PathBuf,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// Word context lookup configuration
    pub context: ContextConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,
}

/// How prompts are spoken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerBackend {
    /// The operating system's speech command
    System,
    /// `OpenAI` TTS played on the default output device
    OpenAI,
    /// `ElevenLabs` TTS played on the default output device
    ElevenLabs,
    /// Log only
    Log,
}

impl FromStr for SpeakerBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "system" | "os" => Ok(Self::System),
            "openai" => Ok(Self::OpenAI),
            "elevenlabs" => Ok(Self::ElevenLabs),
            "log" | "none" => Ok(Self::Log),
            other => Err(Error::Config(format!("unknown speaker backend: {other}"))),
        }
    }
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Speaker backend
    pub speaker: SpeakerBackend,

    /// Speech command for the system speaker (program first); platform
    /// default when unset
    pub speech_command: Option<Vec<String>>,

    /// TTS model (e.g. "tts-1", "`eleven_monolingual_v1`")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f64,

    /// STT provider
    pub stt_provider: SttProvider,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: String,

    /// How long each listen records
    pub listen_duration: Duration,
}

/// Word context lookup configuration
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Enable language-model hints
    pub enabled: bool,

    /// OpenAI-compatible API base URL; unset follows the chosen key
    pub base_url: Option<String>,

    /// Chat model identifier; unset follows the chosen key
    pub model: Option<String>,
}

/// API keys for external services
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper, TTS, and hints when no Groq key is set)
    pub openai: Option<SecretString>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<SecretString>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<SecretString>,

    /// Groq API key (word hints)
    pub groq: Option<SecretString>,
}

/// Return the default word database path, creating its directory if needed
///
/// Uses `~/.local/share/omni/spellbee/words.db` on Linux
pub fn default_database_path() -> PathBuf {
    let data_dir = directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".local/share/omni/spellbee"),
        |d| d.data_dir().join("omni").join("spellbee"),
    );

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::warn!(path = %data_dir.display(), error = %e, "failed to create data directory");
    }

    data_dir.join("words.db")
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if a value is present but invalid
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a value is present but invalid
    pub fn from_sources<E>(fc: SpellbeeConfigFile, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let env_parse = |key: &str| -> Result<Option<u64>> {
            env(key)
                .map(|v| {
                    v.trim()
                        .parse::<u64>()
                        .map_err(|e| Error::Config(format!("invalid {key}: {e}")))
                })
                .transpose()
        };

        let port = match env_parse("SPELLBEE_PORT")? {
            Some(p) => u16::try_from(p)
                .map_err(|_| Error::Config(format!("port out of range: {p}")))?,
            None => fc.server.port.unwrap_or(DEFAULT_PORT),
        };

        let server = ServerConfig {
            port,
            static_dir: env("SPELLBEE_STATIC_DIR")
                .map(PathBuf::from)
                .or(fc.server.static_dir),
        };

        let database_path = env("SPELLBEE_DB")
            .map(PathBuf::from)
            .or(fc.database.path)
            .unwrap_or_else(default_database_path);

        let speaker = env("SPELLBEE_SPEAKER")
            .or(fc.voice.speaker)
            .map_or(Ok(SpeakerBackend::System), |s| s.parse())?;

        let stt_provider = env("SPELLBEE_STT_PROVIDER")
            .or(fc.voice.stt_provider)
            .map_or(Ok(SttProvider::Whisper), |s| s.parse())?;

        let default_stt_model = match stt_provider {
            SttProvider::Whisper => "whisper-1",
            SttProvider::Deepgram => "nova-2",
        };
        let default_tts_model = match speaker {
            SpeakerBackend::ElevenLabs => "eleven_monolingual_v1",
            _ => "tts-1",
        };

        let listen_secs = env_parse("SPELLBEE_LISTEN_SECS")?
            .or(fc.voice.listen_secs)
            .unwrap_or(DEFAULT_LISTEN_SECS);
        if listen_secs == 0 {
            return Err(Error::Config("listen duration must be at least 1 second".to_string()));
        }

        let voice = VoiceConfig {
            speaker,
            speech_command: fc.voice.speech_command.filter(|c| !c.is_empty()),
            tts_model: env("SPELLBEE_TTS_MODEL")
                .or(fc.voice.tts_model)
                .unwrap_or_else(|| default_tts_model.to_string()),
            tts_voice: env("SPELLBEE_TTS_VOICE")
                .or(fc.voice.tts_voice)
                .unwrap_or_else(|| "alloy".to_string()),
            tts_speed: fc.voice.tts_speed.unwrap_or(1.0).clamp(0.25, 4.0),
            stt_provider,
            stt_model: env("SPELLBEE_STT_MODEL")
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| default_stt_model.to_string()),
            listen_duration: Duration::from_secs(listen_secs),
        };

        let context = ContextConfig {
            enabled: fc.context.enabled.unwrap_or(true),
            base_url: env("SPELLBEE_CONTEXT_URL").or(fc.context.base_url),
            model: env("SPELLBEE_CONTEXT_MODEL").or(fc.context.model),
        };

        let secret = |value: Option<String>| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::from)
        };

        let api_keys = ApiKeys {
            openai: secret(env("OPENAI_API_KEY").or(fc.api_keys.openai)),
            elevenlabs: secret(env("ELEVENLABS_API_KEY").or(fc.api_keys.elevenlabs)),
            deepgram: secret(env("DEEPGRAM_API_KEY").or(fc.api_keys.deepgram)),
            groq: secret(env("GROQ_API_KEY").or(fc.api_keys.groq)),
        };

        Ok(Self {
            server,
            database_path,
            voice,
            context,
            api_keys,
        })
    }
}
