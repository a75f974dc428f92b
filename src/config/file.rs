//! TOML configuration file loading
//!
//! Supports `~/.config/omni/spellbee/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct SpellbeeConfigFile {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Word database configuration
    #[serde(default)]
    pub database: DatabaseFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Word context (hint) lookup configuration
    #[serde(default)]
    pub context: ContextFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// HTTP server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Port to listen on
    pub port: Option<u16>,

    /// Directory holding the web UI
    pub static_dir: Option<PathBuf>,
}

/// Word database configuration
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseFileConfig {
    /// Path to the sqlite word database
    pub path: Option<PathBuf>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Speaker backend ("system", "openai", "elevenlabs", "log")
    pub speaker: Option<String>,

    /// Speech command for the system speaker, program first
    pub speech_command: Option<Vec<String>>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f64>,

    /// STT provider ("whisper", "deepgram")
    pub stt_provider: Option<String>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// How long each listen records, in seconds
    pub listen_secs: Option<u64>,
}

/// Word context lookup configuration
#[derive(Debug, Default, Deserialize)]
pub struct ContextFileConfig {
    /// Enable language-model hints
    pub enabled: Option<bool>,

    /// OpenAI-compatible API base URL
    pub base_url: Option<String>,

    /// Chat model identifier
    pub model: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub elevenlabs: Option<String>,
    pub deepgram: Option<String>,
    pub groq: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `SpellbeeConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> SpellbeeConfigFile {
    config_file_path().map_or_else(SpellbeeConfigFile::default, |path| load_from(&path))
}

/// Load a TOML config file from `path`
///
/// Missing or malformed files yield defaults.
pub fn load_from(path: &Path) -> SpellbeeConfigFile {
    if !path.exists() {
        return SpellbeeConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                SpellbeeConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            SpellbeeConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/omni/spellbee/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("omni")
            .join("spellbee")
            .join("config.toml")
    })
}
