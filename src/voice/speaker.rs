//! Speaker backends
//!
//! - [`SynthesizedSpeaker`]: cloud TTS decoded and played locally
//! - [`SystemSpeaker`]: the operating system's speech command
//! - [`LogSpeaker`]: logs text only, for headless machines

use async_trait::async_trait;

use super::playback::AudioPlayback;
use super::tts::TextToSpeech;
use crate::collab::Speaker;
use crate::{Error, Result};

/// Speaks through a TTS API and the default output device
pub struct SynthesizedSpeaker {
    tts: TextToSpeech,
}

impl SynthesizedSpeaker {
    #[must_use]
    pub const fn new(tts: TextToSpeech) -> Self {
        Self { tts }
    }
}

#[async_trait]
impl Speaker for SynthesizedSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        let audio = self.tts.synthesize(text).await?;
        tracing::debug!(bytes = audio.len(), "speech synthesized");

        // cpal streams are not Send; open and play on a blocking thread
        tokio::task::spawn_blocking(move || AudioPlayback::new()?.play_mp3(&audio))
            .await
            .map_err(|e| Error::Audio(format!("playback task failed: {e}")))?
    }
}

/// Speaks through a local speech command such as `espeak` or `say`
#[derive(Debug, Clone)]
pub struct SystemSpeaker {
    program: String,
    args: Vec<String>,
}

impl SystemSpeaker {
    /// Run `program` with `args` followed by the text to speak
    #[must_use]
    pub const fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }

    /// The platform's built-in speech command
    #[must_use]
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("say".to_string(), Vec::new())
        } else if cfg!(target_os = "windows") {
            Self::new("powershell".to_string(), vec!["-Command".to_string()])
        } else {
            Self::new("espeak".to_string(), Vec::new())
        }
    }

    /// Final argument carrying the text
    ///
    /// `PowerShell` needs a script, with single quotes doubled.
    fn text_argument(&self, text: &str) -> String {
        if self.program.eq_ignore_ascii_case("powershell") {
            let escaped = text.replace('\'', "''");
            format!(
                "Add-Type -AssemblyName System.Speech; \
                 (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{escaped}');"
            )
        } else {
            text.to_string()
        }
    }
}

#[async_trait]
impl Speaker for SystemSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(self.text_argument(text))
            .status()
            .await
            .map_err(|e| Error::Tts(format!("failed to run {}: {e}", self.program)))?;

        if !status.success() {
            return Err(Error::Tts(format!("{} exited with {status}", self.program)));
        }
        Ok(())
    }
}

/// Logs what would be spoken
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSpeaker;

#[async_trait]
impl Speaker for LogSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        tracing::info!(text, "agent says");
        Ok(())
    }
}
