//! Microphone transcription

use std::time::Duration;

use async_trait::async_trait;

use super::capture::{SAMPLE_RATE, record_blocking, rms_energy, samples_to_wav};
use super::stt::SpeechToText;
use crate::collab::Transcriber;
use crate::{Error, Result};

/// Energy below which a recording is treated as silence
pub const SILENCE_THRESHOLD: f32 = 0.01;

/// Records from the microphone and transcribes through an STT API
pub struct MicrophoneTranscriber {
    stt: SpeechToText,
    silence_threshold: f32,
}

impl MicrophoneTranscriber {
    #[must_use]
    pub const fn new(stt: SpeechToText) -> Self {
        Self {
            stt,
            silence_threshold: SILENCE_THRESHOLD,
        }
    }

    /// Override the silence threshold
    #[must_use]
    pub const fn with_silence_threshold(mut self, threshold: f32) -> Self {
        self.silence_threshold = threshold;
        self
    }
}

/// Stands in when no speech-to-text key is configured
///
/// Every listen fails with [`Error::Stt`].
pub struct UnavailableTranscriber {
    reason: String,
}

impl UnavailableTranscriber {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Transcriber for UnavailableTranscriber {
    async fn transcribe(&self, _max_wait: Duration) -> Result<Option<String>> {
        Err(Error::Stt(self.reason.clone()))
    }
}

#[async_trait]
impl Transcriber for MicrophoneTranscriber {
    async fn transcribe(&self, max_wait: Duration) -> Result<Option<String>> {
        tracing::info!(seconds = max_wait.as_secs_f32(), "listening");

        let samples = tokio::task::spawn_blocking(move || record_blocking(max_wait))
            .await
            .map_err(|e| Error::Audio(format!("recording task failed: {e}")))??;

        let energy = rms_energy(&samples);
        if energy < self.silence_threshold {
            tracing::debug!(energy, "recording is silent");
            return Ok(None);
        }

        let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
        let text = self.stt.transcribe(&wav).await?;
        let text = text.trim();

        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(text.to_string()))
        }
    }
}
