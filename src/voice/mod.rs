//! Voice processing module
//!
//! Microphone capture, playback, STT/TTS clients and the speaker and
//! transcriber backends built from them.

mod capture;
mod playback;
mod speaker;
mod stt;
mod transcriber;
mod tts;

pub use capture::{AudioCapture, SAMPLE_RATE, record_blocking, rms_energy, samples_to_wav};
pub use playback::{AudioPlayback, PLAYBACK_SAMPLE_RATE, decode_mp3};
pub use speaker::{LogSpeaker, SynthesizedSpeaker, SystemSpeaker};
pub use stt::{SpeechToText, SttProvider};
pub use transcriber::{MicrophoneTranscriber, SILENCE_THRESHOLD, UnavailableTranscriber};
pub use tts::{TextToSpeech, TtsProvider};
