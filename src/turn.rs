//! Turn coordination between speaking and listening
//!
//! A single lock guards the audio "floor". Speech holds it for the whole
//! playback, listening holds it for the whole capture, so the microphone
//! never records the server's own voice and two prompts never overlap.
//!
//! The lock is taken before the speech task is spawned. A listen request
//! issued right after `begin_speak` returns therefore always queues behind
//! the speech, even if the spawned task has not been polled yet.
//!
//! There is no timeout: a speech task that never finishes stalls every
//! later turn.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;

use crate::collab::Speaker;

/// Serializes speech and listening
#[derive(Clone)]
pub struct TurnCoordinator {
    floor: Arc<Mutex<()>>,
    speaker: Arc<dyn Speaker>,
}

/// Handle to an in-flight speech task
///
/// Dropping the handle detaches the task; the lock is still released
/// when the speech ends.
#[must_use = "dropping the handle detaches the speech task"]
pub struct SpeechHandle {
    task: JoinHandle<()>,
}

impl SpeechHandle {
    /// Wait for this speech to finish
    pub async fn finished(self) {
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "speech task aborted");
        }
    }

    /// Whether the speech task has completed
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl TurnCoordinator {
    /// Create a coordinator speaking through `speaker`
    #[must_use]
    pub fn new(speaker: Arc<dyn Speaker>) -> Self {
        Self {
            floor: Arc::new(Mutex::new(())),
            speaker,
        }
    }

    /// Start speaking `text` in the background
    ///
    /// The floor is held when this returns. If another speech is in
    /// flight the caller waits for it first. Speaker failures are logged
    /// and never block later turns.
    pub async fn begin_speak(&self, text: impl Into<String>) -> SpeechHandle {
        let text = text.into();
        let guard = self.take_floor().await;
        let speaker = Arc::clone(&self.speaker);

        let task = tokio::spawn(async move {
            // Released on every exit path, including a panicking speaker
            let _guard = guard;
            tracing::debug!(text = %text, "speaking");
            if let Err(e) = speaker.speak(&text).await {
                tracing::error!(error = %e, text = %text, "speech failed");
            }
        });

        SpeechHandle { task }
    }

    /// Wait until no speech is in flight
    ///
    /// Returns without keeping the floor.
    pub async fn await_idle(&self) {
        drop(self.floor.lock().await);
    }

    /// Run `action` while holding the floor
    ///
    /// Used for listening: waits for in-flight speech to finish, then keeps
    /// new speech out until `action` completes.
    pub async fn with_turn<F, Fut, T>(&self, action: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.floor.lock().await;
        action().await
    }

    /// Whether the floor is currently held
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.floor.try_lock().is_err()
    }

    async fn take_floor(&self) -> OwnedMutexGuard<()> {
        // Fast path never yields, so the floor is held before any other
        // task on this runtime can run
        match Arc::clone(&self.floor).try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::trace!("waiting for previous speech to finish");
                Arc::clone(&self.floor).lock_owned().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::{Error, Result};

    struct CountingSpeaker {
        spoken: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Speaker for CountingSpeaker {
        async fn speak(&self, _text: &str) -> Result<()> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.spoken.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Tts("synthesizer offline".to_string()));
            }
            Ok(())
        }
    }

    fn coordinator(fail: bool) -> (TurnCoordinator, Arc<CountingSpeaker>) {
        let speaker = Arc::new(CountingSpeaker {
            spoken: AtomicUsize::new(0),
            fail,
        });
        (TurnCoordinator::new(speaker.clone()), speaker)
    }

    #[tokio::test]
    async fn floor_held_when_begin_speak_returns() {
        let (turns, _) = coordinator(false);
        let handle = turns.begin_speak("hello").await;
        assert!(turns.is_speaking());
        handle.finished().await;
        assert!(!turns.is_speaking());
    }

    #[tokio::test]
    async fn failed_speech_releases_floor() {
        let (turns, speaker) = coordinator(true);
        turns.begin_speak("hello").await.finished().await;
        assert!(!turns.is_speaking());
        assert_eq!(speaker.spoken.load(Ordering::SeqCst), 1);

        // Later turns still run
        let heard = turns.with_turn(|| async { 7 }).await;
        assert_eq!(heard, 7);
    }

    #[tokio::test]
    async fn await_idle_waits_for_speech() {
        let (turns, speaker) = coordinator(false);
        let _handle = turns.begin_speak("hello").await;
        turns.await_idle().await;
        assert_eq!(speaker.spoken.load(Ordering::SeqCst), 1);
        assert!(!turns.is_speaking());
    }

    #[tokio::test]
    async fn speeches_serialize() {
        let (turns, speaker) = coordinator(false);
        let first = turns.begin_speak("one").await;
        let second = turns.begin_speak("two").await;
        // Second speech could only take the floor after the first finished
        assert!(first.is_finished());
        assert_eq!(speaker.spoken.load(Ordering::SeqCst), 1);
        second.finished().await;
        assert_eq!(speaker.spoken.load(Ordering::SeqCst), 2);
    }
}
