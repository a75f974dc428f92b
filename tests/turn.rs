//! Turn coordination integration tests
//!
//! Speech and listening must never overlap, whatever the speech duration.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use spelling_bee::{Result, Speaker, TurnCoordinator};
use tokio_test::{assert_pending, assert_ready};

mod common;
use common::FakeSpeaker;

/// Appends speech start/end markers to a shared log
struct TimelineSpeaker {
    log: Arc<Mutex<Vec<String>>>,
    delay: Duration,
}

#[async_trait]
impl Speaker for TimelineSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        self.log.lock().unwrap().push(format!("start {text}"));
        tokio::time::sleep(self.delay).await;
        self.log.lock().unwrap().push(format!("end {text}"));
        Ok(())
    }
}

#[tokio::test]
async fn test_idle_waits_for_zero_length_speech() {
    let speaker = Arc::new(FakeSpeaker::default());
    let turns = TurnCoordinator::new(speaker.clone());

    let handle = turns.begin_speak("The word is apple. Please spell apple").await;
    assert!(turns.is_speaking());

    turns.await_idle().await;
    assert_eq!(speaker.spoken().len(), 1);

    handle.finished().await;
    assert!(!turns.is_speaking());
}

#[tokio::test]
async fn test_idle_pending_while_speaking() {
    let speaker = Arc::new(FakeSpeaker::slow(Duration::from_millis(50)));
    let turns = TurnCoordinator::new(speaker.clone());

    let handle = turns.begin_speak("Correct! The word is apple.").await;

    let mut idle = tokio_test::task::spawn(turns.await_idle());
    assert_pending!(idle.poll());

    handle.finished().await;
    assert!(idle.is_woken());
    assert_ready!(idle.poll());
    assert_eq!(speaker.spoken(), ["Correct! The word is apple."]);
}

#[tokio::test]
async fn test_listening_never_overlaps_speech() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let turns = TurnCoordinator::new(Arc::new(TimelineSpeaker {
        log: log.clone(),
        delay: Duration::from_millis(20),
    }));

    drop(turns.begin_speak("one").await);

    let listen_log = log.clone();
    turns
        .with_turn(|| async move {
            listen_log.lock().unwrap().push("listen".to_string());
        })
        .await;

    drop(turns.begin_speak("two").await);
    turns.await_idle().await;

    assert_eq!(
        *log.lock().unwrap(),
        ["start one", "end one", "listen", "start two", "end two"]
    );
}

#[tokio::test]
async fn test_overlapping_speech_serializes() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let turns = TurnCoordinator::new(Arc::new(TimelineSpeaker {
        log: log.clone(),
        delay: Duration::from_millis(10),
    }));

    let first = turns.begin_speak("one").await;
    let second_turns = turns.clone();
    let second = tokio::spawn(async move { second_turns.begin_speak("two").await.finished().await });

    first.finished().await;
    second.await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        ["start one", "end one", "start two", "end two"]
    );
}
