//! Game endpoints: words, filters, listening

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::session::Score;
use crate::utterance::{HintKind, Utterance, interpret};
use crate::word::{FilterMetadata, Filters, Word, WordContext, WordOrder};

const PAUSE_PROMPT: &str = "Pausing. Click Resume to continue.";
const NO_INPUT_PROMPT: &str = "I didn't hear anything.";
const STT_FAILURE_PROMPT: &str = "Sorry, I couldn't reach the speech service.";

/// Build game router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/started", get(started))
        .route("/next_word", post(next_word))
        .route("/repeat_word", post(repeat_word))
        .route("/filters", get(filters))
        .route("/update_filters", post(update_filters))
        .route("/set_order", post(set_order))
        .route("/listen", post(listen))
        .route("/wait_for_speech", get(wait_for_speech))
        .with_state(state)
}

fn word_prompt(word: &Word) -> String {
    format!("The word is {word}. Please spell {word}")
}

fn hint_prompt(kind: HintKind, text: &str) -> String {
    format!("The {} is: {text}", kind.as_str())
}

fn hint_text(context: &WordContext, kind: HintKind) -> &str {
    match kind {
        HintKind::Meaning => context.meaning(),
        HintKind::Origin => context.origin(),
        HintKind::Sentence => context.sentence(),
    }
}

/// Plain status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Client handshake
async fn started() -> Json<StatusResponse> {
    tracing::debug!("client started");
    Json(StatusResponse { status: "ok" })
}

/// Next word response
#[derive(Debug, Serialize)]
pub struct NextWordResponse {
    pub word: Word,
    pub status: &'static str,
    pub score: Score,
}

/// Advance to the next word and announce it
async fn next_word(State(state): State<Arc<ApiState>>) -> Result<Json<NextWordResponse>, GameError> {
    let word = state
        .session
        .lock()
        .await
        .advance()
        .ok_or(GameError::NoWordsLeft)?;

    let context = state.context.context(&word).await;

    let score = {
        let mut session = state.session.lock().await;
        session.begin_turn(&word, context);
        session.score()
    };

    state.announce(word_prompt(&word)).await;
    tracing::info!(word = %word, "next word");

    Ok(Json(NextWordResponse {
        word,
        status: "spoken",
        score,
    }))
}

/// Say the current word again
async fn repeat_word(State(state): State<Arc<ApiState>>) -> Result<Json<StatusResponse>, GameError> {
    let word = state
        .session
        .lock()
        .await
        .current_word()
        .cloned()
        .ok_or(GameError::NoActiveWord)?;

    state.announce(format!("Please spell {word}")).await;

    Ok(Json(StatusResponse { status: "repeated" }))
}

/// Distinct filter values
async fn filters(State(state): State<Arc<ApiState>>) -> Result<Json<FilterMetadata>, GameError> {
    let metadata = state
        .words
        .filter_metadata()
        .map_err(|e| GameError::WordSource(e.to_string()))?;
    Ok(Json(metadata))
}

/// Filter update request
///
/// Tags may arrive as strings or numbers; anything else is unconstrained.
#[derive(Debug, Default, Deserialize)]
pub struct FilterUpdate {
    #[serde(default)]
    pub year: Option<serde_json::Value>,
    #[serde(default)]
    pub list: Option<serde_json::Value>,
    #[serde(default)]
    pub difficulty: Option<serde_json::Value>,
}

fn tag(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl From<FilterUpdate> for Filters {
    fn from(update: FilterUpdate) -> Self {
        Self::new(tag(update.year), tag(update.list), tag(update.difficulty))
    }
}

/// Filter update response
#[derive(Debug, Serialize)]
pub struct FilterUpdateResponse {
    pub status: &'static str,
    pub word_count: usize,
    pub filters: Filters,
}

/// Replace the filters and rebuild the word queue
async fn update_filters(
    State(state): State<Arc<ApiState>>,
    Json(update): Json<FilterUpdate>,
) -> Result<Json<FilterUpdateResponse>, GameError> {
    let mut session = state.session.lock().await;
    session
        .set_filters(update.into(), state.words.as_ref())
        .map_err(|e| GameError::WordSource(e.to_string()))?;

    Ok(Json(FilterUpdateResponse {
        status: "ok",
        word_count: session.word_count(),
        filters: session.filters().clone(),
    }))
}

/// Order change request
#[derive(Debug, Default, Deserialize)]
pub struct OrderUpdate {
    #[serde(default)]
    pub order: Option<String>,
}

/// Order change response
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub status: &'static str,
    pub order: WordOrder,
}

/// Replace the order and rebuild the word queue
async fn set_order(
    State(state): State<Arc<ApiState>>,
    Json(update): Json<OrderUpdate>,
) -> Result<Json<OrderResponse>, GameError> {
    let order = update
        .order
        .as_deref()
        .map(WordOrder::parse_lenient)
        .unwrap_or_default();

    state
        .session
        .lock()
        .await
        .set_order(order, state.words.as_ref())
        .map_err(|e| GameError::WordSource(e.to_string()))?;

    Ok(Json(OrderResponse { status: "ok", order }))
}

/// Outcome of one listen
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ListenOutcome {
    Hint {
        #[serde(rename = "type")]
        kind: &'static str,
        text: String,
    },
    Paused,
    Correct {
        heard: String,
        target: Word,
        score: Score,
    },
    Incorrect {
        heard: String,
        target: Word,
        score: Score,
    },
    NoInput {
        target: Word,
    },
    Error {
        message: String,
    },
}

/// Listen for one utterance and act on it
///
/// Waits for any in-flight speech before recording.
async fn listen(State(state): State<Arc<ApiState>>) -> Result<(StatusCode, Json<ListenOutcome>), GameError> {
    let (word, context) = state
        .session
        .lock()
        .await
        .active_turn()
        .ok_or(GameError::NoActiveWord)?;

    let transcription = state
        .turns
        .with_turn(|| state.transcriber.transcribe(state.listen_duration))
        .await;

    let utterance = interpret(transcription, &word);
    tracing::debug!(word = %word, utterance = ?utterance, "utterance classified");

    let outcome = match utterance {
        Utterance::Hint(kind) => {
            let text = hint_text(&context, kind).to_string();
            state.announce(hint_prompt(kind, &text)).await;
            ListenOutcome::Hint {
                kind: kind.as_str(),
                text,
            }
        }
        Utterance::Paused => {
            state.announce(PAUSE_PROMPT).await;
            ListenOutcome::Paused
        }
        Utterance::RepeatCommand => {
            state.announce(word_prompt(&word)).await;
            ListenOutcome::Hint {
                kind: "repeat",
                text: format!("Repeating: {word}"),
            }
        }
        Utterance::SpellingAttempt { text, heard } => {
            let (correct, score) = {
                let mut session = state.session.lock().await;
                let correct = session.check_spelling(&text, &word);
                (correct, session.score())
            };

            if correct {
                state.announce(format!("Correct! The word is {word}.")).await;
                ListenOutcome::Correct {
                    heard,
                    target: word,
                    score,
                }
            } else {
                state.announce(format!("Incorrect. The word is {word}.")).await;
                ListenOutcome::Incorrect {
                    heard,
                    target: word,
                    score,
                }
            }
        }
        Utterance::NoInput => {
            state.announce(NO_INPUT_PROMPT).await;
            ListenOutcome::NoInput { target: word }
        }
        Utterance::TranscriptionFailed(message) => {
            tracing::warn!(word = %word, error = %message, "transcription failed");
            state.announce(STT_FAILURE_PROMPT).await;
            return Ok((StatusCode::BAD_GATEWAY, Json(ListenOutcome::Error { message })));
        }
    };

    Ok((StatusCode::OK, Json(outcome)))
}

/// Block until any in-flight speech has finished
async fn wait_for_speech(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    state.turns.await_idle().await;
    Json(StatusResponse { status: "done" })
}

/// Game API errors
#[derive(Debug)]
pub enum GameError {
    NoActiveWord,
    NoWordsLeft,
    WordSource(String),
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let (status, error) = match self {
            Self::NoActiveWord => (StatusCode::BAD_REQUEST, "No active word".to_string()),
            Self::NoWordsLeft => (StatusCode::NOT_FOUND, "No words left".to_string()),
            Self::WordSource(msg) => {
                tracing::error!(error = %msg, "word source failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
