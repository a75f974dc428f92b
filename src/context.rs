//! Word context lookup (meaning, origin, example sentence)
//!
//! Hints come from an OpenAI-compatible chat completion endpoint (Groq by
//! default). Lookups never fail: any error degrades to placeholder hints.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::collab::ContextProvider;
use crate::word::{Word, WordContext};
use crate::{Error, Result};

/// Default OpenAI-compatible API base
pub const DEFAULT_CONTEXT_URL: &str = "https://api.groq.com/openai/v1";

/// Default chat model for hint generation
pub const DEFAULT_CONTEXT_MODEL: &str = "llama-3.3-70b-versatile";

/// API base used when hints run on the `OpenAI` key
pub const OPENAI_CONTEXT_URL: &str = "https://api.openai.com/v1";

/// Chat model used when hints run on the `OpenAI` key
pub const OPENAI_CONTEXT_MODEL: &str = "gpt-4o-mini";

/// Mask used in place of the word inside hints
const WORD_MASK: &str = "***";

/// Chat completion request
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Chat completion response
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Hint provider backed by a language model
pub struct LlmContextProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl LlmContextProvider {
    /// Create a provider for an OpenAI-compatible endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: SecretString, base_url: String, model: String) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "API key required for word context lookup".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    /// API base the provider posts to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat model the provider asks
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn lookup(&self, word: &Word) -> Result<WordContext> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt(word),
            }],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.2,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Context(format!("chat API error {status}: {body}")));
        }

        let reply: ChatResponse = response.json().await?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Context("empty chat reply".to_string()))?;

        parse_reply(&content, word)
    }
}

#[async_trait]
impl ContextProvider for LlmContextProvider {
    async fn context(&self, word: &Word) -> WordContext {
        match self.lookup(word).await {
            Ok(context) => {
                tracing::debug!(word = %word, "word context loaded");
                context
            }
            Err(e) => {
                tracing::warn!(word = %word, error = %e, "word context lookup failed");
                WordContext::unavailable()
            }
        }
    }
}

/// Hint provider that knows nothing
///
/// Used when no language model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticContextProvider;

#[async_trait]
impl ContextProvider for StaticContextProvider {
    async fn context(&self, _word: &Word) -> WordContext {
        WordContext::unavailable()
    }
}

fn prompt(word: &Word) -> String {
    format!(
        "Provide hints for a spelling bee contestant for the word '{word}'. \
         Reply with a JSON object with exactly these string fields: \
         \"meaning\" (part of speech in parentheses, then a short definition), \
         \"origin\" (language of origin and root, one short phrase), \
         \"sentence\" (one short example sentence). \
         Replace the word '{word}' with '{WORD_MASK}' everywhere. \
         Be extremely concise. Do not include any other text."
    )
}

/// Parse a model reply into hints, masking any leaked spelling
fn parse_reply(content: &str, word: &Word) -> Result<WordContext> {
    let json = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let parsed: WordContext = serde_json::from_str(json)?;

    Ok(WordContext {
        meaning: parsed.meaning.map(|m| mask_word(&m, word)),
        origin: parsed.origin.map(|o| mask_word(&o, word)),
        sentence: parsed.sentence.map(|s| mask_word(&s, word)),
    })
}

/// Replace case-insensitive occurrences of the word with the mask
fn mask_word(text: &str, word: &Word) -> String {
    let needle = word.as_str().to_lowercase();
    let lower = text.to_lowercase();
    // Lower-casing can change byte lengths outside ASCII; leave such text alone
    if needle.is_empty() || lower.len() != text.len() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = 0;
    for (pos, _) in lower.match_indices(&needle) {
        out.push_str(&text[rest..pos]);
        out.push_str(WORD_MASK);
        rest = pos + needle.len();
    }
    out.push_str(&text[rest..]);
    out
}
