//! Core word types shared by the session, the classifier and the word source

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Placeholder spoken when no meaning is known
pub const NO_MEANING: &str = "No meaning available.";

/// Placeholder spoken when no origin is known
pub const NO_ORIGIN: &str = "No origin available.";

/// Placeholder spoken when no example sentence is known
pub const NO_SENTENCE: &str = "No example sentence available.";

/// A target spelling
///
/// Always non-empty and free of emphasis markup. Comparison against spoken
/// answers is case-insensitive and handled by [`crate::spelling`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Word(String);

impl Word {
    /// Clean a raw word list entry into a word
    ///
    /// Strips `**` emphasis markers, collapses whitespace runs and trims.
    /// Returns `None` when nothing is left.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw
            .replace("**", "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned))
        }
    }

    /// The word as written in the word list
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Hint data for a word: meaning, origin and an example sentence
///
/// Every field is optional; accessors fall back to fixed placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordContext {
    #[serde(default)]
    pub meaning: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub sentence: Option<String>,
}

impl WordContext {
    /// Context with every field set to its placeholder
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            meaning: None,
            origin: None,
            sentence: None,
        }
    }

    /// Meaning, or the placeholder
    #[must_use]
    pub fn meaning(&self) -> &str {
        non_blank(self.meaning.as_deref()).unwrap_or(NO_MEANING)
    }

    /// Origin, or the placeholder
    #[must_use]
    pub fn origin(&self) -> &str {
        non_blank(self.origin.as_deref()).unwrap_or(NO_ORIGIN)
    }

    /// Example sentence, or the placeholder
    #[must_use]
    pub fn sentence(&self) -> &str {
        non_blank(self.sentence.as_deref()).unwrap_or(NO_SENTENCE)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Word list constraints; `None` means unconstrained
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub list: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

impl Filters {
    /// Build filters, treating blank values as unconstrained
    #[must_use]
    pub fn new(year: Option<String>, list: Option<String>, difficulty: Option<String>) -> Self {
        Self {
            year: blank_to_none(year),
            list: blank_to_none(list),
            difficulty: blank_to_none(difficulty),
        }
    }

    /// True when no constraint is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.year.is_none() && self.list.is_none() && self.difficulty.is_none()
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Order in which the word queue is built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordOrder {
    Alphabetical,
    #[default]
    Random,
}

impl WordOrder {
    /// Parse a client-supplied order, defaulting to random
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alphabetical => "alphabetical",
            Self::Random => "random",
        }
    }
}

impl FromStr for WordOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alphabetical" | "alpha" | "a-z" => Ok(Self::Alphabetical),
            "random" | "shuffle" => Ok(Self::Random),
            other => Err(format!("unknown word order: {other}")),
        }
    }
}

/// Distinct filter values available in the word source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterMetadata {
    pub years: Vec<String>,
    pub lists: Vec<String>,
    pub difficulties: Vec<String>,
}
