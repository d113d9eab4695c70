//! Core types and error definitions for the Bharti conversational backend.
//!
//! This crate provides the foundational types shared across all Bharti crates:
//! the unified error enum, conversation turns, the intent taxonomy, and the
//! structured-answer schema returned for catalog queries.
//!
//! # Main types
//!
//! - [`BhartiError`] — Unified error enum for all Bharti subsystems.
//! - [`BhartiResult`] — Convenience alias for `Result<T, BhartiError>`.
//! - [`Intent`] — The classified purpose of a user message.
//! - [`Role`] / [`Turn`] — A single entry in a conversation session.
//! - [`Answer`] — A rendered answer, either plain text or structured.
//! - [`AnswerSection`] / [`Resource`] — The structured-answer schema.
//! - [`CategoryRecord`] — A row from the relational catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Error types ---

/// Top-level error type for the Bharti backend.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Debug, thiserror::Error)]
pub enum BhartiError {
    /// An error from an outbound HTTP request (e.g. LLM API call).
    #[error("HTTP error: {0}")]
    Http(String),

    /// An error related to session lookup or mutation.
    #[error("Session error: {0}")]
    Session(String),

    /// An error from the similarity-search layer.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// An error from the relational catalog store.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from the HTTP gateway layer.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Generated output did not match the structured-answer schema.
    #[error("Malformed structured output: {0}")]
    MalformedAnswer(String),

    /// The pipeline completed without any generator branch producing output.
    /// This is the only failure that crosses the HTTP boundary as a non-200.
    #[error("No answer produced: {0}")]
    NoAnswer(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`BhartiError`].
pub type BhartiResult<T> = Result<T, BhartiError>;

// --- Intent ---

/// The classified purpose of a user's message.
///
/// Exactly one intent is produced per user turn and it is never revised
/// within that turn. The label coming back from a generative classifier is
/// untrusted input: anything outside the known set maps to [`Intent::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// A salutation or small talk ("hi", "namaste").
    Greeting,
    /// A question about the portal itself, answered from a static blurb.
    General,
    /// A catalog exploration query that needs retrieval.
    Specialised,
    /// Anything the classifier could not place.
    Unknown,
}

impl Intent {
    /// Parse a classifier label into an intent.
    ///
    /// Trims and matches case-insensitively. `"query"` is accepted as a
    /// legacy alias for `Specialised`. Unrecognized labels degrade to
    /// `Unknown` rather than erroring.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "greeting" => Intent::Greeting,
            "general" => Intent::General,
            "specialised" | "specialized" | "query" => Intent::Specialised,
            _ => Intent::Unknown,
        }
    }

    /// Whether this intent requires catalog retrieval before generation.
    pub fn needs_retrieval(&self) -> bool {
        matches!(self, Intent::Specialised)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Intent::Greeting => "greeting",
            Intent::General => "general",
            Intent::Specialised => "specialised",
            Intent::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Answer language requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    /// English (the default).
    #[default]
    #[serde(rename = "en")]
    English,
    /// Hindi; produced text fields are translated best-effort.
    #[serde(rename = "hi")]
    Hindi,
}

// --- Answers ---

/// A single resource (catalog item) referenced inside a structured answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Title of the catalog item.
    pub title: String,
    /// Portal URL for the item.
    pub url: String,
}

/// One category entry within a structured answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSection {
    /// Catalog category this section covers.
    pub category: String,
    /// Summarized description for the category.
    pub description: String,
    /// Catalog items backing the section. May legitimately be empty when
    /// retrieval produced no context.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// A rendered answer: plain text for greeting/general/unknown intents, a
/// structured section list for specialised intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Free-text answer.
    Text(String),
    /// Category-grouped structured answer.
    Structured(Vec<AnswerSection>),
}

impl Answer {
    /// Render the answer as plain text, for history/prompt building.
    /// Structured answers are rendered as compact JSON.
    pub fn as_history_text(&self) -> String {
        match self {
            Answer::Text(text) => text.clone(),
            Answer::Structured(sections) => {
                serde_json::to_string(sections).unwrap_or_default()
            }
        }
    }
}

// --- Turns ---

/// The role of the participant that authored a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human end-user.
    User,
    /// The assistant.
    Assistant,
}

/// A single turn within a conversation session.
///
/// Turns are immutable once appended; their insertion order is the
/// conversation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Unique identifier for this turn.
    pub id: Uuid,
    /// The role of the turn author.
    pub role: Role,
    /// The content of the turn.
    pub content: Answer,
    /// For assistant turns, the intent that produced the answer.
    pub intent: Option<Intent>,
    /// UTC timestamp of when the turn was created.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Creates a user turn from raw message text.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: Answer::Text(text.into()),
            intent: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates an assistant turn carrying the answer and its intent.
    pub fn assistant(content: Answer, intent: Intent) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content,
            intent: Some(intent),
            timestamp: Utc::now(),
        }
    }
}

// --- Catalog ---

/// A read-only row from the relational catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    /// Unique key (the vector store uses the same key for title embeddings).
    pub id: i64,
    /// Catalog category (e.g. "ebooks", "archives").
    pub category: String,
    /// Item title.
    pub title: String,
    /// Item description, possibly empty.
    pub description: String,
    /// Portal URL, or "NA" when the item has none.
    pub url: String,
}
