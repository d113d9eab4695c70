use bharti_core::{Role, Turn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for a conversation session. Monotonically increasing;
/// rotated (never reused) when memory is cleared.
pub type SessionId = u64;

/// Retention cap: only the most recent turns are kept per session, bounding
/// both memory and the history block fed into prompts.
pub const MAX_RETAINED_TURNS: usize = 50;

/// A conversation session: an ordered, append-only list of turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier.
    pub id: SessionId,
    /// Ordered conversation turns, capped to [`MAX_RETAINED_TURNS`].
    pub turns: Vec<Turn>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session last changed.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session with the given id.
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a turn, dropping the oldest turns beyond the retention cap.
    pub fn push_turn(&mut self, turn: Turn) {
        self.updated_at = Utc::now();
        self.turns.push(turn);
        if self.turns.len() > MAX_RETAINED_TURNS {
            let excess = self.turns.len() - MAX_RETAINED_TURNS;
            self.turns.drain(..excess);
        }
    }

    /// Number of turns currently retained.
    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// Render the conversation so far as a plain-text transcript for prompt
    /// building, one `role: content` line per turn.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            out.push_str(role);
            out.push_str(": ");
            out.push_str(&turn.content.as_history_text());
            out.push('\n');
        }
        out
    }

    /// The most recent user message text, if any.
    pub fn last_user_text(&self) -> Option<String> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_history_text())
    }
}
