//! Rolling conversation context.
//!
//! Holds the most recent question/answer turns for one conversation. The
//! context is owned by a single client instance; it is not shared across
//! sessions and needs no locking.

/// One question/answer pair in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub query: String,
    pub answer: String,
}

/// Bounded FIFO of recent turns.
///
/// Appends beyond the cap evict the oldest turn first. The cap bounds what
/// is remembered; how many turns a prompt includes is the caller's choice
/// via [`recent`](ConversationContext::recent).
#[derive(Debug, Clone)]
pub struct ConversationContext {
    turns: Vec<Turn>,
    max_turns: usize,
}

impl ConversationContext {
    /// Create an empty context keeping at most `max_turns` turns.
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns,
        }
    }

    /// Append a turn, evicting the oldest turns beyond the cap.
    pub fn push(&mut self, query: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(Turn {
            query: query.into(),
            answer: answer.into(),
        });
        while self.turns.len() > self.max_turns {
            self.turns.remove(0);
        }
    }

    /// The most recent `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Number of turns currently held.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop all turns. Idempotent.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for ConversationContext {
    /// A context with the standard 5-turn cap.
    fn default() -> Self {
        Self::new(5)
    }
}
