//! The ordered history of a conversation.

use crate::types::Turn;

/// Append-only, ordered sequence of turns.
///
/// Insertion order is chronological order is display order.  The only way
/// to shrink the store is [`ConversationStore::reset`], which returns it to
/// its seed greeting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationStore {
    seed: Option<Turn>,
    turns: Vec<Turn>,
}

impl ConversationStore {
    /// Creates an empty store with no greeting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose first turn is the assistant's greeting.
    pub fn with_greeting(greeting: Turn) -> Self {
        Self {
            turns: vec![greeting.clone()],
            seed: Some(greeting),
        }
    }

    /// Appends a turn at the end.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns in order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// A copy of all turns, suitable for a request payload.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// The most recent turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true when the store holds no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drops every turn except the seed greeting.
    pub fn reset(&mut self) {
        self.turns.clear();
        if let Some(seed) = &self.seed {
            self.turns.push(seed.clone());
        }
    }
}
