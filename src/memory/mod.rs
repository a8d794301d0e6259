// Conversation memory
// Bounded window of past exchanges, threaded into the answer prompt


use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Write as _;

/// Exchanges kept before the oldest is evicted
pub const MEMORY_CAPACITY: usize = 8;

/// Messages returned by [`MemoryWindow::summary`]
pub const SUMMARY_MESSAGES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
}

/// FIFO window of the most recent exchanges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryWindow {
    capacity: usize,
    turns: VecDeque<ConversationTurn>,
}

impl Default for MemoryWindow {
    #[inline]
    fn default() -> Self {
        Self::with_capacity(MEMORY_CAPACITY)
    }
}

impl MemoryWindow {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// A window holding at most `capacity` turns (minimum one)
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            turns: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an exchange, evicting the oldest beyond capacity
    #[inline]
    pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push_back(ConversationTurn {
            question: question.into(),
            answer: answer.into(),
        });
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Turns in order, oldest first
    #[inline]
    pub fn snapshot(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Transcript in the "Human:/Assistant:" form used by the answer prompt
    #[inline]
    pub fn render(&self) -> String {
        let mut transcript = String::new();
        for turn in &self.turns {
            let _ = writeln!(transcript, "Human: {}", turn.question);
            let _ = writeln!(transcript, "Assistant: {}", turn.answer);
        }
        transcript.trim_end().to_string()
    }

    /// The last ten messages, questions and answers interleaved
    #[inline]
    pub fn summary(&self) -> Vec<String> {
        let messages: Vec<&String> = self
            .turns
            .iter()
            .flat_map(|turn| [&turn.question, &turn.answer])
            .collect();
        let skip = messages.len().saturating_sub(SUMMARY_MESSAGES);
        messages.into_iter().skip(skip).cloned().collect()
    }
}
