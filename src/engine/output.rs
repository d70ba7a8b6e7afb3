use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventBlock {
    /// Player-facing narration.
    Narration(String),
    /// Achievement unlock notification.
    Unlock(String),
    /// Recoverable content problem (e.g. a random event naming an unknown
    /// enemy); the action itself no-ops.
    Diagnostic(String),
}

impl EventBlock {
    pub fn text(&self) -> &str {
        match self {
            EventBlock::Narration(s) | EventBlock::Unlock(s) | EventBlock::Diagnostic(s) => s,
        }
    }
}

/// Ordered events emitted by one engine call.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub blocks: Vec<EventBlock>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(&mut self, s: impl Into<String>) {
        let s = s.into();
        if !s.trim().is_empty() {
            self.blocks.push(EventBlock::Narration(s));
        }
    }

    pub fn unlock(&mut self, s: impl Into<String>) {
        let s = s.into();
        if !s.trim().is_empty() {
            self.blocks.push(EventBlock::Unlock(s));
        }
    }

    pub fn diagnostic(&mut self, s: impl Into<String>) {
        let s = s.into();
        if !s.trim().is_empty() {
            self.blocks.push(EventBlock::Diagnostic(s));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The single-slot view: the last emitted message wins, matching
    /// callers that can only display one notification per turn.
    pub fn combined_message(&self) -> Option<&str> {
        self.blocks.last().map(|b| b.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_messages_are_dropped() {
        let mut out = Output::new();
        out.say("   ");
        out.unlock("");
        assert!(out.is_empty());
        assert_eq!(out.combined_message(), None);
    }

    #[test]
    fn combined_message_is_last_wins() {
        let mut out = Output::new();
        out.say("first");
        out.unlock("second");
        assert_eq!(out.combined_message(), Some("second"));
    }
}
