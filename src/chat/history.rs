//! Chat history
//!
//! Append-only record of every formatted broadcast line, replayed to
//! newcomers. Entries outlive the clients that produced them.

#[derive(Debug, Default)]
pub struct ChatHistory {
    lines: Vec<String>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined, in broadcast order, ready for a single write.
    pub fn replay(&self) -> String {
        self.lines.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_keeps_order() {
        let mut history = ChatHistory::new();
        assert!(history.lines().is_empty());
        assert_eq!(history.replay(), "");

        history.push("first\n".into());
        history.push("second\n".into());
        assert_eq!(history.lines(), ["first\n", "second\n"]);
        assert_eq!(history.replay(), "first\nsecond\n");
    }
}
