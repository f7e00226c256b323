#![forbid(unsafe_code)]

//! The text buffer both session models edit.

use backtrack_core::{CommandError, CommandResult, Originator, ReversibleCmd};

/// A plain text buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    text: String,
}

impl TextDocument {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn append(&mut self, s: &str) {
        self.text.push_str(s);
    }

    pub fn truncate(&mut self, len: usize) {
        self.text.truncate(len);
    }
}

impl Originator for TextDocument {
    type Snapshot = String;

    fn save(&self) -> String {
        self.text.clone()
    }

    fn restore(&mut self, snapshot: &String) {
        self.text.clone_from(snapshot);
    }
}

/// Appends text. Reversing truncates back to the length seen on apply.
#[derive(Debug)]
pub struct AppendText {
    text: String,
    description: String,
    prior_len: Option<usize>,
}

impl AppendText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            description: format!("Type {text:?}"),
            text,
            prior_len: None,
        }
    }
}

impl ReversibleCmd<TextDocument> for AppendText {
    fn apply(&mut self, target: &mut TextDocument) -> CommandResult {
        self.prior_len = Some(target.text().len());
        target.append(&self.text);
        Ok(())
    }

    fn reverse(&mut self, target: &mut TextDocument) -> CommandResult {
        let len = self
            .prior_len
            .ok_or_else(|| CommandError::InvalidState("text was never appended".into()))?;
        if target.text().len() < len {
            return Err(CommandError::InvalidState(format!(
                "document shorter ({}) than before the append ({len})",
                target.text().len()
            )));
        }
        target.truncate(len);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_reverse() {
        let mut doc = TextDocument::new("Say: ");
        let mut cmd = AppendText::new("Hi");
        cmd.apply(&mut doc).unwrap();
        assert_eq!(doc.text(), "Say: Hi");
        cmd.reverse(&mut doc).unwrap();
        assert_eq!(doc.text(), "Say: ");
        assert_eq!(cmd.description(), "Type \"Hi\"");
    }

    #[test]
    fn reverse_before_apply_fails() {
        let mut doc = TextDocument::default();
        let err = AppendText::new("x").reverse(&mut doc).unwrap_err();
        assert!(matches!(err, CommandError::InvalidState(_)));
    }

    #[test]
    fn save_restore_is_whole_state() {
        let mut doc = TextDocument::new("Hello");
        let saved = doc.save();
        doc.append(" World");
        assert_eq!(saved, "Hello");
        doc.restore(&saved);
        assert_eq!(doc.text(), "Hello");
    }
}
