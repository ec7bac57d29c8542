//! Inline rename of a single conversation title.
//!
//! While an edit is open it captures all text input and keyboard
//! navigation is disabled.

use crate::conversation::ConversationId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEdit {
    pub id: ConversationId,
    pub buffer: String,
}

/// A rename the collaborator still has to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRename {
    pub id: ConversationId,
    pub title: String,
}

#[derive(Debug, Clone, Default)]
pub struct RenameState {
    edit: Option<RenameEdit>,
    pending: Vec<PendingRename>,
}

impl RenameState {
    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    pub fn edit(&self) -> Option<&RenameEdit> {
        self.edit.as_ref()
    }

    pub fn is_pending(&self, id: &ConversationId) -> bool {
        self.pending.iter().any(|p| &p.id == id)
    }

    pub fn start(&mut self, id: ConversationId, current_title: &str) {
        self.edit = Some(RenameEdit {
            id,
            buffer: current_title.to_string(),
        });
    }

    pub fn push(&mut self, c: char) {
        if let Some(edit) = &mut self.edit {
            edit.buffer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(edit) = &mut self.edit {
            edit.buffer.pop();
        }
    }

    pub fn cancel(&mut self) {
        self.edit = None;
    }

    /// Close the edit. Returns the rename to send, or `None` when the
    /// trimmed title is empty or unchanged.
    pub fn commit(&mut self, current_title: Option<&str>) -> Option<PendingRename> {
        let edit = self.edit.take()?;
        let title = edit.buffer.trim();
        if title.is_empty() || Some(title) == current_title {
            return None;
        }
        let rename = PendingRename {
            id: edit.id,
            title: title.to_string(),
        };
        self.pending.push(rename.clone());
        Some(rename)
    }

    /// Take the oldest pending rename for `id`.
    pub fn resolve(&mut self, id: &ConversationId) -> Option<PendingRename> {
        let pos = self.pending.iter().position(|p| &p.id == id)?;
        Some(self.pending.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_clears_edit_and_trims() {
        let mut r = RenameState::default();
        let id = ConversationId::from("c1");
        r.start(id.clone(), "Old");
        r.backspace();
        r.backspace();
        r.backspace();
        for c in " New title ".chars() {
            r.push(c);
        }
        let pending = r.commit(Some("Old")).unwrap();
        assert_eq!(pending.title, "New title");
        assert!(!r.is_editing());
        assert!(r.is_pending(&id));
        assert_eq!(r.resolve(&id), Some(pending));
        assert!(!r.is_pending(&id));
    }

    #[test]
    fn test_empty_or_unchanged_commit_sends_nothing() {
        let mut r = RenameState::default();
        r.start(ConversationId::from("c1"), "Same");
        assert_eq!(r.commit(Some("Same")), None);
        assert!(!r.is_editing());

        r.start(ConversationId::from("c1"), "Same");
        while r.edit().is_some_and(|e| !e.buffer.is_empty()) {
            r.backspace();
        }
        r.push(' ');
        assert_eq!(r.commit(Some("Same")), None);
    }

    #[test]
    fn test_cancel_discards_edit() {
        let mut r = RenameState::default();
        r.start(ConversationId::from("c1"), "Title");
        r.push('!');
        r.cancel();
        assert!(!r.is_editing());
        assert_eq!(r.commit(Some("Title")), None);
    }
}
