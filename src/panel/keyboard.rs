//! Focus cursor over the flattened visible list.
//!
//! The cursor indexes the list as produced by grouping with collapse state
//! ignored, so focus may sit on a row whose group is folded.

use crate::conversation::{ConversationFilter, ConversationId};

/// What makes two flattened lists "the same list" for focus purposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListIdentity {
    pub filter: ConversationFilter,
    pub query: String,
}

#[derive(Debug, Clone, Default)]
pub struct KeyboardNavigator {
    cursor: Option<usize>,
    len: usize,
    identity: ListIdentity,
}

impl KeyboardNavigator {
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Track the current list. A filter or query change unsets the cursor;
    /// a shrinking list clamps it. Returns true when the identity changed.
    pub fn sync(&mut self, identity: &ListIdentity, len: usize) -> bool {
        let changed = &self.identity != identity;
        if changed {
            self.identity = identity.clone();
            self.cursor = None;
        }
        self.len = len;
        self.cursor = match self.cursor {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => None,
        };
        changed
    }

    pub fn down(&mut self) {
        if self.len == 0 {
            return;
        }
        self.cursor = Some(match self.cursor {
            None => 0,
            Some(i) => (i + 1).min(self.len - 1),
        });
    }

    pub fn up(&mut self) {
        if self.len == 0 {
            return;
        }
        self.cursor = Some(match self.cursor {
            None => 0,
            Some(i) => i.saturating_sub(1),
        });
    }

    pub fn focus(&mut self, index: usize) {
        if index < self.len {
            self.cursor = Some(index);
        }
    }

    pub fn focused_id<'a>(&self, visible: &[&'a ConversationId]) -> Option<&'a ConversationId> {
        self.cursor.and_then(|i| visible.get(i).copied())
    }
}
