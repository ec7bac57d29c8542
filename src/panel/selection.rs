//! Multi-select and bulk deletion.

use crate::conversation::ConversationId;
use crate::error::BackendError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkDeleteOutcome {
    /// Selection cleared; these ids were removed by the collaborator
    Deleted(Vec<ConversationId>),
    /// Selection retained so the user can retry
    Failed(BackendError),
}

/// Ordered set of selected conversation ids. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: Vec<ConversationId>,
    deleting: bool,
}

impl SelectionManager {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn contains(&self, id: &ConversationId) -> bool {
        self.selected.contains(id)
    }

    #[cfg(test)]
    pub fn ids(&self) -> &[ConversationId] {
        &self.selected
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    /// Flip membership of `id`. Returns true if it is now selected.
    pub fn toggle(&mut self, id: &ConversationId) -> bool {
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(id.clone());
            true
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop ids that no longer exist (e.g. deleted elsewhere).
    pub fn retain(&mut self, mut keep: impl FnMut(&ConversationId) -> bool) {
        self.selected.retain(|id| keep(id));
    }

    /// Start a bulk delete. Returns the ids to send, or `None` when a delete
    /// is already in flight or nothing is selected.
    pub fn begin_bulk_delete(&mut self) -> Option<Vec<ConversationId>> {
        if self.deleting {
            tracing::debug!("Bulk delete already in flight, ignoring");
            return None;
        }
        if self.selected.is_empty() {
            return None;
        }
        self.deleting = true;
        Some(self.selected.clone())
    }

    pub fn finish_bulk_delete(
        &mut self,
        result: Result<Vec<ConversationId>, BackendError>,
    ) -> BulkDeleteOutcome {
        let outcome = match result {
            Ok(deleted) => {
                self.selected.clear();
                BulkDeleteOutcome::Deleted(deleted)
            }
            Err(e) => {
                tracing::warn!("Bulk delete of {} failed: {}", self.selected.len(), e);
                BulkDeleteOutcome::Failed(e)
            }
        };
        self.deleting = false;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<ConversationId> {
        names.iter().map(|n| ConversationId::from(*n)).collect()
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut s = SelectionManager::default();
        let a = ConversationId::from("a");
        assert!(s.toggle(&a));
        assert!(s.contains(&a));
        assert!(!s.toggle(&a));
        assert!(s.is_empty());
    }

    #[test]
    fn test_bulk_delete_sends_ids_in_selection_order() {
        let mut s = SelectionManager::default();
        for id in ids(&["b", "a", "c"]) {
            s.toggle(&id);
        }
        assert_eq!(s.begin_bulk_delete(), Some(ids(&["b", "a", "c"])));
    }

    #[test]
    fn test_bulk_delete_success_clears_selection() {
        let mut s = SelectionManager::default();
        for id in ids(&["a", "b"]) {
            s.toggle(&id);
        }
        let sent = s.begin_bulk_delete().unwrap();
        let outcome = s.finish_bulk_delete(Ok(sent.clone()));
        assert_eq!(outcome, BulkDeleteOutcome::Deleted(sent));
        assert!(s.is_empty());
        assert!(!s.is_deleting());
    }

    #[test]
    fn test_bulk_delete_failure_retains_selection() {
        let mut s = SelectionManager::default();
        for id in ids(&["a", "b"]) {
            s.toggle(&id);
        }
        s.begin_bulk_delete().unwrap();
        let outcome = s.finish_bulk_delete(Err(BackendError::Unavailable("down".into())));
        assert!(matches!(outcome, BulkDeleteOutcome::Failed(_)));
        assert_eq!(s.ids(), ids(&["a", "b"]).as_slice());
        assert!(!s.is_deleting());
        // Retry is possible once the flag is reset
        assert!(s.begin_bulk_delete().is_some());
    }

    #[test]
    fn test_concurrent_bulk_delete_is_ignored() {
        let mut s = SelectionManager::default();
        s.toggle(&ConversationId::from("a"));
        assert!(s.begin_bulk_delete().is_some());
        assert!(s.begin_bulk_delete().is_none());
    }

    #[test]
    fn test_bulk_delete_with_empty_selection_is_noop() {
        let mut s = SelectionManager::default();
        assert!(s.begin_bulk_delete().is_none());
        assert!(!s.is_deleting());
    }
}
