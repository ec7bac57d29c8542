//! Drag-and-drop department reassignment as a two-phase operation.
//!
//! Dropping produces a [`Reassignment`]: the caller applies its optimistic
//! update right away, persists it, and later calls [`resolve`] with the
//! collaborator's answer. A failure yields the compensating update, which the
//! caller feeds through the same update path as the optimistic one.
//!
//! Only one drag can be active. Starting another drag replaces the slot.
//!
//! [`resolve`]: DragReassignmentController::resolve

use std::collections::HashMap;

use crate::conversation::{Conversation, ConversationId};
use crate::error::BackendError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub conversation_id: ConversationId,
    pub source_key: String,
}

/// A department change applied to the local conversation snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentUpdate {
    pub id: ConversationId,
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub token: u64,
    pub conversation_id: ConversationId,
    /// Department before the drop (`None` = never assigned)
    pub from: Option<String>,
    pub to: String,
}

impl Reassignment {
    pub fn apply(&self) -> DepartmentUpdate {
        DepartmentUpdate {
            id: self.conversation_id.clone(),
            department: Some(self.to.clone()),
        }
    }

    pub fn compensate(&self) -> DepartmentUpdate {
        DepartmentUpdate {
            id: self.conversation_id.clone(),
            department: self.from.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassignmentResolution {
    Confirmed(Reassignment),
    /// Revert with `reassignment.compensate()`
    Failed(Reassignment, BackendError),
    /// Failed, but a later drop of the same conversation is still in flight
    /// and now carries the original department for its own rollback
    Superseded(Reassignment, BackendError),
}

#[derive(Debug, Clone, Default)]
pub struct DragReassignmentController {
    active: Option<DragState>,
    over: Option<String>,
    in_flight: Vec<Reassignment>,
    /// Newest confirmed token per conversation while earlier drops are pending
    confirmed: HashMap<ConversationId, u64>,
    next_token: u64,
}

impl DragReassignmentController {
    pub fn active(&self) -> Option<&DragState> {
        self.active.as_ref()
    }

    pub fn drop_target(&self) -> Option<&str> {
        self.over.as_deref()
    }

    pub fn is_dragging(&self, id: &ConversationId) -> bool {
        self.active
            .as_ref()
            .is_some_and(|d| &d.conversation_id == id)
    }

    pub fn on_drag_start(&mut self, conversation: &Conversation) {
        if let Some(prev) = &self.active {
            tracing::debug!("Replacing active drag of {}", prev.conversation_id);
        }
        self.active = Some(DragState {
            conversation_id: conversation.id.clone(),
            source_key: conversation.group_key().to_string(),
        });
        self.over = None;
    }

    pub fn on_drag_over_target(&mut self, key: &str) {
        if self.active.is_some() {
            self.over = Some(key.to_string());
        }
    }

    pub fn on_drag_leave_target(&mut self) {
        self.over = None;
    }

    pub fn cancel(&mut self) {
        self.active = None;
        self.over = None;
    }

    /// End the drag on `key`. Returns the reassignment to apply and persist,
    /// or `None` when nothing was dragged or the target is the source group.
    pub fn on_drop(&mut self, key: &str, from: Option<String>) -> Option<Reassignment> {
        let drag = self.active.take();
        self.over = None;
        let drag = drag?;
        if drag.source_key == key {
            return None;
        }

        self.next_token += 1;
        let reassignment = Reassignment {
            token: self.next_token,
            conversation_id: drag.conversation_id,
            from,
            to: key.to_string(),
        };
        tracing::debug!(
            "Optimistic reassignment #{}: {} {:?} -> {}",
            reassignment.token,
            reassignment.conversation_id,
            reassignment.from,
            reassignment.to
        );
        self.in_flight.push(reassignment.clone());
        Some(reassignment)
    }

    /// Settle the reassignment behind `token`.
    ///
    /// A failure only reverts the row when no later drop of the same
    /// conversation has settled or is still pending; otherwise the later
    /// drop owns the row's department.
    pub fn resolve(
        &mut self,
        token: u64,
        result: Result<(), BackendError>,
    ) -> Option<ReassignmentResolution> {
        let pos = self.in_flight.iter().position(|r| r.token == token)?;
        let reassignment = self.in_flight.remove(pos);
        let id = reassignment.conversation_id.clone();

        let resolution = match result {
            Ok(()) => {
                let earlier_pending = self
                    .in_flight
                    .iter()
                    .any(|r| r.conversation_id == id && r.token < token);
                if earlier_pending {
                    let last = self.confirmed.entry(id.clone()).or_insert(token);
                    *last = (*last).max(token);
                }
                ReassignmentResolution::Confirmed(reassignment)
            }
            Err(e) if self.confirmed.get(&id).is_some_and(|&t| t > token) => {
                tracing::debug!(
                    "Reassignment #{} failed after a later move of {} was confirmed",
                    token,
                    id
                );
                ReassignmentResolution::Superseded(reassignment, e)
            }
            Err(e) => {
                // Hand the pre-drag department to the newest later drop of
                // the same conversation so its rollback lands on the right value
                match self
                    .in_flight
                    .iter_mut()
                    .rev()
                    .find(|r| r.conversation_id == id && r.token > token)
                {
                    Some(later) => {
                        later.from = reassignment.from.clone();
                        ReassignmentResolution::Superseded(reassignment, e)
                    }
                    None => ReassignmentResolution::Failed(reassignment, e),
                }
            }
        };

        if !self.in_flight.iter().any(|r| r.conversation_id == id) {
            self.confirmed.remove(&id);
        }
        Some(resolution)
    }

    /// Optimistic overrides still awaiting confirmation, newest last.
    pub fn pending_overrides(&self) -> impl Iterator<Item = DepartmentUpdate> + '_ {
        self.in_flight.iter().map(Reassignment::apply)
    }
}
