//! The conversation service collaborator.
//!
//! The panel never touches storage directly. It queues [`PanelCommand`]s,
//! the actor runs each one against the [`ConversationStore`] on its own
//! task, and results flow back as [`BackendEvent`]s in whatever order they
//! complete.

mod actor;
mod retry;
mod seed;
mod store;

pub use actor::spawn_backend_actor;
pub use store::ConversationStore;

use tokio::sync::mpsc;

use crate::conversation::{Conversation, ConversationId, Department};
use crate::error::BackendError;

/// Outward calls queued by the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    Refresh,
    Search {
        seq: u64,
        query: String,
    },
    Create,
    Delete {
        id: ConversationId,
    },
    BulkDelete {
        ids: Vec<ConversationId>,
    },
    Rename {
        id: ConversationId,
        title: String,
    },
    UpdateDepartment {
        token: u64,
        id: ConversationId,
        slug: Option<String>,
    },
    SavePinned(bool),
    /// Handled by the host; the service is not involved
    Select {
        id: ConversationId,
    },
    Shutdown,
}

/// Results reported back by the actor.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    Loaded {
        conversations: Vec<Conversation>,
        departments: Vec<Department>,
        has_more: bool,
    },
    LoadFailed(BackendError),
    SearchCompleted {
        seq: u64,
        result: Result<Vec<Conversation>, BackendError>,
    },
    Created(Result<Conversation, BackendError>),
    Deleted {
        id: ConversationId,
        result: Result<(), BackendError>,
    },
    BulkDeleted(Result<Vec<ConversationId>, BackendError>),
    Renamed {
        id: ConversationId,
        title: String,
        result: Result<(), BackendError>,
    },
    DepartmentUpdated {
        token: u64,
        result: Result<(), BackendError>,
    },
    Error(String),
}

/// Handle for talking to the backend actor
pub struct BackendHandle {
    pub cmd_tx: mpsc::Sender<PanelCommand>,
    pub event_rx: mpsc::Receiver<BackendEvent>,
}
