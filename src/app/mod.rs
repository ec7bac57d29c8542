//! Application core - owns the panel, the backend handle and the terminal loop

mod actions;
mod event_loop;
pub mod render_thread;
pub mod state;

use anyhow::Result;

use render_thread::RenderThread;

use crate::backend::{BackendHandle, ConversationStore, PanelCommand, spawn_backend_actor};
use crate::config::Config;
use crate::constants::PINNED_PREFERENCE_KEY;
use crate::conversation::ConversationId;
use crate::input::KeyBindings;
use crate::panel::Panel;
use state::AppState;

/// Left button held on a conversation row, not yet resolved as click or drag
#[derive(Debug, Clone)]
pub(crate) struct PointerPress {
    pub id: ConversationId,
    pub position: usize,
    pub row: usize,
    pub dragging: bool,
}

pub struct App {
    pub(crate) state: AppState,
    pub(crate) backend: BackendHandle,
    pub(crate) bindings: KeyBindings,
    pub(crate) press: Option<PointerPress>,
    /// Dirty flag: when true, UI needs re-render. Skips renders when nothing changed.
    pub(crate) dirty: bool,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let store = ConversationStore::open(&Config::database_path()?).await?;

        let pinned = store.get_bool_preference(PINNED_PREFERENCE_KEY).await?;
        let mut panel = Panel::new(&config.panel, pinned);

        // Paint from the local store first; the refresh below goes through
        // the simulated service and replaces this snapshot
        let (conversations, has_more) = store
            .list_conversations(config.backend.page_size)
            .await?;
        let departments = store.list_departments().await?;
        tracing::info!(
            "Loaded {} conversations and {} departments from store",
            conversations.len(),
            departments.len()
        );
        panel.load(conversations, departments, has_more);
        panel.refresh();

        let backend = spawn_backend_actor(store, &config.backend);
        let bindings = KeyBindings::new(&config.ui.keybinding_mode);
        let state = AppState::new(panel, config.ui.date_format.clone());

        Ok(Self {
            state,
            backend,
            bindings,
            press: None,
            dirty: true,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Spawn background render thread (owns terminal setup/teardown)
        let render_thread = RenderThread::spawn()?;

        let result = self.event_loop(&render_thread).await;

        render_thread.shutdown();
        self.backend.cmd_tx.send(PanelCommand::Shutdown).await.ok();

        result
    }

    /// Forward everything the panel queued to the backend actor.
    pub(crate) async fn flush_commands(&mut self) {
        for cmd in self.state.panel.drain_commands() {
            match cmd {
                PanelCommand::Select { id } => {
                    tracing::debug!("Showing conversation {}", id);
                }
                cmd => {
                    if let Err(e) = self.backend.cmd_tx.send(cmd).await {
                        tracing::error!("Backend actor unavailable: {}", e);
                    }
                }
            }
        }
    }
}
