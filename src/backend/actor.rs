//! Backend actor: simulated latency, failure injection, unordered completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::retry::{RetryConfig, with_retry};
use super::store::ConversationStore;
use super::{BackendEvent, BackendHandle, PanelCommand};
use crate::config::BackendConfig;
use crate::constants::{PINNED_PREFERENCE_KEY, SEARCH_RESULT_LIMIT};
use crate::conversation::ConversationId;
use crate::error::BackendError;

/// Uniform sample in [0, 1). Falls back to the midpoint if the OS source fails.
fn random_unit() -> f64 {
    let mut bytes = [0u8; 8];
    if getrandom::fill(&mut bytes).is_err() {
        return 0.5;
    }
    (u64::from_le_bytes(bytes) >> 11) as f64 / (1u64 << 53) as f64
}

/// Latency and failure model shared by every command task.
#[derive(Debug, Clone)]
struct Simulation {
    latency: Duration,
    failure_rate: f64,
}

impl Simulation {
    fn from_config(config: &BackendConfig) -> Self {
        Self {
            latency: Duration::from_millis(config.latency_ms),
            failure_rate: config.failure_rate,
        }
    }

    /// Latency jittered to 50%..150% so concurrent calls resolve out of order.
    async fn delay(&self) {
        if self.latency.is_zero() {
            return;
        }
        let factor = 0.5 + random_unit();
        tokio::time::sleep(self.latency.mul_f64(factor)).await;
    }

    fn roll_failure(&self, operation: &str) -> Result<(), BackendError> {
        if self.failure_rate > 0.0 && random_unit() < self.failure_rate {
            tracing::debug!("Injecting failure into {}", operation);
            return Err(BackendError::Unavailable(format!("{} timed out", operation)));
        }
        Ok(())
    }
}

struct ActorContext {
    store: ConversationStore,
    simulation: Simulation,
    retry: RetryConfig,
    page_size: usize,
    event_tx: mpsc::Sender<BackendEvent>,
}

pub fn spawn_backend_actor(store: ConversationStore, config: &BackendConfig) -> BackendHandle {
    spawn_with_retry(store, config, RetryConfig::default())
}

fn spawn_with_retry(
    store: ConversationStore,
    config: &BackendConfig,
    retry: RetryConfig,
) -> BackendHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (event_tx, event_rx) = mpsc::channel(128);

    let ctx = Arc::new(ActorContext {
        store,
        simulation: Simulation::from_config(config),
        retry,
        page_size: config.page_size,
        event_tx,
    });
    tokio::spawn(backend_actor_loop(ctx, cmd_rx));

    BackendHandle { cmd_tx, event_rx }
}

async fn backend_actor_loop(ctx: Arc<ActorContext>, mut cmd_rx: mpsc::Receiver<PanelCommand>) {
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            PanelCommand::Shutdown => break,
            PanelCommand::Select { id } => {
                tracing::debug!("Backend ignoring local select of {}", id);
            }
            // Inline so rapid toggles persist in order
            PanelCommand::SavePinned(pinned) => {
                if let Err(e) = ctx
                    .store
                    .set_bool_preference(PINNED_PREFERENCE_KEY, pinned)
                    .await
                {
                    let event =
                        BackendEvent::Error(format!("Failed to save pinned preference: {:#}", e));
                    if ctx.event_tx.send(event).await.is_err() {
                        tracing::warn!("Backend actor: event receiver dropped");
                        break;
                    }
                }
            }
            cmd => {
                let ctx = Arc::clone(&ctx);
                tokio::spawn(async move {
                    let event = run_command(&ctx, cmd).await;
                    if let Some(event) = event
                        && ctx.event_tx.send(event).await.is_err()
                    {
                        tracing::warn!("Backend actor: event receiver dropped");
                    }
                });
            }
        }
    }
    tracing::debug!("Backend actor stopped");
}

/// Map a store "row existed" flag onto the typed error.
fn found(existed: bool, id: &ConversationId) -> Result<(), BackendError> {
    if existed {
        Ok(())
    } else {
        Err(BackendError::NotFound { id: id.clone() })
    }
}

async fn run_command(ctx: &ActorContext, cmd: PanelCommand) -> Option<BackendEvent> {
    let sim = &ctx.simulation;
    let store = &ctx.store;

    let event = match cmd {
        PanelCommand::Refresh => {
            let page_size = ctx.page_size;
            let result = with_retry(&ctx.retry, BackendError::is_transient, || async move {
                sim.delay().await;
                sim.roll_failure("refresh")?;
                let (conversations, has_more) = store.list_conversations(page_size).await?;
                let departments = store.list_departments().await?;
                Ok::<_, BackendError>((conversations, departments, has_more))
            })
            .await;
            match result {
                Ok((conversations, departments, has_more)) => BackendEvent::Loaded {
                    conversations,
                    departments,
                    has_more,
                },
                Err(e) => BackendEvent::LoadFailed(e),
            }
        }

        PanelCommand::Search { seq, query } => {
            let query = query.as_str();
            let result = with_retry(&ctx.retry, BackendError::is_transient, || async move {
                sim.delay().await;
                sim.roll_failure("search")?;
                Ok::<_, BackendError>(store.search(query, SEARCH_RESULT_LIMIT).await?)
            })
            .await;
            BackendEvent::SearchCompleted { seq, result }
        }

        PanelCommand::Create => {
            sim.delay().await;
            let result = match sim.roll_failure("create") {
                Ok(()) => store.create_conversation().await.map_err(BackendError::from),
                Err(e) => Err(e),
            };
            BackendEvent::Created(result)
        }

        PanelCommand::Delete { id } => {
            sim.delay().await;
            let result = match sim.roll_failure("delete") {
                Ok(()) => match store.delete_conversation(&id).await {
                    Ok(existed) => found(existed, &id),
                    Err(e) => Err(e.into()),
                },
                Err(e) => Err(e),
            };
            BackendEvent::Deleted { id, result }
        }

        PanelCommand::BulkDelete { ids } => {
            sim.delay().await;
            let result = match sim.roll_failure("bulk delete") {
                Ok(()) => store.bulk_delete(&ids).await.map_err(BackendError::from),
                Err(e) => Err(e),
            };
            BackendEvent::BulkDeleted(result)
        }

        PanelCommand::Rename { id, title } => {
            sim.delay().await;
            let result = match sim.roll_failure("rename") {
                Ok(()) => match store.rename(&id, &title).await {
                    Ok(existed) => found(existed, &id),
                    Err(e) => Err(e.into()),
                },
                Err(e) => Err(e),
            };
            BackendEvent::Renamed { id, title, result }
        }

        PanelCommand::UpdateDepartment { token, id, slug } => {
            sim.delay().await;
            let result = match sim.roll_failure("department update") {
                Ok(()) => match store.update_department(&id, slug.as_deref()).await {
                    Ok(existed) => found(existed, &id),
                    Err(e) => Err(e.into()),
                },
                Err(e) => Err(e),
            };
            BackendEvent::DepartmentUpdated { token, result }
        }

        PanelCommand::SavePinned(_) | PanelCommand::Select { .. } | PanelCommand::Shutdown => {
            return None;
        }
    };
    Some(event)
}
