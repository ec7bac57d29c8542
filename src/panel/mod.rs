//! The conversation panel: state machines plus the snapshot they act on.
//!
//! [`Panel`] is the single owner of the conversation snapshot. It never
//! performs I/O; every outward call is queued as a [`PanelCommand`] and
//! drained by the event loop, and every result comes back through
//! [`Panel::handle_backend_event`]. Time is passed in explicitly so all
//! timers are deterministic.

pub mod drag;
pub mod expansion;
pub mod hover;
pub mod keyboard;
pub mod notification;
pub mod rename;
pub mod render_strategy;
pub mod search;
pub mod selection;

use std::ops::Range;
use std::time::Instant;

pub use drag::{DepartmentUpdate, DragReassignmentController, ReassignmentResolution};
pub use expansion::{ExpansionStateMachine, OutsideClick, PanelView, PointerTarget, VisualState};
pub use keyboard::{KeyboardNavigator, ListIdentity};
pub use notification::{Notification, NotificationKind, NotificationState};
pub use rename::RenameState;
pub use render_strategy::{
    GroupedRenderer, ListRenderer, ListRow, RenderStrategy, WindowedRenderer, row_for_position,
};
pub use search::{SearchCoordinator, SearchResolution};
pub use selection::{BulkDeleteOutcome, SelectionManager};

use crate::backend::{BackendEvent, PanelCommand};
use crate::config::PanelConfig;
use crate::conversation::{
    Conversation, ConversationFilter, ConversationId, Department, DepartmentGroups,
    GroupExpansion, department_display_name, group_conversations,
};

/// One materialized list row, owned so it can cross to the render thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowView {
    Header {
        key: String,
        name: String,
        count: usize,
        expanded: bool,
        collapsible: bool,
        drop_target: bool,
    },
    Conversation {
        id: ConversationId,
        /// Group the row is filed under
        group_key: String,
        title: String,
        updated_at: i64,
        message_count: u32,
        position: usize,
        focused: bool,
        selected: bool,
        current: bool,
        dragging: bool,
        /// Edit buffer while this row is being renamed
        editing: Option<String>,
        rename_pending: bool,
    },
}

/// The materialized part of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub strategy: RenderStrategy,
    pub total_rows: usize,
    /// Index of `rows[0]` in the full row sequence
    pub first_row: usize,
    pub offset: usize,
    pub rows: Vec<RowView>,
    /// Windowed renderer still waiting for a viewport measurement
    pub unmeasured: bool,
}

impl ListView {
    /// Row at absolute index `row`, if materialized.
    pub fn row(&self, row: usize) -> Option<&RowView> {
        row.checked_sub(self.first_row)
            .and_then(|i| self.rows.get(i))
    }
}

#[derive(Debug, Clone)]
pub struct Panel {
    conversations: Vec<Conversation>,
    departments: Vec<Department>,
    current_id: Option<ConversationId>,
    loading: bool,
    has_more: bool,
    filter: ConversationFilter,
    expansion: ExpansionStateMachine,
    search: SearchCoordinator,
    group_expansion: GroupExpansion,
    selection: SelectionManager,
    drag: DragReassignmentController,
    keyboard: KeyboardNavigator,
    rename: RenameState,
    notifications: NotificationState,
    grouped: GroupedRenderer,
    windowed: WindowedRenderer,
    virtualization_threshold: usize,
    desktop_min_width: u16,
    viewport_width: u16,
    outbox: Vec<PanelCommand>,
}

impl Panel {
    pub fn new(config: &PanelConfig, pinned: bool) -> Self {
        Self {
            conversations: Vec::new(),
            departments: Vec::new(),
            current_id: None,
            loading: false,
            has_more: false,
            filter: ConversationFilter::All,
            expansion: ExpansionStateMachine::new(
                pinned,
                config.hover_enter_delay(),
                config.hover_exit_delay(),
                config.desktop_min_width,
            ),
            search: SearchCoordinator::new(config.search_debounce(), config.remote_search),
            group_expansion: GroupExpansion::default(),
            selection: SelectionManager::default(),
            drag: DragReassignmentController::default(),
            keyboard: KeyboardNavigator::default(),
            rename: RenameState::default(),
            notifications: NotificationState::new(config.notification_ttl()),
            grouped: GroupedRenderer::default(),
            windowed: WindowedRenderer::default(),
            virtualization_threshold: config.virtualization_threshold,
            desktop_min_width: config.desktop_min_width,
            viewport_width: 0,
            outbox: Vec::new(),
        }
    }

    // === Read access ===

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    pub fn conversation(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    #[cfg(test)]
    pub fn current_id(&self) -> Option<&ConversationId> {
        self.current_id.as_ref()
    }

    pub fn current(&self) -> Option<&Conversation> {
        self.current_id.as_ref().and_then(|id| self.conversation(id))
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[cfg(test)]
    pub fn filter(&self) -> &ConversationFilter {
        &self.filter
    }

    pub fn filter_label(&self) -> String {
        self.filter.label(&self.departments).into_owned()
    }

    pub fn query(&self) -> &str {
        self.search.query()
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_searching()
    }

    pub fn view(&self) -> PanelView {
        self.expansion.view()
    }

    pub fn visual_state(&self) -> VisualState {
        self.expansion.current_visual_state()
    }

    pub fn is_pinned(&self) -> bool {
        self.expansion.is_pinned()
    }

    pub fn is_mobile_layout(&self) -> bool {
        self.viewport_width <= self.desktop_min_width
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn drag(&self) -> &DragReassignmentController {
        &self.drag
    }

    pub fn is_renaming(&self) -> bool {
        self.rename.is_editing()
    }

    #[cfg(test)]
    pub fn cursor(&self) -> Option<usize> {
        self.keyboard.cursor()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current()
    }

    pub fn has_unacknowledged_error(&self) -> bool {
        self.notifications.has_unacknowledged_error()
    }

    /// Number of conversations matching the current filter and query.
    pub fn result_count(&self) -> usize {
        self.groups().conversation_count()
    }

    pub fn groups(&self) -> DepartmentGroups<'_> {
        group_conversations(
            &self.conversations,
            &self.departments,
            &self.filter,
            self.search.query(),
        )
    }

    pub fn strategy(&self) -> RenderStrategy {
        RenderStrategy::choose(self.conversations.len(), self.virtualization_threshold)
    }

    fn renderer(&self) -> &dyn ListRenderer {
        match self.strategy() {
            RenderStrategy::Grouped => &self.grouped,
            RenderStrategy::Virtualized => &self.windowed,
        }
    }

    fn renderer_mut(&mut self) -> &mut dyn ListRenderer {
        match self.strategy() {
            RenderStrategy::Grouped => &mut self.grouped,
            RenderStrategy::Virtualized => &mut self.windowed,
        }
    }

    pub fn focused(&self) -> Option<&Conversation> {
        let groups = self.groups();
        let flat = groups.flatten();
        let ids: Vec<&ConversationId> = flat.iter().map(|c| &c.id).collect();
        let id = self.keyboard.focused_id(&ids)?;
        self.conversation(id)
    }

    /// Materialize the rows the active renderer wants drawn.
    pub fn list_view(&self) -> ListView {
        let groups = self.groups();
        let renderer = self.renderer();
        let rows = renderer.rows(&groups, &self.group_expansion);
        let window = renderer.window(rows.len());
        let unmeasured = self.strategy() == RenderStrategy::Virtualized && !self.windowed.is_measured();

        ListView {
            strategy: renderer.strategy(),
            total_rows: rows.len(),
            first_row: window.start,
            offset: renderer.visible_offset(rows.len()),
            rows: self.row_views(&rows, window),
            unmeasured,
        }
    }

    fn row_views(&self, rows: &[ListRow<'_>], window: Range<usize>) -> Vec<RowView> {
        let cursor = self.keyboard.cursor();
        let edit = self.rename.edit();
        rows[window]
            .iter()
            .map(|row| match row {
                ListRow::GroupHeader {
                    key,
                    name,
                    count,
                    expanded,
                    collapsible,
                } => RowView::Header {
                    key: key.to_string(),
                    name: name.to_string(),
                    count: *count,
                    expanded: *expanded,
                    collapsible: *collapsible,
                    drop_target: self.drag.drop_target() == Some(*key),
                },
                ListRow::Conversation {
                    conversation,
                    position,
                } => RowView::Conversation {
                    id: conversation.id.clone(),
                    group_key: conversation.group_key().to_string(),
                    title: conversation.title.clone(),
                    updated_at: conversation.updated_at,
                    message_count: conversation.message_count,
                    position: *position,
                    focused: cursor == Some(*position),
                    selected: self.selection.contains(&conversation.id),
                    current: self.current_id.as_ref() == Some(&conversation.id),
                    dragging: self.drag.is_dragging(&conversation.id),
                    editing: edit
                        .filter(|e| e.id == conversation.id)
                        .map(|e| e.buffer.clone()),
                    rename_pending: self.rename.is_pending(&conversation.id),
                },
            })
            .collect()
    }

    // === Event loop integration ===

    pub fn drain_commands(&mut self) -> Vec<PanelCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.expansion.next_deadline(),
            self.search.next_deadline(),
            self.notifications.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Fire elapsed timers. Returns true if anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let has_conversations = !self.conversations.is_empty();
        let mut changed = self.expansion.tick(now, has_conversations);
        if let Some(request) = self.search.poll(now) {
            self.outbox.push(PanelCommand::Search {
                seq: request.seq,
                query: request.query,
            });
            changed = true;
        }
        changed |= self.notifications.clear_if_expired(now);
        changed
    }

    pub fn acknowledge(&mut self) {
        self.notifications.acknowledge();
    }

    /// Initial snapshot supplied by the host before the first refresh.
    pub fn load(
        &mut self,
        conversations: Vec<Conversation>,
        departments: Vec<Department>,
        has_more: bool,
    ) {
        self.departments = departments;
        self.has_more = has_more;
        self.replace_snapshot(conversations);
    }

    pub fn refresh(&mut self) {
        if self.loading {
            return;
        }
        self.loading = true;
        self.outbox.push(PanelCommand::Refresh);
    }

    pub fn handle_backend_event(&mut self, event: BackendEvent, now: Instant) {
        match event {
            BackendEvent::Loaded {
                conversations,
                departments,
                has_more,
            } => {
                self.loading = false;
                if has_more && !self.has_more {
                    self.notifications.info(
                        format!("Showing the newest {} conversations", conversations.len()),
                        now,
                    );
                }
                self.departments = departments;
                self.has_more = has_more;
                self.replace_snapshot(conversations);
                tracing::debug!("Loaded {} conversations", self.conversations.len());
            }
            BackendEvent::LoadFailed(e) => {
                self.loading = false;
                self.notifications
                    .error(format!("Refresh failed: {}", e), now);
            }
            BackendEvent::SearchCompleted { seq, result } => {
                if self.search.on_completed(seq) == SearchResolution::Stale {
                    return;
                }
                match result {
                    Ok(results) => self.replace_snapshot(results),
                    Err(e) => self.notifications.error(format!("Search failed: {}", e), now),
                }
            }
            BackendEvent::Created(result) => match result {
                Ok(conversation) => {
                    let id = conversation.id.clone();
                    self.conversations.insert(0, conversation);
                    self.notifications.success("Conversation created", now);
                    self.select(id);
                }
                Err(e) => self
                    .notifications
                    .error(format!("Failed to create conversation: {}", e), now),
            },
            BackendEvent::Deleted { id, result } => match result {
                Ok(()) => {
                    self.remove_conversations(std::slice::from_ref(&id));
                    self.notifications.success("Conversation deleted", now);
                }
                Err(e) => self.notifications.error(format!("Delete failed: {}", e), now),
            },
            BackendEvent::BulkDeleted(result) => {
                match self.selection.finish_bulk_delete(result) {
                    BulkDeleteOutcome::Deleted(ids) => {
                        self.remove_conversations(&ids);
                        self.notifications
                            .success(format!("Deleted {} conversations", ids.len()), now);
                    }
                    BulkDeleteOutcome::Failed(e) => {
                        self.notifications
                            .error(format!("Bulk delete failed: {}", e), now);
                    }
                }
                self.sync_selection();
            }
            BackendEvent::Renamed { id, title, result } => {
                self.rename.resolve(&id);
                match result {
                    Ok(()) => {
                        if let Some(conv) = self.conversations.iter_mut().find(|c| c.id == id) {
                            conv.title = title;
                        }
                    }
                    Err(e) => self.notifications.error(format!("Rename failed: {}", e), now),
                }
            }
            BackendEvent::DepartmentUpdated { token, result } => {
                self.resolve_reassignment(token, result, now);
            }
            BackendEvent::Error(message) => self.notifications.error(message, now),
        }
        self.sync_list();
    }

    /// Replace the snapshot, keeping in-flight optimistic department moves.
    fn replace_snapshot(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
        let overrides: Vec<DepartmentUpdate> = self.drag.pending_overrides().collect();
        for update in &overrides {
            self.apply_department_update(update);
        }
        self.sync_list();
    }

    fn remove_conversations(&mut self, ids: &[ConversationId]) {
        self.conversations.retain(|c| !ids.contains(&c.id));
        self.selection.retain(|id| !ids.contains(id));
        if self.current_id.as_ref().is_some_and(|id| ids.contains(id)) {
            self.current_id = None;
        }
        self.sync_selection();
        self.sync_list();
    }

    /// Re-sync cursor and scroll with the current list. A new filter or
    /// query starts again from the top.
    fn sync_list(&mut self) {
        let len = self.result_count();
        let identity = ListIdentity {
            filter: self.filter.clone(),
            query: self.search.query().to_string(),
        };
        let changed = self.keyboard.sync(&identity, len);
        self.sync_scroll(changed);
    }

    fn sync_scroll(&mut self, reset: bool) {
        let total = {
            let groups = self.groups();
            self.renderer().rows(&groups, &self.group_expansion).len()
        };
        let renderer = self.renderer_mut();
        if reset {
            renderer.reset_scroll();
        }
        renderer.clamp_scroll(total);
    }

    fn sync_selection(&mut self) {
        self.expansion
            .on_selection_changed(!self.selection.is_empty());
    }

    // === Expansion ===

    pub fn toggle_pin(&mut self) {
        let pinned = self.expansion.toggle_pin();
        self.outbox.push(PanelCommand::SavePinned(pinned));
    }

    pub fn pointer_entered_rail(&mut self, now: Instant) {
        let has_conversations = !self.conversations.is_empty();
        self.expansion.pointer_entered_rail(now, has_conversations);
    }

    pub fn pointer_entered_content(&mut self) {
        self.expansion.pointer_entered_content();
    }

    pub fn pointer_left(&mut self, now: Instant) {
        self.expansion.pointer_left(now);
    }

    pub fn pointer_down(&mut self, target: PointerTarget) -> OutsideClick {
        let outcome = self.expansion.on_pointer_down(target, self.viewport_width);
        if outcome == OutsideClick::Unpinned {
            self.outbox.push(PanelCommand::SavePinned(false));
        }
        outcome
    }

    pub fn set_mobile_open(&mut self, open: bool) {
        self.expansion.on_mobile_open_changed(open);
    }

    pub fn toggle_drawer(&mut self) {
        let open = !self.expansion.is_mobile_open();
        self.set_mobile_open(open);
    }

    /// Terminal resized: `width` in columns, `list_height` in rows.
    pub fn on_viewport_resize(&mut self, width: u16, list_height: u16) {
        self.viewport_width = width;
        if !self.is_mobile_layout() && self.expansion.is_mobile_open() {
            self.set_mobile_open(false);
        }
        self.grouped.on_resize(list_height);
        self.windowed.on_resize(list_height);
        self.sync_scroll(false);
        self.scroll_to_focus();
    }

    // === Search and filter ===

    pub fn set_query(&mut self, text: &str, now: Instant) {
        if let Some(request) = self.search.on_query_changed(text, now) {
            self.outbox.push(PanelCommand::Search {
                seq: request.seq,
                query: request.query,
            });
        }
        self.sync_list();
    }

    pub fn search_input(&mut self, c: char, now: Instant) {
        let mut text = self.search.query().to_string();
        text.push(c);
        self.set_query(&text, now);
    }

    pub fn search_backspace(&mut self, now: Instant) {
        let mut text = self.search.query().to_string();
        text.pop();
        self.set_query(&text, now);
    }

    pub fn clear_search(&mut self) {
        if let Some(request) = self.search.clear() {
            self.outbox.push(PanelCommand::Search {
                seq: request.seq,
                query: request.query,
            });
        }
        self.sync_list();
    }

    pub fn set_filter(&mut self, filter: ConversationFilter) {
        tracing::debug!("Filter set to {:?}", filter);
        self.filter = filter;
        self.sync_list();
    }

    /// All -> Archived -> each department -> All.
    pub fn cycle_filter(&mut self) {
        let keys: Vec<&str> = self.departments.iter().map(|d| d.key()).collect();
        let next = match &self.filter {
            ConversationFilter::All => ConversationFilter::Archived,
            ConversationFilter::Archived => keys
                .first()
                .map(|k| ConversationFilter::Department(k.to_string()))
                .unwrap_or_default(),
            ConversationFilter::Department(current) => keys
                .iter()
                .position(|k| k == current)
                .and_then(|i| keys.get(i + 1))
                .map(|k| ConversationFilter::Department(k.to_string()))
                .unwrap_or_default(),
        };
        self.set_filter(next);
    }

    pub fn toggle_group(&mut self, key: &str) {
        if self.strategy() == RenderStrategy::Virtualized {
            return;
        }
        let groups = group_conversations(
            &self.conversations,
            &self.departments,
            &self.filter,
            self.search.query(),
        );
        if let Some(group) = groups.get(key) {
            let expanded = self.group_expansion.toggle(group);
            tracing::debug!("Group {} expanded: {}", key, expanded);
        }
        self.sync_scroll(false);
    }

    /// Toggle the group containing the focused conversation.
    pub fn toggle_focused_group(&mut self) {
        if let Some(key) = self.focused().map(|c| c.group_key().to_string()) {
            self.toggle_group(&key);
            self.scroll_to_focus();
        }
    }

    // === Keyboard ===

    fn keyboard_enabled(&self) -> bool {
        self.expansion.view().shows_content() && !self.rename.is_editing()
    }

    pub fn move_down(&mut self) {
        if self.keyboard_enabled() {
            self.keyboard.down();
            self.scroll_to_focus();
        }
    }

    pub fn move_up(&mut self) {
        if self.keyboard_enabled() {
            self.keyboard.up();
            self.scroll_to_focus();
        }
    }

    /// Same effect as clicking the focused row.
    pub fn select_current(&mut self) {
        if !self.keyboard_enabled() {
            return;
        }
        if let Some(id) = self.focused().map(|c| c.id.clone()) {
            self.select(id);
        }
    }

    pub fn focus_position(&mut self, position: usize) {
        self.keyboard.focus(position);
    }

    fn scroll_to_focus(&mut self) {
        let Some(position) = self.keyboard.cursor() else {
            return;
        };
        let row = {
            let groups = self.groups();
            let rows = self.renderer().rows(&groups, &self.group_expansion);
            row_for_position(&rows, position)
        };
        if let Some(row) = row {
            self.renderer_mut().scroll_to(row);
        }
    }

    // === Selection and navigation ===

    pub fn select(&mut self, id: ConversationId) {
        tracing::debug!("Selecting conversation {}", id);
        self.current_id = Some(id.clone());
        self.outbox.push(PanelCommand::Select { id });
        if self.expansion.is_mobile_open() {
            self.set_mobile_open(false);
        }
    }

    pub fn toggle_selection(&mut self, id: &ConversationId) {
        self.selection.toggle(id);
        self.sync_selection();
    }

    pub fn toggle_focused_selection(&mut self) {
        if !self.keyboard_enabled() {
            return;
        }
        if let Some(id) = self.focused().map(|c| c.id.clone()) {
            self.toggle_selection(&id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.sync_selection();
    }

    pub fn bulk_delete(&mut self) {
        if let Some(ids) = self.selection.begin_bulk_delete() {
            tracing::debug!("Bulk deleting {} conversations", ids.len());
            self.outbox.push(PanelCommand::BulkDelete { ids });
        }
    }

    pub fn create_conversation(&mut self) {
        self.outbox.push(PanelCommand::Create);
    }

    pub fn delete_conversation(&mut self, id: ConversationId) {
        self.outbox.push(PanelCommand::Delete { id });
    }

    /// Target of single-row actions: the focused row, else the current one.
    fn action_target(&self) -> Option<&Conversation> {
        self.focused().or_else(|| self.current())
    }

    pub fn delete_focused(&mut self) {
        if let Some(id) = self.action_target().map(|c| c.id.clone()) {
            self.delete_conversation(id);
        }
    }

    // === Rename ===

    pub fn start_rename(&mut self) {
        if let Some((id, title)) = self
            .action_target()
            .map(|c| (c.id.clone(), c.title.clone()))
        {
            self.rename.start(id, &title);
        }
    }

    pub fn rename_input(&mut self, c: char) {
        self.rename.push(c);
    }

    pub fn rename_backspace(&mut self) {
        self.rename.backspace();
    }

    pub fn cancel_rename(&mut self) {
        self.rename.cancel();
    }

    /// Close the edit and send the rename. The title changes locally only
    /// once the service confirms it.
    pub fn commit_rename(&mut self) {
        let current_title = self
            .rename
            .edit()
            .and_then(|e| self.conversation(&e.id))
            .map(|c| c.title.clone());
        if let Some(pending) = self.rename.commit(current_title.as_deref()) {
            self.outbox.push(PanelCommand::Rename {
                id: pending.id,
                title: pending.title,
            });
        }
    }

    // === Drag reassignment ===

    pub fn drag_start(&mut self, id: &ConversationId) {
        if let Some(conversation) = self.conversations.iter().find(|c| &c.id == id) {
            self.drag.on_drag_start(conversation);
        }
    }

    pub fn drag_over(&mut self, key: &str) {
        self.drag.on_drag_over_target(key);
    }

    pub fn drag_leave(&mut self) {
        self.drag.on_drag_leave_target();
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn drop_on(&mut self, key: &str) {
        let from = self
            .drag
            .active()
            .and_then(|d| self.conversation(&d.conversation_id))
            .and_then(|c| c.department.clone());
        let Some(reassignment) = self.drag.on_drop(key, from) else {
            return;
        };
        self.apply_department_update(&reassignment.apply());
        self.outbox.push(PanelCommand::UpdateDepartment {
            token: reassignment.token,
            id: reassignment.conversation_id,
            slug: Some(reassignment.to),
        });
        self.sync_list();
    }

    /// Keyboard path to the same two-phase move used by drag and drop.
    pub fn move_focused_to(&mut self, key: &str) {
        if let Some(id) = self.action_target().map(|c| c.id.clone()) {
            if let Some(active) = self.drag.active() {
                tracing::debug!("Keyboard move cancels drag of {}", active.conversation_id);
                self.drag.cancel();
            }
            self.drag_start(&id);
            self.drop_on(key);
        }
    }

    /// The single write path for department changes, used by both the
    /// optimistic apply and its compensation.
    fn apply_department_update(&mut self, update: &DepartmentUpdate) {
        if let Some(conv) = self.conversations.iter_mut().find(|c| c.id == update.id) {
            conv.department = update.department.clone();
        }
    }

    fn resolve_reassignment(
        &mut self,
        token: u64,
        result: Result<(), crate::error::BackendError>,
        now: Instant,
    ) {
        match self.drag.resolve(token, result) {
            Some(ReassignmentResolution::Confirmed(r)) => {
                let name = department_display_name(&r.to, &self.departments).into_owned();
                self.notifications.success(format!("Moved to {}", name), now);
            }
            Some(ReassignmentResolution::Failed(r, e)) => {
                self.apply_department_update(&r.compensate());
                self.notifications
                    .error(format!("Failed to move conversation: {}", e), now);
            }
            Some(ReassignmentResolution::Superseded(_, e)) => {
                self.notifications
                    .error(format!("Failed to move conversation: {}", e), now);
            }
            None => tracing::debug!("Department update #{} already resolved", token),
        }
    }

    /// Department keys offered as move targets, in group order.
    pub fn move_targets(&self) -> Vec<(String, String)> {
        self.groups()
            .iter()
            .map(|g| (g.key.clone(), g.name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::test_support::{conversation, conversations};
    use crate::error::BackendError;
    use std::time::Duration;

    fn config() -> PanelConfig {
        PanelConfig::default()
    }

    fn panel_with(convs: Vec<Conversation>) -> Panel {
        let mut panel = Panel::new(&config(), false);
        panel.on_viewport_resize(160, 20);
        panel.load(convs, Vec::new(), false);
        panel
    }

    fn expand(panel: &mut Panel) {
        panel.toggle_pin();
        panel.drain_commands();
    }

    fn department_of(panel: &Panel, id: &str) -> Option<String> {
        panel
            .conversation(&ConversationId::from(id))
            .and_then(|c| c.department.clone())
    }

    fn update_token(commands: &[PanelCommand]) -> u64 {
        commands
            .iter()
            .find_map(|c| match c {
                PanelCommand::UpdateDepartment { token, .. } => Some(*token),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_drop_failure_reverts_to_pre_drag_department() {
        let mut panel = panel_with(vec![conversation("a", "Deal", Some("sales"))]);
        let now = Instant::now();
        panel.drag_start(&ConversationId::from("a"));
        panel.drag_over("legal");
        panel.drop_on("legal");
        assert_eq!(department_of(&panel, "a").as_deref(), Some("legal"));

        let token = update_token(&panel.drain_commands());
        panel.handle_backend_event(
            BackendEvent::DepartmentUpdated {
                token,
                result: Err(BackendError::Unavailable("offline".into())),
            },
            now,
        );
        assert_eq!(department_of(&panel, "a").as_deref(), Some("sales"));
        assert_eq!(panel.notification().unwrap().kind, NotificationKind::Error);
    }

    #[test]
    fn test_drop_success_keeps_target_department() {
        let mut panel = panel_with(vec![conversation("a", "Deal", None)]);
        panel.drag_start(&ConversationId::from("a"));
        panel.drop_on("legal");
        let token = update_token(&panel.drain_commands());
        panel.handle_backend_event(
            BackendEvent::DepartmentUpdated {
                token,
                result: Ok(()),
            },
            Instant::now(),
        );
        assert_eq!(department_of(&panel, "a").as_deref(), Some("legal"));
        let toast = panel.notification().unwrap();
        assert_eq!(toast.kind, NotificationKind::Success);
        assert_eq!(toast.message, "Moved to Legal");
    }

    #[test]
    fn test_refresh_keeps_pending_optimistic_move() {
        let mut panel = panel_with(vec![conversation("a", "Deal", None)]);
        panel.drag_start(&ConversationId::from("a"));
        panel.drop_on("sales");
        panel.drain_commands();

        // Stale snapshot from before the move lands first
        panel.handle_backend_event(
            BackendEvent::Loaded {
                conversations: vec![conversation("a", "Deal", None)],
                departments: Vec::new(),
                has_more: false,
            },
            Instant::now(),
        );
        assert_eq!(department_of(&panel, "a").as_deref(), Some("sales"));
    }

    #[test]
    fn test_earlier_move_failing_after_later_confirm_keeps_later_department() {
        let now = Instant::now();
        let mut panel = panel_with(vec![conversation("a", "Deal", Some("sales"))]);
        let id = ConversationId::from("a");

        panel.drag_start(&id);
        panel.drop_on("legal");
        let first = update_token(&panel.drain_commands());
        panel.drag_start(&id);
        panel.drop_on("support");
        let second = update_token(&panel.drain_commands());
        assert_eq!(department_of(&panel, "a").as_deref(), Some("support"));

        panel.handle_backend_event(
            BackendEvent::DepartmentUpdated {
                token: second,
                result: Ok(()),
            },
            now,
        );
        panel.handle_backend_event(
            BackendEvent::DepartmentUpdated {
                token: first,
                result: Err(BackendError::Unavailable("offline".into())),
            },
            now,
        );
        assert_eq!(department_of(&panel, "a").as_deref(), Some("support"));
        assert_eq!(panel.notification().unwrap().kind, NotificationKind::Error);

        // A later snapshot has nothing pending to re-apply
        panel.handle_backend_event(
            BackendEvent::Loaded {
                conversations: vec![conversation("a", "Deal", Some("support"))],
                departments: Vec::new(),
                has_more: false,
            },
            now,
        );
        assert_eq!(department_of(&panel, "a").as_deref(), Some("support"));
        assert_eq!(panel.drag().pending_overrides().count(), 0);
    }

    #[test]
    fn test_keyboard_move_cancels_mouse_drag() {
        let mut panel = panel_with(vec![
            conversation("a", "Dragged", None),
            conversation("b", "Moved", None),
        ]);
        panel.drag_start(&ConversationId::from("a"));
        panel.drag_over("sales");
        panel.select(ConversationId::from("b"));
        panel.drain_commands();

        panel.move_focused_to("legal");
        let commands = panel.drain_commands();
        let moved: Vec<&ConversationId> = commands
            .iter()
            .filter_map(|c| match c {
                PanelCommand::UpdateDepartment { id, .. } => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(moved, vec![&ConversationId::from("b")]);
        assert_eq!(department_of(&panel, "b").as_deref(), Some("legal"));
        assert_eq!(department_of(&panel, "a"), None);
        assert!(panel.drag().active().is_none());
        assert_eq!(panel.drag().drop_target(), None);
    }

    #[test]
    fn test_query_after_scrolling_starts_from_top() {
        let mut panel = Panel::new(&config(), true);
        panel.on_viewport_resize(160, 5);
        panel.load(conversations(15), Vec::new(), false);
        for _ in 0..15 {
            panel.move_down();
        }
        assert_eq!(panel.list_view().offset, 11);

        panel.set_query("Conversation 1", Instant::now());
        assert_eq!(panel.result_count(), 6);
        let view = panel.list_view();
        assert_eq!(view.total_rows, 7);
        assert_eq!(view.offset, 0);
        assert!(matches!(view.row(0), Some(RowView::Header { .. })));
        assert!((0..5).all(|row| view.row(row).is_some()));
    }

    #[test]
    fn test_shrinking_snapshot_keeps_viewport_filled() {
        let mut panel = Panel::new(&config(), true);
        panel.on_viewport_resize(160, 5);
        panel.load(conversations(15), Vec::new(), false);
        for _ in 0..15 {
            panel.move_down();
        }

        panel.handle_backend_event(
            BackendEvent::Loaded {
                conversations: conversations(6),
                departments: Vec::new(),
                has_more: false,
            },
            Instant::now(),
        );
        let view = panel.list_view();
        assert_eq!(view.total_rows, 7);
        assert_eq!(view.offset, 2);
        assert!((view.offset..view.offset + 5).all(|row| view.row(row).is_some()));
        assert_eq!(panel.cursor(), Some(5));
    }

    #[test]
    fn test_truncated_load_posts_info_once() {
        let now = Instant::now();
        let mut panel = panel_with(conversations(2));
        let truncated = || BackendEvent::Loaded {
            conversations: conversations(2),
            departments: Vec::new(),
            has_more: true,
        };
        panel.handle_backend_event(truncated(), now);
        let toast = panel.notification().unwrap();
        assert_eq!(toast.kind, NotificationKind::Info);
        assert_eq!(toast.message, "Showing the newest 2 conversations");

        panel.tick(now + Duration::from_secs(60));
        panel.handle_backend_event(truncated(), now + Duration::from_secs(60));
        assert!(panel.notification().is_none());
        assert!(!panel.has_unacknowledged_error());
    }

    #[test]
    fn test_bulk_delete_success_and_failure() {
        let now = Instant::now();
        let mut panel = panel_with(conversations(3));
        let a = ConversationId::from("c0");
        let b = ConversationId::from("c1");
        panel.toggle_selection(&a);
        panel.toggle_selection(&b);
        assert!(panel.view().shows_content());

        panel.bulk_delete();
        assert_eq!(
            panel.drain_commands(),
            vec![PanelCommand::BulkDelete {
                ids: vec![a.clone(), b.clone()]
            }]
        );
        panel.handle_backend_event(
            BackendEvent::BulkDeleted(Err(BackendError::Unavailable("down".into()))),
            now,
        );
        assert_eq!(panel.selection().ids(), &[a.clone(), b.clone()]);

        panel.bulk_delete();
        panel.drain_commands();
        panel.handle_backend_event(BackendEvent::BulkDeleted(Ok(vec![a, b])), now);
        assert!(panel.selection().is_empty());
        assert_eq!(panel.conversations().len(), 1);
        // Selection no longer holds the panel open
        assert_eq!(panel.view(), PanelView::Rail);
    }

    #[test]
    fn test_stale_search_results_are_dropped() {
        let start = Instant::now();
        let debounce = config().search_debounce();
        let mut panel = panel_with(conversations(5));

        panel.set_query("first", start);
        panel.tick(start + debounce);
        panel.set_query("second", start + debounce);
        panel.tick(start + debounce * 2);
        let seqs: Vec<u64> = panel
            .drain_commands()
            .into_iter()
            .filter_map(|c| match c {
                PanelCommand::Search { seq, .. } => Some(seq),
                _ => None,
            })
            .collect();
        assert_eq!(seqs.len(), 2);

        panel.handle_backend_event(
            BackendEvent::SearchCompleted {
                seq: seqs[1],
                result: Ok(vec![conversation("s", "second result", None)]),
            },
            start,
        );
        panel.handle_backend_event(
            BackendEvent::SearchCompleted {
                seq: seqs[0],
                result: Ok(vec![conversation("f", "first result", None)]),
            },
            start,
        );
        assert_eq!(panel.conversations().len(), 1);
        assert_eq!(panel.conversations()[0].id.as_str(), "s");
        assert!(!panel.is_searching());
    }

    #[test]
    fn test_keyboard_walks_flattened_list_and_selects() {
        let mut panel = panel_with(conversations(3));
        expand(&mut panel);
        panel.move_down();
        panel.move_down();
        panel.move_down();
        panel.move_down();
        assert_eq!(panel.cursor(), Some(2));

        panel.select_current();
        let focused = panel.focused().unwrap().id.clone();
        assert_eq!(panel.current_id(), Some(&focused));
        assert!(
            panel
                .drain_commands()
                .contains(&PanelCommand::Select { id: focused })
        );
    }

    #[test]
    fn test_keyboard_disabled_while_collapsed_or_renaming() {
        let mut panel = panel_with(conversations(3));
        panel.move_down();
        assert_eq!(panel.cursor(), None);

        expand(&mut panel);
        panel.move_down();
        panel.start_rename();
        panel.move_down();
        assert_eq!(panel.cursor(), Some(0));
        panel.cancel_rename();
        panel.move_down();
        assert_eq!(panel.cursor(), Some(1));
    }

    #[test]
    fn test_filter_change_resets_cursor() {
        let mut panel = panel_with(conversations(3));
        expand(&mut panel);
        panel.move_down();
        panel.cycle_filter();
        assert_eq!(panel.filter(), &ConversationFilter::Archived);
        assert_eq!(panel.cursor(), None);
        panel.cycle_filter();
        assert_eq!(panel.filter(), &ConversationFilter::All);
    }

    #[test]
    fn test_rename_applies_title_only_on_confirmation() {
        let now = Instant::now();
        let mut panel = panel_with(vec![conversation("a", "Old", None)]);
        expand(&mut panel);
        panel.move_down();
        panel.start_rename();
        for _ in 0..3 {
            panel.rename_backspace();
        }
        for c in "New".chars() {
            panel.rename_input(c);
        }
        panel.commit_rename();
        assert!(!panel.is_renaming());
        assert_eq!(panel.conversations()[0].title, "Old");

        let id = ConversationId::from("a");
        panel.handle_backend_event(
            BackendEvent::Renamed {
                id: id.clone(),
                title: "New".to_string(),
                result: Err(BackendError::Unavailable("down".into())),
            },
            now,
        );
        assert_eq!(panel.conversations()[0].title, "Old");
        assert_eq!(panel.notification().unwrap().kind, NotificationKind::Error);

        panel.handle_backend_event(
            BackendEvent::Renamed {
                id,
                title: "New".to_string(),
                result: Ok(()),
            },
            now,
        );
        assert_eq!(panel.conversations()[0].title, "New");
    }

    #[test]
    fn test_outside_click_unpins_and_persists() {
        let mut panel = panel_with(conversations(2));
        expand(&mut panel);
        assert_eq!(panel.pointer_down(PointerTarget::Outside), OutsideClick::Unpinned);
        assert_eq!(panel.drain_commands(), vec![PanelCommand::SavePinned(false)]);
        assert_eq!(panel.view(), PanelView::Rail);
    }

    #[test]
    fn test_outside_click_ignored_with_selection() {
        let mut panel = panel_with(conversations(2));
        expand(&mut panel);
        panel.toggle_selection(&ConversationId::from("c0"));
        assert_eq!(panel.pointer_down(PointerTarget::Outside), OutsideClick::Ignored);
        assert!(panel.is_pinned());
    }

    #[test]
    fn test_select_closes_mobile_drawer() {
        let mut panel = panel_with(conversations(2));
        panel.on_viewport_resize(60, 20);
        panel.toggle_drawer();
        assert_eq!(panel.view(), PanelView::Drawer);
        panel.select(ConversationId::from("c1"));
        assert_eq!(panel.view(), PanelView::Rail);
    }

    #[test]
    fn test_strategy_switch_and_windowed_view() {
        let mut panel = panel_with(conversations(20));
        assert_eq!(panel.strategy(), RenderStrategy::Grouped);
        assert_eq!(panel.list_view().rows.len(), 21);

        panel.load(conversations(40), Vec::new(), true);
        let view = panel.list_view();
        assert_eq!(view.strategy, RenderStrategy::Virtualized);
        assert_eq!(view.total_rows, 41);
        // 20 visible rows plus overscan below the top
        assert!(view.rows.len() < view.total_rows);
        assert!(panel.has_more());
    }

    #[test]
    fn test_hover_expands_after_delay_via_tick() {
        let start = Instant::now();
        let mut panel = panel_with(conversations(2));
        panel.pointer_entered_rail(start);
        assert_eq!(panel.next_deadline(), Some(start + config().hover_enter_delay()));
        assert!(panel.tick(start + config().hover_enter_delay()));
        assert_eq!(panel.view(), PanelView::Expanded);
        panel.pointer_left(start + Duration::from_secs(1));
        panel.tick(start + Duration::from_secs(2));
        assert_eq!(panel.view(), PanelView::Rail);
    }

    #[test]
    fn test_created_conversation_becomes_current() {
        let mut panel = panel_with(conversations(1));
        let created = conversation("new", "New conversation", None);
        panel.handle_backend_event(BackendEvent::Created(Ok(created)), Instant::now());
        assert_eq!(panel.current_id(), Some(&ConversationId::from("new")));
        assert_eq!(panel.conversations()[0].id.as_str(), "new");
    }

    #[test]
    fn test_deleting_current_clears_it() {
        let mut panel = panel_with(conversations(2));
        let id = ConversationId::from("c0");
        panel.select(id.clone());
        panel.handle_backend_event(
            BackendEvent::Deleted {
                id,
                result: Ok(()),
            },
            Instant::now(),
        );
        assert_eq!(panel.current_id(), None);
        assert_eq!(panel.conversations().len(), 1);
    }
}
