//! Main event loop and backend event processing

use anyhow::Result;
use crossterm::event;
use std::time::{Duration, Instant};

use crate::constants::IDLE_POLL_MS;
use crate::input::{InputResult, handle_input};
use crate::ui::list_height;

use super::App;
use super::render_thread::RenderThread;

/// Poll cadence while a spinner is on screen.
const BUSY_POLL_MS: u64 = 50;

impl App {
    pub(crate) async fn event_loop(&mut self, render_thread: &RenderThread) -> Result<()> {
        let (width, height) = crossterm::terminal::size()?;
        self.on_resize(width, height);
        self.flush_commands().await;

        loop {
            // Backend results first so the frame below reflects them
            if self.process_backend_events() {
                self.dirty = true;
            }

            // Hover intents, search debounce and toast expiry
            if self.state.panel.tick(Instant::now()) {
                self.dirty = true;
            }
            self.flush_commands().await;

            let busy = self.is_busy();
            if busy {
                self.dirty = true;
            }

            if self.dirty && render_thread.render(self.state.clone()) {
                self.dirty = false;
            }

            if event::poll(self.poll_timeout(busy))? {
                let evt = event::read()?;
                // Any input event (including resize) requires re-render
                self.dirty = true;
                match handle_input(evt, &self.state, &self.bindings) {
                    InputResult::Quit => break,
                    InputResult::Action(action) => {
                        self.state.panel.acknowledge();
                        self.handle_action(action);
                    }
                    InputResult::Char(c) => {
                        self.state.panel.acknowledge();
                        self.handle_char(c);
                    }
                    InputResult::Backspace => {
                        self.state.panel.acknowledge();
                        self.handle_backspace();
                    }
                    InputResult::Mouse(mouse) => self.handle_mouse(mouse),
                    InputResult::Resize(width, height) => self.on_resize(width, height),
                    InputResult::Continue => {}
                }
                self.flush_commands().await;
            }
        }

        Ok(())
    }

    /// Drain backend events without blocking. Returns true if any arrived.
    pub(crate) fn process_backend_events(&mut self) -> bool {
        let mut had_events = false;
        while let Ok(event) = self.backend.event_rx.try_recv() {
            tracing::debug!("Backend event: {:?}", event);
            self.state.panel.handle_backend_event(event, Instant::now());
            had_events = true;
        }
        had_events
    }

    fn is_busy(&self) -> bool {
        let panel = &self.state.panel;
        panel.is_loading() || panel.is_searching() || panel.selection().is_deleting()
    }

    /// Wake up in time for the earliest pending panel deadline.
    fn poll_timeout(&self, busy: bool) -> Duration {
        let ceiling = Duration::from_millis(if busy { BUSY_POLL_MS } else { IDLE_POLL_MS });
        match self.state.panel.next_deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(ceiling),
            None => ceiling,
        }
    }

    pub(crate) fn on_resize(&mut self, width: u16, height: u16) {
        tracing::debug!("Viewport {}x{}", width, height);
        self.state.viewport = (width, height);
        self.state
            .panel
            .on_viewport_resize(width, list_height(height));
    }
}
