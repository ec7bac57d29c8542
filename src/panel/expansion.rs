//! Three-tier visibility state machine for the side panel.
//!
//! The base state is `Collapsed | Hovered | Pinned`; two independent
//! modifiers (mobile drawer open, selection active) widen what is shown.
//! Every consumer (visual state, content mounting, icon rail) reads the same
//! [`PanelView`], derived by a single function, so they cannot disagree.

use std::time::{Duration, Instant};

use bitflags::bitflags;

use super::hover::{HoverIntent, HoverIntentTracker};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PanelModifiers: u8 {
        const MOBILE_OPEN = 0b01;
        const HAS_SELECTION = 0b10;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpansionState {
    #[default]
    Collapsed,
    Hovered,
    Pinned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Collapsed,
    Hovered,
    Pinned,
}

/// What the panel renders, derived from base state and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelView {
    /// Icon rail only
    Rail,
    /// Icon rail plus the content drawer opened in the mobile layout
    Drawer,
    /// Icon rail plus content (hover or active selection)
    Expanded,
    /// Content only; the rail is hidden
    Pinned,
}

impl PanelView {
    pub fn derive(state: ExpansionState, modifiers: PanelModifiers) -> Self {
        match state {
            ExpansionState::Pinned => Self::Pinned,
            ExpansionState::Hovered => Self::Expanded,
            ExpansionState::Collapsed if modifiers.contains(PanelModifiers::HAS_SELECTION) => {
                Self::Expanded
            }
            ExpansionState::Collapsed if modifiers.contains(PanelModifiers::MOBILE_OPEN) => {
                Self::Drawer
            }
            ExpansionState::Collapsed => Self::Rail,
        }
    }

    pub fn visual(self) -> VisualState {
        match self {
            Self::Rail | Self::Drawer => VisualState::Collapsed,
            Self::Expanded => VisualState::Hovered,
            Self::Pinned => VisualState::Pinned,
        }
    }

    pub fn shows_icon_rail(self) -> bool {
        !matches!(self, Self::Pinned)
    }

    pub fn shows_content(self) -> bool {
        !matches!(self, Self::Rail)
    }
}

/// Where a pointer-down landed, as resolved by the host's hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Inside the panel (rail or content)
    Panel,
    /// Inside an overlay that logically belongs to the panel (menu, dialog, picker)
    Overlay,
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutsideClick {
    Ignored,
    /// Pin cleared; the caller persists the new preference
    Unpinned,
    Collapsed,
}

#[derive(Debug, Clone)]
pub struct ExpansionStateMachine {
    state: ExpansionState,
    modifiers: PanelModifiers,
    hover: HoverIntentTracker,
    pointer_inside: bool,
    /// A hover-exit fired while a modifier held the panel open
    collapse_when_released: bool,
    desktop_min_width: u16,
}

impl ExpansionStateMachine {
    pub fn new(
        pinned: bool,
        enter_delay: Duration,
        exit_delay: Duration,
        desktop_min_width: u16,
    ) -> Self {
        Self {
            state: if pinned {
                ExpansionState::Pinned
            } else {
                ExpansionState::Collapsed
            },
            modifiers: PanelModifiers::empty(),
            hover: HoverIntentTracker::new(enter_delay, exit_delay),
            pointer_inside: false,
            collapse_when_released: false,
            desktop_min_width,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ExpansionState {
        self.state
    }

    #[cfg(test)]
    pub fn modifiers(&self) -> PanelModifiers {
        self.modifiers
    }

    pub fn view(&self) -> PanelView {
        PanelView::derive(self.state, self.modifiers)
    }

    pub fn current_visual_state(&self) -> VisualState {
        self.view().visual()
    }

    pub fn is_pinned(&self) -> bool {
        self.state == ExpansionState::Pinned
    }

    pub fn is_mobile_open(&self) -> bool {
        self.modifiers.contains(PanelModifiers::MOBILE_OPEN)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.hover.deadline()
    }

    /// Flip between pinned and unpinned. Returns the new pinned flag,
    /// which the caller persists.
    pub fn toggle_pin(&mut self) -> bool {
        self.hover.disarm();
        self.collapse_when_released = false;
        self.state = match self.state {
            ExpansionState::Pinned if self.pointer_inside => ExpansionState::Hovered,
            ExpansionState::Pinned => ExpansionState::Collapsed,
            ExpansionState::Collapsed | ExpansionState::Hovered => ExpansionState::Pinned,
        };
        tracing::debug!("Pin toggled, state now {:?}", self.state);
        self.is_pinned()
    }

    pub fn on_mobile_open_changed(&mut self, open: bool) {
        self.modifiers.set(PanelModifiers::MOBILE_OPEN, open);
        self.release_if_pending();
    }

    pub fn on_selection_changed(&mut self, has_selection: bool) {
        self.modifiers.set(PanelModifiers::HAS_SELECTION, has_selection);
        self.release_if_pending();
    }

    pub fn pointer_entered_rail(&mut self, now: Instant, has_conversations: bool) {
        self.pointer_inside = true;
        self.collapse_when_released = false;
        match self.state {
            ExpansionState::Collapsed if has_conversations => {
                if self.hover.pending() != Some(HoverIntent::Enter) {
                    self.hover.arm_enter(now);
                }
            }
            ExpansionState::Collapsed => {}
            ExpansionState::Hovered => self.hover.cancel_leave(),
            ExpansionState::Pinned => {}
        }
    }

    pub fn pointer_entered_content(&mut self) {
        self.pointer_inside = true;
        self.collapse_when_released = false;
        self.hover.cancel_leave();
    }

    pub fn pointer_left(&mut self, now: Instant) {
        if !self.pointer_inside {
            return;
        }
        self.pointer_inside = false;
        match self.state {
            ExpansionState::Hovered => self.hover.arm_leave(now),
            _ => self.hover.disarm(),
        }
    }

    /// Fire elapsed hover timers. Returns true if the base state changed.
    pub fn tick(&mut self, now: Instant, has_conversations: bool) -> bool {
        let Some(intent) = self.hover.poll(now) else {
            return false;
        };
        match intent {
            HoverIntent::Enter => {
                if self.state == ExpansionState::Collapsed && has_conversations {
                    self.state = ExpansionState::Hovered;
                    tracing::debug!("Hover intent: expanded");
                    return true;
                }
            }
            HoverIntent::Leave => {
                if self.state != ExpansionState::Hovered {
                    return false;
                }
                if self.is_held_open() {
                    tracing::debug!("Hover exit deferred, panel held open");
                    self.collapse_when_released = true;
                } else {
                    self.state = ExpansionState::Collapsed;
                    tracing::debug!("Hover intent: collapsed");
                    return true;
                }
            }
        }
        false
    }

    /// Apply the outside-click rule for a pointer-down at `target`.
    pub fn on_pointer_down(&mut self, target: PointerTarget, viewport_width: u16) -> OutsideClick {
        if !self.outside_click_armed(viewport_width) {
            return OutsideClick::Ignored;
        }
        match target {
            PointerTarget::Panel | PointerTarget::Overlay => return OutsideClick::Ignored,
            PointerTarget::Outside => {}
        }
        // Selection must be cleared explicitly
        if self.modifiers.contains(PanelModifiers::HAS_SELECTION) {
            return OutsideClick::Ignored;
        }

        self.hover.disarm();
        self.collapse_when_released = false;
        let was_pinned = self.is_pinned();
        self.state = ExpansionState::Collapsed;
        tracing::debug!("Outside click collapsed panel (was pinned: {})", was_pinned);
        if was_pinned {
            OutsideClick::Unpinned
        } else {
            OutsideClick::Collapsed
        }
    }

    pub fn outside_click_armed(&self, viewport_width: u16) -> bool {
        viewport_width > self.desktop_min_width
            && !self.is_mobile_open()
            && self.view().shows_content()
    }

    fn is_held_open(&self) -> bool {
        self.modifiers
            .intersects(PanelModifiers::MOBILE_OPEN | PanelModifiers::HAS_SELECTION)
    }

    fn release_if_pending(&mut self) {
        if self.collapse_when_released
            && !self.is_held_open()
            && !self.pointer_inside
            && self.state == ExpansionState::Hovered
        {
            self.collapse_when_released = false;
            self.state = ExpansionState::Collapsed;
            tracing::debug!("Deferred hover exit applied");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTER: Duration = Duration::from_millis(100);
    const EXIT: Duration = Duration::from_millis(200);
    const WIDE: u16 = 160;
    const NARROW: u16 = 60;

    fn machine(pinned: bool) -> ExpansionStateMachine {
        ExpansionStateMachine::new(pinned, ENTER, EXIT, 100)
    }

    fn expected_visual(state: ExpansionState, modifiers: PanelModifiers) -> VisualState {
        if state == ExpansionState::Pinned {
            VisualState::Pinned
        } else if state == ExpansionState::Hovered
            || modifiers.contains(PanelModifiers::HAS_SELECTION)
        {
            VisualState::Hovered
        } else {
            VisualState::Collapsed
        }
    }

    fn assert_consistent(m: &ExpansionStateMachine) {
        let view = m.view();
        let state = m.state();
        let mods = m.modifiers();
        assert_eq!(view.visual(), expected_visual(state, mods));
        assert_eq!(
            view.shows_content(),
            state == ExpansionState::Pinned
                || state == ExpansionState::Hovered
                || mods.contains(PanelModifiers::MOBILE_OPEN)
                || mods.contains(PanelModifiers::HAS_SELECTION)
        );
        assert_eq!(view.shows_icon_rail(), view.visual() != VisualState::Pinned);
    }

    #[test]
    fn test_derivations_agree_for_all_inputs() {
        let states = [
            ExpansionState::Collapsed,
            ExpansionState::Hovered,
            ExpansionState::Pinned,
        ];
        for state in states {
            for bits in 0..4u8 {
                let mods = PanelModifiers::from_bits_truncate(bits);
                let view = PanelView::derive(state, mods);
                assert_eq!(view.visual(), expected_visual(state, mods));
                let content = state != ExpansionState::Collapsed || !mods.is_empty();
                assert_eq!(view.shows_content(), content, "{:?} {:?}", state, mods);
                assert_eq!(view.shows_icon_rail(), state != ExpansionState::Pinned);
            }
        }
    }

    #[test]
    fn test_derivations_agree_over_event_sequences() {
        // Deterministic pseudo-random walk over every input event
        let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
        let mut m = machine(false);
        let mut now = Instant::now();
        for _ in 0..2000 {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            match (seed >> 33) % 8 {
                0 => {
                    m.toggle_pin();
                }
                1 => m.pointer_entered_rail(now, true),
                2 => m.pointer_entered_content(),
                3 => m.pointer_left(now),
                4 => m.on_selection_changed((seed >> 40) % 2 == 0),
                5 => m.on_mobile_open_changed((seed >> 41) % 2 == 0),
                6 => {
                    m.on_pointer_down(PointerTarget::Outside, WIDE);
                }
                _ => now += Duration::from_millis(150),
            }
            m.tick(now, true);
            assert_consistent(&m);
        }
    }

    #[test]
    fn test_initial_state_respects_saved_pin() {
        assert_eq!(machine(false).current_visual_state(), VisualState::Collapsed);
        assert_eq!(machine(true).current_visual_state(), VisualState::Pinned);
        assert!(!machine(true).view().shows_icon_rail());
    }

    #[test]
    fn test_hover_enter_requires_delay() {
        let mut m = machine(false);
        let start = Instant::now();
        m.pointer_entered_rail(start, true);
        assert!(!m.tick(start + ENTER / 2, true));
        assert_eq!(m.state(), ExpansionState::Collapsed);
        assert!(m.tick(start + ENTER, true));
        assert_eq!(m.state(), ExpansionState::Hovered);
    }

    #[test]
    fn test_hover_enter_ignored_without_conversations() {
        let mut m = machine(false);
        let start = Instant::now();
        m.pointer_entered_rail(start, false);
        m.tick(start + ENTER * 2, false);
        assert_eq!(m.state(), ExpansionState::Collapsed);
    }

    #[test]
    fn test_pointer_passing_through_rail_does_not_expand() {
        let mut m = machine(false);
        let start = Instant::now();
        m.pointer_entered_rail(start, true);
        m.pointer_left(start + ENTER / 2);
        m.tick(start + ENTER * 3, true);
        assert_eq!(m.state(), ExpansionState::Collapsed);
    }

    #[test]
    fn test_hover_exit_after_delay() {
        let mut m = machine(false);
        let start = Instant::now();
        m.pointer_entered_rail(start, true);
        m.tick(start + ENTER, true);
        m.pointer_left(start + ENTER);
        m.tick(start + ENTER + EXIT / 2, true);
        assert_eq!(m.state(), ExpansionState::Hovered);
        m.tick(start + ENTER + EXIT, true);
        assert_eq!(m.state(), ExpansionState::Collapsed);
    }

    #[test]
    fn test_moving_into_content_cancels_exit() {
        let mut m = machine(false);
        let start = Instant::now();
        m.pointer_entered_rail(start, true);
        m.tick(start + ENTER, true);
        m.pointer_left(start + ENTER);
        m.pointer_entered_content();
        m.tick(start + ENTER + EXIT * 2, true);
        assert_eq!(m.state(), ExpansionState::Hovered);
    }

    #[test]
    fn test_selection_holds_panel_open_until_cleared() {
        let mut m = machine(false);
        let start = Instant::now();
        m.pointer_entered_rail(start, true);
        m.tick(start + ENTER, true);
        m.on_selection_changed(true);
        m.pointer_left(start + ENTER);
        m.tick(start + ENTER + EXIT, true);
        assert_eq!(m.state(), ExpansionState::Hovered);

        m.on_selection_changed(false);
        assert_eq!(m.state(), ExpansionState::Collapsed);
    }

    #[test]
    fn test_selection_renders_as_hovered_even_when_collapsed() {
        let mut m = machine(false);
        m.on_selection_changed(true);
        assert_eq!(m.state(), ExpansionState::Collapsed);
        assert_eq!(m.current_visual_state(), VisualState::Hovered);
        assert!(m.view().shows_icon_rail());
        assert!(m.view().shows_content());
    }

    #[test]
    fn test_pinned_with_selection_stays_pinned() {
        let mut m = machine(true);
        m.on_selection_changed(true);
        assert_eq!(m.view(), PanelView::Pinned);
        assert_eq!(m.current_visual_state(), VisualState::Pinned);
        assert!(!m.view().shows_icon_rail());
    }

    #[test]
    fn test_toggle_pin_round_trip() {
        let mut m = machine(false);
        assert!(m.toggle_pin());
        assert_eq!(m.state(), ExpansionState::Pinned);
        assert!(!m.toggle_pin());
        assert_eq!(m.state(), ExpansionState::Collapsed);
    }

    #[test]
    fn test_unpin_while_pointer_inside_keeps_hover() {
        let mut m = machine(true);
        m.pointer_entered_content();
        assert!(!m.toggle_pin());
        assert_eq!(m.state(), ExpansionState::Hovered);
    }

    #[test]
    fn test_outside_click_with_selection_never_collapses() {
        for pinned in [false, true] {
            let mut m = machine(pinned);
            m.on_selection_changed(true);
            assert_eq!(
                m.on_pointer_down(PointerTarget::Outside, WIDE),
                OutsideClick::Ignored
            );
            assert!(m.view().shows_content());
            assert_eq!(m.is_pinned(), pinned);
        }
    }

    #[test]
    fn test_outside_click_unpins_and_collapses() {
        let mut m = machine(true);
        assert_eq!(
            m.on_pointer_down(PointerTarget::Outside, WIDE),
            OutsideClick::Unpinned
        );
        assert_eq!(m.state(), ExpansionState::Collapsed);
        assert!(!m.view().shows_content());
    }

    #[test]
    fn test_outside_click_collapses_hover_immediately() {
        let mut m = machine(false);
        let start = Instant::now();
        m.pointer_entered_rail(start, true);
        m.tick(start + ENTER, true);
        assert_eq!(
            m.on_pointer_down(PointerTarget::Outside, WIDE),
            OutsideClick::Collapsed
        );
        assert_eq!(m.state(), ExpansionState::Collapsed);
    }

    #[test]
    fn test_outside_click_ignored_for_overlay_and_panel() {
        let mut m = machine(true);
        assert_eq!(
            m.on_pointer_down(PointerTarget::Overlay, WIDE),
            OutsideClick::Ignored
        );
        assert_eq!(
            m.on_pointer_down(PointerTarget::Panel, WIDE),
            OutsideClick::Ignored
        );
        assert!(m.is_pinned());
    }

    #[test]
    fn test_outside_click_disarmed_on_narrow_or_mobile() {
        let mut m = machine(true);
        assert_eq!(
            m.on_pointer_down(PointerTarget::Outside, NARROW),
            OutsideClick::Ignored
        );
        m.on_mobile_open_changed(true);
        assert_eq!(
            m.on_pointer_down(PointerTarget::Outside, WIDE),
            OutsideClick::Ignored
        );
        assert!(m.is_pinned());
    }

    #[test]
    fn test_outside_click_disarmed_when_collapsed() {
        let mut m = machine(false);
        assert!(!m.outside_click_armed(WIDE));
        assert_eq!(
            m.on_pointer_down(PointerTarget::Outside, WIDE),
            OutsideClick::Ignored
        );
    }
}
