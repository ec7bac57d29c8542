//! Application-wide constants for tuning and configuration
//!
//! Centralizes magic numbers to make them discoverable and configurable.

/// Delay before a pointer resting on the icon rail expands the panel.
/// Short enough to feel responsive, long enough to ignore a pointer passing through.
pub const HOVER_ENTER_DELAY_MS: u64 = 150;

/// Delay before a pointer that left the panel collapses it again.
pub const HOVER_EXIT_DELAY_MS: u64 = 300;

/// Debounce delay for remote conversation search in milliseconds.
/// The local substring filter runs instantly; the remote call waits for a pause.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Lists with strictly more conversations than this use the windowed renderer.
pub const VIRTUALIZATION_THRESHOLD: usize = 20;

/// Extra rows rendered above and below the visible window.
pub const WINDOW_OVERSCAN: usize = 4;

/// Minimum terminal width (columns) treated as a desktop layout.
/// At or below this width the panel behaves as a mobile drawer.
pub const DESKTOP_MIN_WIDTH: u16 = 100;

/// Notification display duration in seconds before auto-dismiss.
pub const NOTIFICATION_TTL_SECS: u64 = 4;

/// Durable key holding the pinned-panel preference.
pub const PINNED_PREFERENCE_KEY: &str = "panel.pinned";

/// Slug of the default department group that always exists.
pub const STANDARD_GROUP_KEY: &str = "standard";

/// Display name of the default department group.
pub const STANDARD_GROUP_NAME: &str = "Standard";

// === Backend Constants ===

/// Simulated collaborator round-trip latency in milliseconds.
pub const BACKEND_LATENCY_MS: u64 = 120;

/// Number of conversations loaded per refresh.
pub const CONVERSATION_PAGE_SIZE: usize = 200;

/// Maximum rows returned by a store search.
pub const SEARCH_RESULT_LIMIT: usize = 500;

// === UI Constants ===

/// Fixed width of the collapsed icon rail in columns.
pub const RAIL_WIDTH: u16 = 5;

/// Fixed width of the expanded content panel in columns.
pub const PANEL_WIDTH: u16 = 38;

/// Width of the selection checkbox column at the start of each row.
pub const CHECKBOX_WIDTH: u16 = 4;

/// Rows above the list used by the panel header (title, search, filter).
pub const PANEL_HEADER_HEIGHT: u16 = 4;

/// Rows below the list used by the panel footer (hints, notifications).
pub const PANEL_FOOTER_HEIGHT: u16 = 2;

/// Input poll timeout when nothing is pending.
pub const IDLE_POLL_MS: u64 = 150;

/// Spinner animation frame duration in milliseconds.
pub const SPINNER_FRAME_MS: u128 = 80;
