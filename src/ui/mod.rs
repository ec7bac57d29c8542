pub mod app;
mod components;
mod conversation;
pub mod layout;
mod panel;
mod popups;
mod rail;
pub mod theme;
mod widgets;

pub use app::render;
pub use layout::{Hit, hit_test, list_height, screen_layout};
pub use popups::overlay_area;
