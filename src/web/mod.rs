//! Web front end: form page, JSON API and map panel rendering

pub mod handlers;
pub mod page;
pub mod render;

pub use handlers::{configure, ApiResponse};
pub use render::{escape_html, map_iframe, PanelSet};
