//! UI layer for the desktop app: the eframe shell and the results section.

pub mod app;
pub mod results;

pub use app::DesktopGuiApp;
