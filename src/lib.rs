//! Windows notification-area icon controller
//!
//! Installs a single tray icon, restores it after Explorer restarts, and routes
//! clicks on it to the application.

// Initialize i18n with locales directory and English fallback
rust_i18n::i18n!("locales", fallback = "en");

pub mod error;
pub mod i18n;
pub mod logging;
pub mod settings;
pub mod shell;
pub mod tray;

pub use error::{Result, TrayError};
pub use tray::{MessageIds, TrayDelegate, TrayEvent, TrayIconController};
