//! System tray integration module

pub mod controller;
pub mod event;
pub mod resource;

pub use controller::{TrayIconController, TrayState};
pub use event::{MessageIds, TrayDelegate, TrayEvent, TrayNotification, DEFAULT_CALLBACK_MESSAGE};
pub use resource::{OwnedIcon, OwnedMenu};
