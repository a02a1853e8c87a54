//! OS seam for the tray: handle types, the shell trait and its backends

pub mod traits;
pub mod types;
#[cfg(windows)]
pub mod win32;

pub use traits::TrayShell;
pub use types::{IconHandle, MenuHandle, NotifyAction, NotifyIconData, Point, WindowHandle};
#[cfg(windows)]
pub use win32::Win32Shell;
