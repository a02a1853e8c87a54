//! Tray callback decoding and the events handed to the application

use crate::error::Result;
use crate::shell::types::{WM_APP, WM_LBUTTONDBLCLK, WM_LBUTTONUP, WM_RBUTTONUP};
use crate::shell::{Point, TrayShell};
use std::fmt;

/// Broadcast the shell sends after Explorer (re)creates the taskbar
pub const TASKBAR_CREATED: &str = "TaskbarCreated";

/// Default private message the shell uses to call back into the host window
pub const DEFAULT_CALLBACK_MESSAGE: u32 = WM_APP + 1;

/// User interaction with the tray icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrayEvent {
    LeftClick,
    LeftDoubleClick,
    RightClick,
}

impl TrayEvent {
    /// Map a tray callback sub-message to an event
    pub fn from_notification(code: u32) -> Option<Self> {
        match code {
            WM_LBUTTONUP => Some(TrayEvent::LeftClick),
            WM_LBUTTONDBLCLK => Some(TrayEvent::LeftDoubleClick),
            WM_RBUTTONUP => Some(TrayEvent::RightClick),
            _ => None,
        }
    }

    /// Wire name used by hosts that route events as strings
    pub fn name(self) -> &'static str {
        match self {
            TrayEvent::LeftClick => "leftMouseUp",
            TrayEvent::LeftDoubleClick => "leftMouseDblClk",
            TrayEvent::RightClick => "rightMouseUp",
        }
    }
}

impl fmt::Display for TrayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives tray events synchronously on the window thread.
///
/// Implementations must not block and must not call back into the
/// controller's lifecycle operations.
pub trait TrayDelegate {
    fn on_tray_event(&self, event: TrayEvent);
}

impl<F> TrayDelegate for F
where
    F: Fn(TrayEvent),
{
    fn on_tray_event(&self, event: TrayEvent) {
        self(event)
    }
}

/// Window message ids the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageIds {
    /// Registered `TaskbarCreated` id, shared by every controller in the process
    pub taskbar_created: u32,
    /// Private id tagging this controller's notifications
    pub callback: u32,
}

impl MessageIds {
    pub fn new(taskbar_created: u32, callback: u32) -> Self {
        Self {
            taskbar_created,
            callback,
        }
    }

    /// Register `TaskbarCreated` with the OS. Call once at process startup.
    pub fn register(shell: &dyn TrayShell, callback: u32) -> Result<Self> {
        let taskbar_created = shell.register_window_message(TASKBAR_CREATED)?;
        Ok(Self::new(taskbar_created, callback))
    }
}

/// A decoded tray callback message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrayNotification {
    /// Mouse message that triggered the callback
    pub code: u32,
    /// Icon id; only one icon per controller, so informational
    pub icon_id: u32,
    pub cursor: Point,
}

impl TrayNotification {
    /// Unpack `NOTIFYICON_VERSION_4` callback parameters.
    /// `lparam` carries the code (low word) and icon id (high word);
    /// `wparam` carries signed x/y anchor coordinates.
    pub fn decode(wparam: usize, lparam: isize) -> Self {
        let lparam = lparam as usize;
        Self {
            code: (lparam & 0xFFFF) as u32,
            icon_id: ((lparam >> 16) & 0xFFFF) as u32,
            cursor: Point::new(
                (wparam & 0xFFFF) as u16 as i16 as i32,
                ((wparam >> 16) & 0xFFFF) as u16 as i16 as i32,
            ),
        }
    }
}
