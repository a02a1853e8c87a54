//! Platform-neutral handle and descriptor types shared by every shell backend

use std::fmt;

/// Win32 message constants the controller decodes.
/// Values match the Windows SDK; the Win32 backend asserts this at compile time.
pub const WM_NULL: u32 = 0x0000;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_LBUTTONDBLCLK: u32 = 0x0203;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_APP: u32 = 0x8000;

/// `NOTIFYICONDATAW::uFlags` bits
pub const NIF_MESSAGE: u32 = 0x0000_0001;
pub const NIF_ICON: u32 = 0x0000_0002;
pub const NIF_TIP: u32 = 0x0000_0004;

/// `NOTIFYICON_VERSION_4` (Vista and later)
pub const NOTIFYICON_VERSION_4: u32 = 4;

/// Capacity of the tooltip buffer in UTF-16 code units, terminator included
pub const TIP_CAPACITY: usize = 128;

/// Window handle borrowed from the host. Never released by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowHandle(pub isize);

/// Icon handle (`HICON`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IconHandle(pub isize);

/// Menu handle (`HMENU`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MenuHandle(pub isize);

impl WindowHandle {
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl IconHandle {
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl MenuHandle {
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// `Shell_NotifyIcon` verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyAction {
    Add,
    Modify,
    Delete,
}

impl fmt::Display for NotifyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyAction::Add => write!(f, "NIM_ADD"),
            NotifyAction::Modify => write!(f, "NIM_MODIFY"),
            NotifyAction::Delete => write!(f, "NIM_DELETE"),
        }
    }
}

/// The descriptor the shell uses to identify and draw the icon.
///
/// The shell correlates add/modify/delete calls through `window` and `id`,
/// so a controller keeps one instance alive for the whole installation.
#[derive(Clone, PartialEq, Eq)]
pub struct NotifyIconData {
    pub window: WindowHandle,
    pub id: u32,
    pub flags: u32,
    pub callback_message: u32,
    pub icon: Option<IconHandle>,
    pub tip: [u16; TIP_CAPACITY],
    pub version: u32,
}

impl Default for NotifyIconData {
    fn default() -> Self {
        Self {
            window: WindowHandle::default(),
            id: 0,
            flags: 0,
            callback_message: 0,
            icon: None,
            tip: [0; TIP_CAPACITY],
            version: 0,
        }
    }
}

impl NotifyIconData {
    /// Copy `text` into the tip buffer, truncating silently.
    ///
    /// At most `TIP_CAPACITY - 1` code units are kept so the buffer is always
    /// NUL terminated. A surrogate pair is never split at the cut.
    pub fn set_tip(&mut self, text: &str) {
        self.tip = [0; TIP_CAPACITY];
        let max = TIP_CAPACITY - 1;
        let mut len = 0;
        for ch in text.chars() {
            let mut units = [0u16; 2];
            let encoded = ch.encode_utf16(&mut units);
            if len + encoded.len() > max {
                break;
            }
            self.tip[len..len + encoded.len()].copy_from_slice(encoded);
            len += encoded.len();
        }
    }

    /// Tooltip text up to the first NUL
    pub fn tip_text(&self) -> String {
        let end = self.tip.iter().position(|&c| c == 0).unwrap_or(TIP_CAPACITY);
        String::from_utf16_lossy(&self.tip[..end])
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }
}

impl fmt::Debug for NotifyIconData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyIconData")
            .field("window", &self.window)
            .field("id", &self.id)
            .field("flags", &format_args!("{:#x}", self.flags))
            .field("callback_message", &format_args!("{:#x}", self.callback_message))
            .field("icon", &self.icon)
            .field("tip", &self.tip_text())
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_tip_short_text() {
        let mut nid = NotifyIconData::default();
        nid.set_tip("Hello tray");
        assert_eq!(nid.tip_text(), "Hello tray");
        assert_eq!(nid.tip[10], 0);
    }

    #[test]
    fn test_set_tip_truncates_to_capacity() {
        let mut nid = NotifyIconData::default();
        let long = "x".repeat(300);
        nid.set_tip(&long);
        assert_eq!(nid.tip_text().len(), TIP_CAPACITY - 1);
        assert_eq!(nid.tip[TIP_CAPACITY - 1], 0);
    }

    #[test]
    fn test_set_tip_does_not_split_surrogate_pair() {
        let mut nid = NotifyIconData::default();
        // 126 ASCII units leave one free slot, too small for the emoji's pair
        let text = format!("{}{}", "a".repeat(126), "\u{1F600}");
        nid.set_tip(&text);
        assert_eq!(nid.tip_text(), "a".repeat(126));
    }

    #[test]
    fn test_set_tip_replaces_previous_text() {
        let mut nid = NotifyIconData::default();
        nid.set_tip("a much longer tooltip");
        nid.set_tip("short");
        assert_eq!(nid.tip_text(), "short");
    }

    #[test]
    fn test_notify_action_display() {
        assert_eq!(NotifyAction::Add.to_string(), "NIM_ADD");
        assert_eq!(NotifyAction::Modify.to_string(), "NIM_MODIFY");
        assert_eq!(NotifyAction::Delete.to_string(), "NIM_DELETE");
    }
}
