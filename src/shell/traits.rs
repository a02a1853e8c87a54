//! Trait abstraction over the Win32 shell and window-manager calls the tray needs.
//! Lets the controller run against a recording mock in tests.

use super::types::{IconHandle, MenuHandle, NotifyAction, NotifyIconData, Point, WindowHandle};
use crate::error::Result;

/// OS facilities used by the tray icon controller
pub trait TrayShell {
    /// Load a small icon from an image file on disk
    fn load_icon(&self, path: &str) -> Result<IconHandle>;
    fn destroy_icon(&self, icon: IconHandle);
    fn destroy_menu(&self, menu: MenuHandle);
    /// `Shell_NotifyIcon`
    fn notify_icon(&self, action: NotifyAction, data: &NotifyIconData) -> Result<()>;
    fn is_window(&self, window: WindowHandle) -> bool;
    fn cursor_pos(&self) -> Result<Point>;
    fn set_foreground_window(&self, window: WindowHandle);
    /// Show `menu` at `at`, owned by `window`, tracking the left button
    fn track_popup_menu(&self, menu: MenuHandle, at: Point, window: WindowHandle);
    /// Post `WM_NULL` so a dismissed popup menu closes reliably
    fn post_null_message(&self, window: WindowHandle);
    fn register_window_message(&self, name: &str) -> Result<u32>;
}

/// Mock implementations for testing
/// Available in tests and with the "test-mocks" feature
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks {
    use super::*;
    use crate::error::TrayError;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// One recorded shell call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ShellCall {
        LoadIcon(String),
        DestroyIcon(IconHandle),
        DestroyMenu(MenuHandle),
        NotifyIcon(NotifyAction, NotifyIconData),
        IsWindow(WindowHandle),
        CursorPos,
        SetForegroundWindow(WindowHandle),
        TrackPopupMenu(MenuHandle, Point, WindowHandle),
        PostNullMessage(WindowHandle),
        RegisterWindowMessage(String),
        /// Test-inserted marker, used to order foreign events against shell calls
        Marker(String),
    }

    /// Recording shell with handle accounting
    pub struct MockShell {
        pub calls: Mutex<Vec<ShellCall>>,
        next_handle: Mutex<isize>,
        live_icons: Mutex<HashSet<IconHandle>>,
        live_menus: Mutex<HashSet<MenuHandle>>,
        live_windows: Mutex<HashSet<WindowHandle>>,
        invalid_releases: Mutex<u32>,
        fail_icon_loads: Mutex<bool>,
        failing_actions: Mutex<HashSet<NotifyAction>>,
        registered_messages: Mutex<HashMap<String, u32>>,
        cursor: Mutex<Point>,
    }

    impl Default for MockShell {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockShell {
        pub fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                next_handle: Mutex::new(0x100),
                live_icons: Mutex::new(HashSet::new()),
                live_menus: Mutex::new(HashSet::new()),
                live_windows: Mutex::new(HashSet::new()),
                invalid_releases: Mutex::new(0),
                fail_icon_loads: Mutex::new(false),
                failing_actions: Mutex::new(HashSet::new()),
                registered_messages: Mutex::new(HashMap::new()),
                cursor: Mutex::new(Point::default()),
            }
        }

        fn next_raw(&self) -> isize {
            let mut next = self.next_handle.lock().unwrap();
            *next += 1;
            *next
        }

        fn record(&self, call: ShellCall) {
            self.calls.lock().unwrap().push(call);
        }

        /// Create a live window handle
        pub fn create_window(&self) -> WindowHandle {
            let window = WindowHandle(self.next_raw());
            self.live_windows.lock().unwrap().insert(window);
            window
        }

        pub fn destroy_window(&self, window: WindowHandle) {
            self.live_windows.lock().unwrap().remove(&window);
        }

        /// Create a live menu handle, as a caller building a menu would
        pub fn create_menu(&self) -> MenuHandle {
            let menu = MenuHandle(self.next_raw());
            self.live_menus.lock().unwrap().insert(menu);
            menu
        }

        pub fn set_fail_icon_loads(&self, fail: bool) {
            *self.fail_icon_loads.lock().unwrap() = fail;
        }

        pub fn set_fail_action(&self, action: NotifyAction, fail: bool) {
            let mut failing = self.failing_actions.lock().unwrap();
            if fail {
                failing.insert(action);
            } else {
                failing.remove(&action);
            }
        }

        pub fn set_cursor(&self, at: Point) {
            *self.cursor.lock().unwrap() = at;
        }

        pub fn calls(&self) -> Vec<ShellCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn mark(&self, label: impl Into<String>) {
            self.record(ShellCall::Marker(label.into()));
        }

        pub fn clear_calls(&self) {
            self.calls.lock().unwrap().clear();
        }

        /// Descriptors passed with `action`, in call order
        pub fn notify_calls(&self, action: NotifyAction) -> Vec<NotifyIconData> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter_map(|call| match call {
                    ShellCall::NotifyIcon(a, data) if *a == action => Some(data.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn popup_count(&self) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| matches!(call, ShellCall::TrackPopupMenu(..)))
                .count()
        }

        pub fn live_icon_count(&self) -> usize {
            self.live_icons.lock().unwrap().len()
        }

        pub fn live_menu_count(&self) -> usize {
            self.live_menus.lock().unwrap().len()
        }

        /// Releases of handles that were not live (double free or foreign handle)
        pub fn invalid_release_count(&self) -> u32 {
            *self.invalid_releases.lock().unwrap()
        }
    }

    impl TrayShell for MockShell {
        fn load_icon(&self, path: &str) -> Result<IconHandle> {
            self.record(ShellCall::LoadIcon(path.to_string()));
            if path.is_empty() || *self.fail_icon_loads.lock().unwrap() {
                return Err(TrayError::IconLoad(path.to_string()));
            }
            let icon = IconHandle(self.next_raw());
            self.live_icons.lock().unwrap().insert(icon);
            Ok(icon)
        }

        fn destroy_icon(&self, icon: IconHandle) {
            self.record(ShellCall::DestroyIcon(icon));
            if !self.live_icons.lock().unwrap().remove(&icon) {
                *self.invalid_releases.lock().unwrap() += 1;
            }
        }

        fn destroy_menu(&self, menu: MenuHandle) {
            self.record(ShellCall::DestroyMenu(menu));
            if !self.live_menus.lock().unwrap().remove(&menu) {
                *self.invalid_releases.lock().unwrap() += 1;
            }
        }

        fn notify_icon(&self, action: NotifyAction, data: &NotifyIconData) -> Result<()> {
            self.record(ShellCall::NotifyIcon(action, data.clone()));
            if self.failing_actions.lock().unwrap().contains(&action) {
                return Err(TrayError::Shell(action));
            }
            Ok(())
        }

        fn is_window(&self, window: WindowHandle) -> bool {
            self.record(ShellCall::IsWindow(window));
            self.live_windows.lock().unwrap().contains(&window)
        }

        fn cursor_pos(&self) -> Result<Point> {
            self.record(ShellCall::CursorPos);
            Ok(*self.cursor.lock().unwrap())
        }

        fn set_foreground_window(&self, window: WindowHandle) {
            self.record(ShellCall::SetForegroundWindow(window));
        }

        fn track_popup_menu(&self, menu: MenuHandle, at: Point, window: WindowHandle) {
            self.record(ShellCall::TrackPopupMenu(menu, at, window));
        }

        fn post_null_message(&self, window: WindowHandle) {
            self.record(ShellCall::PostNullMessage(window));
        }

        fn register_window_message(&self, name: &str) -> Result<u32> {
            self.record(ShellCall::RegisterWindowMessage(name.to_string()));
            let mut registered = self.registered_messages.lock().unwrap();
            let next = 0xC000 + registered.len() as u32;
            Ok(*registered.entry(name.to_string()).or_insert(next))
        }
    }
}
