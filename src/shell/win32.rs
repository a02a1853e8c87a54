//! `TrayShell` backed by the real Win32 shell

use super::traits::TrayShell;
use super::types::{self, IconHandle, MenuHandle, NotifyAction, NotifyIconData, Point, WindowHandle};
use crate::error::{Result, TrayError};
use log::{debug, warn};
use std::ffi::{c_void, OsStr};
use std::mem::size_of;
use std::os::windows::ffi::OsStrExt;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, POINT, WPARAM};
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIM_ADD, NIM_DELETE, NIM_MODIFY, NOTIFYICONDATAW, NOTIFYICONDATAW_0,
    NOTIFY_ICON_DATA_FLAGS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    DestroyIcon, DestroyMenu, GetCursorPos, GetSystemMetrics, IsWindow, LoadImageW, PostMessageW,
    RegisterWindowMessageW, SetForegroundWindow, TrackPopupMenu, HICON, HMENU, IMAGE_ICON,
    LR_LOADFROMFILE, SM_CXSMICON, SM_CYSMICON, TPM_LEFTBUTTON,
};

const _: () = {
    use windows::Win32::UI::Shell as shell;
    use windows::Win32::UI::WindowsAndMessaging as wm;
    assert!(types::WM_NULL == wm::WM_NULL);
    assert!(types::WM_LBUTTONUP == wm::WM_LBUTTONUP);
    assert!(types::WM_LBUTTONDBLCLK == wm::WM_LBUTTONDBLCLK);
    assert!(types::WM_RBUTTONUP == wm::WM_RBUTTONUP);
    assert!(types::WM_APP == wm::WM_APP);
    assert!(types::NIF_MESSAGE == shell::NIF_MESSAGE.0);
    assert!(types::NIF_ICON == shell::NIF_ICON.0);
    assert!(types::NIF_TIP == shell::NIF_TIP.0);
    assert!(types::NOTIFYICON_VERSION_4 == shell::NOTIFYICON_VERSION_4);
};

fn to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut c_void)
}

fn hicon(icon: IconHandle) -> HICON {
    HICON(icon.0 as *mut c_void)
}

fn hmenu(menu: MenuHandle) -> HMENU {
    HMENU(menu.0 as *mut c_void)
}

/// Converts a window handle from the host's windowing layer
pub fn window_handle(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

/// Converts a menu created by the caller so ownership can pass to the controller
pub fn menu_handle(menu: HMENU) -> MenuHandle {
    MenuHandle(menu.0 as isize)
}

fn native_data(data: &NotifyIconData) -> NOTIFYICONDATAW {
    NOTIFYICONDATAW {
        cbSize: size_of::<NOTIFYICONDATAW>() as u32,
        hWnd: hwnd(data.window),
        uID: data.id,
        uFlags: NOTIFY_ICON_DATA_FLAGS(data.flags),
        uCallbackMessage: data.callback_message,
        hIcon: data.icon.map(hicon).unwrap_or_default(),
        szTip: data.tip,
        Anonymous: NOTIFYICONDATAW_0 {
            uVersion: data.version,
        },
        ..Default::default()
    }
}

/// The production shell
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Shell;

impl Win32Shell {
    pub fn new() -> Self {
        Self
    }
}

impl TrayShell for Win32Shell {
    fn load_icon(&self, path: &str) -> Result<IconHandle> {
        let path_wide = to_wide(path);
        unsafe {
            let handle = LoadImageW(
                HINSTANCE::default(),
                PCWSTR::from_raw(path_wide.as_ptr()),
                IMAGE_ICON,
                GetSystemMetrics(SM_CXSMICON),
                GetSystemMetrics(SM_CYSMICON),
                LR_LOADFROMFILE,
            )
            .map_err(|e| {
                debug!("LoadImageW failed for {}: {}", path, e);
                TrayError::IconLoad(path.to_string())
            })?;
            if handle.is_invalid() {
                return Err(TrayError::IconLoad(path.to_string()));
            }
            Ok(IconHandle(handle.0 as isize))
        }
    }

    fn destroy_icon(&self, icon: IconHandle) {
        unsafe {
            if let Err(e) = DestroyIcon(hicon(icon)) {
                warn!("DestroyIcon failed: {}", e);
            }
        }
    }

    fn destroy_menu(&self, menu: MenuHandle) {
        unsafe {
            if let Err(e) = DestroyMenu(hmenu(menu)) {
                warn!("DestroyMenu failed: {}", e);
            }
        }
    }

    fn notify_icon(&self, action: NotifyAction, data: &NotifyIconData) -> Result<()> {
        let message = match action {
            NotifyAction::Add => NIM_ADD,
            NotifyAction::Modify => NIM_MODIFY,
            NotifyAction::Delete => NIM_DELETE,
        };
        let nid = native_data(data);
        unsafe {
            if Shell_NotifyIconW(message, &nid).as_bool() {
                Ok(())
            } else {
                Err(TrayError::Shell(action))
            }
        }
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        unsafe { IsWindow(hwnd(window)).as_bool() }
    }

    fn cursor_pos(&self) -> Result<Point> {
        let mut pt = POINT::default();
        unsafe {
            GetCursorPos(&mut pt)?;
        }
        Ok(Point::new(pt.x, pt.y))
    }

    fn set_foreground_window(&self, window: WindowHandle) {
        unsafe {
            let _ = SetForegroundWindow(hwnd(window));
        }
    }

    fn track_popup_menu(&self, menu: MenuHandle, at: Point, window: WindowHandle) {
        unsafe {
            let _ = TrackPopupMenu(hmenu(menu), TPM_LEFTBUTTON, at.x, at.y, 0, hwnd(window), None);
        }
    }

    fn post_null_message(&self, window: WindowHandle) {
        unsafe {
            if let Err(e) = PostMessageW(hwnd(window), types::WM_NULL, WPARAM(0), LPARAM(0)) {
                debug!("PostMessageW(WM_NULL) failed: {}", e);
            }
        }
    }

    fn register_window_message(&self, name: &str) -> Result<u32> {
        let name_wide = to_wide(name);
        let id = unsafe { RegisterWindowMessageW(PCWSTR::from_raw(name_wide.as_ptr())) };
        if id == 0 {
            return Err(TrayError::MessageRegistration(name.to_string()));
        }
        Ok(id)
    }
}
