//! Notification-area icon lifecycle and callback dispatch

use super::event::{MessageIds, TrayDelegate, TrayEvent, TrayNotification};
use super::resource::{OwnedIcon, OwnedMenu};
use crate::error::{Result, TrayError};
use crate::shell::types::{NIF_ICON, NIF_MESSAGE, NIF_TIP, NOTIFYICON_VERSION_4};
use crate::shell::{MenuHandle, NotifyAction, NotifyIconData, TrayShell, WindowHandle};
use log::{debug, info, trace, warn};
use std::rc::Rc;

/// Icon id within the bound window; one icon per controller
const TRAY_ICON_ID: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayState {
    Uninstalled,
    Installed,
}

/// Owns one tray icon and its context menu.
///
/// The host window forwards every message to [`handle_message`](Self::handle_message).
/// All calls happen on the window's thread.
pub struct TrayIconController {
    shell: Rc<dyn TrayShell>,
    delegate: Option<Rc<dyn TrayDelegate>>,
    ids: MessageIds,
    window: Option<WindowHandle>,
    icon: Option<OwnedIcon>,
    menu: Option<OwnedMenu>,
    nid: NotifyIconData,
    installed: bool,
}

impl TrayIconController {
    pub fn new(
        shell: Rc<dyn TrayShell>,
        ids: MessageIds,
        delegate: Option<Rc<dyn TrayDelegate>>,
    ) -> Self {
        Self {
            shell,
            delegate,
            ids,
            window: None,
            icon: None,
            menu: None,
            nid: NotifyIconData::default(),
            installed: false,
        }
    }

    pub fn set_delegate(&mut self, delegate: Option<Rc<dyn TrayDelegate>>) {
        self.delegate = delegate;
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn state(&self) -> TrayState {
        if self.installed {
            TrayState::Installed
        } else {
            TrayState::Uninstalled
        }
    }

    pub fn message_ids(&self) -> MessageIds {
        self.ids
    }

    pub fn window(&self) -> Option<WindowHandle> {
        self.window
    }

    /// The descriptor last sent to the shell
    pub fn notify_data(&self) -> &NotifyIconData {
        &self.nid
    }

    pub fn menu(&self) -> Option<MenuHandle> {
        self.menu.as_ref().map(OwnedMenu::handle)
    }

    /// Add the icon to the notification area.
    ///
    /// Succeeds without touching the shell when already installed. `title` is
    /// accepted for interface compatibility and has no effect.
    pub fn install(
        &mut self,
        window: WindowHandle,
        title: Option<&str>,
        icon_path: Option<&str>,
        tooltip: Option<&str>,
    ) -> Result<()> {
        if self.installed {
            debug!("Tray icon already installed");
            return Ok(());
        }
        if let Some(title) = title {
            trace!("Ignoring tray title {:?}", title);
        }

        self.icon = None;

        let path = icon_path.unwrap_or_default();
        if path.is_empty() {
            return Err(TrayError::IconLoad(String::new()));
        }
        let icon = OwnedIcon::load(&self.shell, path)?;

        self.window = Some(window);
        self.nid.window = window;
        self.nid.id = TRAY_ICON_ID;
        self.nid.version = NOTIFYICON_VERSION_4;
        self.nid.callback_message = self.ids.callback;
        self.nid.icon = Some(icon.handle());
        self.nid.set_tip(tooltip.unwrap_or_default());
        self.nid.flags = NIF_MESSAGE | NIF_ICON | NIF_TIP;
        self.icon = Some(icon);

        self.shell.notify_icon(NotifyAction::Add, &self.nid)?;

        self.installed = true;
        info!("Tray icon installed from {}", path);
        Ok(())
    }

    /// Update tooltip and/or icon of the installed icon.
    ///
    /// Local fields are not rolled back when the shell rejects the update.
    /// When the new icon fails to load the descriptor is still published,
    /// without an icon, and the load error is returned.
    pub fn set_info(
        &mut self,
        title: Option<&str>,
        icon_path: Option<&str>,
        tooltip: Option<&str>,
    ) -> Result<()> {
        if !self.installed {
            return Err(TrayError::NotInstalled);
        }
        let shell = Rc::clone(&self.shell);
        if !self.window.is_some_and(|w| shell.is_window(w)) {
            return Err(TrayError::InvalidWindow);
        }
        if let Some(title) = title {
            trace!("Ignoring tray title {:?}", title);
        }

        if let Some(tooltip) = tooltip {
            self.nid.flags |= NIF_TIP;
            self.nid.set_tip(tooltip);
        }

        let mut load_error = None;
        if let Some(path) = icon_path {
            self.icon = None;
            self.nid.flags |= NIF_ICON;
            match OwnedIcon::load(&self.shell, path) {
                Ok(icon) => {
                    self.nid.icon = Some(icon.handle());
                    self.icon = Some(icon);
                }
                Err(e) => {
                    warn!("Tray icon update left without an icon: {}", e);
                    self.nid.icon = None;
                    load_error = Some(e);
                }
            }
        }

        self.shell.notify_icon(NotifyAction::Modify, &self.nid)?;

        match load_error {
            Some(e) => Err(e),
            None => {
                debug!("Tray icon updated");
                Ok(())
            }
        }
    }

    /// Replace the context menu, taking ownership of `menu`. `None` clears it.
    pub fn set_context_menu(&mut self, menu: Option<MenuHandle>) {
        self.menu = None;
        self.menu = menu
            .filter(|m| !m.is_null())
            .map(|m| OwnedMenu::adopt(&self.shell, m));
    }

    /// Remove the icon from the notification area. A later `install` adds it
    /// again with a freshly loaded icon.
    pub fn remove(&mut self) -> Result<()> {
        if !self.installed {
            return Err(TrayError::NotInstalled);
        }
        self.shell.notify_icon(NotifyAction::Delete, &self.nid)?;
        self.installed = false;
        info!("Tray icon removed");
        Ok(())
    }

    /// Re-register the stored descriptor after the shell forgot it.
    /// On failure the controller is left uninstalled.
    pub fn reinstall(&mut self) -> Result<()> {
        if !self.installed {
            return Err(TrayError::NotInstalled);
        }
        if let Err(e) = self.shell.notify_icon(NotifyAction::Add, &self.nid) {
            self.installed = false;
            return Err(e);
        }
        info!("Tray icon reinstalled after shell restart");
        Ok(())
    }

    /// Entry point for every message the host window receives.
    ///
    /// `Some(result)` means handled: the host returns `result` and skips
    /// default processing. `None` means not ours.
    pub fn handle_message(&mut self, message: u32, wparam: usize, lparam: isize) -> Option<isize> {
        if self.ids.taskbar_created != 0 && message == self.ids.taskbar_created {
            debug!("Shell restarted");
            if self.installed {
                if let Err(e) = self.reinstall() {
                    warn!("Failed to restore tray icon: {}", e);
                }
            }
            return Some(0);
        }
        if message == self.ids.callback {
            let notification = TrayNotification::decode(wparam, lparam);
            return Some(self.on_tray_callback(notification));
        }
        None
    }

    fn on_tray_callback(&self, notification: TrayNotification) -> isize {
        let Some(event) = TrayEvent::from_notification(notification.code) else {
            trace!("Unhandled tray notification {:#x}", notification.code);
            return 0;
        };
        trace!(
            "Tray {} on icon {} at {:?}",
            event,
            notification.icon_id,
            notification.cursor
        );

        if let Some(delegate) = &self.delegate {
            delegate.on_tray_event(event);
        }
        if event == TrayEvent::RightClick {
            self.show_popup_menu();
        }
        0
    }

    fn show_popup_menu(&self) {
        let Some(menu) = &self.menu else {
            return;
        };
        let Some(window) = self.window else {
            debug!("No window bound, skipping context menu");
            return;
        };

        let at = self.shell.cursor_pos().unwrap_or_else(|e| {
            debug!("Cursor position unavailable: {}", e);
            Default::default()
        });
        // Without foreground the menu does not close on an outside click
        self.shell.set_foreground_window(window);
        self.shell.track_popup_menu(menu.handle(), at, window);
        self.shell.post_null_message(window);
    }
}

impl Drop for TrayIconController {
    fn drop(&mut self) {
        if self.installed {
            if let Err(e) = self.remove() {
                warn!("Failed to remove tray icon on drop: {}", e);
            }
        }
        // Owned icon and menu are released by their own drops
    }
}
