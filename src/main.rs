//! Tray Controller - demo host
//!
//! A hidden window that owns one tray icon and forwards every message to the controller.

#![cfg_attr(windows, windows_subsystem = "windows")]

// Initialize i18n for the binary (shares locales with library)
rust_i18n::i18n!("locales", fallback = "en");

#[cfg(windows)]
mod host {
    use log::{error, info};
    use std::cell::RefCell;
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use std::rc::Rc;
    use win_tray_controller::logging::{init_logging, LoggingConfig};
    use win_tray_controller::settings::{AppConfig, ConfigManager};
    use win_tray_controller::shell::win32::{menu_handle, window_handle};
    use win_tray_controller::shell::{TrayShell, Win32Shell};
    use win_tray_controller::{
        i18n, MessageIds, Result, TrayDelegate, TrayEvent, TrayIconController,
    };
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::UI::WindowsAndMessaging::{
        AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu,
        DestroyWindow, DispatchMessageW, GetMessageW, MessageBoxW, PostQuitMessage,
        RegisterClassW, TranslateMessage, HMENU, MB_ICONINFORMATION, MB_OK, MB_SETFOREGROUND,
        MF_SEPARATOR, MF_STRING, MSG, WINDOW_EX_STYLE, WM_COMMAND, WM_DESTROY, WNDCLASSW,
        WS_OVERLAPPEDWINDOW,
    };

    const WINDOW_CLASS: &str = "WinTrayControllerHost";

    /// Context menu command ids
    const IDM_ABOUT: usize = 1001;
    const IDM_EXIT: usize = 1002;

    thread_local! {
        static TRAY: RefCell<Option<TrayIconController>> = const { RefCell::new(None) };
    }

    fn to_wide(s: &str) -> Vec<u16> {
        OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
    }

    unsafe extern "system" fn wndproc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        let handled = TRAY.with(|cell| match cell.try_borrow_mut() {
            Ok(mut slot) => slot
                .as_mut()
                .and_then(|tray| tray.handle_message(msg, wparam.0, lparam.0)),
            // Re-entered from the popup menu's modal loop
            Err(_) => None,
        });
        if let Some(result) = handled {
            return LRESULT(result);
        }

        match msg {
            WM_COMMAND => {
                match wparam.0 & 0xFFFF {
                    IDM_ABOUT => show_about_dialog(hwnd),
                    IDM_EXIT => {
                        info!("Exit requested");
                        let _ = DestroyWindow(hwnd);
                    }
                    _ => {}
                }
                LRESULT(0)
            }
            WM_DESTROY => {
                // Dropping the controller removes the icon and releases icon and menu
                let tray = TRAY.with(|cell| cell.try_borrow_mut().ok().and_then(|mut slot| slot.take()));
                drop(tray);
                PostQuitMessage(0);
                LRESULT(0)
            }
            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }

    /// Hidden top-level window; a message-only window misses the TaskbarCreated broadcast
    fn create_window() -> Result<HWND> {
        let class_name = to_wide(WINDOW_CLASS);
        unsafe {
            let instance: HINSTANCE = GetModuleHandleW(PCWSTR::null())?.into();
            let class = WNDCLASSW {
                lpfnWndProc: Some(wndproc),
                hInstance: instance,
                lpszClassName: PCWSTR::from_raw(class_name.as_ptr()),
                ..Default::default()
            };
            if RegisterClassW(&class) == 0 {
                return Err(windows::core::Error::from_win32().into());
            }

            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR::from_raw(class_name.as_ptr()),
                PCWSTR::from_raw(class_name.as_ptr()),
                WS_OVERLAPPEDWINDOW,
                0,
                0,
                0,
                0,
                HWND::default(),
                HMENU::default(),
                instance,
                None,
            )?;
            Ok(hwnd)
        }
    }

    fn build_menu() -> Result<HMENU> {
        let about = to_wide(&rust_i18n::t!("menu_about"));
        let exit = to_wide(&rust_i18n::t!("menu_exit"));
        unsafe {
            let menu = CreatePopupMenu()?;
            let appended = AppendMenuW(menu, MF_STRING, IDM_ABOUT, PCWSTR::from_raw(about.as_ptr()))
                .and_then(|_| AppendMenuW(menu, MF_SEPARATOR, 0, PCWSTR::null()))
                .and_then(|_| AppendMenuW(menu, MF_STRING, IDM_EXIT, PCWSTR::from_raw(exit.as_ptr())));
            if let Err(e) = appended {
                let _ = DestroyMenu(menu);
                return Err(e.into());
            }
            Ok(menu)
        }
    }

    fn show_about_dialog(hwnd: HWND) {
        let message = rust_i18n::t!("about_text", version = env!("CARGO_PKG_VERSION"));
        let title = rust_i18n::t!("about_title");
        let message_wide = to_wide(&message);
        let title_wide = to_wide(&title);

        unsafe {
            MessageBoxW(
                hwnd,
                PCWSTR::from_raw(message_wide.as_ptr()),
                PCWSTR::from_raw(title_wide.as_ptr()),
                MB_OK | MB_ICONINFORMATION | MB_SETFOREGROUND,
            );
        }
    }

    fn message_loop() {
        let mut msg = MSG::default();
        unsafe {
            // GetMessageW returns -1 on error and 0 on WM_QUIT
            while GetMessageW(&mut msg, HWND::default(), 0, 0).0 > 0 {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    fn start(config_manager: &ConfigManager, config: &AppConfig) -> Result<()> {
        let shell: Rc<dyn TrayShell> = Rc::new(Win32Shell::new());
        let ids = MessageIds::register(&*shell, config.tray.callback_message())?;
        let hwnd = create_window()?;

        let delegate: Rc<dyn TrayDelegate> = Rc::new(|event: TrayEvent| {
            info!("{} ({})", i18n::event_description(event), event);
        });
        let mut tray = TrayIconController::new(shell, ids, Some(delegate));

        let icon_path = config_manager.resolve_path(&config.tray.icon_path);
        let icon_path = icon_path.to_string_lossy();
        let tooltip = config
            .tray
            .tooltip
            .clone()
            .unwrap_or_else(|| rust_i18n::t!("tooltip_default").to_string());

        let installed = build_menu().and_then(|menu| {
            tray.set_context_menu(Some(menu_handle(menu)));
            tray.install(
                window_handle(hwnd),
                config.tray.title.as_deref(),
                Some(&*icon_path),
                Some(&tooltip),
            )
        });
        if let Err(e) = installed {
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
            return Err(e);
        }

        TRAY.with(|cell| *cell.borrow_mut() = Some(tray));
        message_loop();
        Ok(())
    }

    pub fn run() {
        let config_manager = match ConfigManager::new() {
            Ok(cm) => cm,
            Err(e) => {
                eprintln!("Failed to initialize config manager: {}", e);
                return;
            }
        };

        let config = config_manager.load().unwrap_or_else(|e| {
            eprintln!("Failed to load config: {}, using defaults", e);
            AppConfig::default()
        });
        let log_config = LoggingConfig::from_settings(&config.logging, config_manager.log_dir());

        if let Err(e) = init_logging(log_config) {
            eprintln!("Failed to initialize logging: {}", e);
        }

        i18n::init(config.general.language.as_deref());

        info!("Tray Controller starting...");
        info!("Version: {}", env!("CARGO_PKG_VERSION"));

        if let Err(e) = start(&config_manager, &config) {
            error!("Application error: {}", e);
        }

        info!("Tray Controller stopped");
    }
}

#[cfg(windows)]
fn main() {
    host::run();
}

#[cfg(not(windows))]
fn main() {
    eprintln!("win_tray_controller hosts a Windows notification-area icon and needs the Windows shell");
    std::process::exit(1);
}
