//! Lifecycle tests for the tray icon controller against the recording mock shell

use std::rc::Rc;
use win_tray_controller::shell::traits::mocks::{MockShell, ShellCall};
use win_tray_controller::shell::{NotifyAction, TrayShell, WindowHandle};
use win_tray_controller::tray::TrayState;
use win_tray_controller::{MessageIds, TrayError, TrayIconController};

const TASKBAR_CREATED: u32 = 0xC123;
const CALLBACK: u32 = 0x8001;

fn setup() -> (Rc<MockShell>, TrayIconController, WindowHandle) {
    let mock = Rc::new(MockShell::new());
    let shell: Rc<dyn TrayShell> = mock.clone();
    let tray = TrayIconController::new(shell, MessageIds::new(TASKBAR_CREATED, CALLBACK), None);
    let window = mock.create_window();
    (mock, tray, window)
}

#[test]
fn test_install_twice_is_noop() {
    let (mock, mut tray, window) = setup();
    tray.install(window, Some("App"), Some("app.ico"), Some("Tip")).unwrap();
    let descriptor = tray.notify_data().clone();
    mock.clear_calls();

    for _ in 0..3 {
        assert!(tray.install(window, None, Some("other.ico"), Some("Other")).is_ok());
    }

    assert!(mock.calls().is_empty(), "repeated install must not touch the shell");
    assert_eq!(*tray.notify_data(), descriptor);
    assert_eq!(mock.live_icon_count(), 1);
}

#[test]
fn test_install_remove_install_uses_fresh_icon() {
    let (mock, mut tray, window) = setup();

    tray.install(window, None, Some("app.ico"), Some("Tip")).unwrap();
    let first_icon = tray.notify_data().icon;
    tray.remove().unwrap();
    tray.install(window, None, Some("app.ico"), Some("Tip")).unwrap();

    assert_eq!(tray.state(), TrayState::Installed);
    assert_ne!(tray.notify_data().icon, first_icon);
    assert_eq!(mock.live_icon_count(), 1, "first icon must have been released");
    assert_eq!(mock.invalid_release_count(), 0);
    assert_eq!(mock.notify_calls(NotifyAction::Add).len(), 2);
}

#[test]
fn test_operations_before_install_make_no_shell_calls() {
    let (mock, mut tray, _window) = setup();
    mock.clear_calls();

    assert!(matches!(
        tray.set_info(None, Some("app.ico"), Some("Tip")),
        Err(TrayError::NotInstalled)
    ));
    assert!(matches!(tray.remove(), Err(TrayError::NotInstalled)));
    assert!(matches!(tray.reinstall(), Err(TrayError::NotInstalled)));

    assert!(mock.calls().is_empty());
}

#[test]
fn test_failed_icon_load_leaves_uninstalled() {
    let (mock, mut tray, window) = setup();
    mock.set_fail_icon_loads(true);

    assert!(matches!(
        tray.install(window, None, Some("missing.ico"), None),
        Err(TrayError::IconLoad(_))
    ));
    assert_eq!(tray.state(), TrayState::Uninstalled);
    assert!(mock.notify_calls(NotifyAction::Add).is_empty());

    mock.set_fail_icon_loads(false);
    assert!(tray.install(window, None, Some("app.ico"), None).is_ok());
}

#[test]
fn test_set_info_replaces_icon() {
    let (mock, mut tray, window) = setup();
    tray.install(window, None, Some("app.ico"), Some("Tip")).unwrap();
    let old_icon = tray.notify_data().icon.unwrap();
    mock.clear_calls();

    tray.set_info(None, Some("busy.ico"), None).unwrap();

    let calls = mock.calls();
    let destroy = calls
        .iter()
        .position(|c| *c == ShellCall::DestroyIcon(old_icon))
        .expect("old icon destroyed");
    let load = calls
        .iter()
        .position(|c| *c == ShellCall::LoadIcon("busy.ico".to_string()))
        .expect("new icon loaded");
    assert!(destroy < load, "old icon is released before the new one is loaded");
    assert_eq!(mock.live_icon_count(), 1);
    assert_eq!(tray.notify_data().tip_text(), "Tip");
}

#[test]
fn test_long_tooltip_truncated() {
    let (mock, mut tray, window) = setup();
    let long = "t".repeat(500);

    tray.install(window, None, Some("app.ico"), Some(&long)).unwrap();

    let added = &mock.notify_calls(NotifyAction::Add)[0];
    assert_eq!(added.tip_text().len(), 127);
}

#[test]
fn test_drop_uninstalled_releases_icon_and_menu_once() {
    let (mock, mut tray, window) = setup();
    tray.install(window, None, Some("app.ico"), None).unwrap();
    tray.set_context_menu(Some(mock.create_menu()));
    tray.remove().unwrap();
    assert!(!tray.is_installed());

    drop(tray);

    assert_eq!(mock.live_icon_count(), 0);
    assert_eq!(mock.live_menu_count(), 0);
    assert_eq!(mock.invalid_release_count(), 0);
    assert_eq!(mock.notify_calls(NotifyAction::Delete).len(), 1);
}

#[test]
fn test_drop_installed_removes_icon() {
    let (mock, mut tray, window) = setup();
    tray.install(window, None, Some("app.ico"), None).unwrap();

    drop(tray);

    assert_eq!(mock.notify_calls(NotifyAction::Delete).len(), 1);
    assert_eq!(mock.live_icon_count(), 0);
}
