//! Internationalization support using rust-i18n
//!
//! Provides locale detection and initialization of the i18n system.

use crate::tray::TrayEvent;
use log::info;

/// Detect the user's OS locale using Windows API
///
/// Returns the locale string (e.g., "en-US", "de-DE") or falls back to "en" on failure.
#[cfg(windows)]
pub fn detect_locale() -> String {
    use log::warn;
    use windows::Win32::Globalization::GetUserDefaultLocaleName;

    unsafe {
        let mut buffer = [0u16; 85]; // LOCALE_NAME_MAX_LENGTH
        let len = GetUserDefaultLocaleName(&mut buffer);

        if len > 0 && len <= buffer.len() as i32 {
            match String::from_utf16(&buffer[..len as usize - 1]) {
                Ok(locale) => {
                    info!("Detected system locale: {}", locale);
                    locale
                }
                Err(e) => {
                    warn!("Failed to convert locale to UTF-8: {}, falling back to 'en'", e);
                    "en".to_string()
                }
            }
        } else {
            warn!("GetUserDefaultLocaleName failed or returned invalid length, falling back to 'en'");
            "en".to_string()
        }
    }
}

/// Detect the locale from `LANG` (e.g. "de_DE.UTF-8" becomes "de-DE")
#[cfg(not(windows))]
pub fn detect_locale() -> String {
    std::env::var("LANG")
        .ok()
        .and_then(|lang| {
            let tag = lang.split('.').next()?.replace('_', "-");
            (!tag.is_empty() && tag != "C" && tag != "POSIX").then_some(tag)
        })
        .unwrap_or_else(|| "en".to_string())
}

/// Initialize the i18n system with optional language override
///
/// If `config_language` is Some, uses that locale. Otherwise, detects the system locale.
pub fn init(config_language: Option<&str>) {
    let locale = match config_language {
        Some(lang) => {
            info!("Using configured language: {}", lang);
            lang.to_string()
        }
        None => detect_locale(),
    };

    rust_i18n::set_locale(&locale);
    info!("Locale set to: {}", locale);
}

/// Human-readable description of a tray event in the current locale
pub fn event_description(event: TrayEvent) -> String {
    match event {
        TrayEvent::LeftClick => rust_i18n::t!("event_left_click").to_string(),
        TrayEvent::LeftDoubleClick => rust_i18n::t!("event_left_double_click").to_string(),
        TrayEvent::RightClick => rust_i18n::t!("event_right_click").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_locale_returns_string() {
        let locale = detect_locale();
        assert!(!locale.is_empty(), "Locale should not be empty");
        assert!(locale.len() >= 2, "Locale should be at least 2 characters (e.g., 'en')");
    }

    #[test]
    fn test_translations_available() {
        let exit = rust_i18n::t!("menu_exit", locale = "en");
        assert_eq!(exit, "Exit");
        let exit_de = rust_i18n::t!("menu_exit", locale = "de");
        assert_eq!(exit_de, "Beenden");
    }

    #[test]
    fn test_init_with_some_uses_override() {
        init(Some("de"));
        let current_locale = rust_i18n::locale();
        assert!(current_locale.starts_with("de"), "Locale should be German");
        init(Some("en"));
    }
}
