use crate::shell::NotifyAction;
use std::fmt;

#[derive(Debug)]
pub enum TrayError {
    /// Operation requires an installed icon
    NotInstalled,
    /// The bound window is missing or no longer alive
    InvalidWindow,
    /// The icon image at the given path could not be loaded
    IconLoad(String),
    /// The shell refused a `Shell_NotifyIcon` call
    Shell(NotifyAction),
    /// A well-known window message could not be registered
    MessageRegistration(String),
    ConfigError(String),
    IoError(std::io::Error),
    #[cfg(windows)]
    WindowsApiError(windows::core::Error),
}

impl fmt::Display for TrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrayError::NotInstalled => write!(f, "Tray icon is not installed"),
            TrayError::InvalidWindow => write!(f, "Tray icon window is not a live window"),
            TrayError::IconLoad(path) => write!(f, "Failed to load tray icon from '{}'", path),
            TrayError::Shell(action) => write!(f, "Shell rejected {} for tray icon", action),
            TrayError::MessageRegistration(name) => {
                write!(f, "Failed to register window message '{}'", name)
            }
            TrayError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            TrayError::IoError(e) => write!(f, "IO error: {}", e),
            #[cfg(windows)]
            TrayError::WindowsApiError(e) => write!(f, "Windows API error: {}", e),
        }
    }
}

impl std::error::Error for TrayError {}

impl From<std::io::Error> for TrayError {
    fn from(err: std::io::Error) -> Self {
        TrayError::IoError(err)
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for TrayError {
    fn from(err: windows::core::Error) -> Self {
        TrayError::WindowsApiError(err)
    }
}

pub type Result<T> = std::result::Result<T, TrayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(TrayError::NotInstalled.to_string(), "Tray icon is not installed");
        assert_eq!(
            TrayError::IconLoad("app.ico".to_string()).to_string(),
            "Failed to load tray icon from 'app.ico'"
        );
        assert_eq!(
            TrayError::Shell(NotifyAction::Modify).to_string(),
            "Shell rejected NIM_MODIFY for tray icon"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let err: TrayError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, TrayError::IoError(_)));
    }
}
