use crate::error::{Result, WatchError};

/// Platforms with a known URL launcher (xdg-open, rundll32, open).
pub fn is_supported_platform() -> bool {
    cfg!(any(target_os = "linux", target_os = "windows", target_os = "macos"))
}

/// Hand the URL to the platform's default browser without waiting on it.
pub fn open_url(url: &str) -> Result<()> {
    if !is_supported_platform() {
        return Err(WatchError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ));
    }
    tracing::debug!(url, "opening in browser");
    open::that_detached(url).map_err(WatchError::Io)
}
