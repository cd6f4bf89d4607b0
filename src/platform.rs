//! Platform identification for selecting the correct download target.
//!
//! Catalog entries key their download URLs and digests by platform identifier,
//! using the same names the operating system reports for itself:
//! - `Windows`
//! - `Darwin` (macOS)
//! - `Linux`
//!
//! The lifecycle engine never queries the host directly. It receives a
//! [`Platform`] value at construction, so eligibility checks and path logic can
//! be exercised for any platform from any host.
//!
//! # Examples
//!
//! ```
//! use toolbox::platform::Platform;
//!
//! let host = Platform::current();
//! println!("Installing for: {}", host);
//!
//! let windows = Platform::new("Windows");
//! assert!(windows.is_windows());
//! ```

use std::fmt;

/// Identifier of the platform packages are installed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform(String);

impl Platform {
    /// Wrap an explicit platform identifier (e.g. `"Linux"`).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Detect the platform this binary was built for.
    pub fn current() -> Self {
        Self::new(detect_platform_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_windows(&self) -> bool {
        self.0.eq_ignore_ascii_case("windows")
    }

    pub fn is_macos(&self) -> bool {
        self.0.eq_ignore_ascii_case("darwin") || self.0.eq_ignore_ascii_case("macos")
    }

    /// Whether this platform appears in a descriptor's supported list.
    ///
    /// Identifiers are matched exactly, the same way the catalog keys its
    /// `url` and `sha256` maps.
    pub fn is_listed_in(&self, supported: &[String]) -> bool {
        supported.iter().any(|os| os == &self.0)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platform identifier for the compile target.
pub fn detect_platform_id() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "Windows"
    }

    #[cfg(target_os = "macos")]
    {
        "Darwin"
    }

    #[cfg(target_os = "linux")]
    {
        "Linux"
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        std::env::consts::OS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_platform() {
        let platform = Platform::current();
        assert!(!platform.as_str().is_empty());
        #[cfg(target_os = "linux")]
        assert_eq!(platform.as_str(), "Linux");
        #[cfg(target_os = "macos")]
        assert!(platform.is_macos());
        #[cfg(target_os = "windows")]
        assert!(platform.is_windows());
    }

    #[test]
    fn test_listed_is_exact() {
        let supported = vec!["Windows".to_string(), "Darwin".to_string()];
        assert!(Platform::new("Windows").is_listed_in(&supported));
        assert!(!Platform::new("windows").is_listed_in(&supported));
        assert!(!Platform::new("Linux").is_listed_in(&supported));
        assert!(!Platform::new("Linux").is_listed_in(&[]));
    }
}
