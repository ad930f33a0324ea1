//! Endpoint address resolution
//!
//! Maps a logical application name to the local channel the daemon binds:
//! - POSIX hosts: a Unix domain socket at `/tmp/<app>.sock`
//! - Windows hosts: a named pipe at `\\.\pipe\<app>`
//!
//! The mapping is a pure function of the name and the platform, so client
//! and daemon agree on the address without any further configuration.

use std::fmt;
use std::str::FromStr;

use crate::common::{Error, Result};

/// Host platform family, which decides the address scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux, macOS and other Unix-likes
    Posix,
    /// Windows named pipes
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posix => f.write_str("posix"),
            Self::Windows => f.write_str("windows"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "posix" | "unix" => Ok(Self::Posix),
            "windows" => Ok(Self::Windows),
            other => Err(format!("unknown platform '{other}' (expected posix or windows)")),
        }
    }
}

/// Resolve the endpoint address for `app_name`
pub fn endpoint_address(app_name: &str, platform: Platform) -> Result<String> {
    endpoint_address_with_suffix(app_name, None, platform)
}

/// Resolve the endpoint address for one of several channels of an application
///
/// A non-empty suffix is appended as `<app>_<suffix>`; `None` or an empty
/// suffix gives the plain application address.
pub fn endpoint_address_with_suffix(
    app_name: &str,
    suffix: Option<&str>,
    platform: Platform,
) -> Result<String> {
    validate_name(app_name)?;

    let channel = match suffix {
        Some(suffix) if !suffix.is_empty() => {
            validate_name(suffix)?;
            format!("{app_name}_{suffix}")
        }
        _ => app_name.to_string(),
    };

    Ok(match platform {
        Platform::Posix => format!("/tmp/{channel}.sock"),
        Platform::Windows => format!(r"\\.\pipe\{channel}"),
    })
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(Error::InvalidAppName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_posix_address() {
        let addr = endpoint_address("myapp", Platform::Posix).unwrap();
        assert_eq!(addr, "/tmp/myapp.sock");
    }

    #[test]
    fn test_windows_address() {
        let addr = endpoint_address("myapp", Platform::Windows).unwrap();
        assert_eq!(addr, r"\\.\pipe\myapp");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        for name in ["a", "myapp", "daemon-slayer", "with space", "ünïcode"] {
            for platform in [Platform::Posix, Platform::Windows] {
                let first = endpoint_address(name, platform).unwrap();
                let second = endpoint_address(name, platform).unwrap();
                assert_eq!(first, second);
                match platform {
                    Platform::Posix => {
                        assert!(first.starts_with("/tmp/"));
                        assert!(first.ends_with(".sock"));
                    }
                    Platform::Windows => assert!(first.starts_with(r"\\.\pipe\")),
                }
            }
        }
    }

    #[test]
    fn test_suffix_is_appended() {
        let addr = endpoint_address_with_suffix("myapp", Some("health"), Platform::Posix).unwrap();
        assert_eq!(addr, "/tmp/myapp_health.sock");

        let addr = endpoint_address_with_suffix("myapp", Some("health"), Platform::Windows).unwrap();
        assert_eq!(addr, r"\\.\pipe\myapp_health");
    }

    #[test]
    fn test_empty_suffix_is_plain_address() {
        let plain = endpoint_address("myapp", Platform::Posix).unwrap();
        let empty = endpoint_address_with_suffix("myapp", Some(""), Platform::Posix).unwrap();
        assert_eq!(plain, empty);
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        for name in ["", "../etc/passwd", r"a\b", "nul\0byte"] {
            let err = endpoint_address(name, Platform::Posix).unwrap_err();
            assert!(matches!(err, Error::InvalidAppName(_)), "{name:?}");
        }
        assert!(endpoint_address_with_suffix("ok", Some("x/y"), Platform::Windows).is_err());
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("posix".parse::<Platform>().unwrap(), Platform::Posix);
        assert_eq!("Windows".parse::<Platform>().unwrap(), Platform::Windows);
        assert!("beos".parse::<Platform>().is_err());
    }

    proptest! {
        #[test]
        fn resolution_is_deterministic_for_any_name(name in "[^/\\\\\\x00]{1,40}") {
            let posix = endpoint_address(&name, Platform::Posix).unwrap();
            prop_assert_eq!(&posix, &endpoint_address(&name, Platform::Posix).unwrap());
            prop_assert!(posix.starts_with("/tmp/"));
            prop_assert!(posix.ends_with(".sock"));

            let windows = endpoint_address(&name, Platform::Windows).unwrap();
            prop_assert_eq!(&windows, &endpoint_address(&name, Platform::Windows).unwrap());
            prop_assert!(windows.starts_with(r"\\.\pipe\"));
            prop_assert!(windows.ends_with(name.as_str()));
        }

        #[test]
        fn names_with_separators_are_rejected(
            head in "[a-z]{0,8}",
            sep in prop_oneof![Just('/'), Just('\\'), Just('\0')],
            tail in "[a-z]{0,8}",
        ) {
            let name = format!("{head}{sep}{tail}");
            for platform in [Platform::Posix, Platform::Windows] {
                let err = endpoint_address(&name, platform).unwrap_err();
                prop_assert!(matches!(err, Error::InvalidAppName(_)));
            }
        }
    }
}
