//! Build platform descriptor
//!
//! Each supported OS family has its own format with no shared structure:
//!
//! ```text
//! macOS    OSX_<version>_<arch>                   OSX_10.5_x86_64
//! Linux    Linux_<name:version:codename>_<kernel> Linux_Ubuntu:20.04:focal_5.4.0-42-generic
//! Windows  win32_v<major>.<minor>.<build>[ (sp)]  win32_v10.0.19041
//! other    <system><release>                      FreeBSD13.2-RELEASE
//! ```

use std::fs;
use std::sync::OnceLock;

use sysinfo::System;

use crate::build_info::{DistMode, NOT_AVAILABLE};

const OS_RELEASE: &str = "/etc/os-release";

/// Facts about the host needed to build its platform descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOs {
    MacOs {
        version: String,
        arch: String,
    },
    Linux {
        /// Distribution name, version and codename; empty parts are skipped
        distribution: Vec<String>,
        kernel_release: String,
    },
    Windows {
        major: u32,
        minor: u32,
        build: u32,
        service_pack: Option<String>,
    },
    Other {
        system: String,
        release: String,
    },
}

impl HostOs {
    /// Inspect the running host
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "macos" => HostOs::MacOs {
                version: System::os_version().unwrap_or_default(),
                arch: mac_arch(std::env::consts::ARCH).to_string(),
            },
            "linux" => {
                let codename = fs::read_to_string(OS_RELEASE)
                    .ok()
                    .and_then(|contents| os_release_value(&contents, "VERSION_CODENAME"))
                    .unwrap_or_default();
                HostOs::Linux {
                    distribution: vec![
                        System::name().unwrap_or_default(),
                        System::os_version().unwrap_or_default(),
                        codename,
                    ],
                    kernel_release: System::kernel_version().unwrap_or_default(),
                }
            }
            "windows" => native_windows_version().unwrap_or_else(|| {
                windows_version(
                    &System::os_version().unwrap_or_default(),
                    &System::kernel_version().unwrap_or_default(),
                )
            }),
            os => HostOs::Other {
                system: System::name().unwrap_or_else(|| os.to_string()),
                release: System::kernel_version().unwrap_or_default(),
            },
        }
    }

    /// Platform descriptor for this host
    pub fn tag(&self) -> String {
        match self {
            HostOs::MacOs { version, arch } => format!("OSX_{}_{}", version, arch),
            HostOs::Linux {
                distribution,
                kernel_release,
            } => {
                let ids: Vec<&str> = distribution
                    .iter()
                    .map(String::as_str)
                    .filter(|s| !s.is_empty())
                    .collect();
                format!("Linux_{}_{}", ids.join(":"), kernel_release)
            }
            HostOs::Windows {
                major,
                minor,
                build,
                service_pack,
            } => match service_pack.as_deref().filter(|sp| !sp.is_empty()) {
                Some(sp) => format!("win32_v{}.{}.{} ({})", major, minor, build, sp),
                None => format!("win32_v{}.{}.{}", major, minor, build),
            },
            HostOs::Other { system, release } => format!("{}{}", system, release),
        }
    }
}

/// Describes the build platform, inspecting the host only when a binary
/// distribution asks for it
#[derive(Debug, Clone, Default)]
pub struct PlatformDescriber {
    host: OnceLock<HostOs>,
}

impl PlatformDescriber {
    pub fn new(host: HostOs) -> Self {
        Self {
            host: OnceLock::from(host),
        }
    }

    /// Describer for the running host, detected on first use
    pub fn detect() -> Self {
        Self::default()
    }

    pub fn host(&self) -> &HostOs {
        self.host.get_or_init(HostOs::detect)
    }

    /// The host facts, if they have been supplied or detected already
    pub fn known_host(&self) -> Option<&HostOs> {
        self.host.get()
    }

    /// Platform descriptor for binary distributions, `"n/a"` otherwise
    pub fn describe(&self, mode: DistMode) -> String {
        if !mode.wants_platform() {
            return NOT_AVAILABLE.to_string();
        }
        let tag = self.host().tag();
        tracing::debug!(platform = %tag, "described build platform");
        tag
    }
}

/// macOS reports Apple silicon as `arm64`
fn mac_arch(arch: &str) -> &str {
    match arch {
        "aarch64" => "arm64",
        other => other,
    }
}

/// Read one `KEY=value` entry from os-release text, unquoting the value
fn os_release_value(contents: &str, key: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let (k, v) = line.trim().split_once('=')?;
        if k != key {
            return None;
        }
        Some(v.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
    })
}

/// Windows variant from the parts the OS version API reports
fn windows_host(major: u32, minor: u32, build: u32, service_pack: &str) -> HostOs {
    let service_pack = service_pack.trim();
    HostOs::Windows {
        major,
        minor,
        build,
        service_pack: (!service_pack.is_empty()).then(|| service_pack.to_string()),
    }
}

/// Decode a fixed-size, NUL-padded UTF-16 buffer
fn utf16_until_nul(units: &[u16]) -> String {
    let len = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..len])
}

/// Query `RtlGetVersion`, which reports the real NT version and service pack
/// regardless of the calling executable's compatibility manifest.
#[cfg(windows)]
fn native_windows_version() -> Option<HostOs> {
    use windows::Wdk::System::SystemServices::RtlGetVersion;
    use windows::Win32::System::SystemInformation::OSVERSIONINFOW;

    let mut info = OSVERSIONINFOW {
        dwOSVersionInfoSize: std::mem::size_of::<OSVERSIONINFOW>() as u32,
        ..Default::default()
    };
    // SAFETY: `info` is a writable OSVERSIONINFOW with its size field set
    let status = unsafe { RtlGetVersion(&mut info) };
    if status.is_err() {
        return None;
    }

    Some(windows_host(
        info.dwMajorVersion,
        info.dwMinorVersion,
        info.dwBuildNumber,
        &utf16_until_nul(&info.szCSDVersion),
    ))
}

#[cfg(not(windows))]
fn native_windows_version() -> Option<HostOs> {
    None
}

/// NT version of a pre-Windows 10 release, keyed by its build number
fn legacy_nt_version(build: u32) -> (u32, u32) {
    match build {
        0..=2195 => (5, 0),
        2196..=2600 => (5, 1),
        2601..=3790 => (5, 2),
        3791..=6003 => (6, 0),
        6004..=7601 => (6, 1),
        7602..=9200 => (6, 2),
        9201..=9600 => (6, 3),
        _ => (10, 0),
    }
}

/// Fallback built from sysinfo's `"<major> (<build>)"` version and the build
/// number it reports as the kernel version.
///
/// sysinfo reads `CurrentMajorVersionNumber`, which only exists from
/// Windows 10 on; older hosts report a major of `0`.
fn windows_version(os_version: &str, kernel_version: &str) -> HostOs {
    let numbers: Vec<u32> = os_version
        .split(|c: char| !c.is_ascii_digit())
        .filter_map(|part| part.parse().ok())
        .collect();

    let build = kernel_version
        .trim()
        .parse()
        .ok()
        .or_else(|| numbers.last().copied())
        .unwrap_or(0);

    let (major, minor) = match numbers.first().copied() {
        // The NT version stays 10.0 on Windows 11
        Some(10 | 11) => (10, 0),
        _ => legacy_nt_version(build),
    };

    windows_host(major, minor, build, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(host: HostOs, mode: DistMode) -> String {
        PlatformDescriber::new(host).describe(mode)
    }

    #[test]
    fn test_macos() {
        let host = HostOs::MacOs {
            version: "10.5".to_string(),
            arch: "x86_64".to_string(),
        };
        assert_eq!(describe(host, DistMode::Bdist), "OSX_10.5_x86_64");
    }

    #[test]
    fn test_windows_without_service_pack() {
        let host = HostOs::Windows {
            major: 10,
            minor: 0,
            build: 19041,
            service_pack: None,
        };
        assert_eq!(describe(host, DistMode::Bdist), "win32_v10.0.19041");
    }

    #[test]
    fn test_windows_with_service_pack() {
        let host = HostOs::Windows {
            major: 6,
            minor: 1,
            build: 7601,
            service_pack: Some("Service Pack 1".to_string()),
        };
        assert_eq!(
            describe(host, DistMode::Bdist),
            "win32_v6.1.7601 (Service Pack 1)"
        );
    }

    #[test]
    fn test_windows_empty_service_pack_is_omitted() {
        let host = HostOs::Windows {
            major: 10,
            minor: 0,
            build: 22631,
            service_pack: Some(String::new()),
        };
        assert_eq!(host.tag(), "win32_v10.0.22631");
    }

    #[test]
    fn test_linux_skips_empty_ids() {
        let host = HostOs::Linux {
            distribution: vec![
                "Ubuntu".to_string(),
                "20.04".to_string(),
                String::new(),
            ],
            kernel_release: "5.4.0-42-generic".to_string(),
        };
        assert_eq!(host.tag(), "Linux_Ubuntu:20.04_5.4.0-42-generic");
    }

    #[test]
    fn test_other_has_no_separator() {
        let host = HostOs::Other {
            system: "FreeBSD".to_string(),
            release: "13.2-RELEASE".to_string(),
        };
        assert_eq!(host.tag(), "FreeBSD13.2-RELEASE");
    }

    #[test]
    fn test_non_binary_modes_are_not_available() {
        let hosts = [
            HostOs::MacOs {
                version: "14.2".to_string(),
                arch: "arm64".to_string(),
            },
            HostOs::Windows {
                major: 10,
                minor: 0,
                build: 19041,
                service_pack: None,
            },
            HostOs::detect(),
        ];
        for host in hosts {
            assert_eq!(describe(host.clone(), DistMode::Sdist), NOT_AVAILABLE);
            assert_eq!(describe(host, DistMode::None), NOT_AVAILABLE);
        }
    }

    #[test]
    fn test_detect_never_fails() {
        let tag = PlatformDescriber::detect().describe(DistMode::Bdist);
        assert!(!tag.is_empty());
        assert_ne!(tag, NOT_AVAILABLE);
    }

    #[test]
    fn test_os_release_value() {
        let contents = "NAME=\"Ubuntu\"\nVERSION_ID=\"20.04\"\nVERSION_CODENAME=focal\n";
        assert_eq!(
            os_release_value(contents, "VERSION_CODENAME").as_deref(),
            Some("focal")
        );
        assert_eq!(os_release_value(contents, "NAME").as_deref(), Some("Ubuntu"));
        assert_eq!(os_release_value(contents, "ID_LIKE"), None);
    }

    #[test]
    fn test_windows_version_from_sysinfo_strings() {
        assert_eq!(
            windows_version("10 (19041)", "19041"),
            HostOs::Windows {
                major: 10,
                minor: 0,
                build: 19041,
                service_pack: None
            }
        );
        assert_eq!(windows_version("11 (22631)", "22631").tag(), "win32_v10.0.22631");
        assert_eq!(windows_version("10 (19045)", "").tag(), "win32_v10.0.19045");
    }

    #[test]
    fn test_windows_version_before_windows_10() {
        // No CurrentMajorVersionNumber on Windows 7, so sysinfo says "0"
        assert_eq!(windows_version("0 (7601)", "7601").tag(), "win32_v6.1.7601");
        assert_eq!(windows_version("0 (9600)", "9600").tag(), "win32_v6.3.9600");
        assert_eq!(windows_version("", "2600").tag(), "win32_v5.1.2600");

        assert_eq!(
            windows_host(6, 1, 7601, "Service Pack 1").tag(),
            "win32_v6.1.7601 (Service Pack 1)"
        );
        assert_eq!(windows_host(6, 1, 7600, "").tag(), "win32_v6.1.7600");
    }

    #[test]
    fn test_utf16_until_nul() {
        let mut buffer = [0u16; 128];
        for (slot, unit) in buffer.iter_mut().zip("Service Pack 1".encode_utf16()) {
            *slot = unit;
        }
        assert_eq!(utf16_until_nul(&buffer), "Service Pack 1");
        assert_eq!(utf16_until_nul(&[0u16; 4]), "");
    }

    #[test]
    fn test_host_is_detected_lazily() {
        let describer = PlatformDescriber::detect();
        assert_eq!(describer.describe(DistMode::None), NOT_AVAILABLE);
        assert_eq!(describer.describe(DistMode::Sdist), NOT_AVAILABLE);
        assert!(describer.known_host().is_none());

        describer.describe(DistMode::Bdist);
        assert!(describer.known_host().is_some());
    }

    #[test]
    fn test_mac_arch() {
        assert_eq!(mac_arch("aarch64"), "arm64");
        assert_eq!(mac_arch("x86_64"), "x86_64");
    }
}
