//! Facts about the execution environment shown on the status page.

use serde::Serialize;

use crate::config::SERVER_SOFTWARE;

/// Compiler version captured by the build script
pub const RUNTIME_VERSION: &str = env!("STACK_STATUS_RUSTC_VERSION");

/// Runtime and host details, collected once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbientFacts {
    pub server_software: String,
    pub runtime_version: String,
    pub os_release: String,
}

impl AmbientFacts {
    pub fn collect() -> Self {
        Self {
            server_software: SERVER_SOFTWARE.to_string(),
            runtime_version: RUNTIME_VERSION.to_string(),
            os_release: os_release(),
        }
    }
}

/// Kernel name and release, like `uname -s -r`.
#[cfg(target_os = "linux")]
fn os_release() -> String {
    let read = |path: &str| {
        std::fs::read_to_string(path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    match (
        read("/proc/sys/kernel/ostype"),
        read("/proc/sys/kernel/osrelease"),
    ) {
        (Some(name), Some(release)) => format!("{} {}", name, release),
        (Some(name), None) => name,
        _ => std::env::consts::OS.to_string(),
    }
}

#[cfg(not(target_os = "linux"))]
fn os_release() -> String {
    std::env::consts::OS.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_fills_every_field() {
        let facts = AmbientFacts::collect();
        assert!(facts.server_software.starts_with("stack-status"));
        assert!(!facts.runtime_version.is_empty());
        assert!(!facts.os_release.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_release_names_kernel() {
        assert!(os_release().starts_with("Linux"));
    }
}
