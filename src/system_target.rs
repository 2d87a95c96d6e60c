use std::env;
use std::path::Path;

use crate::properties;

const OS_RELEASE_PATH: &str = "/etc/os-release";

fn log(message: &str) {
    if properties::debug_enabled() {
        eprintln!("web5-smoke target: {message}");
    }
}

/// Basename of the prebuilt library expected for the current host.
pub fn detect() -> Result<String, String> {
    let os = env::consts::OS;
    let arch = env::consts::ARCH;
    log(&format!("system architecture: {arch}"));
    log(&format!("operating system name: {os}"));

    let os_release = if os == "linux" {
        let content = std::fs::read_to_string(Path::new(OS_RELEASE_PATH)).ok();
        if let Some(content) = &content {
            log(&format!("os release content: {}", content.trim_end()));
        }
        content
    } else {
        None
    };

    detect_from(os, arch, os_release.as_deref())
}

/// Pure mapping from host facts to the library basename. Linux needs the
/// os-release content to tell glibc hosts from musl hosts.
pub fn detect_from(os: &str, arch: &str, os_release: Option<&str>) -> Result<String, String> {
    match (os, arch) {
        ("macos", "aarch64") => Ok("web5_uniffi_aarch64_apple_darwin".to_string()),
        ("macos", "x86_64") => Ok("web5_uniffi_x86_64_apple_darwin".to_string()),
        ("linux", "x86_64") => {
            let content = os_release
                .ok_or_else(|| format!("linux {OS_RELEASE_PATH} not found"))?
                .to_ascii_lowercase();
            if content.contains("ubuntu") {
                Ok("web5_uniffi_x86_64_unknown_linux_gnu".to_string())
            } else if content.contains("alpine") {
                Ok("web5_uniffi_x86_64_unknown_linux_musl".to_string())
            } else {
                Err(format!("unsupported linux distribution in {OS_RELEASE_PATH}"))
            }
        }
        _ => Err(format!("unsupported platform: {os} {arch}")),
    }
}

/// Platform file name the dynamic loader is asked for when no override
/// is supplied.
pub fn platform_library_filename(base: &str) -> String {
    format!(
        "{}{base}.{}",
        env::consts::DLL_PREFIX,
        env::consts::DLL_EXTENSION
    )
}
