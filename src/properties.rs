use std::collections::HashMap;
use std::env;
use std::sync::{OnceLock, RwLock};

/// Verbosity of load diagnostics; the probe sets this to "debug" before
/// touching the loader.
pub const LOG_LEVEL: &str = "WEB5_SDK_LOG_LEVEL";

/// Filesystem path or loader name of the library to load, supplied
/// externally. Read back after the load to report what was resolved.
pub const LIBRARY_OVERRIDE: &str = "uniffi.component.web5.libraryOverride";

static PROPERTIES: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn store() -> &'static RwLock<HashMap<String, String>> {
    PROPERTIES.get_or_init(|| RwLock::new(HashMap::new()))
}

pub fn set(key: &str, value: &str) {
    let mut map = store().write().unwrap_or_else(|e| e.into_inner());
    map.insert(key.to_string(), value.to_string());
}

/// Explicitly set values win; the process environment is the fallback.
pub fn get(key: &str) -> Option<String> {
    {
        let map = store().read().unwrap_or_else(|e| e.into_inner());
        if let Some(value) = map.get(key) {
            return Some(value.clone());
        }
    }
    env::var(key).ok()
}

pub fn debug_enabled() -> bool {
    get(LOG_LEVEL).is_some_and(|level| level.eq_ignore_ascii_case("debug"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_values_read_back() {
        set("web5.smoke.test.key", "value-1");
        assert_eq!(get("web5.smoke.test.key").as_deref(), Some("value-1"));
        set("web5.smoke.test.key", "value-2");
        assert_eq!(get("web5.smoke.test.key").as_deref(), Some("value-2"));
    }

    #[test]
    fn unset_key_without_env_is_none() {
        assert_eq!(get("web5.smoke.test.unset"), None);
    }

    #[test]
    fn log_level_reads_back_as_debug_once_set() {
        set(LOG_LEVEL, "debug");
        assert_eq!(get(LOG_LEVEL).as_deref(), Some("debug"));
        assert!(debug_enabled());
    }

    #[test]
    fn env_fallback_serves_process_environment() {
        // PATH is set in any environment the tests run under.
        let from_env = get("PATH");
        assert_eq!(from_env, env::var("PATH").ok());
    }
}
