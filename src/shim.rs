use libloading::{Library, Symbol};
use std::sync::OnceLock;

use crate::properties;
use crate::system_target;

/// Contract version the generated bindings were built against. The
/// scaffolding compiled into the library must report the same value.
pub const CONTRACT_VERSION: u32 = 25;

const CONTRACT_VERSION_SYMBOL: &str = "ffi_web5_uniffi_contract_version";

/// Per-operation API checksums baked into the bindings at generation
/// time. A value drift means the library was built from a different
/// interface definition than the caller expects.
pub const API_CHECKSUMS: &[(&str, u16)] = &[
    ("uniffi_web5_checksum_method_jwk_compute_thumbprint", 9735),
    ("uniffi_web5_checksum_constructor_jwk_new", 31971),
];

fn log(message: &str) {
    if properties::debug_enabled() {
        eprintln!("web5-smoke loader: {message}");
    }
}

/// Handle to the loaded library. Holding it keeps the module mapped for
/// the rest of the process lifetime.
#[derive(Debug)]
pub struct NativeLibrary {
    library: Library,
    source: String,
    from_override: bool,
    contract_version: u32,
}

impl NativeLibrary {
    /// What the dynamic loader was actually asked for: the override
    /// value when one was supplied, the detected platform file name
    /// otherwise.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn from_override(&self) -> bool {
        self.from_override
    }

    /// Contract version reported by the scaffolding inside the library.
    pub fn contract_version(&self) -> u32 {
        self.contract_version
    }

    /// Read an API checksum export back through the live handle.
    pub fn checksum(&self, symbol: &str) -> Result<u16, String> {
        api_checksum(&self.library, &self.source, symbol)
    }
}

static INSTANCE: OnceLock<Result<NativeLibrary, String>> = OnceLock::new();

/// Process-wide singleton handle. The first caller pays for the load
/// and verification; every later call returns the same handle. A failed
/// load is cached too, so the probe reports one attributable error no
/// matter how often it asks.
pub fn instance() -> Result<&'static NativeLibrary, String> {
    INSTANCE.get_or_init(load).as_ref().map_err(Clone::clone)
}

/// The override value, when present, is used verbatim; its derivation
/// is owned by whatever supplied it. Returns the source and whether it
/// came from the override key.
pub fn resolve_source(override_path: Option<String>) -> Result<(String, bool), String> {
    if let Some(path) = override_path {
        return Ok((path, true));
    }
    let base = system_target::detect()?;
    Ok((system_target::platform_library_filename(&base), false))
}

fn load() -> Result<NativeLibrary, String> {
    let (source, from_override) = resolve_source(properties::get(properties::LIBRARY_OVERRIDE))?;
    log(&format!("loading shared library {source}"));

    // SAFETY: loading the artifact and calling its exports is the whole
    // point of the probe; the OnceLock serializes initialization.
    let library = unsafe { Library::new(&source) }
        .map_err(|e| format!("failed to load shared library {source}: {e}"))?;

    let contract_version = scaffolding_contract_version(&library, &source)?;
    if contract_version != CONTRACT_VERSION {
        return Err(format!(
            "contract version mismatch in {source}: bindings expect {CONTRACT_VERSION}, library reports {contract_version}"
        ));
    }

    for &(symbol, expected) in API_CHECKSUMS {
        let actual = api_checksum(&library, &source, symbol)?;
        if actual != expected {
            return Err(format!(
                "API checksum mismatch for {symbol} in {source}: expected {expected}, got {actual}"
            ));
        }
    }

    log(&format!("loaded and verified {source}"));
    Ok(NativeLibrary {
        library,
        source,
        from_override,
        contract_version,
    })
}

fn scaffolding_contract_version(library: &Library, source: &str) -> Result<u32, String> {
    // SAFETY: the symbol is a plain nullary export of the scaffolding.
    unsafe {
        let symbol: Symbol<unsafe extern "C" fn() -> u32> = library
            .get(CONTRACT_VERSION_SYMBOL.as_bytes())
            .map_err(|e| format!("failed to resolve {CONTRACT_VERSION_SYMBOL} in {source}: {e}"))?;
        Ok(symbol())
    }
}

fn api_checksum(library: &Library, source: &str, symbol: &str) -> Result<u16, String> {
    // SAFETY: checksum exports are plain nullary functions.
    unsafe {
        let checksum: Symbol<unsafe extern "C" fn() -> u16> = library
            .get(symbol.as_bytes())
            .map_err(|e| format!("failed to resolve {symbol} in {source}: {e}"))?;
        Ok(checksum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_detection() {
        let (source, from_override) =
            resolve_source(Some("/opt/web5/libweb5_custom.so".to_string())).unwrap();
        assert_eq!(source, "/opt/web5/libweb5_custom.so");
        assert!(from_override);
    }

    #[test]
    fn override_value_is_not_rewritten() {
        // Bare loader names pass through untouched as well.
        let (source, _) = resolve_source(Some("web5".to_string())).unwrap();
        assert_eq!(source, "web5");
    }

    // The only test allowed to touch the process-wide singleton and the
    // override property: later calls must observe the cached first
    // attempt, not a fresh load against the updated override.
    #[test]
    fn failed_load_is_cached_and_never_retried() {
        properties::set(
            properties::LIBRARY_OVERRIDE,
            "/nonexistent/libweb5_uniffi_missing.so",
        );
        let first = instance().unwrap_err();
        assert!(first.contains("/nonexistent/libweb5_uniffi_missing.so"), "{first}");

        properties::set(
            properties::LIBRARY_OVERRIDE,
            "/nonexistent/some_other_path.so",
        );
        let second = instance().unwrap_err();
        assert_eq!(first, second);
    }
}
