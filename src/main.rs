mod artifact;
mod properties;
mod report;
mod shim;
mod system_target;

use serde::Serialize;
use std::env;
use std::path::Path;

fn print_usage() {
    eprintln!(
        "\
usage:
  web5-smoke [--json]        load the web5 shared library and confirm
  web5-smoke detect-target   report the library name expected for this host
  web5-smoke help

notes:
  - point the probe at a specific artifact by setting the
    uniffi.component.web5.libraryOverride property in the environment
  - the probe runs at debug verbosity; load diagnostics go to stderr"
    );
}

#[derive(Serialize)]
struct ChecksumEntry {
    symbol: String,
    expected: u16,
    actual: Option<u16>,
}

#[derive(Serialize)]
struct LoadReport {
    source: String,
    origin: String,
    contract_version: u32,
    checksums: Vec<ChecksumEntry>,
    artifact: Option<artifact::ArtifactInfo>,
    artifact_error: Option<String>,
}

#[derive(Serialize)]
struct LoadFailure {
    library_override: Option<String>,
}

#[derive(Serialize)]
struct DetectTargetReport {
    os: String,
    arch: String,
    target: Option<String>,
    library_filename: Option<String>,
}

fn build_load_report(lib: &shim::NativeLibrary) -> LoadReport {
    let mut checksums = Vec::new();
    for &(symbol, expected) in shim::API_CHECKSUMS {
        checksums.push(ChecksumEntry {
            symbol: symbol.to_string(),
            expected,
            actual: lib.checksum(symbol).ok(),
        });
    }

    let path = Path::new(lib.source());
    let (artifact, artifact_error) = if path.is_file() {
        match artifact::inspect(path) {
            Ok(info) => (Some(info), None),
            Err(err) => (None, Some(err)),
        }
    } else {
        // A bare loader name came from the linker search path; there is
        // no file to fingerprint relative to the working directory.
        (None, None)
    };

    LoadReport {
        source: lib.source().to_string(),
        origin: if lib.from_override() {
            "override".to_string()
        } else {
            "detected".to_string()
        },
        contract_version: lib.contract_version(),
        checksums,
        artifact,
        artifact_error,
    }
}

fn run_probe(json: bool) -> ! {
    // Maximum verbosity before the load so its diagnostics are visible.
    properties::set(properties::LOG_LEVEL, "debug");

    match shim::instance() {
        Ok(lib) => {
            if json {
                let data = build_load_report(lib);
                report::print_envelope("load_report", report::JsonResult::ok(), &data);
            } else {
                println!("Successfully loaded shared library for {}", lib.source());
            }
            std::process::exit(0);
        }
        Err(err) => {
            if json {
                let data = LoadFailure {
                    library_override: properties::get(properties::LIBRARY_OVERRIDE),
                };
                report::print_envelope("load_report", report::JsonResult::failed(3, err), &data);
            } else {
                eprintln!("web5-smoke: {err}");
            }
            std::process::exit(3);
        }
    }
}

fn run_detect_target() -> ! {
    match system_target::detect() {
        Ok(target) => {
            let data = DetectTargetReport {
                os: env::consts::OS.to_string(),
                arch: env::consts::ARCH.to_string(),
                library_filename: Some(system_target::platform_library_filename(&target)),
                target: Some(target),
            };
            report::print_envelope("detect_target_report", report::JsonResult::ok(), &data);
            std::process::exit(0);
        }
        Err(err) => {
            let data = DetectTargetReport {
                os: env::consts::OS.to_string(),
                arch: env::consts::ARCH.to_string(),
                target: None,
                library_filename: None,
            };
            report::print_envelope("detect_target_report", report::JsonResult::failed(3, err), &data);
            std::process::exit(3);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => run_probe(false),
        Some("--json") if args.len() == 1 => run_probe(true),
        Some("detect-target") if args.len() == 1 => run_detect_target(),
        Some("help") | Some("-h") | Some("--help") => print_usage(),
        _ => {
            eprintln!("unknown arguments: {}\n", args.join(" "));
            print_usage();
            std::process::exit(2);
        }
    }
}
