//! CLI probe for the metadata store.
//!
//! # Responsibility
//! - Provide a minimal executable to inspect a persisted metadata file.
//! - Keep output deterministic for quick local sanity checks.

use benchmeta_core::{default_log_level, init_logging, load_from_path, TagStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    let log_dir = std::env::temp_dir().join("benchmeta-logs");
    if let Err(err) = init_logging(default_log_level(), &log_dir.to_string_lossy()) {
        eprintln!("logging disabled: {err}");
    }

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        println!("benchmeta_core version={}", benchmeta_core::core_version());
        println!("usage: benchmeta <metadata-file>");
        return ExitCode::SUCCESS;
    };

    let store = TagStore::new();
    if let Err(err) = load_from_path(&store, &path) {
        eprintln!("failed to load `{path}`: {err}");
        return ExitCode::FAILURE;
    }

    println!("tags={}", store.len());
    println!("events={}", store.timeline().len());
    println!("max_timepoint={}", store.max_timepoint());
    for vessel_id in store.plate_design().vessel_ids() {
        println!("vessel={vessel_id}");
    }
    ExitCode::SUCCESS
}
