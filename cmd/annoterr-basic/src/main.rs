//! Basic annoterr example
//!
//! Registers a custom error type, creates errors from a nested call and from
//! an `io::Error`, branches on their types and prints them.
//!
//! # Environment Variables
//!
//! - `RUST_LOG=annoterr=debug` - Show type registrations
//! - `ANNOTERR_MAX_FRAMES=8` - Keep at most 8 frames per error
//! - `ANNOTERR_CAPTURE=0` - Skip stack capture

use annoterr::{annotate, match_type, AnnotatedError, ErrorType, ResultExt};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

// RUST_LOG=annoterr=trace ANNOTERR_MAX_FRAMES=8 cargo run -p annoterr-basic
fn main() {
    init_tracing();

    println!("=== annoterr Basic Example ===\n");

    // Register a new error type
    let network_fail = annoterr::register("NetworkFail");

    let err = simulate_network_fail(network_fail);
    println!("{}", err);

    let err = annotate!("File is corrupted", ErrorType::DATA_CORRUPTION, "/disk/a/report");
    println!("{}", err);

    // Compare types and read the payload
    if err.error_type() == ErrorType::DATA_CORRUPTION {
        if let Some(path) = err.context().downcast_ref::<&str>() {
            println!("corrupted file: {}\n", path);
        }
    }

    let err = match read_settings() {
        Ok(_) => return,
        Err(err) => err,
    };
    let action = match_type!(err, {
        ErrorType::NOT_FOUND => "fall back to defaults",
        ErrorType::PERMISSION_DENIED => "ask for elevated access",
        network_fail => "retry later",
        _ => "give up",
    });
    println!("{}=> {}", err, action);

    println!("\nregistered types: {:?}", annoterr::global_registry().names());
}

fn simulate_network_fail(network_fail: ErrorType) -> AnnotatedError {
    annotate!("No network connection", network_fail)
}

// `?` classifies by io::ErrorKind; annotate_with picks the type and keeps the path.
fn read_settings() -> annoterr::Result<String> {
    let path = "/etc/annoterr-basic/settings.toml";
    let meta = std::fs::metadata(path)?;
    if meta.len() == 0 {
        return Err(annotate!("settings file is empty", ErrorType::DATA_CORRUPTION, path));
    }
    std::fs::read_to_string(path).annotate_with(ErrorType::FILE_SYSTEM, path)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true);

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
    {
        eprintln!("failed to init tracing: {}", e);
    }
}
