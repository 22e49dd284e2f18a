//! # imgtag
//!
//! Scans folders of images, sends each file to one or more cloud
//! image-recognition APIs, merges the returned tags into a per-image
//! score map, and optionally deletes or moves images whose tags match
//! a filter expression.
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation
//! layers:
//! - `core` - the scan-and-classify pipeline
//! - `events` - event-driven progress reporting (GUI-ready)
//! - `error` - typed error taxonomy

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ImgtagError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI)
/// once the verbose flag is known. `RUST_LOG` overrides the default
/// filter either way.
pub fn init_tracing(verbose: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_log_filter(verbose)));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}

fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "imgtag=debug"
    } else {
        "imgtag=warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_flag_raises_the_default_log_level() {
        assert_eq!(default_log_filter(false), "imgtag=warn");
        assert_eq!(default_log_filter(true), "imgtag=debug");
    }
}
