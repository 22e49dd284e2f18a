//! # imgtag CLI
//!
//! Command-line entry point for the image tagger.
//!
//! ## Usage
//! ```bash
//! imgtag --google-key "$KEY" --all -d ~/photos
//! imgtag --dry-run --filter "is-bloat" --delete
//! ```

mod cli;

use imgtag::Result;

fn main() -> Result<()> {
    cli::run()
}
