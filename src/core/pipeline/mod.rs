//! # Pipeline Module
//!
//! The scan orchestrator: enumerates files, fans each one out to the
//! enabled detectors under bounded concurrency, merges tags, runs the
//! categorizer, executes filter actions and persists the results.
//!
//! ## Example
//! ```rust,ignore
//! use imgtag::core::pipeline::Pipeline;
//!
//! let pipeline = Pipeline::builder().config(config).build();
//! let outcome = pipeline.run()?;
//! println!("scanned {} images", outcome.results.len());
//! ```

mod executor;

pub use executor::{Pipeline, PipelineBuilder, RunOutcome};
