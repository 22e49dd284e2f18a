//! # CLI Module
//!
//! Command-line interface for the image tagger.
//!
//! ## Usage
//! ```bash
//! # Tag unsafe content in the current folder
//! imgtag --google-key "$KEY" --unsafe .
//!
//! # Deep scan two folders with everything enabled
//! imgtag -d --google-key "$KEY" --all ~/photos1 ~/photos2
//!
//! # Move previously flagged images without rescanning
//! imgtag --dry-run --filter "is-porn, is-bloat" --move ~/photos/trash
//! ```

use clap::Parser;
use console::{style, Term};
use imgtag::core::config::{self, Config, Credentials, Features};
use imgtag::core::pipeline::{Pipeline, RunOutcome};
use imgtag::error::Result;
use imgtag::events::{DetectEvent, Event, EventChannel, PipelineEvent, ScanEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;

/// Tag image folders with cloud vision APIs, then act on the results
#[derive(Parser, Debug)]
#[command(name = "imgtag")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folders to scan
    #[arg(value_name = "FOLDERS")]
    folders: Vec<PathBuf>,

    /// Allowed file extensions
    #[arg(short, long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Path of the results JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Limit API calls per provider
    #[arg(short, long)]
    limit: Option<usize>,

    /// How many files are processed in parallel
    #[arg(short, long)]
    parallel: Option<usize>,

    /// Deep scan, include subfolders
    #[arg(short = 'd', long)]
    deep: bool,

    /// Verbose mode with extra logging
    #[arg(short, long)]
    verbose: bool,

    /// Replay the saved results file instead of scanning again
    #[arg(long)]
    dry_run: bool,

    /// Google Vision API key
    #[arg(long, env = "IMGTAG_GOOGLE_KEY")]
    google_key: Option<String>,

    /// Clarifai API key
    #[arg(long, env = "IMGTAG_CLARIFAI_KEY")]
    clarifai_key: Option<String>,

    /// Sightengine API user
    #[arg(long, env = "IMGTAG_SIGHTENGINE_USER")]
    sightengine_user: Option<String>,

    /// Sightengine API secret
    #[arg(long, env = "IMGTAG_SIGHTENGINE_SECRET")]
    sightengine_secret: Option<String>,

    /// Detect objects and things
    #[arg(long)]
    objects: bool,

    /// Detect general labels and tags
    #[arg(long)]
    labels: bool,

    /// Detect landmarks and famous places
    #[arg(long)]
    landmarks: bool,

    /// Detect logos and brands
    #[arg(long)]
    logos: bool,

    /// Detect unsafe and explicit images
    #[arg(long = "unsafe")]
    unsafe_content: bool,

    /// Detect everything (all of the above)
    #[arg(long)]
    all: bool,

    /// Filter selecting images to delete or move after the scan,
    /// e.g. "is-porn, explicit-adult>0.89"
    #[arg(long)]
    filter: Option<String>,

    /// Move selected images to this folder
    #[arg(long = "move", value_name = "FOLDER")]
    move_to: Option<PathBuf>,

    /// Delete selected images
    #[arg(long)]
    delete: bool,
}

impl Cli {
    /// Merge CLI arguments over the optional options file into a
    /// resolved config. CLI wins on every overlapping field.
    fn resolve(self) -> Result<Config> {
        let file = config::load_file_options().map_err(imgtag::ImgtagError::Config)?;
        let defaults = Config::default();

        let features = if self.all || file.all.unwrap_or(false) {
            Features::all()
        } else {
            Features {
                objects: self.objects || file.objects.unwrap_or(false),
                labels: self.labels || file.labels.unwrap_or(false),
                landmarks: self.landmarks || file.landmarks.unwrap_or(false),
                logos: self.logos || file.logos.unwrap_or(false),
                unsafe_content: self.unsafe_content || file.unsafe_content.unwrap_or(false),
            }
        };

        Ok(Config {
            folders: if self.folders.is_empty() {
                file.folders.unwrap_or_default()
            } else {
                self.folders
            },
            extensions: self
                .extensions
                .or(file.extensions)
                .unwrap_or(defaults.extensions),
            recursive: self.deep || file.recursive.unwrap_or(false),
            limit: self.limit.or(file.limit).unwrap_or(defaults.limit),
            parallel: self
                .parallel
                .or(file.parallel)
                .unwrap_or(defaults.parallel),
            features,
            credentials: Credentials {
                google_key: self.google_key.or(file.google_key),
                clarifai_key: self.clarifai_key.or(file.clarifai_key),
                sightengine_user: self.sightengine_user.or(file.sightengine_user),
                sightengine_secret: self.sightengine_secret.or(file.sightengine_secret),
            },
            output: self.output.or(file.output).unwrap_or(defaults.output),
            dry_run: self.dry_run || file.dry_run.unwrap_or(false),
            filter: self.filter.or(file.filter),
            move_to: self.move_to.or(file.move_to),
            delete: self.delete || file.delete.unwrap_or(false),
        })
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    imgtag::init_tracing(verbose);
    let config = cli.resolve()?;

    let term = Term::stderr();
    term.write_line(&format!(
        "{} {}",
        style("imgtag").bold().cyan(),
        style(env!("CARGO_PKG_VERSION")).dim()
    ))
    .ok();

    let pipeline = Pipeline::builder().config(config).build();

    let (sender, receiver) = EventChannel::new();

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    progress_clone.set_message(format!("{phase}"));
                }
                Event::Scan(ScanEvent::Completed { total_images }) => {
                    progress_clone.set_length(total_images as u64);
                }
                Event::Detect(DetectEvent::Progress(p)) => {
                    progress_clone.set_position(p.completed as u64);
                    if verbose {
                        progress_clone.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .to_string(),
                        );
                    }
                }
                Event::Detect(DetectEvent::QuotaReached { provider, limit }) => {
                    progress_clone
                        .println(format!("! {provider} reached the limit of {limit} calls"));
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    progress_clone.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let outcome = pipeline.run_with_events(&sender);

    // Drop the sender so the event thread sees the channel close
    drop(sender);
    event_thread.join().ok();

    let outcome = outcome?;
    print_summary(&term, &outcome);
    Ok(())
}

fn print_summary(term: &Term, outcome: &RunOutcome) {
    term.write_line("").ok();
    term.write_line(&format!("{} Run complete", style("✓").green().bold()))
        .ok();
    term.write_line(&format!(
        "  {} images in {:.1}s",
        style(outcome.results.len()).cyan(),
        outcome.duration_ms as f64 / 1000.0
    ))
    .ok();

    if outcome.moved > 0 {
        term.write_line(&format!("  {} images moved", style(outcome.moved).yellow()))
            .ok();
    }
    if outcome.deleted > 0 {
        term.write_line(&format!(
            "  {} images deleted",
            style(outcome.deleted).red()
        ))
        .ok();
    }
    if !outcome.errors.is_empty() {
        term.write_line(&format!(
            "  {} non-fatal errors (see log)",
            style(outcome.errors.len()).red()
        ))
        .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn argument_definitions_are_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn credential_flags_parse() {
        let cli = Cli::try_parse_from([
            "imgtag",
            "--google-key",
            "k",
            "--sightengine-user",
            "u",
            "--sightengine-secret",
            "s",
            "--labels",
            ".",
        ])
        .unwrap();

        assert_eq!(cli.google_key.as_deref(), Some("k"));
        assert_eq!(cli.sightengine_user.as_deref(), Some("u"));
        assert!(cli.labels);
        assert!(!cli.objects);
    }
}
