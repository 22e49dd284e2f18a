//! Pipeline execution implementation.

use crate::core::actions::{delete_images, move_images};
use crate::core::categorizer::categorize;
use crate::core::config::Config;
use crate::core::detector::{build_detectors, Detector, QuotaTracker, TryAcquire};
use crate::core::filter::{parse_filter, select};
use crate::core::metadata;
use crate::core::scanner::{FolderScanner, FoundImage, ScanOptions, WalkDirScanner};
use crate::core::{store, ImageResult};
use crate::error::ImgtagError;
use crate::events::{
    null_sender, DetectEvent, DetectProgress, Event, EventSender, PipelineEvent, PipelinePhase,
    PipelineSummary,
};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Instant, SystemTime};
use tracing::{error, info, warn};

/// Result of one pipeline run
#[derive(Debug)]
pub struct RunOutcome {
    /// One record per processed (or replayed) image
    pub results: Vec<ImageResult>,
    /// Images moved by the action engine
    pub moved: usize,
    /// Images deleted by the action engine
    pub deleted: usize,
    /// Non-fatal errors collected outside individual results
    pub errors: Vec<ImgtagError>,
    /// Elapsed wall time
    pub duration_ms: u64,
}

/// Builder for the scanning pipeline
pub struct PipelineBuilder {
    config: Config,
    detectors: Option<Vec<Box<dyn Detector>>>,
    scanner: Option<Box<dyn FolderScanner>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            detectors: None,
            scanner: None,
        }
    }

    /// Use this resolved configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replace the detector set (tests, embedders)
    pub fn detectors(mut self, detectors: Vec<Box<dyn Detector>>) -> Self {
        self.detectors = Some(detectors);
        self
    }

    /// Replace the folder scanner (tests, embedders)
    pub fn scanner(mut self, scanner: Box<dyn FolderScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        let detectors = self
            .detectors
            .unwrap_or_else(|| build_detectors(&self.config));
        let scanner = self.scanner.unwrap_or_else(|| {
            Box::new(WalkDirScanner::new(ScanOptions {
                recursive: self.config.recursive,
                extensions: self.config.normalized_extensions(),
            }))
        });

        Pipeline {
            config: self.config,
            detectors,
            scanner,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The scan-and-classify pipeline
pub struct Pipeline {
    config: Config,
    detectors: Vec<Box<dyn Detector>>,
    scanner: Box<dyn FolderScanner>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<RunOutcome, ImgtagError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting.
    ///
    /// Only configuration validation can fail; everything after the
    /// run starts is logged and collected, never thrown.
    pub fn run_with_events(&self, events: &EventSender) -> Result<RunOutcome, ImgtagError> {
        self.config.validate().map_err(ImgtagError::Config)?;

        let start_time = Instant::now();
        let mut errors: Vec<ImgtagError> = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));

        let results = if self.config.dry_run {
            info!(path = %self.config.output.display(), "Dry run, replaying saved results");
            store::load(&self.config.output)
        } else {
            self.scan_and_detect(events, &mut errors)
        };

        self.finish(results, errors, start_time, events)
    }

    /// Scanning and Detecting phases: enumerate files, then process
    /// them with bounded concurrency.
    fn scan_and_detect(
        &self,
        events: &EventSender,
        errors: &mut Vec<ImgtagError>,
    ) -> Vec<ImageResult> {
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scan_result = self.scanner.scan_with_events(&self.config.folders, events);
        for scan_error in scan_result.errors {
            errors.push(ImgtagError::Scan(scan_error));
        }

        let images = scan_result.images;
        let total = images.len();
        info!(total, "Folder scan complete");

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Detecting,
        }));
        events.send(Event::Detect(DetectEvent::Started {
            total_images: total,
        }));

        let quota = QuotaTracker::new(self.config.limit);
        let completed = AtomicUsize::new(0);

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.parallel)
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                // Fall back to sequential processing rather than abort.
                error!(error = %e, "Could not build worker pool, scanning sequentially");
                let mut results = Vec::with_capacity(total);
                for image in &images {
                    results.push(self.scan_file(image, &quota, events));
                }
                return results;
            }
        };

        let results: Vec<ImageResult> = pool.install(|| {
            images
                .par_iter()
                .map(|image| {
                    let result = self.scan_file(image, &quota, events);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    events.send(Event::Detect(DetectEvent::Progress(DetectProgress {
                        completed: done,
                        total,
                        current_path: image.path.clone(),
                    })));
                    result
                })
                .collect()
        });

        events.send(Event::Detect(DetectEvent::Completed {
            total_images: results.len(),
        }));

        results
    }

    /// Process one file: details, EXIF, detector fan-out, categorizer.
    ///
    /// The task owns its result until it is returned; merges are never
    /// visible half-done to other files.
    fn scan_file(
        &self,
        image: &FoundImage,
        quota: &QuotaTracker,
        events: &EventSender,
    ) -> ImageResult {
        let path = image.path.as_path();
        let mut result = ImageResult::new(image.path.clone());

        result.details.size = image.size;
        result.details.date = image.modified.map(iso_date);

        if metadata::supports_exif(path) {
            metadata::extract_exif(path, &mut result.details);
        }

        // Exhausted providers decline inside run_detectors, warning
        // once at the crossing point; the file is still recorded.
        self.run_detectors(path, &mut result, quota, events);

        let derived = categorize(path, &result.tags, &result.details);
        result.merge_tags(derived);

        result
    }

    /// Invoke every under-quota detector for the file, in parallel,
    /// and merge their tags in detector order (last writer wins).
    fn run_detectors(
        &self,
        path: &Path,
        result: &mut ImageResult,
        quota: &QuotaTracker,
        events: &EventSender,
    ) {
        let detections: Vec<Option<Result<crate::core::TagMap, _>>> = self
            .detectors
            .par_iter()
            .map(|detector| match quota.try_acquire(detector.provider()) {
                TryAcquire::Granted => Some(detector.detect(path)),
                TryAcquire::ExhaustedFirst => {
                    warn!(
                        provider = detector.provider().as_str(),
                        limit = quota.limit(),
                        "API call limit reached, provider disabled for the rest of the run"
                    );
                    events.send(Event::Detect(DetectEvent::QuotaReached {
                        provider: detector.provider().as_str().to_string(),
                        limit: quota.limit(),
                    }));
                    None
                }
                TryAcquire::Exhausted => None,
            })
            .collect();

        for (detector, detection) in self.detectors.iter().zip(detections) {
            match detection {
                Some(Ok(tags)) => {
                    if !tags.is_empty() {
                        events.send(Event::Detect(DetectEvent::Tags {
                            path: path.to_path_buf(),
                            detector: detector.name().to_string(),
                            count: tags.len(),
                        }));
                    }
                    result.merge_tags(tags);
                }
                Some(Err(e)) => {
                    error!(path = %path.display(), detector = detector.name(), error = %e, "Detection failed");
                    events.send(Event::Detect(DetectEvent::Error {
                        path: path.to_path_buf(),
                        detector: detector.name().to_string(),
                        message: e.to_string(),
                    }));
                    result.error.push(format!("{}: {}", detector.name(), e));
                }
                None => {}
            }
        }
    }

    /// Acting and Saving phases plus the closing summary.
    fn finish(
        &self,
        results: Vec<ImageResult>,
        mut errors: Vec<ImgtagError>,
        start_time: Instant,
        events: &EventSender,
    ) -> Result<RunOutcome, ImgtagError> {
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Acting,
        }));
        let (moved, deleted) = self.execute_actions(&results, events, &mut errors);

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Saving,
        }));
        if let Err(e) = store::save(&results, &self.config.output) {
            error!(error = %e, "Could not save results");
            errors.push(ImgtagError::Store(e));
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            images = results.len(),
            seconds = duration_ms as f64 / 1000.0,
            "Run finished"
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_images: results.len(),
                moved,
                deleted,
                duration_ms,
            },
        }));

        Ok(RunOutcome {
            results,
            moved,
            deleted,
            errors,
            duration_ms,
        })
    }

    /// Apply the configured filter and run move or delete on the
    /// selection. Move takes precedence when both are configured.
    fn execute_actions(
        &self,
        results: &[ImageResult],
        events: &EventSender,
        errors: &mut Vec<ImgtagError>,
    ) -> (usize, usize) {
        let Some(filter) = self.config.filter.as_deref() else {
            return (0, 0);
        };
        if self.config.move_to.is_none() && !self.config.delete {
            return (0, 0);
        }

        let clauses = parse_filter(filter);
        let selected = select(results, &clauses);
        info!(selected = selected.len(), filter, "Filter applied");
        events.send(Event::Action(crate::events::ActionEvent::Selected {
            count: selected.len(),
        }));

        if let Some(target) = &self.config.move_to {
            if self.config.delete {
                warn!("Both move and delete configured, move takes precedence");
            }
            let outcome = move_images(&selected, &self.config.folders, target, events);
            errors.extend(outcome.errors.into_iter().map(ImgtagError::Action));
            (outcome.moved, 0)
        } else {
            let outcome = delete_images(&selected, events);
            errors.extend(outcome.errors.into_iter().map(ImgtagError::Action));
            (0, outcome.deleted)
        }
    }
}

fn iso_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
