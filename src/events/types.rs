//! Event types emitted by the scanning pipeline.

use std::path::PathBuf;

/// Top-level event wrapper
#[derive(Debug, Clone)]
pub enum Event {
    Scan(ScanEvent),
    Detect(DetectEvent),
    Action(ActionEvent),
    Pipeline(PipelineEvent),
}

/// Folder enumeration events
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Enumeration of the configured folders began
    Started { folders: Vec<PathBuf> },
    /// A candidate image file was discovered
    ImageFound { path: PathBuf },
    /// Enumeration finished
    Completed { total_images: usize },
    /// A folder or entry could not be read (non-fatal)
    Error { path: PathBuf, message: String },
}

/// Per-file detection progress
#[derive(Debug, Clone)]
pub struct DetectProgress {
    /// Files fully processed so far
    pub completed: usize,
    /// Total files queued
    pub total: usize,
    /// File just finished
    pub current_path: PathBuf,
}

/// Provider detection events
#[derive(Debug, Clone)]
pub enum DetectEvent {
    /// Detection started over the discovered files
    Started { total_images: usize },
    /// One file finished processing
    Progress(DetectProgress),
    /// A provider returned tags for a file
    Tags {
        path: PathBuf,
        detector: String,
        count: usize,
    },
    /// A provider hit its per-run call limit
    QuotaReached { provider: String, limit: usize },
    /// A provider failed for one file (non-fatal)
    Error {
        path: PathBuf,
        detector: String,
        message: String,
    },
    /// Detection finished
    Completed { total_images: usize },
}

/// Move/delete action events
#[derive(Debug, Clone)]
pub enum ActionEvent {
    /// Filter selected this many images for the action
    Selected { count: usize },
    /// A file was moved
    Moved { from: PathBuf, to: PathBuf },
    /// A file was deleted
    Deleted { path: PathBuf },
    /// An action failed for one file (non-fatal)
    Error { path: PathBuf, message: String },
}

/// Pipeline phase for UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Scanning,
    Detecting,
    Acting,
    Saving,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning folders"),
            PipelinePhase::Detecting => write!(f, "Detecting tags"),
            PipelinePhase::Acting => write!(f, "Executing actions"),
            PipelinePhase::Saving => write!(f, "Saving results"),
        }
    }
}

/// Summary reported when a run completes
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Images recorded in the results
    pub total_images: usize,
    /// Images moved by the action engine
    pub moved: usize,
    /// Images deleted by the action engine
    pub deleted: usize,
    /// Elapsed wall time
    pub duration_ms: u64,
}

/// Whole-run lifecycle events
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Started,
    PhaseChanged { phase: PipelinePhase },
    Completed { summary: PipelineSummary },
}
