//! Filter and action-engine integration tests, driven through dry
//! runs over prepared results files so no detectors are involved.

use assert_fs::prelude::*;
use assert_fs::TempDir;
use imgtag::core::config::Config;
use imgtag::core::filter::{parse_filter, select};
use imgtag::core::pipeline::Pipeline;
use imgtag::core::{store, ImageResult, TagMap};
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn write_image(dir: &TempDir, name: &str) -> PathBuf {
    let child = dir.child(name);
    child.write_binary(b"image bytes").unwrap();
    child.path().to_path_buf()
}

fn result_with_tags(file: &Path, tags: &[(&str, f64)]) -> ImageResult {
    let mut result = ImageResult::new(file.to_path_buf());
    result.tags = tags
        .iter()
        .map(|(name, score)| (name.to_string(), *score))
        .collect::<TagMap>();
    result
}

#[test]
fn bloat_filter_partitions_the_result_set() {
    let results = vec![
        result_with_tags(Path::new("a.jpg"), &[("is-bloat", 1.0)]),
        result_with_tags(Path::new("b.jpg"), &[("cat", 0.9)]),
        result_with_tags(Path::new("c.jpg"), &[("is-bloat", 1.0), ("cat", 0.5)]),
        result_with_tags(Path::new("d.jpg"), &[]),
    ];

    let bloat = select(&results, &parse_filter("is-bloat"));
    let rest = select(&results, &parse_filter("!is-bloat"));

    assert_eq!(bloat.len(), 2);
    assert_eq!(rest.len(), 2);
    assert_eq!(bloat.len() + rest.len(), results.len());
    for image in &bloat {
        assert!(rest.iter().all(|other| other.file != image.file));
    }
}

#[test]
fn dry_run_delete_removes_only_matching_files() {
    let dir = TempDir::new().unwrap();
    let flagged = write_image(&dir, "flagged.jpg");
    let kept = write_image(&dir, "kept.jpg");
    let output = dir.path().join("results.json");

    let results = vec![
        result_with_tags(&flagged, &[("is-porn", 1.0)]),
        result_with_tags(&kept, &[("cat", 0.9)]),
    ];
    store::save(&results, &output).unwrap();

    let config = Config {
        dry_run: true,
        output,
        filter: Some("is-porn".to_string()),
        delete: true,
        ..Config::default()
    };
    let outcome = Pipeline::builder()
        .config(config)
        .detectors(Vec::new())
        .build()
        .run()
        .unwrap();

    assert_eq!(outcome.deleted, 1);
    dir.child("flagged.jpg").assert(predicate::path::missing());
    dir.child("kept.jpg").assert(predicate::path::exists());
    assert!(kept.exists());
}

#[test]
fn deleting_an_already_missing_file_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("results.json");

    let results = vec![result_with_tags(
        Path::new("/nonexistent/gone.jpg"),
        &[("is-bloat", 1.0)],
    )];
    store::save(&results, &output).unwrap();

    let config = Config {
        dry_run: true,
        output,
        filter: Some("is-bloat".to_string()),
        delete: true,
        ..Config::default()
    };
    let outcome = Pipeline::builder()
        .config(config)
        .detectors(Vec::new())
        .build()
        .run()
        .unwrap();

    assert_eq!(outcome.deleted, 0);
    assert!(outcome.errors.is_empty());
}

#[test]
fn dry_run_move_relocates_matching_files() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let flagged = write_image(&source, "albums/2024/flagged.jpg");
    let output = source.path().join("results.json");

    let results = vec![result_with_tags(&flagged, &[("is-bloat", 1.0)])];
    store::save(&results, &output).unwrap();

    let config = Config {
        dry_run: true,
        folders: vec![source.path().to_path_buf()],
        output,
        filter: Some("is-bloat".to_string()),
        move_to: Some(target.path().to_path_buf()),
        ..Config::default()
    };
    let outcome = Pipeline::builder()
        .config(config)
        .detectors(Vec::new())
        .build()
        .run()
        .unwrap();

    assert_eq!(outcome.moved, 1);
    assert!(!flagged.exists());
    target
        .child("albums/2024/flagged.jpg")
        .assert(predicate::path::exists());
}

#[test]
fn score_threshold_clauses_select_precisely() {
    let dir = TempDir::new().unwrap();
    let high = write_image(&dir, "high.jpg");
    let low = write_image(&dir, "low.jpg");
    let output = dir.path().join("results.json");

    let results = vec![
        result_with_tags(&high, &[("explicit-adult", 0.95)]),
        result_with_tags(&low, &[("explicit-adult", 0.51)]),
    ];
    store::save(&results, &output).unwrap();

    let config = Config {
        dry_run: true,
        output,
        filter: Some("explicit-adult>0.89".to_string()),
        delete: true,
        ..Config::default()
    };
    let outcome = Pipeline::builder()
        .config(config)
        .detectors(Vec::new())
        .build()
        .run()
        .unwrap();

    assert_eq!(outcome.deleted, 1);
    assert!(!high.exists());
    assert!(low.exists());
}

#[test]
fn actions_without_filter_fail_before_the_run() {
    let config = Config {
        dry_run: true,
        delete: true,
        ..Config::default()
    };
    let result = Pipeline::builder()
        .config(config)
        .detectors(Vec::new())
        .build()
        .run();

    assert!(result.is_err());
}
