//! The whole-pipeline entry point: scan a project tree, parse DI bindings,
//! build the call graph, restrict it to the reachable set, run the
//! detectors and the path finder, and aggregate into a `ScanReport`.
//!
//! This crate wires together every core component; it owns no analysis
//! logic of its own beyond the exclusion filtering §6 assigns to the
//! project-exclusion configuration (no other component has a natural seam
//! for dropping specific excluded classes/methods before the graph is
//! built).

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use statescan_config::{LeafConfig, ProjectExclusionConfig};
use statescan_detect::{built_in_detectors, run_detectors};
use statescan_graph::CallGraph;
use statescan_model::{ClassNode, RiskLevel, ScanMeta, ScanReport, StatefulPath};
use statescan_scan::ProjectFilter;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] statescan_scan::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Drops classes matching `exclusion.excludes_class`, and strips out
/// methods/invocations matching `exclusion.excludes_method`, before the
/// rest of the pipeline ever sees them. Applied once, directly on the
/// decoded class list, since none of the scanner, graph, or reachability
/// components have their own exclusion hook.
fn apply_exclusions(classes: Vec<ClassNode>, exclusion: &ProjectExclusionConfig) -> Vec<ClassNode> {
    classes
        .into_iter()
        .filter(|class| !exclusion.excludes_class(class.name.as_str()))
        .map(|mut class| {
            class
                .methods
                .retain(|method| !exclusion.excludes_method(class.name.as_str(), method.name.as_str()));
            class
        })
        .collect()
}

/// Runs the full pipeline and returns the final, filtered `ScanReport`.
///
/// `minimum_risk` and `leaf_config.exclude_regex` are applied by the
/// aggregator as the very last step; every other stage sees the complete
/// reachable graph.
pub fn analyze(
    project_root: &Path,
    dependency_archives: &[PathBuf],
    exclusion: &ProjectExclusionConfig,
    leaf_config: &LeafConfig,
    minimum_risk: RiskLevel,
) -> Result<ScanReport> {
    let start = Instant::now();

    if !project_root.is_dir() {
        tracing::warn!(path = %project_root.display(), "project path resolves to nothing scannable");
        return Ok(ScanReport {
            findings: Vec::new(),
            meta: ScanMeta {
                classes_scanned: 0,
                archives_scanned: 0,
                duration: start_to_now(start),
            },
        });
    }

    if is_empty_leaf_config(leaf_config) {
        tracing::warn!("no leaf-type configuration supplied; proceeding with an empty configuration (no findings)");
    }

    let filter = ProjectFilter::new(
        exclusion.include_packages.clone(),
        exclusion.exclude_packages.clone(),
        exclusion.root_packages.clone(),
    );
    let (classes, counts) = statescan_scan::scan_project(project_root, dependency_archives, &filter)?;
    let classes = apply_exclusions(classes, exclusion);

    let graph = CallGraph::build(classes);
    let reachability = statescan_reach::analyze(&graph);
    let reachable_graph = statescan_reach::filtered_graph(&graph, &reachability);

    let detectors = built_in_detectors();
    let findings = run_detectors(&detectors, &reachable_graph, leaf_config, &reachability.set);

    let meta = ScanMeta {
        classes_scanned: counts.classes_scanned,
        archives_scanned: counts.archives_scanned,
        duration: start_to_now(start),
    };

    Ok(statescan_detect::aggregate(findings, meta, minimum_risk, &leaf_config.exclude_regex))
}

/// Runs the scan-through-reachability stages and hands the result to the
/// path finder, independent of `analyze`: `ScanReport` has no slot for
/// paths, so this is exposed as its own entry point rather than folded in.
pub fn find_stateful_paths(
    project_root: &Path,
    dependency_archives: &[PathBuf],
    exclusion: &ProjectExclusionConfig,
    leaf_config: &LeafConfig,
) -> Result<Vec<StatefulPath>> {
    if !project_root.is_dir() {
        tracing::warn!(path = %project_root.display(), "project path resolves to nothing scannable");
        return Ok(Vec::new());
    }

    if is_empty_leaf_config(leaf_config) {
        tracing::warn!("no leaf-type configuration supplied; proceeding with an empty configuration (no findings)");
    }

    let filter = ProjectFilter::new(
        exclusion.include_packages.clone(),
        exclusion.exclude_packages.clone(),
        exclusion.root_packages.clone(),
    );
    let (classes, _counts) = statescan_scan::scan_project(project_root, dependency_archives, &filter)?;
    let classes = apply_exclusions(classes, exclusion);

    let graph = CallGraph::build(classes);
    let reachability = statescan_reach::analyze(&graph);
    let reachable_graph = statescan_reach::filtered_graph(&graph, &reachability);

    Ok(statescan_path::find_paths(&reachable_graph, &reachability.set, leaf_config))
}

/// True when every leaf category is empty, i.e. no leaf-type configuration
/// was effectively supplied (the CLI's default path: `LeafConfig::default()`).
fn is_empty_leaf_config(leaf_config: &LeafConfig) -> bool {
    leaf_config.external_state.is_empty()
        && leaf_config.service_client.is_empty()
        && leaf_config.cache.is_empty()
        && leaf_config.grpc.is_empty()
        && leaf_config.resilience.is_empty()
        && leaf_config.file_state.is_empty()
        && leaf_config.thread_local.is_empty()
}

fn start_to_now(start: Instant) -> Duration {
    start.elapsed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_project_path_yields_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = analyze(
            dir.path(),
            &[],
            &ProjectExclusionConfig::default(),
            &LeafConfig::default(),
            RiskLevel::Medium,
        )
        .unwrap();

        assert!(report.findings.is_empty());
        assert_eq!(report.meta.classes_scanned, 0);
    }

    #[test]
    fn nonexistent_project_path_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let report = analyze(
            &missing,
            &[],
            &ProjectExclusionConfig::default(),
            &LeafConfig::default(),
            RiskLevel::Medium,
        );
        assert!(report.is_ok());
        assert_eq!(report.unwrap().meta.classes_scanned, 0);
    }

    #[test]
    fn exclusion_config_drops_matching_classes_before_graph_construction() {
        let mut class = ClassNode::new("com.example.internal.Generated");
        class.is_project = true;
        let exclusion = ProjectExclusionConfig {
            exclude_classes: vec!["com.example.internal.".to_string()],
            ..Default::default()
        };
        let filtered = apply_exclusions(vec![class], &exclusion);
        assert!(filtered.is_empty());
    }

    #[test]
    fn default_leaf_config_is_detected_as_empty() {
        assert!(is_empty_leaf_config(&LeafConfig::default()));
    }

    #[test]
    fn leaf_config_with_any_category_populated_is_not_empty() {
        let config = LeafConfig {
            cache: vec!["com.example.Cache".to_string()],
            ..Default::default()
        };
        assert!(!is_empty_leaf_config(&config));
    }
}
