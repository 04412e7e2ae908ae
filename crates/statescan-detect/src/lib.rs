//! Detector framework: a registry of named detectors, each consuming the
//! reachable call graph plus a leaf-type configuration and producing
//! findings, and the aggregator that turns the combined output into a
//! `ScanReport`.

mod aggregator;
mod detectors;
mod file_ops;

use indexmap::IndexSet;
use statescan_config::LeafConfig;
use statescan_core::Name;
use statescan_graph::CallGraph;
use statescan_model::Finding;

pub use aggregator::aggregate;

/// A single named analysis over the reachable graph. Detectors do not share
/// mutable state; each call to `detect` is self-contained and its findings
/// are independent records.
pub trait Detector: Send + Sync {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn detect(&self, graph: &CallGraph, leaf_config: &LeafConfig, reachable: &IndexSet<Name>) -> Vec<Finding>;
}

/// The nine built-in detectors, in the fixed order findings are collected.
pub fn built_in_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(detectors::static_state::StaticStateDetector),
        Box::new(detectors::singleton::SingletonDetector),
        Box::new(detectors::module_binding::ModuleBindingDetector),
        Box::new(detectors::category::cache_detector()),
        Box::new(detectors::category::thread_local_detector()),
        Box::new(detectors::category::external_state_detector()),
        Box::new(detectors::category::service_client_detector()),
        Box::new(detectors::category::resilience_detector()),
        Box::new(detectors::file_state::FileStateDetector),
    ]
}

/// Runs every detector in `detectors` over the same graph/config/reachable
/// set, in order, concatenating their findings.
pub fn run_detectors(
    detectors: &[Box<dyn Detector>],
    graph: &CallGraph,
    leaf_config: &LeafConfig,
    reachable: &IndexSet<Name>,
) -> Vec<Finding> {
    detectors
        .iter()
        .flat_map(|detector| detector.detect(graph, leaf_config, reachable))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_detectors_cover_all_nine_ids() {
        let ids: Vec<&str> = built_in_detectors().iter().map(|d| d.id()).collect();
        assert_eq!(ids.len(), 9);
        assert!(ids.contains(&"static-state"));
        assert!(ids.contains(&"singleton"));
        assert!(ids.contains(&"module-binding"));
        assert!(ids.contains(&"cache"));
        assert!(ids.contains(&"thread-local"));
        assert!(ids.contains(&"external-state"));
        assert!(ids.contains(&"service-client"));
        assert!(ids.contains(&"resilience"));
        assert!(ids.contains(&"file-state"));
    }
}
