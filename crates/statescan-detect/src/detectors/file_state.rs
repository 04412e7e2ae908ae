//! Local filesystem state: fields typed as a configured file-backed store,
//! plus any reachable method that calls a recognized disk-mutating
//! operation directly. Either shape leaves state on one instance's disk
//! that no other instance behind the load balancer can see.

use indexmap::IndexSet;
use statescan_config::LeafConfig;
use statescan_core::Name;
use statescan_graph::CallGraph;
use statescan_model::{Finding, RiskLevel, StateType};

use crate::file_ops::is_mutating_file_operation;
use crate::Detector;

pub struct FileStateDetector;

impl Detector for FileStateDetector {
    fn id(&self) -> &'static str {
        "file-state"
    }

    fn description(&self) -> &'static str {
        "Flags file-backed fields and direct calls to disk-mutating operations."
    }

    fn detect(&self, graph: &CallGraph, leaf_config: &LeafConfig, reachable: &IndexSet<Name>) -> Vec<Finding> {
        let mut findings = Vec::new();

        for class in graph.classes() {
            if !reachable.contains(class.name.as_str()) {
                continue;
            }

            for field in &class.fields {
                let Some(canonical_type) = field.canonical_type() else {
                    continue;
                };
                if !leaf_config.file_state.iter().any(|m| m == &canonical_type) {
                    continue;
                }
                findings.push(Finding {
                    class_name: class.name.clone(),
                    source_line: None,
                    state_type: StateType::FileState,
                    risk: RiskLevel::High,
                    pattern_label: "file-state".to_string(),
                    field_name: Some(field.name.clone()),
                    raw_type: Some(Name::new(canonical_type.clone())),
                    scope_source: None,
                    scope_annotation: None,
                    module_name: None,
                    description: format!(
                        "{} holds a field `{}` of type {}, a configured file-backed leaf.",
                        class.name, field.name, canonical_type
                    ),
                    recommendation: "Replace this local file store with a shared volume or object store reachable from every instance.".to_string(),
                    detector_id: "file-state",
                    source_file: class.source_file.clone(),
                });
            }

            for method in &class.methods {
                for invocation in &method.invocations {
                    if !is_mutating_file_operation(
                        invocation.target.owner.as_str(),
                        invocation.target.name.as_str(),
                    ) {
                        continue;
                    }
                    findings.push(Finding {
                        class_name: class.name.clone(),
                        source_line: None,
                        state_type: StateType::FileState,
                        risk: RiskLevel::High,
                        pattern_label: "file-mutation".to_string(),
                        field_name: None,
                        raw_type: Some(invocation.target.owner.clone()),
                        scope_source: None,
                        scope_annotation: None,
                        module_name: None,
                        description: format!(
                            "{}#{} calls {}.{}, which writes to local disk.",
                            class.name,
                            method.name,
                            invocation.target.owner,
                            invocation.target.name
                        ),
                        recommendation: "Route this write through a shared volume or object store reachable from every instance.".to_string(),
                        detector_id: "file-state",
                        source_file: class.source_file.clone(),
                    });
                }
            }
        }

        findings
    }
}
