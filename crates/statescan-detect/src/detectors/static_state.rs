//! Static mutable state: any static field on a reachable class that can
//! hold process-wide mutable state, visible to every request regardless of
//! which instance behind the load balancer handles it.

use indexmap::IndexSet;
use statescan_config::LeafConfig;
use statescan_core::Name;
use statescan_graph::CallGraph;
use statescan_model::{is_cache, is_mutable_collection, is_thread_local, Finding, RiskLevel, StateType};

use crate::Detector;

pub struct StaticStateDetector;

impl Detector for StaticStateDetector {
    fn id(&self) -> &'static str {
        "static-state"
    }

    fn description(&self) -> &'static str {
        "Flags static fields that hold mutable state shared across every request on an instance."
    }

    fn detect(&self, graph: &CallGraph, _leaf_config: &LeafConfig, reachable: &IndexSet<Name>) -> Vec<Finding> {
        let mut findings = Vec::new();

        for class in graph.classes() {
            if !reachable.contains(class.name.as_str()) {
                continue;
            }

            for field in &class.fields {
                if !field.is_static() {
                    continue;
                }
                if class.is_enum_synthetic_or_constant_field(field) {
                    continue;
                }
                if field.is_logger() {
                    continue;
                }
                if !field.is_potentially_mutable() {
                    continue;
                }

                let canonical_type = field.canonical_type();
                let risk = if !field.is_final() {
                    RiskLevel::Critical
                } else if canonical_type.as_deref().is_some_and(is_cache) {
                    RiskLevel::Critical
                } else if canonical_type
                    .as_deref()
                    .is_some_and(|ty| is_mutable_collection(ty) || is_thread_local(ty))
                {
                    RiskLevel::High
                } else {
                    RiskLevel::Medium
                };

                findings.push(Finding {
                    class_name: class.name.clone(),
                    source_line: None,
                    state_type: StateType::StaticState,
                    risk,
                    pattern_label: "static-mutable-field".to_string(),
                    field_name: Some(field.name.clone()),
                    raw_type: canonical_type.map(Name::new),
                    scope_source: None,
                    scope_annotation: None,
                    module_name: None,
                    description: format!(
                        "{} declares static field `{}`, shared by every request served by this instance.",
                        class.name, field.name
                    ),
                    recommendation: "Move this state into a request-scoped value or an external store shared across instances.".to_string(),
                    detector_id: "static-state",
                    source_file: class.source_file.clone(),
                });
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statescan_model::{AccessFlags, ClassNode, FieldNode};

    fn reachable_with(name: &str) -> IndexSet<Name> {
        let mut set = IndexSet::new();
        set.insert(Name::new(name));
        set
    }

    #[test]
    fn non_final_static_field_is_critical() {
        let mut class = ClassNode::new("com.example.Counter");
        class.fields.push(FieldNode::new("count", "I", AccessFlags(0x0008)));
        let graph = CallGraph::build(vec![class]);

        let detector = StaticStateDetector;
        let findings = detector.detect(&graph, &LeafConfig::default(), &reachable_with("com.example.Counter"));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].risk, RiskLevel::Critical);
        assert_eq!(findings[0].detector_id, "static-state");
    }

    #[test]
    fn enum_values_field_is_skipped() {
        let mut class = ClassNode::new("com.example.Color");
        class.is_enum = true;
        class.fields.push(FieldNode::new("$VALUES", "[Lcom/example/Color;", AccessFlags(0x0008 | 0x0010)));
        let graph = CallGraph::build(vec![class]);

        let detector = StaticStateDetector;
        let findings = detector.detect(&graph, &LeafConfig::default(), &reachable_with("com.example.Color"));
        assert!(findings.is_empty());
    }

    #[test]
    fn final_static_cache_is_still_critical() {
        let mut class = ClassNode::new("com.example.Service");
        class.fields.push(FieldNode::new(
            "cache",
            "Lcom/github/benmanes/caffeine/cache/Cache;",
            AccessFlags(0x0008 | 0x0010),
        ));
        let graph = CallGraph::build(vec![class]);

        let detector = StaticStateDetector;
        let findings = detector.detect(&graph, &LeafConfig::default(), &reachable_with("com.example.Service"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].risk, RiskLevel::Critical);
    }
}
