//! Declared singleton scope with a mutable instance field: any bean-scoped
//! class (`@Singleton`, `@Component`, `@ApplicationScoped`, ...) whose
//! instance fields are free to accumulate request-scoped state across
//! every caller that shares the singleton.

use indexmap::IndexSet;
use statescan_config::LeafConfig;
use statescan_core::Name;
use statescan_graph::CallGraph;
use statescan_model::{is_cache, is_mutable_collection, Finding, RiskLevel, ScopeSource, StateType};

use crate::Detector;

pub struct SingletonDetector;

impl Detector for SingletonDetector {
    fn id(&self) -> &'static str {
        "singleton"
    }

    fn description(&self) -> &'static str {
        "Flags mutable instance fields on classes carrying a recognized singleton-scope annotation."
    }

    fn detect(&self, graph: &CallGraph, leaf_config: &LeafConfig, reachable: &IndexSet<Name>) -> Vec<Finding> {
        let mut findings = Vec::new();

        for class in graph.classes() {
            if !reachable.contains(class.name.as_str()) {
                continue;
            }
            if !statescan_binding::is_bean(class) {
                continue;
            }
            let scope_annotation = statescan_binding::bean_scope_annotation_of(class);

            for field in &class.fields {
                if field.is_static() {
                    continue;
                }
                if !field.is_potentially_mutable() {
                    continue;
                }

                let canonical_type = field.canonical_type();
                let is_cache_or_collection = canonical_type
                    .as_deref()
                    .is_some_and(|ty| is_cache(ty) || is_mutable_collection(ty));
                let is_resilience = canonical_type
                    .as_deref()
                    .is_some_and(|ty| leaf_config.resilience.iter().any(|r| r == ty));

                let risk = if is_cache_or_collection {
                    RiskLevel::Critical
                } else if is_resilience || !field.is_final() {
                    RiskLevel::High
                } else {
                    RiskLevel::Medium
                };

                findings.push(Finding {
                    class_name: class.name.clone(),
                    source_line: None,
                    state_type: StateType::SingletonField,
                    risk,
                    pattern_label: "mutable-singleton-field".to_string(),
                    field_name: Some(field.name.clone()),
                    raw_type: canonical_type.map(Name::new),
                    scope_source: Some(ScopeSource::Annotation),
                    scope_annotation: scope_annotation.clone(),
                    module_name: None,
                    description: format!(
                        "{} is singleton-scoped and declares mutable field `{}`.",
                        class.name, field.name
                    ),
                    recommendation: "Move this field to a distributed cache or request-scoped storage so every instance observes the same state.".to_string(),
                    detector_id: "singleton",
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
    fn singleton_with_mutable_map_is_critical() {
        let mut class = ClassNode::new("com.example.UserCache");
        class.annotations.insert(Name::new("javax.inject.Singleton"));
        class.fields.push(FieldNode::new(
            "users",
            "Ljava/util/HashMap;",
            AccessFlags(0x0010),
        ));
        let graph = CallGraph::build(vec![class]);

        let detector = SingletonDetector;
        let findings = detector.detect(&graph, &LeafConfig::default(), &reachable_with("com.example.UserCache"));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].risk, RiskLevel::Critical);
        assert_eq!(findings[0].scope_annotation.as_ref().unwrap().as_str(), "javax.inject.Singleton");
    }

    #[test]
    fn non_bean_classes_are_ignored() {
        let mut class = ClassNode::new("com.example.Plain");
        class.fields.push(FieldNode::new("state", "I", AccessFlags(0)));
        let graph = CallGraph::build(vec![class]);

        let detector = SingletonDetector;
        let findings = detector.detect(&graph, &LeafConfig::default(), &reachable_with("com.example.Plain"));
        assert!(findings.is_empty());
    }
}
