//! Category detectors: fields typed as a project-configured leaf category
//! (cache client, thread-local, external state, service client, resilience
//! wrapper), independent of scope or mutability — holding a reference to one
//! of these types is itself the risk, regardless of whether the field could
//! be made final.

use indexmap::IndexSet;
use statescan_config::LeafConfig;
use statescan_core::Name;
use statescan_graph::CallGraph;
use statescan_model::{Finding, RiskLevel, StateType};

use crate::Detector;

/// One category's fixed shape: which `LeafConfig` list to match against,
/// what risk every match carries, and the label/recommendation text.
pub struct CategoryDetector {
    id: &'static str,
    description: &'static str,
    state_type: StateType,
    pattern_label: &'static str,
    recommendation: &'static str,
    risk: RiskLevel,
    members: fn(&LeafConfig) -> &[String],
}

impl Detector for CategoryDetector {
    fn id(&self) -> &'static str {
        self.id
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn detect(&self, graph: &CallGraph, leaf_config: &LeafConfig, reachable: &IndexSet<Name>) -> Vec<Finding> {
        let members = (self.members)(leaf_config);
        if members.is_empty() {
            return Vec::new();
        }

        let mut findings = Vec::new();
        for class in graph.classes() {
            if !reachable.contains(class.name.as_str()) {
                continue;
            }
            for field in &class.fields {
                let Some(canonical_type) = field.canonical_type() else {
                    continue;
                };
                if !members.iter().any(|m| m == &canonical_type) {
                    continue;
                }

                findings.push(Finding {
                    class_name: class.name.clone(),
                    source_line: None,
                    state_type: self.state_type,
                    risk: self.risk,
                    pattern_label: self.pattern_label.to_string(),
                    field_name: Some(field.name.clone()),
                    raw_type: Some(Name::new(canonical_type.clone())),
                    scope_source: None,
                    scope_annotation: None,
                    module_name: None,
                    description: format!(
                        "{} holds a field `{}` of type {}, a configured {} leaf.",
                        class.name, field.name, canonical_type, self.pattern_label
                    ),
                    recommendation: self.recommendation.to_string(),
                    detector_id: self.id,
                    source_file: class.source_file.clone(),
                });
            }
        }
        findings
    }
}

pub fn cache_detector() -> CategoryDetector {
    CategoryDetector {
        id: "cache",
        description: "Flags fields typed as a configured in-process cache client.",
        state_type: StateType::Cache,
        pattern_label: "cache",
        recommendation: "Back this cache with a shared store (Redis, Memcached) or make it per-request.",
        risk: RiskLevel::Critical,
        members: |config| &config.cache,
    }
}

pub fn thread_local_detector() -> CategoryDetector {
    CategoryDetector {
        id: "thread-local",
        description: "Flags fields typed as a configured thread-local holder.",
        state_type: StateType::ThreadLocal,
        pattern_label: "thread-local",
        recommendation: "Thread-local state does not survive a request across worker threads or instances; pass it explicitly instead.",
        risk: RiskLevel::High,
        members: |config| &config.thread_local,
    }
}

pub fn external_state_detector() -> CategoryDetector {
    CategoryDetector {
        id: "external-state",
        description: "Flags fields typed as a configured external-state holder (data sources, connection pools).",
        state_type: StateType::ExternalState,
        pattern_label: "external-state",
        recommendation: "Confirm this resource is safe to share across instances, or scope it per-request.",
        risk: RiskLevel::High,
        members: |config| &config.external_state,
    }
}

pub fn service_client_detector() -> CategoryDetector {
    CategoryDetector {
        id: "service-client",
        description: "Flags fields typed as a configured outbound service or RPC client.",
        state_type: StateType::ServiceClient,
        pattern_label: "service-client",
        recommendation: "Verify this client is stateless and safe to share, or construct it per-request.",
        risk: RiskLevel::High,
        members: |config| &config.service_client,
    }
}

pub fn resilience_detector() -> CategoryDetector {
    CategoryDetector {
        id: "resilience",
        description: "Flags fields typed as a configured resilience wrapper (circuit breaker, rate limiter, bulkhead).",
        state_type: StateType::Resilience,
        pattern_label: "resilience",
        recommendation: "Confirm this wrapper's state is meant to be shared process-wide, not per-instance.",
        risk: RiskLevel::Medium,
        members: |config| &config.resilience,
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
    fn cache_field_is_flagged_critical() {
        let mut class = ClassNode::new("com.example.Service");
        class.fields.push(FieldNode::new(
            "localCache",
            "Lcom/github/benmanes/caffeine/cache/Cache;",
            AccessFlags(0x0002),
        ));
        let graph = CallGraph::build(vec![class]);

        let mut config = LeafConfig::default();
        config.cache.push("com.github.benmanes.caffeine.cache.Cache".to_string());

        let detector = cache_detector();
        let findings = detector.detect(&graph, &config, &reachable_with("com.example.Service"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].risk, RiskLevel::Critical);
        assert_eq!(findings[0].detector_id, "cache");
    }

    #[test]
    fn empty_category_list_yields_no_findings() {
        let mut class = ClassNode::new("com.example.Service");
        class.fields.push(FieldNode::new(
            "client",
            "Lcom/example/SomeClient;",
            AccessFlags(0x0002),
        ));
        let graph = CallGraph::build(vec![class]);

        let detector = service_client_detector();
        let findings = detector.detect(&graph, &LeafConfig::default(), &reachable_with("com.example.Service"));
        assert!(findings.is_empty());
    }
}
