//! Breadth-first reachability closure over the call graph, starting from
//! every project class.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use statescan_binding::qualifier_of;
use statescan_core::is_runtime_namespace;
use statescan_graph::CallGraph;
use statescan_core::Name;
use statescan_model::BindingKey;

/// Why a class first entered the reachable set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReachReason {
    Root,
    Extends,
    Implements,
    MethodCall,
    FieldType,
    Annotation,
    DiBinding,
}

/// The reason a class became reachable and the first predecessor that
/// pulled it in. Ties (multiple edges into the same class) are broken by
/// first-reached order: only the edge discovered first during the BFS is
/// recorded.
#[derive(Clone, Debug)]
pub struct Reached {
    pub reason: ReachReason,
    pub predecessor: Option<Name>,
}

/// The result of a reachability pass: the raw reachable set, and an
/// annotated map recording why and from where each class was first reached.
#[derive(Clone, Debug, Default)]
pub struct Reachability {
    pub set: IndexSet<Name>,
    pub annotated: IndexMap<Name, Reached>,
}

/// Runs the BFS closure from every `is_project` class in `graph`.
pub fn analyze(graph: &CallGraph) -> Reachability {
    let mut result = Reachability::default();
    let mut queue: VecDeque<Name> = VecDeque::new();

    for class in graph.classes() {
        if class.is_project && result.set.insert(class.name.clone()) {
            result.annotated.insert(
                class.name.clone(),
                Reached {
                    reason: ReachReason::Root,
                    predecessor: None,
                },
            );
            queue.push_back(class.name.clone());
        }
    }

    while let Some(name) = queue.pop_front() {
        let Some(class) = graph.get(name.as_str()) else { continue };

        let mut candidates: Vec<(Name, ReachReason)> = Vec::new();

        if let Some(superclass) = &class.superclass {
            candidates.push((superclass.clone(), ReachReason::Extends));
        }
        for interface in &class.interfaces {
            candidates.push((interface.clone(), ReachReason::Implements));
        }

        for method in &class.methods {
            for invocation in &method.invocations {
                candidates.push((invocation.target.owner.clone(), ReachReason::MethodCall));
            }
            for access in &method.field_accesses {
                candidates.push((access.target.owner.clone(), ReachReason::FieldType));
                if let Some(declared_type) = statescan_core::canonical(access.target.descriptor.as_str()) {
                    candidates.push((Name::new(declared_type), ReachReason::FieldType));
                }
            }
        }

        for field in &class.fields {
            if let Some(declared_type) = field.canonical_type() {
                let type_name = Name::new(declared_type.clone());
                candidates.push((type_name.clone(), ReachReason::FieldType));

                if statescan_binding::is_injection_point(&field.annotations) {
                    let key = match qualifier_of(&field.annotations) {
                        Some(qualifier) => BindingKey::qualified(declared_type, qualifier),
                        None => BindingKey::unqualified(declared_type),
                    };
                    for implementation in graph.implementations(&key) {
                        candidates.push((implementation.clone(), ReachReason::DiBinding));
                    }
                }
            }
        }

        for annotation in &class.annotations {
            candidates.push((annotation.clone(), ReachReason::Annotation));
        }

        let key = BindingKey::unqualified(class.name.clone());
        for implementation in graph.implementations(&key) {
            candidates.push((implementation.clone(), ReachReason::DiBinding));
        }

        for (candidate, reason) in candidates {
            if is_runtime_namespace(candidate.as_str()) {
                continue;
            }
            if graph.get(candidate.as_str()).is_none() {
                continue;
            }
            if result.set.insert(candidate.clone()) {
                result.annotated.insert(
                    candidate.clone(),
                    Reached {
                        reason,
                        predecessor: Some(name.clone()),
                    },
                );
                queue.push_back(candidate);
            }
        }
    }

    result
}

/// The raw reachable set restricted into its own `CallGraph`.
pub fn filtered_graph(graph: &CallGraph, reachability: &Reachability) -> CallGraph {
    graph.filter_to(&reachability.set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_superclass_and_interfaces_but_not_runtime_namespace() {
        let mut root = statescan_model::ClassNode::new("com.example.Service");
        root.is_project = true;
        root.superclass = Some(Name::new("java.lang.Object"));
        root.interfaces.insert(Name::new("com.example.Repository"));

        let mut object = statescan_model::ClassNode::new("java.lang.Object");
        object.is_project = false;

        let mut repo = statescan_model::ClassNode::new("com.example.Repository");
        repo.is_interface = true;

        let graph = CallGraph::build(vec![root, object, repo]);
        let reachability = analyze(&graph);

        assert!(reachability.set.contains("com.example.Service"));
        assert!(reachability.set.contains("com.example.Repository"));
        assert!(!reachability.set.contains("java.lang.Object"));
    }

    #[test]
    fn follows_injection_point_to_di_bound_implementation() {
        use statescan_model::AccessFlags;

        let mut root = statescan_model::ClassNode::new("com.example.Service");
        root.is_project = true;
        let mut field = statescan_model::FieldNode::new(
            "repository",
            "Lcom/example/Repository;",
            AccessFlags(0),
        );
        field.annotations.insert(Name::new("javax.inject.Inject"));
        root.fields.push(field);

        let mut repo_impl = statescan_model::ClassNode::new("com.example.JdbcRepository");
        repo_impl.interfaces.insert(Name::new("com.example.Repository"));
        repo_impl.annotations.insert(Name::new("javax.inject.Singleton"));

        let graph = CallGraph::build(vec![root, repo_impl]);
        let reachability = analyze(&graph);

        assert!(reachability.set.contains("com.example.JdbcRepository"));
        let reached = reachability.annotated.get("com.example.JdbcRepository").unwrap();
        assert!(matches!(reached.reason, ReachReason::DiBinding));
    }
}
