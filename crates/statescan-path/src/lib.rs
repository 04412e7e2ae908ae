//! Path finder: enumerates root-to-leaf paths from project classes to
//! externally configured leaf types (caches, service clients, thread
//! locals, and the like), tracking method context so a call chain is only
//! ever attributed to the method that actually makes it.

use std::collections::VecDeque;

use indexmap::IndexSet;
use statescan_config::LeafConfig;
use statescan_core::{is_runtime_namespace, Name};
use statescan_graph::CallGraph;
use statescan_model::{BindingKey, ClassNode, EdgeKind, LeafCategory, PathStep, RiskLevel, StatefulPath};

/// The method-context component of the BFS visited key: either class-level
/// (`*`) or locked to one method name.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
enum Ctx {
    Star,
    Method(Name),
}

impl Ctx {
    fn visited_key(&self) -> String {
        match self {
            Ctx::Star => "*".to_string(),
            Ctx::Method(name) => name.as_str().to_string(),
        }
    }
}

/// One candidate hop out of `(class, ctx)`, before DI-binding expansion.
#[derive(Clone, Debug)]
struct PendingEdge {
    target: Name,
    kind: EdgeKind,
    /// What to display as this step's member while the search is still
    /// ongoing: the target method name for invocation-derived edges (so it
    /// doubles as the next context), or the field name for field-derived
    /// edges.
    step_member: Name,
    next_ctx: Ctx,
    /// The member of the *source* class that actually produced this edge.
    /// Used only to relabel the step if it turns out to be the final one in
    /// a path, since a leaf type's own "method name" (the placeholder above)
    /// is rarely meaningful once there is nowhere left to go.
    source_member: Name,
}

#[derive(Clone, Debug)]
struct Frontier {
    class: Name,
    ctx: Ctx,
    path: Vec<PathStep>,
    last_source_member: Option<Name>,
}

/// Enumerates every deduplicated `StatefulPath` from a project-class root to
/// a leaf classified by `leaf_config`, restricted to `reachable`.
pub fn find_paths(graph: &CallGraph, reachable: &IndexSet<Name>, leaf_config: &LeafConfig) -> Vec<StatefulPath> {
    let mut queue: VecDeque<Frontier> = VecDeque::new();
    let mut visited: IndexSet<String> = IndexSet::new();
    let mut signatures: IndexSet<String> = IndexSet::new();
    let mut results: Vec<StatefulPath> = Vec::new();

    for class in graph.classes() {
        if class.is_project && reachable.contains(class.name.as_str()) {
            queue.push_back(Frontier {
                class: class.name.clone(),
                ctx: Ctx::Star,
                path: vec![PathStep::root(class.name.clone())],
                last_source_member: None,
            });
        }
    }

    while let Some(frontier) = queue.pop_front() {
        let visited_key = format!("{}#{}", frontier.class.as_str(), frontier.ctx.visited_key());
        if !visited.insert(visited_key) {
            continue;
        }

        if let Some(category) = classify_leaf(graph, leaf_config, frontier.class.as_str()) {
            let path = terminal_path(&frontier, category);
            if signatures.insert(path.signature()) {
                results.push(path);
            }
            continue;
        }

        if is_runtime_namespace(frontier.class.as_str()) {
            continue;
        }

        let Some(class) = graph.get(frontier.class.as_str()) else {
            continue;
        };

        for edge in expand(graph, class, &frontier.ctx) {
            let mut path = frontier.path.clone();
            path.push(PathStep::hop(edge.target.clone(), edge.step_member.clone(), edge.kind));
            queue.push_back(Frontier {
                class: edge.target,
                ctx: edge.next_ctx,
                path,
                last_source_member: Some(edge.source_member),
            });
        }
    }

    results
}

fn terminal_path(frontier: &Frontier, category: LeafCategory) -> StatefulPath {
    let mut steps = frontier.path.clone();
    if let (Some(last), Some(source_member)) = (steps.last_mut(), frontier.last_source_member.clone()) {
        last.member = Some(source_member);
    }
    StatefulPath {
        root: steps[0].class.clone(),
        steps,
        leaf_type: frontier.class.clone(),
        leaf_category: category,
        risk: fixed_risk(category),
    }
}

/// A class is a leaf if it is directly classified, or if the first matching
/// supertype in its closure is classified.
///
/// Walks `superclass`/`interfaces` directly rather than `CallGraph`'s own
/// supertype index, since leaf types (cache libraries, SDK clients) are
/// themselves almost never present as decoded classes in the graph -- only
/// the *subclass*'s ancestor pointer to them is.
fn classify_leaf(graph: &CallGraph, leaf_config: &LeafConfig, class_name: &str) -> Option<LeafCategory> {
    if let Some(category) = leaf_config.direct_category(class_name) {
        return Some(category);
    }
    supertype_closure(graph, class_name)
        .into_iter()
        .find_map(|supertype| leaf_config.direct_category(supertype.as_str()))
}

fn supertype_closure(graph: &CallGraph, class_name: &str) -> Vec<Name> {
    let mut result = Vec::new();
    let mut seen: IndexSet<Name> = IndexSet::new();
    let mut queue: VecDeque<Name> = VecDeque::new();

    let mut enqueue_ancestors = |name: &str, queue: &mut VecDeque<Name>| {
        if let Some(class) = graph.get(name) {
            if let Some(superclass) = &class.superclass {
                queue.push_back(superclass.clone());
            }
            for interface in &class.interfaces {
                queue.push_back(interface.clone());
            }
        }
    };

    enqueue_ancestors(class_name, &mut queue);
    while let Some(name) = queue.pop_front() {
        if !seen.insert(name.clone()) {
            continue;
        }
        enqueue_ancestors(name.as_str(), &mut queue);
        result.push(name);
    }
    result
}

fn expand(graph: &CallGraph, class: &ClassNode, ctx: &Ctx) -> Vec<PendingEdge> {
    let base = base_edges(class, ctx);
    let mut expanded = base.clone();

    for edge in &base {
        let key = BindingKey::unqualified(edge.target.clone());
        for implementation in graph.implementations(&key) {
            expanded.push(PendingEdge {
                target: implementation.clone(),
                kind: EdgeKind::DiBinding,
                step_member: edge.step_member.clone(),
                next_ctx: edge.next_ctx.clone(),
                source_member: edge.source_member.clone(),
            });
        }
    }

    expanded
}

fn base_edges(class: &ClassNode, ctx: &Ctx) -> Vec<PendingEdge> {
    match ctx {
        Ctx::Star => {
            let mut edges = Vec::new();
            for field in &class.fields {
                if let Some(declared_type) = field.canonical_type() {
                    edges.push(PendingEdge {
                        target: Name::new(declared_type),
                        kind: EdgeKind::Field,
                        step_member: field.name.clone(),
                        next_ctx: Ctx::Star,
                        source_member: field.name.clone(),
                    });
                }
            }
            for method in &class.methods {
                for invocation in &method.invocations {
                    edges.push(PendingEdge {
                        target: invocation.target.owner.clone(),
                        kind: EdgeKind::Invocation,
                        step_member: invocation.target.name.clone(),
                        next_ctx: Ctx::Method(invocation.target.name.clone()),
                        source_member: method.name.clone(),
                    });
                }
            }
            edges
        }
        Ctx::Method(name) => {
            if let Some(method) = class.method_named(name.as_str()) {
                let mut edges = Vec::new();
                for invocation in &method.invocations {
                    edges.push(PendingEdge {
                        target: invocation.target.owner.clone(),
                        kind: EdgeKind::Invocation,
                        step_member: invocation.target.name.clone(),
                        next_ctx: Ctx::Method(invocation.target.name.clone()),
                        source_member: method.name.clone(),
                    });
                }
                for access in &method.field_accesses {
                    if let Some(declared_type) = statescan_core::canonical(access.target.descriptor.as_str()) {
                        edges.push(PendingEdge {
                            target: Name::new(declared_type),
                            kind: EdgeKind::Field,
                            step_member: access.target.name.clone(),
                            next_ctx: Ctx::Star,
                            source_member: access.target.name.clone(),
                        });
                    }
                }
                edges
            } else if let Some(superclass) = &class.superclass {
                vec![PendingEdge {
                    target: superclass.clone(),
                    kind: EdgeKind::Invocation,
                    step_member: name.clone(),
                    next_ctx: Ctx::Method(name.clone()),
                    source_member: name.clone(),
                }]
            } else {
                Vec::new()
            }
        }
    }
}

/// Fixed risk assigned to a path terminating in `category`, mirroring the
/// same category-to-severity mapping the category detectors use.
fn fixed_risk(category: LeafCategory) -> RiskLevel {
    match category {
        LeafCategory::Cache => RiskLevel::Critical,
        LeafCategory::ExternalState
        | LeafCategory::ServiceClient
        | LeafCategory::Grpc
        | LeafCategory::FileState
        | LeafCategory::ThreadLocal => RiskLevel::High,
        LeafCategory::Resilience => RiskLevel::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statescan_model::{AccessFlags, FieldNode, Invocation, InvokeKind, MethodNode, MethodRef};

    #[test]
    fn finds_field_path_to_directly_classified_leaf() {
        let mut service = ClassNode::new("com.example.Service");
        service.is_project = true;
        service.fields.push(FieldNode::new(
            "cache",
            "Lcom/github/benmanes/caffeine/cache/Cache;",
            AccessFlags(0),
        ));

        let graph = CallGraph::build(vec![service]);
        let mut reachable = IndexSet::new();
        reachable.insert(Name::new("com.example.Service"));

        let mut leaf_config = LeafConfig::default();
        leaf_config.cache.push("com.github.benmanes.caffeine.cache.Cache".to_string());

        let paths = find_paths(&graph, &reachable, &leaf_config);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].leaf_category, LeafCategory::Cache);
        assert_eq!(paths[0].risk, RiskLevel::Critical);
        assert_eq!(paths[0].steps.last().unwrap().member.as_ref().unwrap().as_str(), "cache");
    }

    #[test]
    fn locks_path_to_the_specific_invoking_method() {
        let mut service = ClassNode::new("com.example.Service");
        service.is_project = true;
        let mut save = MethodNode::new("save", "()V", AccessFlags(0));
        save.invocations.push(Invocation {
            target: MethodRef::new("com.example.Repository", "insert", "()V"),
            kind: InvokeKind::Virtual,
            receiver: None,
            arguments: Vec::new(),
            bytecode_offset: 0,
        });
        let delete = MethodNode::new("delete", "()V", AccessFlags(0));
        service.methods.push(save);
        service.methods.push(delete);

        let mut repository = ClassNode::new("com.example.Repository");
        repository.fields.push(FieldNode::new(
            "dataSource",
            "Ljavax/sql/DataSource;",
            AccessFlags(0),
        ));
        let mut insert = MethodNode::new("insert", "()V", AccessFlags(0));
        insert.field_accesses.push(statescan_model::FieldAccess {
            target: statescan_model::FieldRef::new(
                "com.example.Repository",
                "dataSource",
                "Ljavax/sql/DataSource;",
            ),
            receiver: Some(statescan_model::StackTag::This),
            is_write: false,
        });
        repository.methods.push(insert);

        let graph = CallGraph::build(vec![service, repository]);
        let mut reachable = IndexSet::new();
        reachable.insert(Name::new("com.example.Service"));
        reachable.insert(Name::new("com.example.Repository"));

        let mut leaf_config = LeafConfig::default();
        leaf_config.external_state.push("javax.sql.DataSource".to_string());

        let paths = find_paths(&graph, &reachable, &leaf_config);
        assert_eq!(paths.len(), 1);
        let path = &paths[0];
        assert_eq!(path.root.as_str(), "com.example.Service");
        // Only save() invokes anything, so the path reaches Repository
        // via its insert() method -- delete() never contributes an edge.
        assert_eq!(path.steps[1].member.as_ref().unwrap().as_str(), "insert");
        assert_eq!(path.steps.last().unwrap().member.as_ref().unwrap().as_str(), "dataSource");
    }

    #[test]
    fn leaf_classification_falls_back_to_supertype_closure() {
        let mut service = ClassNode::new("com.example.Service");
        service.is_project = true;
        service.fields.push(FieldNode::new(
            "client",
            "Lcom/example/CustomS3Client;",
            AccessFlags(0),
        ));

        let mut custom_client = ClassNode::new("com.example.CustomS3Client");
        custom_client.superclass = Some(Name::new("software.amazon.awssdk.services.s3.S3Client"));

        let graph = CallGraph::build(vec![service, custom_client]);
        let mut reachable = IndexSet::new();
        reachable.insert(Name::new("com.example.Service"));
        reachable.insert(Name::new("com.example.CustomS3Client"));

        let mut leaf_config = LeafConfig::default();
        leaf_config
            .service_client
            .push("software.amazon.awssdk.services.s3.S3Client".to_string());

        let paths = find_paths(&graph, &reachable, &leaf_config);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].leaf_category, LeafCategory::ServiceClient);
    }
}
