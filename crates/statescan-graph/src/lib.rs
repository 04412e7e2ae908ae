//! The whole-program call graph: an immutable index over every decoded
//! class, giving subtype/supertype queries, a caller index, and the
//! DI-binding map in one place.

use indexmap::{IndexMap, IndexSet};
use statescan_binding::{parse_bindings, BindingMap, ClassTable, ModuleOrigins};
use statescan_core::Name;
use statescan_model::{BindingKey, ClassNode, MethodRef};

/// Immutable whole-program index, built once from a decoded class set and
/// never mutated afterwards. `filter_to` produces a new, smaller graph
/// sharing the same `ClassNode` storage rather than mutating this one.
#[derive(Clone, Debug)]
pub struct CallGraph {
    classes: IndexMap<Name, ClassNode>,
    subtypes: IndexMap<Name, IndexSet<Name>>,
    supertypes: IndexMap<Name, IndexSet<Name>>,
    callers: IndexMap<MethodRef, IndexSet<MethodRef>>,
    bindings: BindingMap,
    module_origins: ModuleOrigins,
}

impl CallGraph {
    /// Builds the graph from every decoded class, parsing DI bindings as
    /// part of construction.
    pub fn build(classes: Vec<ClassNode>) -> Self {
        let table: ClassTable = classes
            .into_iter()
            .map(|class| (class.name.clone(), class))
            .collect();
        let (bindings, module_origins) = parse_bindings(&table);
        Self::build_with_bindings(table, bindings, module_origins)
    }

    fn build_with_bindings(classes: ClassTable, bindings: BindingMap, module_origins: ModuleOrigins) -> Self {
        let mut subtypes: IndexMap<Name, IndexSet<Name>> = IndexMap::new();
        let mut callers: IndexMap<MethodRef, IndexSet<MethodRef>> = IndexMap::new();

        for class in classes.values() {
            for parent in ancestor_edges(class) {
                if classes.contains_key(&parent) {
                    subtypes.entry(parent).or_default().insert(class.name.clone());
                }
            }

            for method in &class.methods {
                let caller = MethodRef::new(class.name.clone(), method.name.clone(), method.descriptor.clone());
                for invocation in &method.invocations {
                    callers
                        .entry(invocation.target.clone())
                        .or_default()
                        .insert(caller.clone());
                }
            }
        }

        let mut supertypes: IndexMap<Name, IndexSet<Name>> = IndexMap::new();
        for name in classes.keys() {
            compute_supertypes(name, &classes, &mut supertypes);
        }

        Self {
            classes,
            subtypes,
            supertypes,
            callers,
            bindings,
            module_origins,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ClassNode> {
        self.classes.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassNode> {
        self.classes.values()
    }

    pub fn direct_subtypes(&self, name: &str) -> impl Iterator<Item = &Name> {
        self.subtypes.get(name).into_iter().flatten()
    }

    /// All (transitive) subtypes of `name`, computed on demand by DFS over
    /// the direct-subtype index.
    pub fn all_subtypes(&self, name: &str) -> IndexSet<Name> {
        let mut seen = IndexSet::new();
        let mut stack: Vec<&str> = vec![name];
        while let Some(current) = stack.pop() {
            if let Some(children) = self.subtypes.get(current) {
                for child in children {
                    if seen.insert(child.clone()) {
                        stack.push(child.as_str());
                    }
                }
            }
        }
        seen
    }

    pub fn all_supertypes(&self, name: &str) -> impl Iterator<Item = &Name> {
        self.supertypes.get(name).into_iter().flatten()
    }

    pub fn is_subtype_of(&self, child: &str, parent: &str) -> bool {
        self.supertypes
            .get(child)
            .is_some_and(|ancestors| ancestors.contains(parent))
    }

    pub fn callers_of(&self, method: &MethodRef) -> impl Iterator<Item = &MethodRef> {
        self.callers.get(method).into_iter().flatten()
    }

    pub fn implementations(&self, key: &BindingKey) -> impl Iterator<Item = &Name> {
        self.bindings.get(key).into_iter().flatten()
    }

    pub fn bindings(&self) -> &BindingMap {
        &self.bindings
    }

    /// The declarative module that bound `implementation`, if any. `None`
    /// for classes bound purely through bean discovery, which has no module
    /// to attribute.
    pub fn module_of(&self, implementation: &str) -> Option<&Name> {
        self.module_origins.get(implementation)
    }

    /// Restricts this graph to `set`, including restricting the caller
    /// index's edges to intra-set edges (both the invoked method's owner and
    /// the calling method's owner must be in `set`).
    pub fn filter_to(&self, set: &IndexSet<Name>) -> CallGraph {
        let classes: ClassTable = self
            .classes
            .iter()
            .filter(|(name, _)| set.contains(name.as_str()))
            .map(|(name, class)| (name.clone(), class.clone()))
            .collect();

        let subtypes = filter_edge_map(&self.subtypes, set);
        let supertypes = filter_edge_map(&self.supertypes, set);

        let callers = self
            .callers
            .iter()
            .filter(|(target, _)| set.contains(target.owner.as_str()))
            .filter_map(|(target, callers)| {
                let filtered: IndexSet<MethodRef> = callers
                    .iter()
                    .filter(|caller| set.contains(caller.owner.as_str()))
                    .cloned()
                    .collect();
                (!filtered.is_empty()).then(|| (target.clone(), filtered))
            })
            .collect();

        let bindings = self
            .bindings
            .iter()
            .filter_map(|(key, impls)| {
                let filtered: IndexSet<Name> = impls
                    .iter()
                    .filter(|name| set.contains(name.as_str()))
                    .cloned()
                    .collect();
                (!filtered.is_empty()).then(|| (key.clone(), filtered))
            })
            .collect();

        let module_origins = self
            .module_origins
            .iter()
            .filter(|(implementation, _)| set.contains(implementation.as_str()))
            .map(|(implementation, module)| (implementation.clone(), module.clone()))
            .collect();

        CallGraph {
            classes,
            subtypes,
            supertypes,
            callers,
            bindings,
            module_origins,
        }
    }
}

fn filter_edge_map(map: &IndexMap<Name, IndexSet<Name>>, set: &IndexSet<Name>) -> IndexMap<Name, IndexSet<Name>> {
    map.iter()
        .filter(|(key, _)| set.contains(key.as_str()))
        .filter_map(|(key, values)| {
            let filtered: IndexSet<Name> = values.iter().filter(|v| set.contains(v.as_str())).cloned().collect();
            (!filtered.is_empty()).then(|| (key.clone(), filtered))
        })
        .collect()
}

fn ancestor_edges(class: &ClassNode) -> Vec<Name> {
    let mut edges = Vec::with_capacity(class.interfaces.len() + 1);
    if let Some(superclass) = &class.superclass {
        edges.push(superclass.clone());
    }
    edges.extend(class.interfaces.iter().cloned());
    edges
}

/// Computes (and memoizes into `supertypes`) the transitive ancestor closure
/// of `name`. Every class has at most one superclass edge and a finite
/// interface list, so this terminates; memoization keeps the total cost
/// linear in the edge count across the whole graph.
fn compute_supertypes(name: &Name, classes: &ClassTable, supertypes: &mut IndexMap<Name, IndexSet<Name>>) -> IndexSet<Name> {
    if let Some(existing) = supertypes.get(name) {
        return existing.clone();
    }
    // Insert an empty placeholder first so a cyclic ancestry (malformed
    // input) can't recurse forever.
    supertypes.insert(name.clone(), IndexSet::new());

    let mut result = IndexSet::new();
    if let Some(class) = classes.get(name) {
        for parent in ancestor_edges(class) {
            if !classes.contains_key(&parent) {
                continue;
            }
            result.insert(parent.clone());
            for ancestor in compute_supertypes(&parent, classes, supertypes) {
                result.insert(ancestor);
            }
        }
    }

    supertypes.insert(name.clone(), result.clone());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtype_and_supertype_indexes_are_consistent() {
        let mut base = ClassNode::new("com.example.Base");
        base.is_abstract = true;
        let mut mid = ClassNode::new("com.example.Mid");
        mid.superclass = Some(Name::new("com.example.Base"));
        let mut leaf = ClassNode::new("com.example.Leaf");
        leaf.superclass = Some(Name::new("com.example.Mid"));

        let graph = CallGraph::build(vec![base, mid, leaf]);

        assert!(graph.is_subtype_of("com.example.Leaf", "com.example.Base"));
        assert!(graph.direct_subtypes("com.example.Base").any(|n| n.as_str() == "com.example.Mid"));
        assert!(graph.all_subtypes("com.example.Base").contains("com.example.Leaf"));
    }

    #[test]
    fn caller_index_tracks_invocation_targets() {
        use statescan_model::{AccessFlags, Invocation, InvokeKind, MethodNode};

        let mut caller_class = ClassNode::new("com.example.Caller");
        let mut call_method = MethodNode::new("run", "()V", AccessFlags(0));
        let target = MethodRef::new("com.example.Callee", "work", "()V");
        call_method.invocations.push(Invocation {
            target: target.clone(),
            kind: InvokeKind::Virtual,
            receiver: None,
            arguments: Vec::new(),
            bytecode_offset: 0,
        });
        caller_class.methods.push(call_method);

        let graph = CallGraph::build(vec![caller_class]);
        let callers: Vec<_> = graph.callers_of(&target).collect();
        assert_eq!(callers.len(), 1);
        assert_eq!(callers[0].owner.as_str(), "com.example.Caller");
    }

    #[test]
    fn filter_to_restricts_caller_index_to_intra_set_edges() {
        use statescan_model::{AccessFlags, Invocation, InvokeKind, MethodNode};

        let mut kept = ClassNode::new("com.example.Kept");
        let mut dropped = ClassNode::new("com.example.Dropped");
        let target = MethodRef::new("com.example.Kept", "work", "()V");

        let mut method_in_kept = MethodNode::new("run", "()V", AccessFlags(0));
        method_in_kept.invocations.push(Invocation {
            target: target.clone(),
            kind: InvokeKind::Virtual,
            receiver: None,
            arguments: Vec::new(),
            bytecode_offset: 0,
        });
        kept.methods.push(method_in_kept);

        let mut method_in_dropped = MethodNode::new("run", "()V", AccessFlags(0));
        method_in_dropped.invocations.push(Invocation {
            target: target.clone(),
            kind: InvokeKind::Virtual,
            receiver: None,
            arguments: Vec::new(),
            bytecode_offset: 0,
        });
        dropped.methods.push(method_in_dropped);

        let graph = CallGraph::build(vec![kept, dropped]);
        let mut set = IndexSet::new();
        set.insert(Name::new("com.example.Kept"));
        let filtered = graph.filter_to(&set);

        let callers: Vec<_> = filtered.callers_of(&target).collect();
        assert_eq!(callers.len(), 1);
        assert_eq!(callers[0].owner.as_str(), "com.example.Kept");
    }
}
