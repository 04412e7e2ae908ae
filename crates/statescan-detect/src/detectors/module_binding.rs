//! Declarative module bindings that hand out a singleton-scoped
//! implementation without an annotation on the implementation class itself.
//! Without this detector, a DI module's `bind(Foo.class).to(FooImpl.class)`
//! would leave `FooImpl`'s mutable fields undetected by the annotation-driven
//! [`super::singleton::SingletonDetector`].

use indexmap::IndexSet;
use statescan_config::LeafConfig;
use statescan_core::Name;
use statescan_graph::CallGraph;
use statescan_model::{is_cache, is_mutable_collection, Finding, RiskLevel, ScopeSource, StateType};

use crate::Detector;

pub struct ModuleBindingDetector;

impl Detector for ModuleBindingDetector {
    fn id(&self) -> &'static str {
        "module-binding"
    }

    fn description(&self) -> &'static str {
        "Flags mutable instance fields on classes bound as singletons by a declarative DI module."
    }

    fn detect(&self, graph: &CallGraph, leaf_config: &LeafConfig, reachable: &IndexSet<Name>) -> Vec<Finding> {
        let mut findings = Vec::new();

        let mut implementations: IndexSet<&Name> = IndexSet::new();
        for set in graph.bindings().values() {
            implementations.extend(set.iter());
        }

        for implementation in implementations {
            if !reachable.contains(implementation.as_str()) {
                continue;
            }
            let Some(class) = graph.get(implementation.as_str()) else {
                continue;
            };
            if statescan_binding::is_bean(class) {
                // Already reported by the annotation-driven detector.
                continue;
            }
            let Some(module_name) = graph.module_of(implementation.as_str()) else {
                continue;
            };

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
                    state_type: StateType::ModuleBoundSingletonField,
                    risk,
                    pattern_label: "module-bound-singleton-field".to_string(),
                    field_name: Some(field.name.clone()),
                    raw_type: canonical_type.map(Name::new),
                    scope_source: Some(ScopeSource::ModuleBinding),
                    scope_annotation: None,
                    module_name: Some(module_name.clone()),
                    description: format!(
                        "{} is bound as a singleton by {} and declares mutable field `{}`.",
                        class.name, module_name, field.name
                    ),
                    recommendation: "Move this field to a distributed cache or request-scoped storage so every instance observes the same state.".to_string(),
                    detector_id: "module-binding",
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
    use statescan_model::{
        AccessFlags, ClassNode, FieldNode, Invocation, InvokeKind, MethodNode, MethodRef,
    };

    fn reachable_with(names: &[&str]) -> IndexSet<Name> {
        names.iter().map(|n| Name::new(*n)).collect()
    }

    fn module_with_binding() -> (ClassNode, ClassNode) {
        let mut impl_class = ClassNode::new("com.example.JdbcRepository");
        impl_class.fields.push(FieldNode::new(
            "connectionPool",
            "Lcom/zaxxer/hikari/HikariDataSource;",
            AccessFlags(0x0010),
        ));

        let mut configure = MethodNode::new("configure", "()V", AccessFlags(0));
        configure.invocations.push(Invocation {
            target: MethodRef::new("com.google.inject.binder.AnnotatedBindingBuilder", "bind", "()V"),
            kind: InvokeKind::Virtual,
            receiver: None,
            arguments: Vec::new(),
            bytecode_offset: 0,
        });
        configure.invocations.push(Invocation {
            target: MethodRef::new("com.google.inject.binder.LinkedBindingBuilder", "to", "()V"),
            kind: InvokeKind::Virtual,
            receiver: None,
            arguments: Vec::new(),
            bytecode_offset: 3,
        });
        configure.class_constants.insert(Name::new("com.example.Repository"));
        configure.class_constants.insert(Name::new("com.example.JdbcRepository"));

        let mut module = ClassNode::new("com.example.AppModule");
        module.superclass = Some(Name::new("com.google.inject.AbstractModule"));
        module.methods.push(configure);

        (module, impl_class)
    }

    #[test]
    fn module_bound_implementation_is_flagged() {
        let (module, impl_class) = module_with_binding();
        let graph = CallGraph::build(vec![module, impl_class]);
        let reachable = reachable_with(&["com.example.JdbcRepository", "com.example.AppModule"]);

        let detector = ModuleBindingDetector;
        let findings = detector.detect(&graph, &LeafConfig::default(), &reachable);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].risk, RiskLevel::Critical);
        assert_eq!(
            findings[0].module_name.as_ref().unwrap().as_str(),
            "com.example.AppModule"
        );
    }

    #[test]
    fn bean_annotated_implementations_are_skipped_to_avoid_duplicates() {
        let (module, mut impl_class) = module_with_binding();
        impl_class.annotations.insert(Name::new("javax.inject.Singleton"));
        let graph = CallGraph::build(vec![module, impl_class]);
        let reachable = reachable_with(&["com.example.JdbcRepository", "com.example.AppModule"]);

        let detector = ModuleBindingDetector;
        let findings = detector.detect(&graph, &LeafConfig::default(), &reachable);
        assert!(findings.is_empty());
    }
}
