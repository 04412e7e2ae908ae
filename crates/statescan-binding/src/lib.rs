//! Recovers dependency-injection bindings from a decoded class set.
//!
//! Two independent parsers — [`declarative`] modules and [`beans`] —
//! contribute to a single `BindingKey -> {implementation}` map, attached to
//! the call graph by `statescan-graph`.

mod beans;
mod declarative;
mod frameworks;
mod qualifier;

pub use declarative::{is_module, parse_module, BindingMap, ClassTable, ModuleOrigins};
pub use qualifier::qualifier_of;

use indexmap::IndexSet;
use statescan_model::{simple_name_of, ClassNode};

/// Runs both binding parsers over every class in `classes`, returning the
/// merged `BindingKey -> {implementation}` map plus the module-origin map
/// (implementation class -> declarative module that bound it; bean-derived
/// bindings never appear in it).
pub fn parse_bindings(classes: &ClassTable) -> (BindingMap, ModuleOrigins) {
    let mut bindings = BindingMap::new();
    let mut origins = ModuleOrigins::new();
    let mut module_visited = IndexSet::new();

    for class in classes.values() {
        if declarative::is_module(class, classes) {
            declarative::parse_module(class, classes, &mut bindings, &mut origins, &mut module_visited);
        }
    }

    for class in classes.values() {
        if beans::is_bean(class) {
            beans::parse_bean(class, classes, &mut bindings);
        }
    }

    (bindings, origins)
}

/// True if `class` is annotated as a bean but was already handled by the
/// declarative module binding; the module-binding detector uses this to
/// avoid double-reporting the same singleton through two code paths.
pub fn is_bean(class: &ClassNode) -> bool {
    beans::is_bean(class)
}

/// The scope/stereotype annotation that made `class` a bean, if any.
pub fn bean_scope_annotation_of(class: &ClassNode) -> Option<statescan_core::Name> {
    beans::bean_scope_annotation_of(class)
}

/// True if any of `annotations` is a recognized `@Inject`-family marker,
/// used by the reachability analyzer to decide whether a field is an
/// injection point whose qualified implementations should be followed.
pub fn is_injection_point(annotations: &IndexSet<statescan_core::Name>) -> bool {
    annotations
        .iter()
        .any(|annotation| frameworks::is_inject_annotation(simple_name_of(annotation.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use statescan_core::Name;
    use statescan_model::BindingKey;

    #[test]
    fn merges_declarative_and_bean_bindings() {
        let mut module = ClassNode::new("com.example.AppModule");
        module.superclass = Some(Name::new("com.google.inject.AbstractModule"));

        let mut bean = ClassNode::new("com.example.JdbcRepository");
        bean.interfaces.insert(Name::new("com.example.Repository"));
        bean.annotations.insert(Name::new("javax.inject.Singleton"));

        let mut classes = ClassTable::new();
        classes.insert(module.name.clone(), module);
        classes.insert(bean.name.clone(), bean);

        let (bindings, _origins) = parse_bindings(&classes);
        let key = BindingKey::unqualified("com.example.Repository");
        assert!(bindings.contains_key(&key));
    }

    #[test]
    fn injection_point_predicate_checks_simple_name() {
        let mut annotations = IndexSet::new();
        annotations.insert(Name::new("javax.inject.Inject"));
        assert!(is_injection_point(&annotations));

        let other: IndexSet<Name> = IndexSet::new();
        assert!(!is_injection_point(&other));
    }
}
