//! Hardcoded recognition sets for the handful of dependency-injection
//! frameworks the binding parsers understand by name: Guice-style
//! declarative modules, and the annotation-driven bean styles shared by
//! Spring, CDI/Jakarta and Dagger.
//!
//! These mirror `statescan_model::mutability`'s built-in type-family sets:
//! fixed, well-known names rather than externally configured data, since a
//! binder base class or a `@Singleton` annotation means the same thing in
//! every project that uses it.

use std::collections::HashSet;
use std::sync::OnceLock;

fn set(names: &[&'static str]) -> HashSet<&'static str> {
    names.iter().copied().collect()
}

fn binder_base_classes() -> &'static HashSet<&'static str> {
    static CELL: OnceLock<HashSet<&'static str>> = OnceLock::new();
    CELL.get_or_init(|| {
        set(&[
            "com.google.inject.AbstractModule",
            "com.google.inject.PrivateModule",
        ])
    })
}

fn module_interfaces() -> &'static HashSet<&'static str> {
    static CELL: OnceLock<HashSet<&'static str>> = OnceLock::new();
    CELL.get_or_init(|| set(&["com.google.inject.Module"]))
}

fn bean_scope_annotations() -> &'static HashSet<&'static str> {
    static CELL: OnceLock<HashSet<&'static str>> = OnceLock::new();
    CELL.get_or_init(|| {
        set(&[
            "Singleton",
            "Component",
            "Service",
            "Repository",
            "Controller",
            "RestController",
            "Configuration",
            "ApplicationScoped",
            "RequestScoped",
            "SessionScoped",
            "ConversationScoped",
            "Scope",
        ])
    })
}

fn lifecycle_annotations() -> &'static HashSet<&'static str> {
    static CELL: OnceLock<HashSet<&'static str>> = OnceLock::new();
    CELL.get_or_init(|| set(&["PostConstruct", "PreDestroy"]))
}

fn inject_annotations() -> &'static HashSet<&'static str> {
    static CELL: OnceLock<HashSet<&'static str>> = OnceLock::new();
    CELL.get_or_init(|| set(&["Inject", "Autowired", "Resource"]))
}

fn nullable_markers() -> &'static HashSet<&'static str> {
    static CELL: OnceLock<HashSet<&'static str>> = OnceLock::new();
    CELL.get_or_init(|| set(&["Nullable", "CheckForNull", "Nonnull", "NonNull"]))
}

fn source_processor_markers() -> &'static HashSet<&'static str> {
    static CELL: OnceLock<HashSet<&'static str>> = OnceLock::new();
    CELL.get_or_init(|| set(&["Generated"]))
}

/// Namespace prefixes belonging to the DI frameworks themselves. Class
/// constants under these prefixes are never real binding endpoints — they
/// show up in a `configure()` body as incidental references (`Scopes`,
/// `Names`, `TypeLiteral`, ...) and must be filtered out of the class
/// constant pairing heuristic.
const FRAMEWORK_NAMESPACES: &[&str] = &[
    "com.google.inject.",
    "javax.inject.",
    "jakarta.inject.",
    "org.springframework.",
];

pub fn is_binder_base(canonical_name: &str) -> bool {
    binder_base_classes().contains(canonical_name)
}

pub fn is_module_interface(canonical_name: &str) -> bool {
    module_interfaces().contains(canonical_name)
}

pub fn is_bean_scope_annotation(simple_name: &str) -> bool {
    bean_scope_annotations().contains(simple_name)
}

pub fn is_inject_annotation(simple_name: &str) -> bool {
    inject_annotations().contains(simple_name)
}

pub fn is_framework_infrastructure(canonical_name: &str) -> bool {
    FRAMEWORK_NAMESPACES
        .iter()
        .any(|prefix| canonical_name.starts_with(prefix))
}

/// True if `simple_name` is one of the categories the qualifier-extraction
/// rule skips over: scope, lifecycle, inject, nullable, or source-processor
/// markers.
pub fn is_non_qualifier_annotation(simple_name: &str) -> bool {
    bean_scope_annotations().contains(simple_name)
        || lifecycle_annotations().contains(simple_name)
        || inject_annotations().contains(simple_name)
        || nullable_markers().contains(simple_name)
        || source_processor_markers().contains(simple_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_guice_module_shapes() {
        assert!(is_binder_base("com.google.inject.AbstractModule"));
        assert!(is_module_interface("com.google.inject.Module"));
        assert!(!is_binder_base("com.example.MyModule"));
    }

    #[test]
    fn recognizes_cross_framework_bean_scopes() {
        assert!(is_bean_scope_annotation("Singleton"));
        assert!(is_bean_scope_annotation("ApplicationScoped"));
        assert!(is_bean_scope_annotation("Service"));
        assert!(!is_bean_scope_annotation("Deprecated"));
    }

    #[test]
    fn filters_framework_infrastructure_namespaces() {
        assert!(is_framework_infrastructure("com.google.inject.Scopes"));
        assert!(!is_framework_infrastructure("com.example.Repository"));
    }
}
