//! Standard-runtime namespace filtering.

const RUNTIME_PREFIXES: &[&str] = &["java.", "javax.", "sun.", "jdk."];

/// Returns true if `canonical_name` belongs to a standard JDK namespace and
/// should be excluded from reachability closure and call-graph expansion.
pub fn is_runtime_namespace(canonical_name: &str) -> bool {
    RUNTIME_PREFIXES
        .iter()
        .any(|prefix| canonical_name.starts_with(prefix))
}
