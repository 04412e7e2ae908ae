//! Configuration data structures consumed by the detector framework and
//! path finder.
//!
//! This crate defines shapes only: deserializing them from a YAML file on
//! disk, discovering which file to load, and merging a project config with
//! whatever default ships with the CLI are all the config-loading
//! collaborator's job (out of scope here, per the core/CLI split). What *is*
//! in scope: the set-union merge semantics across layered configurations,
//! and the category/pattern matching logic the path finder and detectors
//! need.

use std::collections::HashSet;

use serde::Deserialize;
use statescan_model::LeafCategory;

/// A mapping from leaf category to the set of fully qualified type names
/// that belong to it, plus a set of exclude regex patterns over canonical
/// type names. Layered configurations (a shipped default merged with a
/// project-supplied override) combine by set union per category.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeafConfig {
    pub external_state: Vec<String>,
    pub service_client: Vec<String>,
    pub cache: Vec<String>,
    pub grpc: Vec<String>,
    pub resilience: Vec<String>,
    pub file_state: Vec<String>,
    pub thread_local: Vec<String>,
    pub exclude_regex: Vec<String>,
}

impl LeafConfig {
    /// Unions `self` with `other`, category by category, as required by the
    /// layered default-plus-project-config model.
    pub fn merge(&self, other: &LeafConfig) -> LeafConfig {
        LeafConfig {
            external_state: union(&self.external_state, &other.external_state),
            service_client: union(&self.service_client, &other.service_client),
            cache: union(&self.cache, &other.cache),
            grpc: union(&self.grpc, &other.grpc),
            resilience: union(&self.resilience, &other.resilience),
            file_state: union(&self.file_state, &other.file_state),
            thread_local: union(&self.thread_local, &other.thread_local),
            exclude_regex: union(&self.exclude_regex, &other.exclude_regex),
        }
    }

    /// The category `canonical_type` belongs to by direct membership, if
    /// any. Callers that need the supertype-closure fallback described in
    /// the path finder's leaf classification do that walk themselves and
    /// call this once per candidate supertype.
    pub fn direct_category(&self, canonical_type: &str) -> Option<LeafCategory> {
        let categories: [(&[String], LeafCategory); 7] = [
            (&self.external_state, LeafCategory::ExternalState),
            (&self.service_client, LeafCategory::ServiceClient),
            (&self.cache, LeafCategory::Cache),
            (&self.grpc, LeafCategory::Grpc),
            (&self.resilience, LeafCategory::Resilience),
            (&self.file_state, LeafCategory::FileState),
            (&self.thread_local, LeafCategory::ThreadLocal),
        ];
        categories
            .into_iter()
            .find(|(members, _)| members.iter().any(|m| m == canonical_type))
            .map(|(_, category)| category)
    }
}

fn union(a: &[String], b: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut result = Vec::new();
    for value in a.iter().chain(b.iter()) {
        if seen.insert(value.as_str()) {
            result.push(value.clone());
        }
    }
    result
}

/// Project-scoped scanning and traversal exclusions: which packages count
/// as project code, which dependency packages are promoted to roots, and
/// which specific classes/methods are excluded from analysis outright.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectExclusionConfig {
    pub include_packages: Vec<String>,
    pub exclude_packages: Vec<String>,
    pub root_packages: Vec<String>,
    pub exclude_classes: Vec<String>,
    pub exclude_methods: Vec<String>,
}

impl ProjectExclusionConfig {
    /// True if `canonical_name` matches any `exclude_classes` pattern.
    /// A pattern ending in `.` matches as a prefix; otherwise it must match
    /// exactly.
    pub fn excludes_class(&self, canonical_name: &str) -> bool {
        self.exclude_classes.iter().any(|pattern| matches_segment(pattern, canonical_name))
    }

    /// True if `(class, method)` matches any `exclude_methods` pattern, in
    /// one of the four forms `method`, `class#method`, `class#`, `#method`.
    /// An empty class or method segment (as in `class#` or `#method`)
    /// matches any value in that position; a segment ending in `.` matches
    /// as a prefix.
    pub fn excludes_method(&self, class: &str, method: &str) -> bool {
        self.exclude_methods
            .iter()
            .any(|pattern| matches_method_pattern(pattern, class, method))
    }
}

fn matches_method_pattern(pattern: &str, class: &str, method: &str) -> bool {
    let (class_pattern, method_pattern) = match pattern.split_once('#') {
        Some((class_part, method_part)) => (class_part, method_part),
        None => ("", pattern),
    };

    let class_ok = class_pattern.is_empty() || matches_segment(class_pattern, class);
    let method_ok = method_pattern.is_empty() || matches_segment(method_pattern, method);
    class_ok && method_ok
}

fn matches_segment(pattern: &str, value: &str) -> bool {
    match pattern.strip_suffix('.') {
        Some(prefix) => value.starts_with(prefix),
        None => value == pattern,
    }
}
