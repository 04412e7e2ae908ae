use std::time::Duration;

use statescan_core::Name;

/// Severity ladder used consistently across every detector.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RiskLevel {
    Medium,
    High,
    Critical,
}

/// The broad category of state a finding describes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StateType {
    StaticState,
    SingletonField,
    ModuleBoundSingletonField,
    Cache,
    ThreadLocal,
    ExternalState,
    ServiceClient,
    Resilience,
    FileState,
}

/// Where a singleton classification originated, for module-bound findings
/// that must avoid duplicating an annotation-driven singleton finding.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ScopeSource {
    Annotation,
    ModuleBinding,
}

/// A single detector result.
#[derive(Clone, Debug)]
pub struct Finding {
    pub class_name: Name,
    pub source_line: Option<u32>,
    pub state_type: StateType,
    pub risk: RiskLevel,
    pub pattern_label: String,
    pub field_name: Option<Name>,
    pub raw_type: Option<Name>,
    pub scope_source: Option<ScopeSource>,
    pub scope_annotation: Option<Name>,
    pub module_name: Option<Name>,
    pub description: String,
    pub recommendation: String,
    pub detector_id: &'static str,
    pub source_file: Option<Name>,
}

/// Scan-level metadata attached to a `ScanReport`.
#[derive(Clone, Debug)]
pub struct ScanMeta {
    pub classes_scanned: usize,
    pub archives_scanned: usize,
    pub duration: Duration,
}

/// The terminal output of a full analysis run.
#[derive(Clone, Debug)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
    pub meta: ScanMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_orders_critical_highest() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Medium);
    }
}
