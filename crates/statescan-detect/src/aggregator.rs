//! Turns raw detector output into the final `ScanReport`: risk-threshold
//! filtering and exclude-pattern suppression over the raw type name.

use regex::Regex;
use statescan_model::{Finding, RiskLevel, ScanMeta, ScanReport};

/// Filters `findings` down to `minimum_risk` and above, dropping any whose
/// `raw_type` matches one of `exclude_regex`. Invalid patterns are logged
/// and skipped rather than failing the whole scan.
pub fn aggregate(
    findings: Vec<Finding>,
    meta: ScanMeta,
    minimum_risk: RiskLevel,
    exclude_regex: &[String],
) -> ScanReport {
    let patterns: Vec<Regex> = exclude_regex
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(compiled) => Some(compiled),
            Err(error) => {
                tracing::warn!(pattern, %error, "skipping invalid exclude pattern");
                None
            }
        })
        .collect();

    let findings = findings
        .into_iter()
        .filter(|finding| finding.risk >= minimum_risk)
        .filter(|finding| {
            let Some(raw_type) = finding.raw_type.as_ref() else {
                return true;
            };
            !patterns.iter().any(|pattern| pattern.is_match(raw_type.as_str()))
        })
        .collect();

    ScanReport { findings, meta }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statescan_core::Name;
    use statescan_model::StateType;
    use std::time::Duration;

    fn finding(raw_type: &str, risk: RiskLevel) -> Finding {
        Finding {
            class_name: Name::new("com.example.Service"),
            source_line: None,
            state_type: StateType::StaticState,
            risk,
            pattern_label: "static-mutable-field".to_string(),
            field_name: Some(Name::new("field")),
            raw_type: Some(Name::new(raw_type)),
            scope_source: None,
            scope_annotation: None,
            module_name: None,
            description: "example".to_string(),
            recommendation: "example".to_string(),
            detector_id: "static-state",
            source_file: None,
        }
    }

    fn meta() -> ScanMeta {
        ScanMeta {
            classes_scanned: 1,
            archives_scanned: 0,
            duration: Duration::from_secs(1),
        }
    }

    #[test]
    fn filters_below_minimum_risk() {
        let findings = vec![finding("java.util.HashMap", RiskLevel::Medium), finding("java.util.HashMap", RiskLevel::Critical)];
        let report = aggregate(findings, meta(), RiskLevel::High, &[]);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].risk, RiskLevel::Critical);
    }

    #[test]
    fn suppresses_excluded_raw_types() {
        let findings = vec![finding("com.example.generated.Proxy", RiskLevel::Critical)];
        let report = aggregate(findings, meta(), RiskLevel::Medium, &["^com\\.example\\.generated\\..*$".to_string()]);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn invalid_pattern_is_skipped_not_fatal() {
        let findings = vec![finding("java.util.HashMap", RiskLevel::Critical)];
        let report = aggregate(findings, meta(), RiskLevel::Medium, &["(unclosed".to_string()]);
        assert_eq!(report.findings.len(), 1);
    }
}
