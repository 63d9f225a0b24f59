use crate::aggregate::{self, Aggregate, RiskAssessment, Summary};
use crate::errors::TripwireResult;
use crate::patterns::{Registry, Severity};
use crate::scan::{Finding, ScanOptions, Scanner, SkippedPattern};
use crate::source::SourceUnit;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

pub const ANALYZER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// RFC 3339, UTC.
    pub analysis_date: String,
    pub analyzer_version: &'static str,
    pub total_patterns_checked: usize,
    pub skipped_patterns: usize,
    pub warnings: Vec<SkippedPattern>,
    pub source_hash: String,
    pub contract_name: Option<String>,
    pub lines_analyzed: usize,
}

/// Findings bucketed by severity, discovery order inside each bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupedFindings {
    pub critical: Vec<Finding>,
    pub high: Vec<Finding>,
    pub medium: Vec<Finding>,
    pub low: Vec<Finding>,
}

impl GroupedFindings {
    pub fn bucket(&self, severity: Severity) -> &[Finding] {
        match severity {
            Severity::Critical => &self.critical,
            Severity::High => &self.high,
            Severity::Medium => &self.medium,
            Severity::Low => &self.low,
        }
    }

    /// Most severe first.
    pub fn iter(&self) -> impl Iterator<Item = &Finding> + '_ {
        Severity::DESCENDING
            .into_iter()
            .flat_map(move |s| self.bucket(s).iter())
    }

    pub fn len(&self) -> usize {
        self.critical.len() + self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Finding> for GroupedFindings {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        let mut grouped = Self::default();
        for finding in iter {
            match finding.severity {
                Severity::Critical => grouped.critical.push(finding),
                Severity::High => grouped.high.push(finding),
                Severity::Medium => grouped.medium.push(finding),
                Severity::Low => grouped.low.push(finding),
            }
        }
        grouped
    }
}

/// Everything known about one analysed source unit.
///
/// Summary and risk are derived from `findings` on demand, so they can never
/// disagree with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub metadata: Metadata,
    pub findings: GroupedFindings,
}

impl AnalysisResult {
    pub fn analyze(registry: &Registry, source: &str, options: &ScanOptions) -> Self {
        Self::analyze_at(registry, source, options, Utc::now())
    }

    /// Same as [`AnalysisResult::analyze`] with a caller-chosen timestamp;
    /// identical inputs give identical results.
    pub fn analyze_at(
        registry: &Registry,
        source: &str,
        options: &ScanOptions,
        at: DateTime<Utc>,
    ) -> Self {
        let unit = SourceUnit::new(source);
        let outcome = Scanner::new(registry, options.clone()).scan(&unit);

        let metadata = Metadata {
            analysis_date: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            analyzer_version: ANALYZER_VERSION,
            total_patterns_checked: outcome.patterns_checked,
            skipped_patterns: outcome.skipped.len(),
            warnings: outcome.skipped,
            source_hash: unit.hash(),
            contract_name: unit.contract_name(),
            lines_analyzed: unit.line_count(),
        };

        Self {
            metadata,
            findings: outcome.findings.into_iter().collect(),
        }
    }

    pub fn aggregate(&self) -> Aggregate {
        aggregate::aggregate(self.findings.iter())
    }

    pub fn summary(&self) -> Summary {
        self.aggregate().summary
    }

    pub fn risk_assessment(&self) -> RiskAssessment {
        self.aggregate().risk_assessment
    }

    /// `true` when some finding is at least `threshold`.
    pub fn has_findings_at_or_above(&self, threshold: Severity) -> bool {
        self.findings.iter().any(|f| f.severity >= threshold)
    }

    pub fn to_json(&self) -> TripwireResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for AnalysisResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Aggregate {
            summary,
            risk_assessment,
        } = self.aggregate();
        let mut s = serializer.serialize_struct("AnalysisResult", 4)?;
        s.serialize_field("metadata", &self.metadata)?;
        s.serialize_field("summary", &summary)?;
        s.serialize_field("findings", &self.findings)?;
        s.serialize_field("risk_assessment", &risk_assessment)?;
        s.end()
    }
}

#[cfg(test)]
use crate::aggregate::{Recommendation, RiskLevel};

#[cfg(test)]
fn fixed_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn empty_source_has_no_issues() {
    let registry = Registry::builtin().unwrap();
    for source in ["", "   \n\t \r\n"] {
        let result = AnalysisResult::analyze(&registry, source, &ScanOptions::default());
        assert!(result.findings.is_empty());
        assert_eq!(result.summary().total, 0);
        assert_eq!(
            result.risk_assessment().deployment_recommendation,
            Recommendation::NoIssuesFound
        );
        assert_eq!(result.risk_assessment().risk_score, 0);
        assert_eq!(result.metadata.lines_analyzed, 0);
        assert_eq!(result.metadata.total_patterns_checked, registry.len());
    }
}

#[test]
fn honeypot_fixture_is_do_not_deploy() {
    let registry = Registry::builtin().unwrap();
    let source = include_str!("../demos/honeypot_token.sol");
    let result = AnalysisResult::analyze(&registry, source, &ScanOptions::default());

    let ids: Vec<_> = result.findings.iter().map(|f| f.pattern_id).collect();
    for expected in ["disabled-transfer", "unlimited-minting", "blacklist-mapping", "selfdestruct"] {
        assert!(ids.contains(&expected), "missing {expected} in {ids:?}");
    }
    let risk = result.risk_assessment();
    assert_eq!(risk.overall_risk_level, RiskLevel::Critical);
    assert_eq!(risk.deployment_recommendation, Recommendation::DoNotDeploy);
    assert!(risk.risk_score >= 5);
    assert_eq!(result.metadata.contract_name.as_deref(), Some("HoneyToken"));
    assert!(result.metadata.warnings.is_empty());
}

#[test]
fn clean_fixture_has_no_critical_or_high() {
    let registry = Registry::builtin().unwrap();
    let source = include_str!("../demos/clean_token.sol");
    let result = AnalysisResult::analyze(&registry, source, &ScanOptions::default());

    let summary = result.summary();
    assert_eq!(summary.critical, 0, "{:#?}", result.findings.critical);
    assert_eq!(summary.high, 0, "{:#?}", result.findings.high);
    assert_ne!(
        result.risk_assessment().deployment_recommendation,
        Recommendation::DoNotDeploy
    );
    assert!(result.metadata.warnings.is_empty());
}

#[test]
fn summary_matches_grouped_findings() {
    let registry = Registry::builtin().unwrap();
    let source = include_str!("../demos/honeypot_token.sol");
    let result = AnalysisResult::analyze(&registry, source, &ScanOptions::default());
    let summary = result.summary();
    for severity in Severity::DESCENDING {
        assert_eq!(summary.count(severity), result.findings.bucket(severity).len());
        assert!(result.findings.bucket(severity).iter().all(|f| f.severity == severity));
    }
    assert_eq!(summary.total, result.findings.len());
}

#[test]
fn same_input_and_timestamp_give_identical_json() {
    let registry = Registry::builtin().unwrap();
    let source = include_str!("../demos/honeypot_token.sol");
    let options = ScanOptions::default();

    let a = AnalysisResult::analyze_at(&registry, source, &options, fixed_time());
    let b = AnalysisResult::analyze_at(&registry, source, &options, fixed_time());
    assert_eq!(a, b);
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    assert_eq!(a.metadata.analysis_date, "2024-05-01T12:00:00Z");
}

#[test]
fn json_has_the_interop_shape() {
    let registry = Registry::builtin().unwrap();
    let source = include_str!("../demos/honeypot_token.sol");
    let result = AnalysisResult::analyze_at(&registry, source, &ScanOptions::default(), fixed_time());
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

    assert_eq!(json["metadata"]["analyzer_version"], ANALYZER_VERSION);
    assert_eq!(json["metadata"]["total_patterns_checked"], registry.len());
    assert_eq!(json["summary"]["total"], result.findings.len());
    assert_eq!(json["risk_assessment"]["overall_risk_level"], "CRITICAL");
    assert_eq!(json["risk_assessment"]["deployment_recommendation"], "DO NOT DEPLOY");

    let first = &json["findings"]["critical"][0];
    for key in ["pattern_id", "pattern_name", "description", "code_snippet", "line_number", "recommendation"] {
        assert!(!first[key].is_null(), "finding lacks {key}");
    }
    assert_eq!(first["severity"], "critical");
}
