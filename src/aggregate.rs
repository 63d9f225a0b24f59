use crate::patterns::{Category, Severity};
use crate::scan::Finding;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

pub const MAX_RISK_SCORE: u8 = 10;

/// Base points once any Critical finding exists; each Critical adds one more.
const CRITICAL_BASE: usize = 3;
/// Points per distinct category with a High finding.
const HIGH_CATEGORY_POINTS: usize = 2;
/// Points per distinct category with a Medium finding.
const MEDIUM_CATEGORY_POINTS: usize = 1;
/// At most this many distinct High (resp. Medium) categories are counted.
const CATEGORY_CAP: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl Summary {
    fn add(&mut self, severity: Severity) {
        self.total += 1;
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    /// Most severe level present.
    pub fn highest(&self) -> Option<Severity> {
        Severity::DESCENDING.into_iter().find(|s| self.count(*s) > 0)
    }
}

/// Overall risk: the highest severity found, or `NONE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl From<Option<Severity>> for RiskLevel {
    fn from(severity: Option<Severity>) -> Self {
        match severity {
            None => RiskLevel::None,
            Some(Severity::Low) => RiskLevel::Low,
            Some(Severity::Medium) => RiskLevel::Medium,
            Some(Severity::High) => RiskLevel::High,
            Some(Severity::Critical) => RiskLevel::Critical,
        }
    }
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::None => "NONE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    #[serde(rename = "DO NOT DEPLOY")]
    DoNotDeploy,
    #[serde(rename = "DEPLOY WITH CAUTION")]
    DeployWithCaution,
    #[serde(rename = "REVIEW RECOMMENDED")]
    ReviewRecommended,
    #[serde(rename = "NO ISSUES FOUND")]
    NoIssuesFound,
}

impl Recommendation {
    pub fn for_summary(summary: &Summary) -> Self {
        if summary.critical > 0 {
            Recommendation::DoNotDeploy
        } else if summary.high > 0 {
            Recommendation::DeployWithCaution
        } else if summary.total > 0 {
            Recommendation::ReviewRecommended
        } else {
            Recommendation::NoIssuesFound
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::DoNotDeploy => "DO NOT DEPLOY",
            Recommendation::DeployWithCaution => "DEPLOY WITH CAUTION",
            Recommendation::ReviewRecommended => "REVIEW RECOMMENDED",
            Recommendation::NoIssuesFound => "NO ISSUES FOUND",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub overall_risk_level: RiskLevel,
    pub risk_score: u8,
    pub deployment_recommendation: Recommendation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    pub summary: Summary,
    pub risk_assessment: RiskAssessment,
}

/// Fold a finding set into its summary and risk verdict.
///
/// The score never decreases when findings are added: every term is a
/// non-decreasing function of the set, and each additional Critical raises it
/// by one until the ceiling.
pub fn aggregate<'a, I>(findings: I) -> Aggregate
where
    I: IntoIterator<Item = &'a Finding>,
{
    let mut summary = Summary::default();
    let mut high_categories: BTreeSet<Category> = BTreeSet::new();
    let mut medium_categories: BTreeSet<Category> = BTreeSet::new();

    for finding in findings {
        summary.add(finding.severity);
        match finding.severity {
            Severity::High => {
                high_categories.insert(finding.category);
            }
            Severity::Medium => {
                medium_categories.insert(finding.category);
            }
            Severity::Critical | Severity::Low => {}
        }
    }

    let critical_points = if summary.critical > 0 {
        CRITICAL_BASE + summary.critical
    } else {
        0
    };
    let high_points = HIGH_CATEGORY_POINTS * high_categories.len().min(CATEGORY_CAP);
    let medium_points = MEDIUM_CATEGORY_POINTS * medium_categories.len().min(CATEGORY_CAP);
    let score = (critical_points + high_points + medium_points).min(usize::from(MAX_RISK_SCORE));

    Aggregate {
        summary,
        risk_assessment: RiskAssessment {
            overall_risk_level: summary.highest().into(),
            // bounded by MAX_RISK_SCORE above
            risk_score: u8::try_from(score).unwrap_or(MAX_RISK_SCORE),
            deployment_recommendation: Recommendation::for_summary(&summary),
        },
    }
}

#[cfg(test)]
fn f(category: Category, severity: Severity, line: usize) -> Finding {
    Finding::new(
        &crate::patterns::test_pattern("t", category, severity),
        crate::matcher::Location {
            line,
            snippet: String::new(),
        },
    )
}

#[test]
fn empty_set_has_no_issues() {
    let agg = aggregate(&[] as &[Finding]);
    assert_eq!(agg.summary, Summary::default());
    assert_eq!(agg.risk_assessment.risk_score, 0);
    assert_eq!(agg.risk_assessment.overall_risk_level, RiskLevel::None);
    assert_eq!(
        agg.risk_assessment.deployment_recommendation,
        Recommendation::NoIssuesFound
    );
}

#[test]
fn summary_counts_add_up() {
    let findings = [
        f(Category::Fee, Severity::High, 1),
        f(Category::Fee, Severity::Low, 2),
        f(Category::Gas, Severity::Low, 3),
        f(Category::Event, Severity::Medium, 4),
    ];
    let s = aggregate(&findings).summary;
    assert_eq!(s.total, s.critical + s.high + s.medium + s.low);
    assert_eq!((s.high, s.medium, s.low), (1, 1, 2));
    assert_eq!(s.highest(), Some(Severity::High));
}

#[test]
fn score_follows_the_formula() {
    let findings = [
        f(Category::Minting, Severity::Critical, 1),
        f(Category::Fee, Severity::High, 2),
        f(Category::Fee, Severity::High, 3),
        f(Category::Gas, Severity::Medium, 4),
    ];
    // 3 + 1 critical, 2 * 1 high category, 1 medium category
    assert_eq!(aggregate(&findings).risk_assessment.risk_score, 7);

    let many_high = [
        f(Category::Fee, Severity::High, 1),
        f(Category::Gas, Severity::High, 2),
        f(Category::Event, Severity::High, 3),
    ];
    assert_eq!(aggregate(&many_high).risk_assessment.risk_score, 4);

    let lows = [f(Category::Fee, Severity::Low, 1), f(Category::Gas, Severity::Low, 2)];
    let agg = aggregate(&lows);
    assert_eq!(agg.risk_assessment.risk_score, 0);
    assert_eq!(
        agg.risk_assessment.deployment_recommendation,
        Recommendation::ReviewRecommended
    );
}

#[test]
fn score_is_monotonic_and_capped() {
    let pool = [
        f(Category::Fee, Severity::Low, 1),
        f(Category::Fee, Severity::Medium, 2),
        f(Category::Gas, Severity::High, 3),
        f(Category::Minting, Severity::Critical, 4),
        f(Category::Event, Severity::Medium, 5),
        f(Category::Honeypot, Severity::Critical, 6),
        f(Category::Economic, Severity::High, 7),
        f(Category::Minting, Severity::Critical, 8),
        f(Category::LowLevel, Severity::Critical, 9),
        f(Category::Gas, Severity::Critical, 10),
    ];
    let mut last = 0;
    for n in 0..=pool.len() {
        let agg = aggregate(&pool[..n]);
        let score = agg.risk_assessment.risk_score;
        assert!(score >= last, "score dropped at {n}");
        assert!(score <= MAX_RISK_SCORE);
        if n > 0 && pool[n - 1].severity == Severity::Critical && last < MAX_RISK_SCORE {
            assert!(score > last, "critical at {n} did not raise the score");
        }
        last = score;
    }
    assert_eq!(last, MAX_RISK_SCORE);
}

#[test]
fn recommendation_tracks_highest_severity() {
    let crit = aggregate(&[f(Category::Gas, Severity::Critical, 1)]);
    assert_eq!(crit.risk_assessment.deployment_recommendation, Recommendation::DoNotDeploy);
    assert_eq!(crit.risk_assessment.overall_risk_level, RiskLevel::Critical);

    let high = aggregate(&[f(Category::Gas, Severity::High, 1), f(Category::Fee, Severity::Low, 2)]);
    assert_eq!(high.risk_assessment.deployment_recommendation, Recommendation::DeployWithCaution);
    assert_eq!(high.risk_assessment.overall_risk_level.to_string(), "HIGH");
}

#[test]
fn aggregation_is_idempotent() {
    let findings = [f(Category::Fee, Severity::High, 1), f(Category::Gas, Severity::Medium, 2)];
    assert_eq!(aggregate(&findings), aggregate(&findings));
}
