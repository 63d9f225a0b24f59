use crate::errors::MatcherFailure;
use crate::matcher::{self, Location};
use crate::patterns::{Category, Pattern, Registry, Severity};
use crate::source::SourceUnit;
use crate::utils::Config;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One occurrence of one pattern, with its templates expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub pattern_id: &'static str,
    pub pattern_name: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub description: String,
    pub code_snippet: String,
    pub line_number: usize,
    pub recommendation: String,
}

impl Finding {
    pub fn new(pattern: &Pattern, location: Location) -> Self {
        Self {
            pattern_id: pattern.id,
            pattern_name: pattern.name,
            category: pattern.category,
            severity: pattern.severity,
            description: expand(pattern.description, &location),
            recommendation: expand(pattern.recommendation, &location),
            line_number: location.line,
            code_snippet: location.snippet,
        }
    }
}

fn expand(template: &str, location: &Location) -> String {
    template
        .replace("{line}", &location.line.to_string())
        .replace("{snippet}", location.snippet.trim())
}

/// A pattern whose matcher failed on this unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPattern {
    pub pattern_id: &'static str,
    pub reason: String,
}

/// Which patterns take part in a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// `None` runs every category.
    pub categories: Option<Vec<Category>>,
    pub disabled_patterns: Vec<String>,
    pub min_severity: Severity,
    /// Fan patterns out over the rayon pool.
    pub parallel: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            categories: None,
            disabled_patterns: Vec::new(),
            min_severity: Severity::Low,
            parallel: true,
        }
    }
}

impl ScanOptions {
    pub fn from_config(config: &Config) -> Self {
        let scanner = &config.scanner;
        Self {
            categories: (!scanner.categories.is_empty()).then(|| scanner.categories.clone()),
            disabled_patterns: scanner.disabled_patterns.clone(),
            min_severity: scanner.min_severity,
            parallel: config.performance.parallel_patterns,
        }
    }

    pub fn allows(&self, pattern: &Pattern) -> bool {
        pattern.severity >= self.min_severity
            && self
                .categories
                .as_ref()
                .is_none_or(|cats| cats.contains(&pattern.category))
            && !self.disabled_patterns.iter().any(|id| id == pattern.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// De-duplicated, in discovery order.
    pub findings: Vec<Finding>,
    pub skipped: Vec<SkippedPattern>,
    /// Number of patterns that were run.
    pub patterns_checked: usize,
}

/// Runs the active patterns of a registry over source units.
pub struct Scanner<'r> {
    registry: &'r Registry,
    options: ScanOptions,
}

impl<'r> Scanner<'r> {
    pub fn new(registry: &'r Registry, options: ScanOptions) -> Self {
        Self { registry, options }
    }

    /// Patterns selected by the options, in registry order.
    pub fn active_patterns(&self) -> Vec<&'r Pattern> {
        self.registry
            .all()
            .filter(|p| self.options.allows(p))
            .collect()
    }

    pub fn scan(&self, unit: &SourceUnit) -> ScanOutcome {
        let active = self.active_patterns();
        tracing::debug!(
            "scanning {} lines with {} patterns",
            unit.line_count(),
            active.len()
        );

        // indexed collect keeps registry order whatever the scheduling
        let results: Vec<_> = if self.options.parallel {
            active
                .par_iter()
                .map(|p| (*p, matcher::find(p, unit)))
                .collect()
        } else {
            active.iter().map(|p| (*p, matcher::find(p, unit))).collect()
        };

        let mut findings = Vec::new();
        let mut skipped = Vec::new();
        for (pattern, result) in results {
            match result {
                Ok(locations) => findings.extend(
                    locations
                        .into_iter()
                        .map(|location| Finding::new(pattern, location)),
                ),
                Err(failure) => skipped.push(skip(pattern, failure)),
            }
        }

        ScanOutcome {
            findings: dedup(findings),
            skipped,
            patterns_checked: active.len(),
        }
    }
}

fn skip(pattern: &Pattern, failure: MatcherFailure) -> SkippedPattern {
    tracing::warn!(pattern = pattern.id, "pattern skipped: {failure}");
    SkippedPattern {
        pattern_id: pattern.id,
        reason: failure.to_string(),
    }
}

/// Keep one finding per `(line, category)`: the most severe, the earliest on
/// a tie. Survivors stay in their original order.
pub fn dedup(findings: Vec<Finding>) -> Vec<Finding> {
    let mut winners: HashMap<(usize, Category), usize> = HashMap::new();
    for (idx, finding) in findings.iter().enumerate() {
        winners
            .entry((finding.line_number, finding.category))
            .and_modify(|w| {
                if finding.severity > findings[*w].severity {
                    *w = idx;
                }
            })
            .or_insert(idx);
    }

    let keep: HashSet<usize> = winners.into_values().collect();
    findings
        .into_iter()
        .enumerate()
        .filter_map(|(idx, f)| keep.contains(&idx).then_some(f))
        .collect()
}

#[cfg(test)]
fn finding(id: &'static str, category: Category, severity: Severity, line: usize) -> Finding {
    Finding::new(
        &crate::patterns::test_pattern(id, category, severity),
        Location {
            line,
            snippet: "x".into(),
        },
    )
}

#[cfg(test)]
const UNCAPPED_MINT: &str = "pragma solidity ^0.8.0;\ncontract Token {\n    mapping(address => uint256) balances;\n    uint256 totalSupply;\n    function mint(address to, uint256 amount) public onlyOwner { balances[to] += amount; totalSupply += amount; }\n}\n";

#[test]
fn templates_expand_line_and_trimmed_snippet() {
    let pattern = crate::patterns::Pattern {
        description: "on line {line}: `{snippet}`",
        recommendation: "fix line {line}",
        ..crate::patterns::test_pattern("p", Category::Gas, Severity::Low)
    };
    let f = Finding::new(
        &pattern,
        Location {
            line: 7,
            snippet: "    uint x = tx.gasprice;".into(),
        },
    );
    assert_eq!(f.description, "on line 7: `uint x = tx.gasprice;`");
    assert_eq!(f.recommendation, "fix line 7");
    assert_eq!(f.code_snippet, "    uint x = tx.gasprice;");
}

#[test]
fn dedup_keeps_higher_severity_per_line_and_category() {
    let findings = vec![
        finding("fee-medium", Category::Fee, Severity::Medium, 4),
        finding("gas-low", Category::Gas, Severity::Low, 4),
        finding("fee-high", Category::Fee, Severity::High, 4),
        finding("fee-other-line", Category::Fee, Severity::Low, 5),
        finding("fee-high-later", Category::Fee, Severity::High, 4),
    ];
    let ids: Vec<_> = dedup(findings).into_iter().map(|f| f.pattern_id).collect();
    assert_eq!(ids, ["gas-low", "fee-high", "fee-other-line"]);
}

#[test]
fn uncapped_mint_is_critical_on_its_declaration_line() {
    let registry = Registry::builtin().unwrap();
    let outcome = Scanner::new(&registry, ScanOptions::default()).scan(&SourceUnit::new(UNCAPPED_MINT));

    let critical: Vec<_> = outcome
        .findings
        .iter()
        .filter(|f| f.severity == Severity::Critical)
        .collect();
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].pattern_id, "unlimited-minting");
    assert_eq!(critical[0].line_number, 5);
    assert!(critical[0].description.contains("line 5"));
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.patterns_checked, registry.len());
}

#[cfg(test)]
fn critical_ids(source: &str) -> (Vec<(&'static str, usize)>, usize) {
    let registry = Registry::builtin().unwrap();
    let outcome = Scanner::new(&registry, ScanOptions::default()).scan(&SourceUnit::new(source));
    let critical = outcome
        .findings
        .iter()
        .filter(|f| f.severity == Severity::Critical)
        .map(|f| (f.pattern_id, f.line_number))
        .collect();
    (critical, outcome.skipped.len())
}

#[test]
fn commented_header_with_open_brace_does_not_hide_uncapped_mint() {
    let source = UNCAPPED_MINT.replacen(
        "contract Token",
        "/// Usage: function mint(address to) external {\ncontract Token",
        1,
    );
    assert_eq!(critical_ids(&source), (vec![("unlimited-minting", 6)], 0));
}

#[test]
fn commented_out_mint_is_not_reported() {
    let source = "pragma solidity ^0.8.0;\ncontract Token {\n    mapping(address => uint256) balances;\n    // function oldMint(address to, uint256 amount) public {\n    //     balances[to] += amount;\n    // }\n}\n";
    assert_eq!(critical_ids(source), (vec![], 0));
}

#[test]
fn commented_bound_does_not_cap_a_mint() {
    let source = UNCAPPED_MINT.replacen(
        "onlyOwner { ",
        "onlyOwner {\n        // TODO require(amount <= cap);\n        ",
        1,
    );
    assert_eq!(critical_ids(&source), (vec![("unlimited-minting", 5)], 0));
}

#[test]
fn options_filter_patterns() {
    let registry = Registry::builtin().unwrap();
    let unit = SourceUnit::new(UNCAPPED_MINT);

    let disabled = ScanOptions {
        disabled_patterns: vec!["unlimited-minting".into()],
        ..ScanOptions::default()
    };
    let outcome = Scanner::new(&registry, disabled).scan(&unit);
    assert!(outcome.findings.iter().all(|f| f.pattern_id != "unlimited-minting"));
    assert_eq!(outcome.patterns_checked, registry.len() - 1);

    let only_events = ScanOptions {
        categories: Some(vec![Category::Event]),
        ..ScanOptions::default()
    };
    let scanner = Scanner::new(&registry, only_events);
    assert_eq!(
        scanner.active_patterns().len(),
        registry.by_category(Category::Event).len()
    );
    assert!(scanner.scan(&unit).findings.iter().all(|f| f.category == Category::Event));

    let high_up = ScanOptions {
        min_severity: Severity::High,
        ..ScanOptions::default()
    };
    let outcome = Scanner::new(&registry, high_up).scan(&unit);
    assert!(outcome.findings.iter().all(|f| f.severity >= Severity::High));
    assert!(!outcome.findings.is_empty());
}

#[test]
fn failing_pattern_is_skipped_and_others_still_run() {
    let src = "contract Broken {\n  address owner;\n  function kill() public { selfdestruct(payable(owner)); }\n  function mint(address to) public {\n    balances[to] = 1;\n";
    let registry = Registry::builtin().unwrap();
    let outcome = Scanner::new(&registry, ScanOptions::default()).scan(&SourceUnit::new(src));

    assert!(outcome.skipped.iter().any(|s| s.pattern_id == "unlimited-minting"));
    assert!(outcome.skipped.iter().all(|s| s.reason.contains("unterminated")));
    assert!(outcome.findings.iter().any(|f| f.pattern_id == "selfdestruct" && f.line_number == 3));
}

#[test]
fn parallel_and_sequential_scans_agree() {
    let registry = Registry::builtin().unwrap();
    let unit = SourceUnit::new(include_str!("../demos/honeypot_token.sol"));
    let parallel = Scanner::new(&registry, ScanOptions::default()).scan(&unit);
    let sequential = Scanner::new(
        &registry,
        ScanOptions {
            parallel: false,
            ..ScanOptions::default()
        },
    )
    .scan(&unit);
    assert_eq!(parallel, sequential);
    assert!(!parallel.findings.is_empty());
}
