pub mod access_control;
pub mod economic;
pub mod event;
pub mod fee;
pub mod function_logic;
pub mod gas;
pub mod honeypot;
pub mod low_level;
pub mod metamorphic;
pub mod minting;
pub mod standard;

use crate::errors::{TripwireError, TripwireResult};
use console::style;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Severity::Critical => style("CRITICAL").magenta().bold().to_string(),
            Severity::High => style("HIGH").red().bold().to_string(),
            Severity::Medium => style("MEDIUM").yellow().bold().to_string(),
            Severity::Low => style("LOW").cyan().bold().to_string(),
        };
        f.write_str(&s)
    }
}

impl Severity {
    /// Highest first, the order findings are grouped in.
    pub const DESCENDING: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Plain upper-case label, no terminal styling.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl FromStr for Severity {
    type Err = TripwireError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            other => Err(TripwireError::Other(format!("unknown severity `{other}`"))),
        }
    }
}

/// The fixed set of pattern families. Declaration order is enumeration order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Honeypot,
    Minting,
    Fee,
    AccessControl,
    Metamorphic,
    LowLevel,
    FunctionLogic,
    Economic,
    Event,
    StandardViolation,
    Gas,
}

static CATEGORY_NAMES: phf::Map<&'static str, Category> = phf::phf_map! {
    "honeypot" => Category::Honeypot,
    "exit-restriction" => Category::Honeypot,
    "minting" => Category::Minting,
    "mint" => Category::Minting,
    "fee" => Category::Fee,
    "tax" => Category::Fee,
    "access-control" => Category::AccessControl,
    "access" => Category::AccessControl,
    "metamorphic" => Category::Metamorphic,
    "upgrade" => Category::Metamorphic,
    "low-level" => Category::LowLevel,
    "lowlevel" => Category::LowLevel,
    "function-logic" => Category::FunctionLogic,
    "logic" => Category::FunctionLogic,
    "economic" => Category::Economic,
    "event" => Category::Event,
    "standard-violation" => Category::StandardViolation,
    "standard" => Category::StandardViolation,
    "gas" => Category::Gas,
};

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Honeypot,
        Category::Minting,
        Category::Fee,
        Category::AccessControl,
        Category::Metamorphic,
        Category::LowLevel,
        Category::FunctionLogic,
        Category::Economic,
        Category::Event,
        Category::StandardViolation,
        Category::Gas,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Honeypot => "honeypot",
            Category::Minting => "minting",
            Category::Fee => "fee",
            Category::AccessControl => "access-control",
            Category::Metamorphic => "metamorphic",
            Category::LowLevel => "low-level",
            Category::FunctionLogic => "function-logic",
            Category::Economic => "economic",
            Category::Event => "event",
            Category::StandardViolation => "standard-violation",
            Category::Gas => "gas",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TripwireError;

    /// Accepts the kebab-case name plus a few short aliases, case-insensitive.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let key = input.trim().to_ascii_lowercase().replace('_', "-");
        CATEGORY_NAMES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| TripwireError::UnknownCategory(input.to_owned()))
    }
}

/// Line regex with contextual suppression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGuard {
    /// Regex tested against each normalized line.
    pub pattern: &'static str,
    /// The hit is dropped when the same line matches any of these.
    pub unless_line: &'static [&'static str],
    /// The hit is dropped when the signature of the enclosing function,
    /// constructor or modifier matches any of these.
    pub unless_scope: &'static [&'static str],
}

/// Contextual rule evaluated over a brace-delimited block.
///
/// The block starts at the `signature` match and ends at the brace closing
/// the first `{` after it. A hit is reported on the signature's line when
/// every condition holds:
///
/// * the signature text (up to the opening brace) matches none of `signature_forbids`
/// * the block matches **all** of `requires`
/// * the block matches **none** of `forbids`
/// * the whole source unit matches all of `source_requires`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScopeRule {
    pub signature: &'static str,
    pub signature_forbids: &'static [&'static str],
    pub requires: &'static [&'static str],
    pub forbids: &'static [&'static str],
    pub source_requires: &'static [&'static str],
}

impl ScopeRule {
    /// A rule that only locates `signature`; fill in the rest with struct update syntax.
    pub const fn at(signature: &'static str) -> Self {
        Self {
            signature,
            signature_forbids: &[],
            requires: &[],
            forbids: &[],
            source_requires: &[],
        }
    }
}

/// How a pattern finds its occurrences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Matcher {
    /// Plain substring on a single line.
    Literal(&'static str),
    /// Regex on a single line.
    Regex(&'static str),
    Guarded(LineGuard),
    Scoped(ScopeRule),
}

// Fragments shared across category tables.

/// Caller restricted to the owner (modifier or explicit check).
pub(crate) const OWNER_GATE: &str = r"\bonlyOwner\b|\bonlyRole\s*\(|\b(msg\.sender|_msgSender\(\))\s*==\s*_?owner\b|\b_?owner\s*==\s*(msg\.sender|_msgSender\(\))";
/// Plain assignment (not `+=`/`-=`) to a balance slot.
pub(crate) const BALANCE_WRITE: &str = r"\b_?balances?(Of)?\s*\[[^\]]+\]\s*=[^=]";
/// Condition that can never hold.
pub(crate) const ALWAYS_FALSE: &str = r"\b(require|assert)\s*\(\s*(false|1\s*==\s*2|0\s*==\s*1)\s*[,)]";
/// Signature of an internal or private function.
pub(crate) const NON_EXTERNAL: &str = r"\)[^{]*\b(internal|private)\b";

/// One malicious-pattern rule and its meta-data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pattern {
    /// Unique identifier (kebab-case).
    pub id: &'static str,
    /// Human-readable title.
    pub name: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub matcher: Matcher,
    /// Template; `{line}` and `{snippet}` are expanded per finding.
    pub description: &'static str,
    /// Template; same placeholders as `description`.
    pub recommendation: &'static str,
}

/// Every pattern that will be checked, grouped by category.
///
/// Built once at start-up and only read afterwards.
#[derive(Debug, Default)]
pub struct Registry {
    buckets: BTreeMap<Category, Vec<Pattern>>,
    ids: HashSet<&'static str>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in category table.
    pub fn builtin() -> TripwireResult<Self> {
        let mut registry = Self::new();
        for table in [
            honeypot::PATTERNS,
            minting::PATTERNS,
            fee::PATTERNS,
            access_control::PATTERNS,
            metamorphic::PATTERNS,
            low_level::PATTERNS,
            function_logic::PATTERNS,
            economic::PATTERNS,
            event::PATTERNS,
            standard::PATTERNS,
            gas::PATTERNS,
        ] {
            for pattern in table {
                registry.register(*pattern)?;
            }
        }
        tracing::debug!("pattern registry initialised ({} patterns)", registry.len());
        Ok(registry)
    }

    pub fn register(&mut self, pattern: Pattern) -> TripwireResult<()> {
        if !self.ids.insert(pattern.id) {
            return Err(TripwireError::DuplicatePattern { id: pattern.id });
        }
        self.buckets.entry(pattern.category).or_default().push(pattern);
        Ok(())
    }

    /// All patterns, by category then registration order.
    pub fn all(&self) -> impl Iterator<Item = &Pattern> + '_ {
        self.buckets.values().flatten()
    }

    pub fn by_category(&self, category: Category) -> &[Pattern] {
        self.buckets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, id: &str) -> Option<&Pattern> {
        self.all().find(|p| p.id == id)
    }

    /// Categories that hold at least one pattern.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.buckets.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn test_pattern(id: &'static str, category: Category, severity: Severity) -> Pattern {
    Pattern {
        id,
        name: id,
        category,
        severity,
        matcher: Matcher::Literal("x"),
        description: "d",
        recommendation: "r",
    }
}

#[test]
fn severity_orders_low_to_critical() {
    assert!(Severity::Critical > Severity::High);
    assert!(Severity::High > Severity::Medium);
    assert!(Severity::Medium > Severity::Low);
    assert_eq!(Severity::DESCENDING[0], Severity::Critical);
}

#[test]
fn severity_parses_its_own_labels() {
    for s in Severity::DESCENDING {
        assert_eq!(s.as_str().parse::<Severity>().unwrap(), s);
        assert_eq!(s.as_str().to_lowercase().parse::<Severity>().unwrap(), s);
    }
    assert!("severe".parse::<Severity>().is_err());
}

#[test]
fn severity_display_contains_uppercase_name() {
    assert!(Severity::Critical.to_string().contains("CRITICAL"));
    assert!(Severity::Low.to_string().contains("LOW"));
}

#[test]
fn category_parses_names_and_aliases() {
    for c in Category::ALL {
        assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
    }
    assert_eq!("Access_Control".parse::<Category>().unwrap(), Category::AccessControl);
    assert_eq!("standard".parse::<Category>().unwrap(), Category::StandardViolation);
    assert!(matches!(
        "bytecode".parse::<Category>(),
        Err(TripwireError::UnknownCategory(_))
    ));
}

#[test]
fn register_rejects_duplicate_ids() {
    let mut registry = Registry::new();
    registry
        .register(test_pattern("dup", Category::Fee, Severity::Low))
        .unwrap();
    let err = registry
        .register(test_pattern("dup", Category::Gas, Severity::High))
        .unwrap_err();
    assert!(matches!(err, TripwireError::DuplicatePattern { id: "dup" }));
    assert_eq!(registry.len(), 1);
    assert!(registry.by_category(Category::Gas).is_empty());
}

#[test]
fn all_orders_by_category_then_registration() {
    let mut registry = Registry::new();
    registry.register(test_pattern("gas-a", Category::Gas, Severity::Low)).unwrap();
    registry.register(test_pattern("honey-a", Category::Honeypot, Severity::Low)).unwrap();
    registry.register(test_pattern("gas-b", Category::Gas, Severity::High)).unwrap();
    registry.register(test_pattern("honey-b", Category::Honeypot, Severity::Low)).unwrap();

    let ids: Vec<_> = registry.all().map(|p| p.id).collect();
    assert_eq!(ids, ["honey-a", "honey-b", "gas-a", "gas-b"]);

    let gas: Vec<_> = registry.by_category(Category::Gas).iter().map(|p| p.id).collect();
    assert_eq!(gas, ["gas-a", "gas-b"]);
    assert_eq!(registry.get("gas-b").map(|p| p.severity), Some(Severity::High));
}

#[test]
fn builtin_registry_covers_every_category() {
    let registry = Registry::builtin().expect("built-in ids are unique");
    let categories: Vec<_> = registry.categories().collect();
    assert_eq!(categories, Category::ALL);
    for pattern in registry.all() {
        assert!(
            pattern.id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            "id `{}` must be kebab-case",
            pattern.id
        );
    }
    assert!(registry.get("unlimited-minting").is_some());
}
