use crate::errors::MatcherFailure;
use crate::patterns::{LineGuard, Matcher, Pattern, ScopeRule};
use crate::source::SourceUnit;
use crate::utils::regex_cache;

/// Longest snippet kept verbatim; longer lines are cut and end in `...`.
pub const MAX_SNIPPET_CHARS: usize = 240;

/// One occurrence of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// 1-based line in the normalized source.
    pub line: usize,
    pub snippet: String,
}

impl Location {
    fn new(line: usize, text: &str) -> Self {
        Self {
            line,
            snippet: bounded_snippet(text),
        }
    }
}

fn bounded_snippet(text: &str) -> String {
    match text.char_indices().nth(MAX_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

/// Locate every occurrence of `pattern` in `unit`.
///
/// Pure with respect to its inputs: the only shared state touched is the
/// write-once regex cache and the unit's lazily computed scope table. At most
/// one location is reported per line, in ascending line order. Every test
/// runs on the masked code, so comments and string contents never match;
/// snippets are cut from the real text.
pub fn find(pattern: &Pattern, unit: &SourceUnit) -> Result<Vec<Location>, MatcherFailure> {
    match pattern.matcher {
        Matcher::Literal(needle) => line_hits(unit, |_, line| Ok(line.contains(needle))),
        Matcher::Regex(source) => {
            let re = regex_cache::get(source)?;
            line_hits(unit, |_, line| Ok(re.is_match(line)))
        }
        Matcher::Guarded(guard) => guarded(&guard, unit),
        Matcher::Scoped(rule) => scoped(&rule, unit),
    }
}

fn line_hits<F>(unit: &SourceUnit, mut hit: F) -> Result<Vec<Location>, MatcherFailure>
where
    F: FnMut(usize, &str) -> Result<bool, MatcherFailure>,
{
    let mut out = Vec::new();
    for (number, line) in unit.lines() {
        let code = unit.code_line(number).unwrap_or_default();
        if !code.trim().is_empty() && hit(number, code)? {
            out.push(Location::new(number, line));
        }
    }
    Ok(out)
}

fn guarded(guard: &LineGuard, unit: &SourceUnit) -> Result<Vec<Location>, MatcherFailure> {
    let re = regex_cache::get(guard.pattern)?;
    let unless_line = regex_cache::get_all(guard.unless_line)?;
    let unless_scope = regex_cache::get_all(guard.unless_scope)?;

    line_hits(unit, |number, line| {
        if !re.is_match(line) || unless_line.iter().any(|u| u.is_match(line)) {
            return Ok(false);
        }
        if unless_scope.is_empty() {
            return Ok(true);
        }
        let exempt = match unit.enclosing_scope(number)? {
            Some(scope) => {
                let signature = unit.code_slice(scope.signature.clone());
                unless_scope.iter().any(|u| u.is_match(signature))
            }
            None => false,
        };
        Ok(!exempt)
    })
}

fn scoped(rule: &ScopeRule, unit: &SourceUnit) -> Result<Vec<Location>, MatcherFailure> {
    let signature = regex_cache::get(rule.signature)?;
    let signature_forbids = regex_cache::get_all(rule.signature_forbids)?;
    let requires = regex_cache::get_all(rule.requires)?;
    let forbids = regex_cache::get_all(rule.forbids)?;
    let source_requires = regex_cache::get_all(rule.source_requires)?;

    if !source_requires.iter().all(|r| r.is_match(unit.code())) {
        return Ok(Vec::new());
    }

    let mut out: Vec<Location> = Vec::new();
    for m in signature.find_iter(unit.code()) {
        let line = unit.line_of(m.start());
        if out.last().is_some_and(|l| l.line == line) {
            continue;
        }
        let Some(block) = unit.block_at(m.start())? else {
            continue;
        };

        let head = unit.code_slice(block.signature());
        let text = unit.code_slice(block.whole());
        if signature_forbids.iter().any(|f| f.is_match(head))
            || !requires.iter().all(|r| r.is_match(text))
            || forbids.iter().any(|f| f.is_match(text))
        {
            continue;
        }
        out.push(Location::new(line, unit.line(line).unwrap_or_default()));
    }
    Ok(out)
}

#[cfg(test)]
use crate::patterns::{Category, Severity};

#[cfg(test)]
fn with_matcher(matcher: Matcher) -> Pattern {
    Pattern {
        matcher,
        ..crate::patterns::test_pattern("sample", Category::Minting, Severity::High)
    }
}

#[test]
fn literal_reports_each_line_once() {
    let unit = SourceUnit::new("a tx.gasprice tx.gasprice\nb\ntx.gasprice");
    let hits = find(&with_matcher(Matcher::Literal("tx.gasprice")), &unit).unwrap();
    let lines: Vec<_> = hits.iter().map(|l| l.line).collect();
    assert_eq!(lines, [1, 3]);
    assert_eq!(hits[0].snippet, "a tx.gasprice tx.gasprice");
}

#[test]
fn long_lines_are_truncated_with_ellipsis() {
    let long = format!("selfdestruct(owner); {}", "x".repeat(400));
    let unit = SourceUnit::new(&long);
    let hits = find(&with_matcher(Matcher::Regex(r"selfdestruct\s*\(")), &unit).unwrap();
    assert_eq!(hits[0].snippet.chars().count(), MAX_SNIPPET_CHARS + 3);
    assert!(hits[0].snippet.ends_with("..."));

    let short = SourceUnit::new("selfdestruct(owner);");
    let hits = find(&with_matcher(Matcher::Regex(r"selfdestruct\s*\(")), &short).unwrap();
    assert_eq!(hits[0].snippet, "selfdestruct(owner);");
}

#[test]
fn guard_suppresses_by_line_and_by_scope() {
    let src = "contract T {\n  constructor() {\n    balances[msg.sender] = 100;\n  }\n  function rig(address a) external {\n    balances[a] = 0;\n    balances[a] = balances[a];\n    // balances[a] = 1;\n  }\n}";
    let unit = SourceUnit::new(src);
    let pattern = with_matcher(Matcher::Guarded(LineGuard {
        pattern: r"\bbalances\[[^\]]+\]\s*=[^=]",
        unless_line: &[r"=\s*balances\["],
        unless_scope: &[r"^\s*constructor\b"],
    }));
    let lines: Vec<_> = find(&pattern, &unit).unwrap().iter().map(|l| l.line).collect();
    assert_eq!(lines, [6]);
}

#[test]
fn scoped_rule_applies_requires_and_forbids() {
    let src = "function a() public onlyOwner {\n  x = 1;\n}\nfunction b() public onlyOwner {\n  require(x < 10);\n}\nfunction c() public {\n  x = 2;\n}\nfunction d() external onlyOwner;";
    let unit = SourceUnit::new(src);
    let pattern = with_matcher(Matcher::Scoped(ScopeRule {
        requires: &[r"\bonlyOwner\b"],
        forbids: &[r"\brequire\s*\("],
        ..ScopeRule::at(r"\bfunction\s+\w+\s*\(")
    }));
    let lines: Vec<_> = find(&pattern, &unit).unwrap().iter().map(|l| l.line).collect();
    assert_eq!(lines, [1]);
}

#[test]
fn scoped_rule_checks_signature_and_source() {
    let src = "contract T {\n  function _mintTo(address a) internal {\n    x = 1;\n  }\n  function mint(address a) external {\n    x = 1;\n  }\n}";
    let unit = SourceUnit::new(src);
    let rule = ScopeRule {
        signature_forbids: &[crate::patterns::NON_EXTERNAL],
        ..ScopeRule::at(r"\bfunction\s+_?\w*[Mm]int\w*\s*\(")
    };
    let hits = find(&with_matcher(Matcher::Scoped(rule)), &unit).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].line, 5);
    assert_eq!(hits[0].snippet, "  function mint(address a) external {");

    let gated = ScopeRule {
        source_requires: &[r"maxSupply"],
        ..rule
    };
    assert!(find(&with_matcher(Matcher::Scoped(gated)), &unit).unwrap().is_empty());
}

#[test]
fn unterminated_block_and_bad_regex_fail() {
    let unit = SourceUnit::new("function mint(address to) public {\n  balances[to] = 1;\n");
    let rule = with_matcher(Matcher::Scoped(ScopeRule::at(r"\bfunction\s+mint\s*\(")));
    assert_eq!(
        find(&rule, &unit),
        Err(MatcherFailure::UnterminatedBlock { line: 1 })
    );

    let bad = with_matcher(Matcher::Regex(r"balances["));
    assert!(matches!(find(&bad, &unit), Err(MatcherFailure::InvalidRegex { .. })));
}

#[test]
fn blank_source_matches_nothing() {
    let unit = SourceUnit::new("   \n\t\n");
    for pattern in crate::patterns::Registry::builtin().unwrap().all() {
        assert!(find(pattern, &unit).unwrap().is_empty(), "{} matched blank input", pattern.id);
    }
}

#[test]
fn comments_and_strings_never_match_line_patterns() {
    let src = "/// @dev never calls selfdestruct(owner) on its own\ncontract T {\n  string constant NOTE = \"selfdestruct(x)\";\n  function f() external { selfdestruct(payable(msg.sender)); }\n}";
    let unit = SourceUnit::new(src);
    let registry = crate::patterns::Registry::builtin().unwrap();
    let pattern = registry.get("selfdestruct").unwrap();
    let hits = find(pattern, &unit).unwrap();
    let lines: Vec<_> = hits.iter().map(|l| l.line).collect();
    assert_eq!(lines, [4]);
    assert_eq!(hits[0].snippet, "  function f() external { selfdestruct(payable(msg.sender)); }");
}

#[test]
fn scoped_conditions_ignore_commented_text() {
    let src = "function a() public { // onlyOwner\n  x = 1;\n}\nfunction b() public onlyOwner {\n  // require(x < 10);\n  x = 2;\n}\n// function c() public onlyOwner {\n//   x = 3;\n// }";
    let unit = SourceUnit::new(src);
    let pattern = with_matcher(Matcher::Scoped(ScopeRule {
        requires: &[r"\bonlyOwner\b"],
        forbids: &[r"\brequire\s*\("],
        ..ScopeRule::at(r"\bfunction\s+\w+\s*\(")
    }));
    let lines: Vec<_> = find(&pattern, &unit).unwrap().iter().map(|l| l.line).collect();
    assert_eq!(lines, [4]);
}
