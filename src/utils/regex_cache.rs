use crate::errors::MatcherFailure;
use regex::Regex;
use std::collections::HashMap;
use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError, RwLock};

static CACHE: Lazy<RwLock<HashMap<&'static str, Arc<Regex>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Return **one shared Arc** to the compiled form of `pattern`.
///
/// Every pattern source is `'static` table data, so each one is compiled at
/// most once per process. Invalid sources are not cached.
pub fn get(pattern: &'static str) -> Result<Arc<Regex>, MatcherFailure> {
    // fast path
    if let Some(re) = CACHE.read().unwrap_or_else(PoisonError::into_inner).get(pattern) {
        return Ok(Arc::clone(re));
    }

    // slow path: compile
    let compiled = Regex::new(pattern).map(Arc::new).map_err(|e| {
        tracing::warn!(pattern, "regex compile error: {e}");
        MatcherFailure::InvalidRegex {
            pattern,
            reason: e.to_string(),
        }
    })?;

    let mut w = CACHE.write().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(w.entry(pattern).or_insert(compiled)))
}

/// Compile every source in `patterns`, failing on the first invalid one.
pub fn get_all(patterns: &[&'static str]) -> Result<Vec<Arc<Regex>>, MatcherFailure> {
    patterns.iter().map(|p| get(p)).collect()
}

#[test]
fn same_source_shares_one_compiled_regex() {
    let a = get(r"\bonlyOwner\b").unwrap();
    let b = get(r"\bonlyOwner\b").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(a.is_match("function f() public onlyOwner {"));
}

#[test]
fn invalid_source_is_a_matcher_failure() {
    let err = get(r"(unclosed").unwrap_err();
    assert!(matches!(err, MatcherFailure::InvalidRegex { pattern: "(unclosed", .. }));
    assert!(get_all(&[r"ok", r"[bad"]).is_err());
    assert_eq!(get_all(&[r"a", r"b"]).unwrap().len(), 2);
}
