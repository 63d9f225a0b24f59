use crate::patterns::{Category, LineGuard, Matcher, OWNER_GATE, Pattern, ScopeRule, Severity};

const FEE_SETTER: &str = r"\bfunction\s+(set|update|change)\w*(Tax|tax|Fee|fee)\w*\s*\(";

/// Numeric upper bound on the new fee value.
const FEE_BOUND: &str = r"\b(require|assert)\s*\([^;]*<=?\s*(\d+|_?[A-Z][A-Z0-9_]*|max\w*)|\bif\s*\([^)]*[<>]=?\s*\d+";

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        id: "extreme-fee",
        name: "Extreme Fee Rate",
        category: Category::Fee,
        severity: Severity::High,
        matcher: Matcher::Regex(r"(?i)\b\w*(tax|fee)\w*\s*=\s*(9[0-9]|100)\s*;"),
        description: "Fee or tax of 90% or more set on line {line}: `{snippet}`.",
        recommendation: "A fee this high confiscates almost every transfer. Do not trade this token.",
    },
    // Owner can change fees and the setter never bounds the value.
    // Any numeric or constant upper bound in the body suppresses the finding.
    Pattern {
        id: "unbounded-fee-setter",
        name: "Dynamic Fee Manipulation",
        category: Category::Fee,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[OWNER_GATE],
            forbids: &[FEE_BOUND],
            ..ScopeRule::at(FEE_SETTER)
        }),
        description: "Owner-controlled fee setter on line {line} accepts any value: `{snippet}`.",
        recommendation: "Cap fees with a hard-coded maximum (e.g. `require(newFee <= 10)`).",
    },
    // Same setter shape without the owner requirement; overlaps with
    // `unbounded-fee-setter` on owner-gated setters and loses to it.
    Pattern {
        id: "fee-setter-without-limit",
        name: "No Fee Limit",
        category: Category::Fee,
        severity: Severity::Medium,
        matcher: Matcher::Scoped(ScopeRule {
            forbids: &[FEE_BOUND],
            ..ScopeRule::at(FEE_SETTER)
        }),
        description: "Fee setter on line {line} has no upper limit.",
        recommendation: "Add an upper bound check on the new fee.",
    },
    Pattern {
        id: "fee-missing-divisor",
        name: "Fee Calculation Error",
        category: Category::Fee,
        severity: Severity::Low,
        matcher: Matcher::Guarded(LineGuard {
            pattern: r"\b\w+\s*\*\s*_?\w*(Tax|tax|Fee|fee)\w*\b",
            unless_line: &[r"/"],
            unless_scope: &[],
        }),
        description: "Fee multiplied on line {line} without a percentage divisor: `{snippet}`.",
        recommendation: "Divide by the fee denominator (100 or 10000) when computing fees.",
    },
];
