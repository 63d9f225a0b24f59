use crate::patterns::{Category, Matcher, Pattern, ScopeRule, Severity};

pub const PATTERNS: &[Pattern] = &[
    // Unconditional loop with no way out of its body.
    Pattern {
        id: "infinite-loop",
        name: "Infinite Loop",
        category: Category::Gas,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            forbids: &[r"\b(break|return|revert)\b"],
            ..ScopeRule::at(r"\bwhile\s*\(\s*(true|1\s*==\s*1)\s*\)|\bfor\s*\([^;]*;\s*(true|1\s*==\s*1)?\s*;[^)]*\)")
        }),
        description: "Loop on line {line} has no exit condition: `{snippet}`.",
        recommendation: "Any call reaching this loop runs out of gas.",
    },
    Pattern {
        id: "gas-bomb",
        name: "Gas Bomb",
        category: Category::Gas,
        severity: Severity::Medium,
        matcher: Matcher::Regex(
            r"\bfor\s*\([^;]*;\s*\w+\s*<=?\s*\d{4,}|\bwhile\s*\([^)]*<=?\s*\d{4,}|\bnew\s+\w+\[\]\s*\(\s*\d{4,}|\bnew\s+bytes\s*\(\s*\d{4,}",
        ),
        description: "Large fixed iteration or allocation on line {line}: `{snippet}`.",
        recommendation: "Loops and allocations of this size can make functions uncallable.",
    },
    // External call followed later in the same function by a balance write.
    // A `nonReentrant` guard anywhere in the function suppresses it.
    Pattern {
        id: "reentrancy-after-call",
        name: "Reentrancy Vulnerability",
        category: Category::Gas,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[r"(?s)\.call(\{[^}]*\})?\s*\(.*\b_?balances?(Of)?\s*\[[^\]]+\]\s*[-+]?=[^=]"],
            forbids: &[r"\bnonReentrant\b"],
            ..ScopeRule::at(r"\bfunction\s+\w+\s*\(")
        }),
        description: "Function declared on line {line} updates balances after an external call.",
        recommendation: "Apply checks-effects-interactions or a reentrancy guard.",
    },
    Pattern {
        id: "gas-price-dependency",
        name: "Execution Order Dependency",
        category: Category::Gas,
        severity: Severity::Low,
        matcher: Matcher::Literal("tx.gasprice"),
        description: "Logic depends on the transaction gas price (line {line}): `{snippet}`.",
        recommendation: "Gas-price checks are a common way to single out bots or ordinary buyers.",
    },
];
