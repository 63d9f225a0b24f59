use crate::patterns::{Category, Matcher, Pattern, ScopeRule, Severity};

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        id: "transfer-returns-false",
        name: "Transfer Function Manipulation",
        category: Category::StandardViolation,
        severity: Severity::Medium,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[r"\breturn\s+false\s*;"],
            ..ScopeRule::at(r"\bfunction\s+(transfer|transferFrom)\s*\(")
        }),
        description: "transfer declared on line {line} can return false instead of reverting.",
        recommendation: "Callers that ignore the return value will think the transfer succeeded.",
    },
    // approve that never touches any allowance storage.
    Pattern {
        id: "approve-without-allowance",
        name: "Approve Function Manipulation",
        category: Category::StandardViolation,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            forbids: &[r"\b_?(allowances?|allowed)\s*\[|\b_approve\s*\("],
            ..ScopeRule::at(r"\bfunction\s+approve\s*\(")
        }),
        description: "approve declared on line {line} never records an allowance.",
        recommendation: "A non-functional approve breaks DEX and wallet integrations.",
    },
    Pattern {
        id: "balance-inconsistency",
        name: "Balance Inconsistency",
        category: Category::StandardViolation,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[r"\breturn\s+(\d+|_?totalSupply)\s*;"],
            ..ScopeRule::at(r"\bfunction\s+balanceOf\s*\(")
        }),
        description: "balanceOf declared on line {line} returns a fixed value instead of the holder's balance.",
        recommendation: "Displayed balances are fake. Treat the token as a scam.",
    },
];
