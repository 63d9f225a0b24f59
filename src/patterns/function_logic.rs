use crate::patterns::{Category, Matcher, Pattern, ScopeRule, Severity};

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        id: "impossible-condition",
        name: "Impossible Condition",
        category: Category::FunctionLogic,
        severity: Severity::High,
        matcher: Matcher::Regex(r"\b(require|assert|if)\s*\(\s*(false|1\s*==\s*2|0\s*==\s*1)\s*[,)]"),
        description: "Condition on line {line} can never be true: `{snippet}`.",
        recommendation: "Code behind an always-false condition is either dead or a trap. Find out which.",
    },
    Pattern {
        id: "time-based-trap",
        name: "Time-based Trap",
        category: Category::FunctionLogic,
        severity: Severity::High,
        matcher: Matcher::Regex(r"\b(require|if)\s*\(\s*(block\.timestamp|block\.number|now)\s*==\s*\d+"),
        description: "Logic on line {line} only works at one exact timestamp or block: `{snippet}`.",
        recommendation: "Exact time equality is practically unreachable. Treat the guarded path as disabled.",
    },
    Pattern {
        id: "hardcoded-address-logic",
        name: "Address-based Logic",
        category: Category::FunctionLogic,
        severity: Severity::High,
        matcher: Matcher::Regex(r"\b(require|if)\s*\(\s*(msg\.sender|tx\.origin)\s*==\s*0x[a-fA-F0-9]{40}"),
        description: "Behaviour on line {line} depends on one hard-coded address: `{snippet}`.",
        recommendation: "Identify the hard-coded address; it is usually a hidden privileged account.",
    },
    // A reassuring name hiding destructive operations in the body.
    Pattern {
        id: "misleading-function-name",
        name: "Misleading Function Name",
        category: Category::FunctionLogic,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[
                r"\b(selfdestruct|suicide)\s*\(|\bassembly\s*\{|\.delegatecall\s*\(|address\s*\(\s*this\s*\)\.balance",
            ],
            ..ScopeRule::at(r"\bfunction\s+(safe|secure|verified|trusted)\w*\s*\(")
        }),
        description: "Function declared on line {line} has a safe-sounding name but destructive logic: `{snippet}`.",
        recommendation: "Read the body, not the name.",
    },
    // Body is empty or only returns; comments are not stripped, so a body
    // holding only a comment is not matched.
    Pattern {
        id: "dummy-security-function",
        name: "Dummy Security Function",
        category: Category::FunctionLogic,
        severity: Severity::Medium,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[r"\{\s*(return\s*(true)?\s*;)?\s*\}$"],
            ..ScopeRule::at(r"\bfunction\s+\w*(?i:security|verify|validate|check|audit)\w*\s*\(")
        }),
        description: "Security-named function declared on line {line} does nothing.",
        recommendation: "A no-op check gives a false sense of safety. Implement it or remove it.",
    },
    Pattern {
        id: "malicious-fallback",
        name: "Malicious Fallback Function",
        category: Category::FunctionLogic,
        severity: Severity::Critical,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[r"\b(selfdestruct|suicide)\s*\(|\bassembly\s*\{|\b_mint\s*\(|\b_?balances?(Of)?\s*\[[^\]]+\]\s*=[^=]"],
            ..ScopeRule::at(r"\b(fallback|receive)\s*\(\s*\)")
        }),
        description: "fallback/receive on line {line} mints, rewrites balances or self-destructs.",
        recommendation: "Plain ether transfers must not trigger state-changing logic like this.",
    },
];

