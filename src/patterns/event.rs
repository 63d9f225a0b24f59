use crate::patterns::{Category, Matcher, Pattern, ScopeRule, Severity};

pub const PATTERNS: &[Pattern] = &[
    // An internal `_mint`/`_burn` call counts as emitting, since the
    // standard helpers emit Transfer themselves.
    Pattern {
        id: "missing-mint-event",
        name: "Missing Event",
        category: Category::Event,
        severity: Severity::Low,
        matcher: Matcher::Scoped(ScopeRule {
            forbids: &[r"\bemit\s+(Mint|Transfer)\b|\b_mint\s*\("],
            ..ScopeRule::at(r"\bfunction\s+mint\s*\(")
        }),
        description: "mint on line {line} changes supply without emitting Mint or Transfer.",
        recommendation: "Emit Transfer(address(0), to, amount) so indexers can track supply.",
    },
    Pattern {
        id: "missing-burn-event",
        name: "Missing Event",
        category: Category::Event,
        severity: Severity::Low,
        matcher: Matcher::Scoped(ScopeRule {
            forbids: &[r"\bemit\s+(Burn|Transfer)\b|\b_burn\s*\("],
            ..ScopeRule::at(r"\bfunction\s+burn\s*\(")
        }),
        description: "burn on line {line} changes supply without emitting Burn or Transfer.",
        recommendation: "Emit Transfer(from, address(0), amount).",
    },
    Pattern {
        id: "missing-ownership-event",
        name: "Missing Event",
        category: Category::Event,
        severity: Severity::Low,
        matcher: Matcher::Scoped(ScopeRule {
            forbids: &[r"\bemit\s+OwnershipTransferred\b|\b_(transfer|set)Owner(ship)?\s*\("],
            ..ScopeRule::at(r"\bfunction\s+transferOwnership\s*\(")
        }),
        description: "transferOwnership on line {line} does not emit OwnershipTransferred.",
        recommendation: "Emit OwnershipTransferred so ownership changes are visible on-chain.",
    },
    // Transfer emitted from a function that never touches balances.
    Pattern {
        id: "misleading-transfer-event",
        name: "Misleading Transfer Event",
        category: Category::Event,
        severity: Severity::Medium,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[r"\bemit\s+Transfer\s*\("],
            forbids: &[r"\b_?balances?(Of)?\s*\[[^\]]+\]\s*[-+]?=|\b_(transfer|mint|burn|update)\s*\("],
            ..ScopeRule::at(r"\bfunction\s+\w+\s*\(")
        }),
        description: "Function declared on line {line} emits Transfer without moving any balance.",
        recommendation: "Fake Transfer events mislead explorers and wallets (airdrop spoofing).",
    },
    Pattern {
        id: "fake-success-event",
        name: "Fake Success Event",
        category: Category::Event,
        severity: Severity::Medium,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[
                r"\bemit\s+(Success|Completed|Finished|Done)\b",
                r"\brequire\s*\(\s*false\s*\)|\brevert\s*\(|\breturn\s+false\b",
            ],
            ..ScopeRule::at(r"\bfunction\s+\w+\s*\(")
        }),
        description: "Function on line {line} emits a success event on a path that can fail.",
        recommendation: "Only emit success events after the operation has actually succeeded.",
    },
];
