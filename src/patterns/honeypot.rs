use crate::patterns::{ALWAYS_FALSE, Category, Matcher, OWNER_GATE, Pattern, ScopeRule, Severity};

const TRANSFER_FN: &str = r"\bfunction\s+(transfer|transferFrom)\s*\(";

pub const PATTERNS: &[Pattern] = &[
    // Transfer body contains a condition that always fails.
    // Ignored: conditional reverts (`if (..) revert`), those are ordinary guards.
    Pattern {
        id: "disabled-transfer",
        name: "Disabled Transfer Function",
        category: Category::Honeypot,
        severity: Severity::Critical,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[ALWAYS_FALSE],
            ..ScopeRule::at(TRANSFER_FN)
        }),
        description: "Transfer function declared on line {line} can never succeed: `{snippet}`.",
        recommendation: "Holders cannot move or sell tokens. Treat the token as a honeypot.",
    },
    // Confidence rises when the owner check sits in the transfer path itself;
    // an owner-gated *admin* transfer with another name is not matched.
    Pattern {
        id: "owner-only-transfer",
        name: "Owner-Only Transfer",
        category: Category::Honeypot,
        severity: Severity::Critical,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[OWNER_GATE],
            ..ScopeRule::at(TRANSFER_FN)
        }),
        description: "Only the owner can execute the transfer declared on line {line}.",
        recommendation: "Remove owner restrictions from the ERC-20 transfer path.",
    },
    Pattern {
        id: "blacklist-mapping",
        name: "Blacklist System",
        category: Category::Honeypot,
        severity: Severity::High,
        matcher: Matcher::Regex(
            r"(?i)mapping\s*\(\s*address\s*=>\s*bool\s*\)\s*(public\s+|private\s+|internal\s+)?\w*(blacklist|banned|blocked|isbot|sniper)\w*",
        ),
        description: "Address blacklist declared: `{snippet}`.",
        recommendation: "Verify who can add addresses and whether blacklisted holders can still sell.",
    },
    Pattern {
        id: "whitelist-gate",
        name: "Whitelist Only System",
        category: Category::Honeypot,
        severity: Severity::Medium,
        matcher: Matcher::Regex(
            r"\brequire\s*\(\s*!?\s*_?\w*(?i:whitelist|allowed|authorized)\w*\s*\[",
        ),
        description: "Transfers gated on an allow-list on line {line}: `{snippet}`.",
        recommendation: "Confirm ordinary holders are not excluded from transfers.",
    },
    // Restriction on the DEX pair/router inside a transfer path.
    // Ignored: contracts that never name a pair or router.
    Pattern {
        id: "sell-path-block",
        name: "Sell-Path Block",
        category: Category::Honeypot,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[
                r"(?i)\b(require\s*\([^;]*\b(to|recipient)\s*!=\s*\w*(pair|router|pool)\w*|require\s*\([^;]*\b(sellenabled|canSell|sellingallowed)\b|if\s*\([^)]*\b(to|recipient)\s*==\s*\w*(pair|router|pool)\w*[^)]*\)\s*\{?\s*(revert|return\s+false))",
            ],
            source_requires: &[r"(?i)\w*(pair|router|uniswap|pancake)\w*"],
            ..ScopeRule::at(r"\bfunction\s+_?\w*[Tt]ransfer\w*\s*\(")
        }),
        description: "Transfer function on line {line} blocks transfers to the DEX pair, which prevents selling.",
        recommendation: "Do not buy: tokens can be bought but not sold back to the pool.",
    },
    Pattern {
        id: "time-lock",
        name: "Time-based Lock",
        category: Category::Honeypot,
        severity: Severity::Low,
        matcher: Matcher::Regex(r"\brequire\s*\(\s*(block\.timestamp|now|block\.number)\s*[<>]=?\s*\w+"),
        description: "Time or block based lock on line {line}: `{snippet}`.",
        recommendation: "Check who controls the unlock time and whether it can be extended.",
    },
    Pattern {
        id: "unrealistic-min-sell",
        name: "Unrealistic Minimum Sell Amount",
        category: Category::Honeypot,
        severity: Severity::High,
        matcher: Matcher::Regex(r"\brequire\s*\(\s*_?amount\s*>=\s*\d{9,}|\bminSellAmount\s*=\s*\d{9,}"),
        description: "Minimum transfer amount of at least 100,000,000 units on line {line}.",
        recommendation: "A huge minimum sell amount effectively blocks selling for most holders.",
    },
];
