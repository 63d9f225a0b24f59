use crate::patterns::{ALWAYS_FALSE, Category, Matcher, OWNER_GATE, Pattern, ScopeRule, Severity};

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        id: "hardcoded-price",
        name: "Hardcoded Price",
        category: Category::Economic,
        severity: Severity::Low,
        matcher: Matcher::Regex(r"\b(price|rate|exchangeRate)\s*=\s*\d+"),
        description: "Price or rate hard-coded on line {line}: `{snippet}`.",
        recommendation: "Fixed prices ignore the market. Check who can change them.",
    },
    Pattern {
        id: "manipulable-oracle",
        name: "Manipulable Oracle",
        category: Category::Economic,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[OWNER_GATE],
            ..ScopeRule::at(r"\bfunction\s+(set|update)(Price|Oracle|Rate)\w*\s*\(")
        }),
        description: "Owner sets the price feed directly via the function on line {line}.",
        recommendation: "Use a decentralised oracle; an owner-set price can drain pools.",
    },
    Pattern {
        id: "liquidity-withdrawal",
        name: "Liquidity Withdrawal",
        category: Category::Economic,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[OWNER_GATE],
            ..ScopeRule::at(r"\bfunction\s+(remove|withdraw|pull)Liquidity\w*\s*\(")
        }),
        description: "Owner can pull liquidity through the function on line {line}.",
        recommendation: "Lock LP tokens with a third-party locker before trading.",
    },
    Pattern {
        id: "lp-token-to-owner",
        name: "LP Tokens Sent To Owner",
        category: Category::Economic,
        severity: Severity::High,
        matcher: Matcher::Regex(r"\b(lpToken|pair|lpPair)\w*\.transfer\s*\(\s*_?owner\b"),
        description: "LP tokens are transferred to the owner on line {line}: `{snippet}`.",
        recommendation: "The owner can remove liquidity at will (rug pull risk).",
    },
    // Exit functions that can never complete.
    Pattern {
        id: "staking-lock",
        name: "Staking Lock",
        category: Category::Economic,
        severity: Severity::Critical,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[ALWAYS_FALSE],
            ..ScopeRule::at(r"\bfunction\s+(withdraw|unstake|claim|exit)\w*\s*\(")
        }),
        description: "Exit function declared on line {line} always reverts; staked funds cannot be withdrawn.",
        recommendation: "Do not deposit: funds are locked permanently.",
    },
];
