use crate::patterns::{
    BALANCE_WRITE, Category, Matcher, NON_EXTERNAL, OWNER_GATE, Pattern, ScopeRule, Severity,
};

pub const PATTERNS: &[Pattern] = &[
    // Owner-gated, externally reachable function that overwrites a balance.
    // Mint-named functions are left to the minting table.
    Pattern {
        id: "owner-balance-manipulation",
        name: "Balance Manipulation",
        category: Category::AccessControl,
        severity: Severity::Critical,
        matcher: Matcher::Scoped(ScopeRule {
            signature_forbids: &[NON_EXTERNAL, r"\bfunction\s+_?\w*[Mm]int\w*"],
            requires: &[OWNER_GATE, BALANCE_WRITE],
            ..ScopeRule::at(r"\bfunction\s+\w+\s*\(")
        }),
        description: "Owner can overwrite arbitrary balances through the function on line {line}: `{snippet}`.",
        recommendation: "Remove any owner path that assigns balances directly.",
    },
    Pattern {
        id: "seize-or-freeze",
        name: "Excessive Owner Powers",
        category: Category::AccessControl,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[OWNER_GATE],
            ..ScopeRule::at(r"\bfunction\s+\w*(?i:seize|freeze|blockaddress|blockuser|ban)\w*\s*\(")
        }),
        description: "Owner can seize, freeze or ban accounts via the function on line {line}: `{snippet}`.",
        recommendation: "Such powers let the owner lock any holder out. Require governance or remove them.",
    },
    // Owner-only function that moves the contract's own funds.
    Pattern {
        id: "emergency-withdrawal",
        name: "Emergency Withdrawal",
        category: Category::AccessControl,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[
                OWNER_GATE,
                r"address\s*\(\s*this\s*\)\.balance|\.transfer\s*\(|\.call\s*\{|\bbalanceOf\s*\(\s*address\s*\(\s*this\s*\)\s*\)",
            ],
            ..ScopeRule::at(r"\bfunction\s+\w*(?i:emergency|rescue|withdraw|drain|sweep)\w*\s*\(")
        }),
        description: "Owner can drain contract funds through the function on line {line}: `{snippet}`.",
        recommendation: "Restrict withdrawals to accounting-tracked amounts or put them behind a timelock.",
    },
    Pattern {
        id: "pause-abuse",
        name: "Contract Pause Abuse",
        category: Category::AccessControl,
        severity: Severity::Medium,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[OWNER_GATE],
            ..ScopeRule::at(r"\bfunction\s+(pause|_?set\w*[Pp]aused?|toggle\w*[Pp]ause\w*)\s*\(")
        }),
        description: "Owner can halt all transfers with the function on line {line}.",
        recommendation: "Bound pause duration or make unpausing permissionless after a delay.",
    },
    // Fires when the body never clears the owner.
    Pattern {
        id: "broken-renounce-ownership",
        name: "Broken Renounce Ownership",
        category: Category::AccessControl,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            forbids: &[
                r"\b_?owner\s*=\s*address\s*\(\s*0\s*\)|\bdelete\s+_?owner\b|\b_(transfer|set)Owner(ship)?\s*\(\s*address\s*\(\s*0\s*\)\s*\)",
            ],
            ..ScopeRule::at(r"\bfunction\s+renounceOwnership\s*\(")
        }),
        description: "renounceOwnership on line {line} does not actually give up ownership.",
        recommendation: "Set the owner to address(0) and emit OwnershipTransferred.",
    },
    Pattern {
        id: "tx-origin-auth",
        name: "tx.origin Authorization",
        category: Category::AccessControl,
        severity: Severity::High,
        matcher: Matcher::Regex(r"\b(require|if)\s*\(\s*tx\.origin\s*==|==\s*tx\.origin\b"),
        description: "Authorization based on tx.origin on line {line}: `{snippet}`.",
        recommendation: "Use msg.sender; tx.origin checks can be phished through intermediate contracts.",
    },
];
