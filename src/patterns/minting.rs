use crate::patterns::{
    BALANCE_WRITE, Category, LineGuard, Matcher, NON_EXTERNAL, Pattern, ScopeRule, Severity,
};

const MINT_FN: &str = r"\bfunction\s+_?\w*[Mm]int\w*\s*\(";

/// Anything in a mint body that bounds how much can be issued.
const SUPPLY_BOUND: &str = r"(?i)\b(require|assert)\s*\([^;]*\b_?\w*amount\w*\s*<=?|\bif\s*\([^)]*\b_?\w*amount\w*\s*[<>]=?|\b(max_?supply|supply_?cap|max_?mint\w*|mint_?cap|cap)\b|\b(require|assert)\s*\([^;]*totalSupply[^;]*<=?";

/// Functions where balance or supply writes are expected.
const SUPPLY_SCOPES: &[&str] = &[
    r"^\s*constructor\b",
    r"(?i)\bfunction\s+_?\w*(initiali[sz]e|mint|burn)\w*",
];

pub const PATTERNS: &[Pattern] = &[
    // Externally reachable function named *mint* with a body.
    // Suppressed by any amount bound, cap/maxSupply reference or totalSupply
    // comparison in the body. Ignored: internal/private helpers (reached
    // only through other functions) and bodiless interface declarations.
    // A modifier enforcing the cap elsewhere is not seen and yields a false positive.
    Pattern {
        id: "unlimited-minting",
        name: "Unlimited Minting",
        category: Category::Minting,
        severity: Severity::Critical,
        matcher: Matcher::Scoped(ScopeRule {
            signature_forbids: &[NON_EXTERNAL],
            forbids: &[SUPPLY_BOUND],
            ..ScopeRule::at(MINT_FN)
        }),
        description: "Mint function declared on line {line} has no supply cap or amount limit: `{snippet}`.",
        recommendation: "Enforce a maximum supply (e.g. `require(totalSupply + amount <= MAX_SUPPLY)`) or remove public minting.",
    },
    // Standard ERC-20 entry points that also create tokens.
    Pattern {
        id: "hidden-minting",
        name: "Hidden Minting",
        category: Category::Minting,
        severity: Severity::Critical,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[r"\b_mint\s*\(|\.mint\s*\(|\btotalSupply\s*\+=|\b_totalSupply\s*\+="],
            ..ScopeRule::at(r"\bfunction\s+(transfer|transferFrom|approve|_transfer|_approve)\s*\(")
        }),
        description: "Function declared on line {line} silently mints tokens: `{snippet}`.",
        recommendation: "Token creation must only happen in explicit, capped mint functions.",
    },
    Pattern {
        id: "conditional-mass-minting",
        name: "Conditional Mass Minting",
        category: Category::Minting,
        severity: Severity::High,
        matcher: Matcher::Regex(
            r"\b_?balances?(Of)?\s*\[\s*\w+\s*\]\s*\+=\s*(_?totalSupply|\d{7,})|\b_mint\s*\(\s*\w+\s*,\s*_?totalSupply\s*\)|\b_?totalSupply\s*\*=\s*\d+|\b_?balances?(Of)?\s*\[\s*\w+\s*\]\s*=\s*_?totalSupply\b",
        ),
        description: "Large-scale token creation on line {line}: `{snippet}`.",
        recommendation: "Check under which condition this runs and who benefits from it.",
    },
    Pattern {
        id: "total-supply-manipulation",
        name: "Total Supply Manipulation",
        category: Category::Minting,
        severity: Severity::Medium,
        matcher: Matcher::Guarded(LineGuard {
            pattern: r"\b_?totalSupply\s*(\+=\s*\d+|-=\s*\d+|\*=|=\s*[\w(])",
            unless_line: &[r"\b(uint\d*|uint)\s+(public\s+|private\s+|internal\s+)?(constant\s+|immutable\s+)?_?totalSupply\b"],
            unless_scope: SUPPLY_SCOPES,
        }),
        description: "totalSupply is written directly outside mint/burn/constructor on line {line}: `{snippet}`.",
        recommendation: "Supply should only change through audited mint and burn paths.",
    },
    // Applies only when a max-supply variable exists somewhere in the unit:
    // the mint body never refers to it.
    Pattern {
        id: "max-supply-bypass",
        name: "Max Supply Bypass",
        category: Category::Minting,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            signature_forbids: &[NON_EXTERNAL],
            forbids: &[r"(?i)max_?supply|supply_?cap"],
            source_requires: &[r"(?i)\w*max_?supply\w*"],
            ..ScopeRule::at(MINT_FN)
        }),
        description: "A max supply is defined but the mint function on line {line} never checks it.",
        recommendation: "Check the max supply in every mint path.",
    },
    Pattern {
        id: "direct-balance-assignment",
        name: "Direct Balance Assignment",
        category: Category::Minting,
        severity: Severity::High,
        matcher: Matcher::Guarded(LineGuard {
            pattern: BALANCE_WRITE,
            unless_line: &[],
            unless_scope: &[
                r"^\s*constructor\b",
                r"(?i)\bfunction\s+_?\w*(initiali[sz]e|mint|burn|transfer|update)\w*",
            ],
        }),
        description: "Balance overwritten directly on line {line}: `{snippet}`.",
        recommendation: "Balances should only change through transfer, mint and burn logic.",
    },
];
