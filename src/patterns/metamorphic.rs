use crate::patterns::{Category, Matcher, OWNER_GATE, Pattern, ScopeRule, Severity};

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        id: "selfdestruct",
        name: "Self Destruct Function",
        category: Category::Metamorphic,
        severity: Severity::High,
        matcher: Matcher::Regex(r"\b(selfdestruct|suicide)\s*\("),
        description: "Contract can destroy itself (line {line}): `{snippet}`.",
        recommendation: "Remove selfdestruct; combined with CREATE2 it allows redeploying different code.",
    },
    // Owner-gated upgrade without any delay mechanism in the body.
    Pattern {
        id: "unlimited-upgrade",
        name: "Unlimited Upgrades",
        category: Category::Metamorphic,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[OWNER_GATE],
            forbids: &[r"(?i)timelock|delay|block\.timestamp\s*>"],
            ..ScopeRule::at(r"\bfunction\s+(\w*[Uu]pgrade\w*|setImplementation)\s*\(")
        }),
        description: "Owner can swap the contract logic instantly via the function on line {line}.",
        recommendation: "Put upgrades behind a timelock or governance vote.",
    },
    Pattern {
        id: "proxy-implementation-change",
        name: "Proxy Implementation Change",
        category: Category::Metamorphic,
        severity: Severity::Medium,
        matcher: Matcher::Regex(r"\b_?implementation\s*=\s*[\w(]"),
        description: "Proxy implementation is reassigned on line {line}: `{snippet}`.",
        recommendation: "Make sure implementation changes are access-controlled and announced.",
    },
    Pattern {
        id: "create2-deployment",
        name: "CREATE2 Usage",
        category: Category::Metamorphic,
        severity: Severity::Medium,
        matcher: Matcher::Regex(r"(?i)\bcreate2\s*\(|Clones\.cloneDeterministic"),
        description: "Deterministic deployment with CREATE2 on line {line}: `{snippet}`.",
        recommendation: "CREATE2 plus selfdestruct enables metamorphic contracts. Verify the deployed code cannot change.",
    },
];
