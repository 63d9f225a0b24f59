use crate::patterns::{Category, Matcher, Pattern, ScopeRule, Severity};

const ASSEMBLY: &str = r#"\bassembly\s*(\(\s*"[^"]*"\s*\)\s*)?\{"#;

pub const PATTERNS: &[Pattern] = &[
    // Raw storage writes bypass every Solidity-level invariant.
    Pattern {
        id: "assembly-sstore",
        name: "Direct Storage Manipulation",
        category: Category::LowLevel,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[r"\bsstore\s*\("],
            ..ScopeRule::at(ASSEMBLY)
        }),
        description: "Assembly block on line {line} writes storage slots directly.",
        recommendation: "Audit every slot written; raw sstore can rewrite balances or the owner.",
    },
    Pattern {
        id: "assembly-dangerous-op",
        name: "Suspicious Inline Assembly",
        category: Category::LowLevel,
        severity: Severity::High,
        matcher: Matcher::Scoped(ScopeRule {
            requires: &[r"(?i)\b(delegatecall|selfdestruct|suicide|callcode)\b"],
            ..ScopeRule::at(ASSEMBLY)
        }),
        description: "Assembly block on line {line} performs delegatecall or selfdestruct.",
        recommendation: "Replace with audited high-level calls or document why assembly is required.",
    },
    Pattern {
        id: "memory-manipulation",
        name: "Memory Manipulation",
        category: Category::LowLevel,
        severity: Severity::Low,
        matcher: Matcher::Regex(r"\b(mstore|mload|returndatacopy|codecopy)\s*\("),
        description: "Raw memory operation on line {line}: `{snippet}`.",
        recommendation: "Review the assembly for memory-safety assumptions.",
    },
    Pattern {
        id: "storage-slot-write",
        name: "Direct Storage Access",
        category: Category::LowLevel,
        severity: Severity::High,
        matcher: Matcher::Regex(r"\.(slot|offset)\s*:?=[^=]"),
        description: "Storage pointer slot reassigned on line {line}: `{snippet}`.",
        recommendation: "Pointing storage references at arbitrary slots can overwrite any state variable.",
    },
    Pattern {
        id: "delegatecall",
        name: "Delegate Call",
        category: Category::LowLevel,
        severity: Severity::High,
        matcher: Matcher::Regex(r"\.delegatecall\s*\("),
        description: "delegatecall on line {line} runs foreign code with this contract's storage.",
        recommendation: "Only delegatecall into fixed, audited targets.",
    },
];
