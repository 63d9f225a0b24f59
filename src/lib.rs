//! Static scanner for malicious and vulnerable patterns in Solidity source.
//!
//! ```no_run
//! use tripwire::{AnalysisResult, Registry, ScanOptions};
//!
//! let registry = Registry::builtin()?;
//! let source = std::fs::read_to_string("Token.sol")?;
//! let result = AnalysisResult::analyze(&registry, &source, &ScanOptions::default());
//! println!("{}", result.risk_assessment().deployment_recommendation);
//! # Ok::<(), tripwire::errors::TripwireError>(())
//! ```

pub mod aggregate;
pub mod errors;
pub mod matcher;
pub mod patterns;
pub mod report;
pub mod scan;
pub mod source;
pub mod utils;
pub mod walk;

pub use aggregate::{Aggregate, Recommendation, RiskAssessment, RiskLevel, Summary};
pub use errors::{MatcherFailure, TripwireError, TripwireResult};
pub use patterns::{Category, Pattern, Registry, Severity};
pub use report::AnalysisResult;
pub use scan::{Finding, ScanOptions, ScanOutcome, Scanner};
pub use source::SourceUnit;
