use thiserror::Error;

pub type TripwireResult<T, E = TripwireError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TripwireError {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("config error: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("thread-pool error: {0}")]
  ThreadPool(#[from] rayon::ThreadPoolBuildError),

  #[error("duplicate pattern id `{id}`")]
  DuplicatePattern { id: &'static str },

  #[error("unknown category `{0}`")]
  UnknownCategory(String),

  #[error("other: {0}")]
  Other(String),
}

/// Failure of a single pattern's matcher. Never fatal to a scan: the
/// orchestrator records it as a skipped pattern and keeps going.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatcherFailure {
  #[error("invalid regex `{pattern}`: {reason}")]
  InvalidRegex { pattern: &'static str, reason: String },

  #[error("unterminated block opened on line {line}")]
  UnterminatedBlock { line: usize },
}
