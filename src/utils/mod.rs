pub mod config;
pub mod ext;
pub mod regex_cache;

// Re-export commonly used items for convenience
pub use config::{Config, OutputFormat};
pub use ext::is_solidity;
