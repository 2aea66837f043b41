pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::ExecError;
pub use types::{BlockOutcome, CodeBlock, ExecutionRequest, Language, LanguageProfile, Strategy};
