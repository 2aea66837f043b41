use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution strategy selected per language
///
/// - `Compiled`: write to disk, compile-and-run, capture output
/// - `Markup`: write to disk, open for preview in the host environment
/// - `Interactive`: submit to a long-lived kernel session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Compiled,
    Markup,
    Interactive,
}

/// Strongly-typed language enum
/// This is the single source of truth for the supported language set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    R,
    Java,
    Cpp,
    C,
    Html,
    Css,
}

/// Static per-language execution profile
///
/// Loaded once at startup (baked into the binary), immutable thereafter.
/// `kernel_name` is set only for `Interactive` languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile {
    pub strategy: Strategy,
    pub file_extension: &'static str,
    pub kernel_name: Option<&'static str>,
}

impl Language {
    /// Returns all language variants
    pub fn all_variants() -> &'static [Language] {
        &[
            Language::Python,
            Language::Javascript,
            Language::R,
            Language::Java,
            Language::Cpp,
            Language::C,
            Language::Html,
            Language::Css,
        ]
    }

    /// Parse a language from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Language> {
        match s.to_lowercase().as_str() {
            "python" => Some(Language::Python),
            "javascript" => Some(Language::Javascript),
            "r" => Some(Language::R),
            "java" => Some(Language::Java),
            "cpp" => Some(Language::Cpp),
            "c" => Some(Language::C),
            "html" => Some(Language::Html),
            "css" => Some(Language::Css),
            _ => None,
        }
    }

    /// Classify this language into its execution profile
    ///
    /// Pure lookup: no state, deterministic, total over the enum.
    pub fn profile(&self) -> LanguageProfile {
        match self {
            Language::Python => LanguageProfile {
                strategy: Strategy::Interactive,
                file_extension: ".py",
                kernel_name: Some("python3"),
            },
            Language::Javascript => LanguageProfile {
                strategy: Strategy::Interactive,
                file_extension: ".js",
                kernel_name: Some("javascript"),
            },
            Language::R => LanguageProfile {
                strategy: Strategy::Interactive,
                file_extension: ".R",
                kernel_name: Some("ir"),
            },
            Language::Java => LanguageProfile {
                strategy: Strategy::Compiled,
                file_extension: ".java",
                kernel_name: None,
            },
            Language::Cpp => LanguageProfile {
                strategy: Strategy::Compiled,
                file_extension: ".cpp",
                kernel_name: None,
            },
            Language::C => LanguageProfile {
                strategy: Strategy::Compiled,
                file_extension: ".c",
                kernel_name: None,
            },
            Language::Html => LanguageProfile {
                strategy: Strategy::Markup,
                file_extension: ".html",
                kernel_name: None,
            },
            Language::Css => LanguageProfile {
                strategy: Strategy::Markup,
                file_extension: ".html",
                kernel_name: None,
            },
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Python => write!(f, "python"),
            Language::Javascript => write!(f, "javascript"),
            Language::R => write!(f, "r"),
            Language::Java => write!(f, "java"),
            Language::Cpp => write!(f, "cpp"),
            Language::C => write!(f, "c"),
            Language::Html => write!(f, "html"),
            Language::Css => write!(f, "css"),
        }
    }
}

/// Execution Request (Immutable)
///
/// One per call. `language` stays a raw string so unknown languages reach
/// the orchestrator and come back as an unsupported-language failure rather
/// than a deserialization error.
///
/// ## Ordered Execution Semantics:
/// - `execute_in_order = true` appends the snippet to the per-language
///   history and executes the whole accumulated program
/// - `execute_in_order = false` executes the snippet alone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub block_id: String,
    #[serde(default)]
    pub execute_in_order: bool,
}

/// One user-visible unit of code in a batch request
///
/// Both fields are optional on the wire: blocks missing either are skipped
/// with a logged warning, not failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub block_id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Normalized per-block outcome
///
/// Exactly one variant populated; serializes as `{"output": ...}` or
/// `{"error": ...}` to match the response contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockOutcome {
    Success { output: String },
    Failure { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_serialization() {
        let lang = Language::Python;
        let json = serde_json::to_string(&lang).unwrap();
        assert_eq!(json, "\"python\"");

        let deserialized: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, Language::Python);
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!(Language::from_str("python"), Some(Language::Python));
        assert_eq!(Language::from_str("Python"), Some(Language::Python));
        assert_eq!(Language::from_str("CPP"), Some(Language::Cpp));
        assert_eq!(Language::from_str("r"), Some(Language::R));

        assert_eq!(Language::from_str("ruby"), None);
        assert_eq!(Language::from_str(""), None);
    }

    #[test]
    fn test_language_all_variants() {
        let variants = Language::all_variants();
        assert_eq!(variants.len(), 8);
        assert!(variants.contains(&Language::Python));
        assert!(variants.contains(&Language::Css));
    }

    #[test]
    fn test_strategy_mapping() {
        assert_eq!(Language::Python.profile().strategy, Strategy::Interactive);
        assert_eq!(Language::Javascript.profile().strategy, Strategy::Interactive);
        assert_eq!(Language::R.profile().strategy, Strategy::Interactive);
        assert_eq!(Language::Java.profile().strategy, Strategy::Compiled);
        assert_eq!(Language::Cpp.profile().strategy, Strategy::Compiled);
        assert_eq!(Language::C.profile().strategy, Strategy::Compiled);
        assert_eq!(Language::Html.profile().strategy, Strategy::Markup);
        assert_eq!(Language::Css.profile().strategy, Strategy::Markup);
    }

    #[test]
    fn test_classification_is_pure() {
        // Repeated calls yield the identical profile
        let first = Language::Java.profile();
        let second = Language::Java.profile();
        assert_eq!(first, second);
        assert_eq!(first.file_extension, ".java");
        assert_eq!(first.kernel_name, None);
    }

    #[test]
    fn test_interactive_profiles_carry_kernel_names() {
        assert_eq!(Language::Python.profile().kernel_name, Some("python3"));
        assert_eq!(Language::Javascript.profile().kernel_name, Some("javascript"));
        assert_eq!(Language::R.profile().kernel_name, Some("ir"));
    }

    #[test]
    fn test_css_previews_as_html_document() {
        assert_eq!(Language::Css.profile().file_extension, ".html");
    }

    #[test]
    fn test_execution_request_defaults() {
        let json = r#"{"language": "python", "code": "1+1", "block_id": "b1"}"#;
        let req: ExecutionRequest = serde_json::from_str(json).unwrap();
        assert!(!req.execute_in_order);
        assert_eq!(req.block_id, "b1");

        // Missing fields become empty strings so validation can report
        // them instead of the deserializer rejecting the body
        let partial: ExecutionRequest = serde_json::from_str(r#"{"code": "1+1"}"#).unwrap();
        assert_eq!(partial.language, "");
    }

    #[test]
    fn test_code_block_tolerates_missing_fields() {
        let block: CodeBlock = serde_json::from_str(r#"{"code": "x = 1"}"#).unwrap();
        assert_eq!(block.code.as_deref(), Some("x = 1"));
        assert_eq!(block.block_id, None);

        let empty: CodeBlock = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.code, None);
    }

    #[test]
    fn test_block_outcome_serialization() {
        let ok = BlockOutcome::Success {
            output: "2".to_string(),
        };
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#"{"output":"2"}"#);

        let err = BlockOutcome::Failure {
            error: "boom".to_string(),
        };
        assert_eq!(serde_json::to_string(&err).unwrap(), r#"{"error":"boom"}"#);
    }
}
