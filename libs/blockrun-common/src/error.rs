use thiserror::Error;

/// Failure taxonomy for the execution pipelines
///
/// Every pipeline returns `Result<String, ExecError>` instead of raising
/// past its boundary; the orchestrator passes errors through unchanged and
/// the HTTP layer maps them to a status code via `is_client_error`.
#[derive(Debug, Error)]
pub enum ExecError {
    /// Request rejected before any pipeline ran
    #[error("{0}")]
    Validation(String),

    /// No profile configured for the given language identifier
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Compiler or runner exited nonzero; carries captured stderr
    #[error("{0}")]
    Toolchain(String),

    /// Error-status reply, mid-stream error message, or malformed reply
    #[error("{0}")]
    KernelProtocol(String),

    /// No reply or output from the kernel within the configured bound
    #[error("Execution timed out. The code may be too complex or there could be a kernel issue.")]
    KernelTimeout,

    /// Temp-file or process-spawn failure
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The host "open document" action could not be invoked
    #[error("Failed to open preview: {0}")]
    Opener(String),
}

impl ExecError {
    /// True for errors the caller can fix (maps to a 4xx response);
    /// everything else is reported as a server-side execution failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ExecError::Validation(_))
    }

    pub fn missing_input() -> Self {
        ExecError::Validation("Code or language not provided".to_string())
    }
}
