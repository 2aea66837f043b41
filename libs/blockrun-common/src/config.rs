use std::env;

/// Application configuration
/// Provides defaults with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Bound on each kernel control-channel reply and output-channel read
    pub kernel_timeout_ms: u64,
    /// Interpreter binary used to launch the python kernel
    pub python_bin: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            kernel_timeout_ms: env::var("KERNEL_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            python_bin: env::var("PYTHON_BIN")
                .unwrap_or_else(|_| "python3".to_string()),
        }
    }

    pub fn new() -> Self {
        Self::from_env()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
