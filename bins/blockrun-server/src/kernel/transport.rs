// Kernel transport seam: the engine behind it stays opaque

use async_trait::async_trait;
use blockrun_common::{ExecError, Language};

/// Control-channel reply to an execute request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteReply {
    Ok,
    Error { evalue: String },
}

/// One message on the kernel's asynchronous output channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMessage {
    /// Plain-text rendering of an expression result
    ExecuteResult { text: String },
    /// Captured stdout/stderr text
    Stream { text: String },
    /// Runtime error surfaced mid-stream; terminal for the call
    Error { traceback: Vec<String> },
    /// The engine went idle; the drain is complete
    Idle,
}

/// Connection to one live interactive engine
///
/// The protocol is strictly sequential per session: one execute request,
/// one reply, then output messages until idle. Serialization across calls
/// is the pool's job, not the transport's.
#[async_trait]
pub trait KernelTransport: Send {
    async fn send_execute(&mut self, code: &str) -> Result<(), ExecError>;
    async fn recv_reply(&mut self) -> Result<ExecuteReply, ExecError>;
    async fn recv_output(&mut self) -> Result<OutputMessage, ExecError>;
}

/// Starts a transport for a language; swappable so tests can script the
/// engine instead of spawning one.
#[async_trait]
pub trait KernelLauncher: Send + Sync {
    async fn launch(&self, language: Language) -> Result<Box<dyn KernelTransport>, ExecError>;
}
