//! Interactive session pool
//!
//! Owns at most one live kernel per language, created lazily on first
//! demand and kept alive across requests so interpreter state (variable
//! bindings) persists between calls. All calls for one language serialize
//! through that session's lock; distinct languages execute concurrently.
//!
//! A failed call never tears the session down: the kernel stays reusable
//! for the next request. A timed-out kernel may still finish later and
//! its output be read by the next caller on the same session.

mod process;
mod transport;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use blockrun_common::{Config, ExecError, Language};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info};

pub use process::ProcessLauncher;
pub use transport::{ExecuteReply, KernelLauncher, KernelTransport, OutputMessage};

type Session = Arc<Mutex<Box<dyn KernelTransport>>>;

pub struct KernelPool {
    reply_timeout: Duration,
    launcher: Box<dyn KernelLauncher>,
    sessions: Mutex<HashMap<Language, Session>>,
}

impl KernelPool {
    pub fn new(config: &Config) -> Self {
        Self::with_launcher(
            Duration::from_millis(config.kernel_timeout_ms),
            Box::new(ProcessLauncher::new(config.clone())),
        )
    }

    pub fn with_launcher(reply_timeout: Duration, launcher: Box<dyn KernelLauncher>) -> Self {
        Self {
            reply_timeout,
            launcher,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Execute a code string against the language's kernel session
    ///
    /// Submit, await the reply, drain the output channel, finalize. Every
    /// wait is bounded by the configured timeout.
    pub async fn execute(&self, language: Language, code: &str) -> Result<String, ExecError> {
        let session = self.session(language).await?;
        // Held for the whole exchange: submit and drain must not interleave
        // with a concurrent caller on the same language.
        let mut transport = session.lock().await;

        self.run_protocol(transport.as_mut(), code).await
    }

    /// Get the live session for a language, starting one on first use
    async fn session(&self, language: Language) -> Result<Session, ExecError> {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(&language) {
            return Ok(Arc::clone(session));
        }

        info!(%language, "starting kernel session");
        let transport = self.launcher.launch(language).await?;
        let session: Session = Arc::new(Mutex::new(transport));
        sessions.insert(language, Arc::clone(&session));
        Ok(session)
    }

    async fn run_protocol(
        &self,
        transport: &mut dyn KernelTransport,
        code: &str,
    ) -> Result<String, ExecError> {
        transport.send_execute(code).await?;

        let reply = timeout(self.reply_timeout, transport.recv_reply())
            .await
            .map_err(|_| ExecError::KernelTimeout)??;

        match reply {
            ExecuteReply::Ok => {}
            ExecuteReply::Error { evalue } => return Err(ExecError::KernelProtocol(evalue)),
        }

        let mut fragments = Vec::new();
        loop {
            let message = timeout(self.reply_timeout, transport.recv_output())
                .await
                .map_err(|_| ExecError::KernelTimeout)??;

            match message {
                OutputMessage::ExecuteResult { text } | OutputMessage::Stream { text } => {
                    fragments.push(text)
                }
                OutputMessage::Error { traceback } => {
                    return Err(ExecError::KernelProtocol(traceback.join("\n")))
                }
                OutputMessage::Idle => break,
            }
        }

        let output = fragments.join("\n");
        debug!(bytes = output.len(), "kernel execution drained");
        if output.is_empty() {
            Ok("executed successfully.".to_string())
        } else {
            Ok(output)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use blockrun_common::{ExecError, Language};

    use super::transport::{ExecuteReply, KernelLauncher, KernelTransport, OutputMessage};

    /// Scripted engine: records submitted code, replays canned replies
    pub struct ScriptedTransport {
        pub executed: Arc<Mutex<Vec<String>>>,
        pub replies: VecDeque<ExecuteReply>,
        pub outputs: VecDeque<OutputMessage>,
        pub hang: bool,
    }

    impl ScriptedTransport {
        pub fn ok_with(outputs: Vec<OutputMessage>) -> Self {
            Self {
                executed: Arc::new(Mutex::new(Vec::new())),
                replies: VecDeque::from(vec![ExecuteReply::Ok]),
                outputs: VecDeque::from(outputs),
                hang: false,
            }
        }

        pub fn hanging() -> Self {
            Self {
                executed: Arc::new(Mutex::new(Vec::new())),
                replies: VecDeque::new(),
                outputs: VecDeque::new(),
                hang: true,
            }
        }
    }

    #[async_trait]
    impl KernelTransport for ScriptedTransport {
        async fn send_execute(&mut self, code: &str) -> Result<(), ExecError> {
            self.executed.lock().unwrap().push(code.to_string());
            Ok(())
        }

        async fn recv_reply(&mut self) -> Result<ExecuteReply, ExecError> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.replies.pop_front().ok_or_else(|| {
                ExecError::KernelProtocol("Invalid reply from kernel".to_string())
            })
        }

        async fn recv_output(&mut self) -> Result<OutputMessage, ExecError> {
            self.outputs.pop_front().ok_or_else(|| {
                ExecError::KernelProtocol("Invalid message from kernel".to_string())
            })
        }
    }

    /// Hands out pre-built transports and counts how many were launched
    pub struct ScriptedLauncher {
        pub launches: Arc<AtomicUsize>,
        transports: Mutex<VecDeque<Box<dyn KernelTransport>>>,
    }

    impl ScriptedLauncher {
        pub fn new(transports: Vec<Box<dyn KernelTransport>>) -> Self {
            Self {
                launches: Arc::new(AtomicUsize::new(0)),
                transports: Mutex::new(VecDeque::from(transports)),
            }
        }
    }

    #[async_trait]
    impl KernelLauncher for ScriptedLauncher {
        async fn launch(&self, _language: Language) -> Result<Box<dyn KernelTransport>, ExecError> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            self.transports
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ExecError::KernelProtocol("no scripted transport".to_string()))
        }
    }
}
