// Child-process kernel backend speaking line-delimited JSON

use std::process::Stdio;

use async_trait::async_trait;
use blockrun_common::{Config, ExecError, Language};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use super::transport::{ExecuteReply, KernelLauncher, KernelTransport, OutputMessage};

/// Evaluates cells in one persistent namespace and speaks the wire protocol
/// on stdin/stdout. Expression results, captured stdout, and errors come
/// back as execute_reply / stream / execute_result / status messages.
const PYTHON_BOOTSTRAP: &str = r#"
import ast, contextlib, io, json, sys, traceback

ns = {}
for line in sys.stdin:
    line = line.strip()
    if not line:
        continue
    try:
        request = json.loads(line)
    except ValueError:
        continue
    code = request.get("code", "")
    buf = io.StringIO()
    value = None
    has_value = False
    try:
        tree = ast.parse(code, mode="exec")
        tail = None
        if tree.body and isinstance(tree.body[-1], ast.Expr):
            tail = ast.Expression(tree.body.pop().value)
        with contextlib.redirect_stdout(buf):
            exec(compile(tree, "<cell>", "exec"), ns)
            if tail is not None:
                value = eval(compile(tail, "<cell>", "eval"), ns)
                has_value = value is not None
    except BaseException as exc:
        evalue = "".join(traceback.format_exception_only(type(exc), exc)).strip()
        print(json.dumps({"msg_type": "execute_reply", "status": "error", "evalue": evalue}), flush=True)
        continue
    print(json.dumps({"msg_type": "execute_reply", "status": "ok"}), flush=True)
    text = buf.getvalue()
    if text:
        print(json.dumps({"msg_type": "stream", "text": text.rstrip("\n")}), flush=True)
    if has_value:
        print(json.dumps({"msg_type": "execute_result", "text": repr(value)}), flush=True)
    print(json.dumps({"msg_type": "status", "execution_state": "idle"}), flush=True)
"#;

/// Launches one interpreter child per language
pub struct ProcessLauncher {
    config: Config,
}

impl ProcessLauncher {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl KernelLauncher for ProcessLauncher {
    async fn launch(&self, language: Language) -> Result<Box<dyn KernelTransport>, ExecError> {
        let kernel_name = language
            .profile()
            .kernel_name
            .ok_or_else(|| ExecError::UnsupportedLanguage(language.to_string()))?;

        let mut command = match kernel_name {
            "python3" => {
                let mut cmd = Command::new(&self.config.python_bin);
                cmd.arg("-u").arg("-c").arg(PYTHON_BOOTSTRAP);
                cmd
            }
            // Other engines ship as external commands speaking the same
            // wire protocol, looked up by kernel name.
            other => Command::new(format!("blockrun-kernel-{}", other)),
        };

        debug!(%language, kernel = kernel_name, "spawning kernel process");
        let transport = ProcessTransport::spawn(&mut command)?;
        Ok(Box::new(transport))
    }
}

/// Pipe pair to a running kernel child; the child is killed when the
/// transport drops with the server process.
pub struct ProcessTransport {
    _child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

impl ProcessTransport {
    pub fn spawn(command: &mut Command) -> Result<Self, ExecError> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or_else(|| {
            ExecError::Io(std::io::Error::other("kernel child has no stdin"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            ExecError::Io(std::io::Error::other("kernel child has no stdout"))
        })?;

        Ok(Self {
            _child: child,
            stdin,
            lines: BufReader::new(stdout).lines(),
        })
    }

    async fn next_line(&mut self) -> Result<String, ExecError> {
        match self.lines.next_line().await? {
            Some(line) => Ok(line),
            None => Err(ExecError::KernelProtocol(
                "Kernel connection closed".to_string(),
            )),
        }
    }
}

#[async_trait]
impl KernelTransport for ProcessTransport {
    async fn send_execute(&mut self, code: &str) -> Result<(), ExecError> {
        let request = serde_json::json!({ "op": "execute", "code": code });
        let mut line = request.to_string();
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn recv_reply(&mut self) -> Result<ExecuteReply, ExecError> {
        let line = self.next_line().await?;
        let message: Value = serde_json::from_str(&line)
            .map_err(|_| ExecError::KernelProtocol("Invalid reply from kernel".to_string()))?;

        if message["msg_type"] != "execute_reply" {
            return Err(ExecError::KernelProtocol(
                "Invalid reply from kernel".to_string(),
            ));
        }
        match message["status"].as_str() {
            Some("ok") => Ok(ExecuteReply::Ok),
            Some("error") => Ok(ExecuteReply::Error {
                evalue: message["evalue"]
                    .as_str()
                    .unwrap_or("Unknown error occurred during execution")
                    .to_string(),
            }),
            _ => Err(ExecError::KernelProtocol(
                "Invalid reply from kernel".to_string(),
            )),
        }
    }

    async fn recv_output(&mut self) -> Result<OutputMessage, ExecError> {
        // Unknown message types are skipped, matching the drain contract
        loop {
            let line = self.next_line().await?;
            let message: Value = serde_json::from_str(&line).map_err(|_| {
                ExecError::KernelProtocol("Invalid message from kernel".to_string())
            })?;

            match message["msg_type"].as_str() {
                Some("execute_result") => {
                    return Ok(OutputMessage::ExecuteResult {
                        text: message["text"].as_str().unwrap_or_default().to_string(),
                    })
                }
                Some("stream") => {
                    return Ok(OutputMessage::Stream {
                        text: message["text"].as_str().unwrap_or_default().to_string(),
                    })
                }
                Some("error") => {
                    let traceback = message["traceback"]
                        .as_array()
                        .map(|lines| {
                            lines
                                .iter()
                                .filter_map(|v| v.as_str())
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default();
                    return Ok(OutputMessage::Error { traceback });
                }
                Some("status") => {
                    if message["execution_state"] == "idle" {
                        return Ok(OutputMessage::Idle);
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A shell stand-in for a kernel child: reads one request, then emits a
    // scripted reply, one stream message, and the idle marker.
    fn scripted_kernel(script: &str) -> ProcessTransport {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        ProcessTransport::spawn(&mut command).unwrap()
    }

    #[tokio::test]
    async fn test_transport_round_trip() {
        let script = concat!(
            "read line; ",
            r#"echo '{"msg_type": "execute_reply", "status": "ok"}'; "#,
            r#"echo '{"msg_type": "stream", "text": "hi"}'; "#,
            r#"echo '{"msg_type": "status", "execution_state": "idle"}'"#,
        );
        let mut transport = scripted_kernel(script);

        transport.send_execute("print('hi')").await.unwrap();
        assert_eq!(transport.recv_reply().await.unwrap(), ExecuteReply::Ok);
        assert_eq!(
            transport.recv_output().await.unwrap(),
            OutputMessage::Stream {
                text: "hi".to_string()
            }
        );
        assert_eq!(transport.recv_output().await.unwrap(), OutputMessage::Idle);
    }

    #[tokio::test]
    async fn test_error_reply_carries_evalue() {
        let script = concat!(
            "read line; ",
            r#"echo '{"msg_type": "execute_reply", "status": "error", "evalue": "NameError: x"}'"#,
        );
        let mut transport = scripted_kernel(script);

        transport.send_execute("x").await.unwrap();
        assert_eq!(
            transport.recv_reply().await.unwrap(),
            ExecuteReply::Error {
                evalue: "NameError: x".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_reply_is_protocol_error() {
        let script = "read line; echo not-json";
        let mut transport = scripted_kernel(script);

        transport.send_execute("1").await.unwrap();
        let err = transport.recv_reply().await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid reply from kernel");
    }

    #[tokio::test]
    async fn test_unexpected_message_shape_is_protocol_error() {
        let script = concat!(
            "read line; ",
            r#"echo '{"msg_type": "stream", "text": "early"}'"#,
        );
        let mut transport = scripted_kernel(script);

        transport.send_execute("1").await.unwrap();
        let err = transport.recv_reply().await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid reply from kernel");
    }

    #[tokio::test]
    async fn test_drain_skips_unknown_message_types() {
        let script = concat!(
            "read line; ",
            r#"echo '{"msg_type": "execute_input", "code": "1"}'; "#,
            r#"echo '{"msg_type": "status", "execution_state": "busy"}'; "#,
            r#"echo '{"msg_type": "execute_result", "text": "2"}'"#,
        );
        let mut transport = scripted_kernel(script);

        transport.send_execute("1+1").await.unwrap();
        assert_eq!(
            transport.recv_output().await.unwrap(),
            OutputMessage::ExecuteResult {
                text: "2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_closed_kernel_is_protocol_error() {
        let mut transport = scripted_kernel("exit 0");
        transport.send_execute("1").await.ok();
        let err = transport.recv_reply().await.unwrap_err();
        assert_eq!(err.to_string(), "Kernel connection closed");
    }

    // Exercises the real interpreter backend end to end, including the
    // embedded bootstrap's last-expression evaluation and namespace reuse.
    #[tokio::test]
    async fn test_python_kernel_evaluates_and_keeps_state() {
        let pool = crate::kernel::KernelPool::new(&Config::default());

        assert_eq!(pool.execute(Language::Python, "1+1").await.unwrap(), "2");

        assert_eq!(
            pool.execute(Language::Python, "x = 5").await.unwrap(),
            "executed successfully."
        );
        assert_eq!(
            pool.execute(Language::Python, "print(x)").await.unwrap(),
            "5"
        );

        let err = pool.execute(Language::Python, "1/0").await.unwrap_err();
        assert!(err.to_string().contains("ZeroDivisionError"));

        // The failure leaves the interpreter and its bindings intact
        assert_eq!(pool.execute(Language::Python, "x + 1").await.unwrap(), "6");
    }

    #[tokio::test]
    async fn test_launch_rejects_non_interactive_language() {
        let launcher = ProcessLauncher::new(Config {
            kernel_timeout_ms: 10_000,
            python_bin: "python3".to_string(),
        });
        let err = launcher
            .launch(Language::Java)
            .await
            .err()
            .expect("launch should refuse a compiled language");
        assert_eq!(err.to_string(), "Unsupported language: java");
    }
}
