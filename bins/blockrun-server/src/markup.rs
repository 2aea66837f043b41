// Markup preview pipeline: write the document out and open it for viewing

use std::path::Path;

use blockrun_common::ExecError;
use tokio::process::Command;
use tracing::debug;

use crate::workspace;

/// Write an HTML/CSS snippet to a retained file and open it in the host's
/// default viewer. Returns a message carrying the file location; the file
/// is never deleted so the preview stays viewable.
pub async fn preview(code: &str) -> Result<String, ExecError> {
    let path = workspace::persist_preview(code)?;
    debug!(path = %path.display(), "wrote preview document");

    open_document(&path)?;

    Ok(format!(
        "HTML/CSS executed successfully. View it at: file://{}",
        path.display()
    ))
}

/// Spawn the platform opener detached; we do not wait for the viewer.
fn open_document(path: &Path) -> Result<(), ExecError> {
    let mut command = opener_command(path);
    command
        .spawn()
        .map_err(|e| ExecError::Opener(e.to_string()))?;
    Ok(())
}

#[cfg(target_os = "windows")]
fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg("start").arg("").arg(path);
    cmd
}

#[cfg(target_os = "macos")]
fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}
