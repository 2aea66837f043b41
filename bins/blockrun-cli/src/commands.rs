// CLI commands: thin client over the Blockrun server endpoints

use anyhow::{bail, Context, Result};
use blockrun_common::{Language, Strategy};
use serde_json::{json, Value};
use std::fs;

/// Submit one block to POST /execute and print its output
pub async fn exec(
    server: &str,
    language: &str,
    file: Option<&str>,
    code: Option<String>,
    block_id: &str,
    ordered: bool,
) -> Result<()> {
    let code = match (file, code) {
        (Some(path), _) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path))?,
        (None, Some(inline)) => inline,
        (None, None) => bail!("Provide --file or --code"),
    };

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/execute", server))
        .json(&json!({
            "language": language,
            "code": code,
            "block_id": block_id,
            "execute_in_order": ordered,
        }))
        .send()
        .await
        .context("Failed to reach server")?;

    let status = response.status();
    let body: Value = response.json().await.context("Invalid server response")?;

    if status.is_success() {
        println!("{}", body["output"].as_str().unwrap_or_default());
        Ok(())
    } else {
        bail!("{}", body["error"].as_str().unwrap_or("unknown error"))
    }
}

/// Submit several files as one batch to POST /execute_all
pub async fn exec_all(server: &str, language: &str, files: &[String]) -> Result<()> {
    if files.is_empty() {
        bail!("No files given");
    }

    let mut blocks = Vec::new();
    for path in files {
        let code = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path))?;
        blocks.push(json!({ "block_id": path, "code": code }));
    }

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/execute_all", server))
        .json(&json!({ "language": language, "code_blocks": blocks }))
        .send()
        .await
        .context("Failed to reach server")?;

    let status = response.status();
    let body: Value = response.json().await.context("Invalid server response")?;

    if !status.is_success() {
        bail!("{}", body["error"].as_str().unwrap_or("unknown error"));
    }

    let Some(results) = body.as_object() else {
        bail!("Unexpected response shape");
    };
    for (block_id, outcome) in results {
        if let Some(output) = outcome["output"].as_str() {
            println!("{} → ok", block_id);
            for line in output.lines() {
                println!("  {}", line);
            }
        } else {
            println!("{} → error", block_id);
            for line in outcome["error"].as_str().unwrap_or("unknown error").lines() {
                println!("  {}", line);
            }
        }
    }

    Ok(())
}

/// Print the static language table
pub fn list_languages() {
    println!("{:<12} {:<12} {:<6} {}", "LANGUAGE", "STRATEGY", "EXT", "KERNEL");
    for language in Language::all_variants() {
        let profile = language.profile();
        let strategy = match profile.strategy {
            Strategy::Compiled => "compiled",
            Strategy::Markup => "markup",
            Strategy::Interactive => "interactive",
        };
        println!(
            "{:<12} {:<12} {:<6} {}",
            language,
            strategy,
            profile.file_extension,
            profile.kernel_name.unwrap_or("-"),
        );
    }
}

/// Query GET /health and print the reply
pub async fn health(server: &str) -> Result<()> {
    let response = reqwest::get(format!("{}/health", server))
        .await
        .context("Failed to reach server")?;
    let body: Value = response.json().await.context("Invalid server response")?;

    println!(
        "status: {}  uptime: {}s  started: {}",
        body["status"].as_str().unwrap_or("unknown"),
        body["uptime_secs"].as_u64().unwrap_or(0),
        body["started_at"].as_str().unwrap_or("unknown"),
    );
    Ok(())
}
