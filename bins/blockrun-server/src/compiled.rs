// Compiled-execution pipeline: write, compile, run, capture

use std::path::{Path, PathBuf};

use blockrun_common::{ExecError, Language, Strategy};
use tokio::process::Command;
use tracing::debug;

use crate::workspace::Scratch;

/// Execute a compiled-language snippet to completion
///
/// Writes the code into a fresh `Scratch`, runs the toolchain steps in
/// order, and returns the final step's stdout. A nonzero exit on any step
/// reports that step's stderr. All artifacts are removed when the scratch
/// drops, regardless of which branch was taken.
pub async fn run(language: Language, code: &str) -> Result<String, ExecError> {
    let scratch = Scratch::new()?;
    let extension = language.profile().file_extension;
    let mut source = scratch.write_source(extension, code)?;

    if language == Language::Java {
        // javac insists the filename match the declared class
        let class_name = extract_java_class_name(code)?;
        source = scratch.rename(&source, &format!("{}.java", class_name))?;
    }

    let steps = toolchain_steps(language, &source, scratch.dir())?;

    let mut stdout = String::new();
    for argv in &steps {
        debug!(step = ?argv, "running toolchain step");
        stdout = run_step(argv, scratch.dir()).await?;
    }

    Ok(stdout)
}

/// Run one toolchain step as a structured argv (no shell involved),
/// capturing stdout and stderr to completion.
async fn run_step(argv: &[String], dir: &Path) -> Result<String, ExecError> {
    let output = Command::new(&argv[0])
        .args(&argv[1..])
        .current_dir(dir)
        .output()
        .await?;

    if !output.status.success() {
        return Err(ExecError::Toolchain(
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Compile-and-run steps for a language, as argv vectors
fn toolchain_steps(
    language: Language,
    source: &Path,
    dir: &Path,
) -> Result<Vec<Vec<String>>, ExecError> {
    if language.profile().strategy != Strategy::Compiled {
        return Err(ExecError::UnsupportedLanguage(language.to_string()));
    }

    let source_str = source.to_string_lossy().into_owned();
    let steps = match language {
        Language::C | Language::Cpp => {
            let compiler = if language == Language::C { "gcc" } else { "g++" };
            let binary: PathBuf = dir.join("snippet.out");
            let binary_str = binary.to_string_lossy().into_owned();
            vec![
                vec![
                    compiler.to_string(),
                    source_str,
                    "-o".to_string(),
                    binary_str.clone(),
                ],
                vec![binary_str],
            ]
        }
        Language::Java => {
            let class_name = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            vec![
                vec!["javac".to_string(), source_str],
                vec![
                    "java".to_string(),
                    "-cp".to_string(),
                    dir.to_string_lossy().into_owned(),
                    class_name,
                ],
            ]
        }
        _ => unreachable!("strategy checked above"),
    };

    Ok(steps)
}

/// Pull the declared class name out of raw Java source
///
/// Naive token scan: the first identifier after the first `class` keyword.
/// Fragile by construction (comments or nested declarations can fool it);
/// kept as an isolated step that fails explicitly instead of panicking.
fn extract_java_class_name(code: &str) -> Result<String, ExecError> {
    let mut tokens = code.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "class" {
            if let Some(raw) = tokens.next() {
                let name: String = raw
                    .chars()
                    .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
                    .collect();
                let starts_ok = name
                    .chars()
                    .next()
                    .map(|c| !c.is_ascii_digit())
                    .unwrap_or(false);
                if starts_ok {
                    return Ok(name);
                }
            }
            break;
        }
    }
    Err(ExecError::Toolchain(
        "Could not determine the class name: expected a 'class <Name>' declaration".to_string(),
    ))
}
