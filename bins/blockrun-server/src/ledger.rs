// Accumulation ledger for ordered (notebook-style) execution

use std::collections::HashMap;
use std::sync::Mutex;

use blockrun_common::Language;

/// Per-language ordered history of submitted snippets
///
/// Append-only for the process lifetime. The effective program for an
/// ordered request is the newline join of the full history including the
/// just-appended snippet, so execution cost grows with history length.
/// Non-ordered calls never touch this state.
pub struct Ledger {
    histories: Mutex<HashMap<Language, Vec<String>>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            histories: Mutex::new(HashMap::new()),
        }
    }

    /// Append `code` to the language's history and return the accumulated
    /// program so far.
    pub fn append_and_join(&self, language: Language, code: &str) -> String {
        let mut histories = self.histories.lock().expect("ledger lock poisoned");
        let history = histories.entry(language).or_default();
        history.push(code.to_string());
        history.join("\n")
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
