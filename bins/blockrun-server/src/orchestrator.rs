//! Execution orchestrator
//!
//! Entry point for everything the HTTP surface accepts: validates the
//! request, classifies the language into a strategy, applies ordered
//! (accumulate-and-replay) semantics when asked, and dispatches to the
//! matching pipeline. Pipeline outcomes pass through unchanged; the
//! orchestrator never rewraps an error.

use std::collections::BTreeMap;

use blockrun_common::{
    BlockOutcome, CodeBlock, Config, ExecError, ExecutionRequest, Language, Strategy,
};
use tracing::{debug, error, warn};

use crate::compiled;
use crate::kernel::KernelPool;
use crate::ledger::Ledger;
use crate::markup;

pub struct Orchestrator {
    kernels: KernelPool,
    ledger: Ledger,
}

impl Orchestrator {
    pub fn new(config: &Config) -> Self {
        Self::with_kernel_pool(KernelPool::new(config))
    }

    pub fn with_kernel_pool(kernels: KernelPool) -> Self {
        Self {
            kernels,
            ledger: Ledger::new(),
        }
    }

    /// Execute one snippet and return its normalized outcome
    pub async fn execute(&self, request: &ExecutionRequest) -> Result<String, ExecError> {
        if request.code.is_empty() || request.language.is_empty() {
            return Err(ExecError::missing_input());
        }

        let language = Language::from_str(&request.language)
            .ok_or_else(|| ExecError::UnsupportedLanguage(request.language.clone()))?;

        let effective_code = if request.execute_in_order {
            self.ledger.append_and_join(language, &request.code)
        } else {
            request.code.clone()
        };

        debug!(
            %language,
            block_id = %request.block_id,
            ordered = request.execute_in_order,
            "dispatching block"
        );
        self.dispatch(language, &effective_code).await
    }

    /// Execute an ordered set of blocks against one language
    ///
    /// Blocks are independent: one block's failure does not abort its
    /// siblings, and batch execution never consults the accumulation
    /// ledger; every block runs standalone even for interactive
    /// languages. Blocks missing code or block_id are skipped with a
    /// warning and produce no entry.
    pub async fn execute_batch(
        &self,
        language_name: &str,
        blocks: &[CodeBlock],
    ) -> Result<BTreeMap<String, BlockOutcome>, ExecError> {
        if blocks.is_empty() || language_name.is_empty() {
            return Err(ExecError::Validation(
                "Code blocks or language not provided".to_string(),
            ));
        }

        let mut results = BTreeMap::new();

        for block in blocks {
            let (block_id, code) = match (&block.block_id, &block.code) {
                (Some(id), Some(code)) if !id.is_empty() && !code.is_empty() => (id, code),
                _ => {
                    warn!(?block, "code or block id missing for block, skipping");
                    continue;
                }
            };

            let outcome = match Language::from_str(language_name) {
                Some(language) => self.dispatch(language, code).await,
                None => Err(ExecError::UnsupportedLanguage(language_name.to_string())),
            };

            let entry = match outcome {
                Ok(output) => BlockOutcome::Success { output },
                Err(e) => {
                    error!(block_id = %block_id, error = %e, "error executing block");
                    BlockOutcome::Failure {
                        error: e.to_string(),
                    }
                }
            };
            results.insert(block_id.clone(), entry);
        }

        Ok(results)
    }

    async fn dispatch(&self, language: Language, code: &str) -> Result<String, ExecError> {
        match language.profile().strategy {
            Strategy::Compiled => compiled::run(language, code).await,
            Strategy::Markup => markup::preview(code).await,
            Strategy::Interactive => self.kernels.execute(language, code).await,
        }
    }
}
