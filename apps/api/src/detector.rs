//! Detector — orchestrates one analysis: build prompt → LLM call → interpret reply.
//!
//! Flow per text: `RequestBuilder::build` → `LlmBackend::complete` →
//! `ResponseInterpreter::interpret`. Builder and interpreter are immutable and
//! shared, so any number of analyses can run concurrently.

use std::sync::Arc;

use anyhow::Context;
use futures::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::{
    AnalysisResult, InvalidInputError, Lexicon, Prompt, RequestBuilder, ResponseInterpreter,
};
use crate::config::Config;
use crate::llm_client::{GeminiClient, LlmBackend, LlmError};

#[derive(Debug, Error)]
pub enum DetectError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Everything callers get back for one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub result: AnalysisResult,
    /// The text was clipped before prompting.
    pub input_truncated: bool,
    pub model: String,
}

#[derive(Clone)]
pub struct Detector {
    builder: Arc<RequestBuilder>,
    interpreter: Arc<ResponseInterpreter>,
    llm: Arc<dyn LlmBackend>,
    batch_concurrency: usize,
}

impl Detector {
    pub fn new(
        builder: RequestBuilder,
        interpreter: ResponseInterpreter,
        llm: Arc<dyn LlmBackend>,
        batch_concurrency: usize,
    ) -> Self {
        Self {
            builder: Arc::new(builder),
            interpreter: Arc::new(interpreter),
            llm,
            batch_concurrency: batch_concurrency.max(1),
        }
    }

    /// Wires a Gemini-backed detector from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let lexicon = match &config.lexicon_path {
            Some(path) => Lexicon::from_file(path)
                .with_context(|| format!("Failed to load lexicon from {}", path.display()))?,
            None => Lexicon::default(),
        };
        let interpreter = ResponseInterpreter::new(&lexicon, config.max_red_flags)
            .context("Failed to build response interpreter")?;
        let llm = GeminiClient::new(config.gemini_settings())
            .context("Failed to build Gemini HTTP client")?;

        Ok(Self::new(
            RequestBuilder::new(config.max_input_chars),
            interpreter,
            Arc::new(llm),
            config.batch_concurrency,
        ))
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Analyzes a single text.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisReport, DetectError> {
        let prompt = self.builder.build(text)?;
        self.run(prompt).await
    }

    /// Analyzes several texts, at most `batch_concurrency` at a time.
    ///
    /// Every text is validated before any LLM call is made. Results keep input
    /// order; the first LLM failure aborts the batch.
    pub async fn analyze_batch(&self, texts: &[String]) -> Result<Vec<AnalysisReport>, DetectError> {
        let prompts = texts
            .iter()
            .map(|text| self.builder.build(text))
            .collect::<Result<Vec<_>, _>>()?;

        stream::iter(prompts)
            .map(|prompt| self.run(prompt))
            .buffered(self.batch_concurrency)
            .try_collect()
            .await
    }

    async fn run(&self, prompt: Prompt) -> Result<AnalysisReport, DetectError> {
        let analysis_id = Uuid::new_v4();
        let span = info_span!("analysis", %analysis_id, model = self.llm.model());

        async move {
            let completion = self.llm.complete(&prompt).await?;
            let result = self.interpreter.interpret(&completion.text);

            info!(
                prediction = %result.prediction(),
                confidence = result.confidence(),
                degraded = result.is_degraded(),
                truncated = prompt.truncated,
                "Analysis complete"
            );

            Ok(AnalysisReport {
                result,
                input_truncated: prompt.truncated,
                model: completion.model,
            })
        }
        .instrument(span)
        .await
    }
}
