use tracing::info;

use crate::error::ModelError;
use crate::llm::LanguageModel;
use crate::models::{Stage, Transcript};
use crate::stages::{call_with_retries, RetryPolicy};

/// Execute the summarize stage
///
/// One model call per attempt; the summary comes back exactly as the model
/// produced it.
pub async fn execute_summarize(
    model: &dyn LanguageModel,
    transcript: &Transcript,
    retry: &RetryPolicy,
) -> Result<String, ModelError> {
    let summary =
        call_with_retries(Stage::Summarize, retry, move || model.summarize(transcript)).await?;

    info!("Summary generated ({} chars)", summary.chars().count());
    Ok(summary)
}
