use tracing::info;

use crate::error::ModelError;
use crate::llm::LanguageModel;
use crate::models::{Stage, Transcript};
use crate::stages::{call_with_retries, RetryPolicy};

/// Execute the sentiment stage
///
/// Whatever label the model returns is accepted as-is, including multi-word
/// or unexpected phrasing.
pub async fn execute_sentiment(
    model: &dyn LanguageModel,
    transcript: &Transcript,
    retry: &RetryPolicy,
) -> Result<String, ModelError> {
    let sentiment = call_with_retries(Stage::Sentiment, retry, move || {
        model.classify_sentiment(transcript)
    })
    .await?;

    info!("Sentiment analyzed: {}", sentiment);
    Ok(sentiment)
}
