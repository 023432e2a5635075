use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::llm::LanguageModel;
use crate::models::{AnalysisResult, PipelineOutcome, Stage, StageFailure, Transcript};
use crate::stages::{
    execute_persist, execute_sentiment, execute_summarize, validate, RetryPolicy,
    DEFAULT_MIN_TRANSCRIPT_CHARS,
};
use crate::store::RecordStore;

/// Configuration for the analysis pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum trimmed transcript length in characters
    pub min_transcript_chars: usize,
    /// Retry policy for the summarize stage
    pub summarize_retry: RetryPolicy,
    /// Retry policy for the sentiment stage
    pub sentiment_retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_transcript_chars: DEFAULT_MIN_TRANSCRIPT_CHARS,
            summarize_retry: RetryPolicy::default(),
            sentiment_retry: RetryPolicy::default(),
        }
    }
}

/// Validate → Summarize → Classify Sentiment → Persist
///
/// Shared entry point holding the injected model, the store and read-only
/// configuration. Every request gets its own [`AnalysisRun`].
pub struct AnalysisPipeline {
    model: Arc<dyn LanguageModel>,
    store: Arc<dyn RecordStore>,
    config: PipelineConfig,
}

impl AnalysisPipeline {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn RecordStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            model,
            store,
            config,
        }
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyze one transcript from start to finish
    pub async fn analyze(&self, text: &str) -> PipelineOutcome {
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", %run_id);

        async {
            info!("Starting transcript analysis workflow");
            let outcome = AnalysisRun::new(self, text).run_to_completion().await;
            match &outcome {
                PipelineOutcome::Success(_) => info!("Workflow completed successfully"),
                PipelineOutcome::Failure(failure) => warn!("Workflow failed: {}", failure),
            }
            outcome
        }
        .instrument(span)
        .await
    }
}

/// State of a single analysis run
#[derive(Debug)]
pub enum RunState {
    /// Initial state, holding the raw input
    Validating(String),
    Summarizing(Transcript),
    ClassifyingSentiment {
        transcript: Transcript,
        summary: String,
    },
    Persisting(AnalysisResult),
    /// Terminal: the record is in the store
    Completed(AnalysisResult),
    /// Terminal
    Failed(StageFailure),
}

impl RunState {
    /// The stage this state is about to execute, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Validating(_) => Some(Stage::Validate),
            Self::Summarizing(_) => Some(Stage::Summarize),
            Self::ClassifyingSentiment { .. } => Some(Stage::Sentiment),
            Self::Persisting(_) => Some(Stage::Persist),
            Self::Completed(_) | Self::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.stage().is_none()
    }
}

/// One pass through the pipeline for one transcript
pub struct AnalysisRun<'p> {
    pipeline: &'p AnalysisPipeline,
    state: RunState,
}

impl<'p> AnalysisRun<'p> {
    pub fn new(pipeline: &'p AnalysisPipeline, text: &str) -> Self {
        Self {
            pipeline,
            state: RunState::Validating(text.to_string()),
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Perform the current stage and move to the next state
    ///
    /// Terminal states are returned unchanged.
    pub async fn step(self) -> Self {
        let pipeline = self.pipeline;
        let config = &pipeline.config;

        let next = match self.state {
            RunState::Validating(text) => {
                match validate(&text, config.min_transcript_chars) {
                    Ok(transcript) => RunState::Summarizing(transcript),
                    Err(e) => RunState::Failed(StageFailure::validation(e)),
                }
            }
            RunState::Summarizing(transcript) => {
                match execute_summarize(
                    pipeline.model.as_ref(),
                    &transcript,
                    &config.summarize_retry,
                )
                .await
                {
                    Ok(summary) => RunState::ClassifyingSentiment {
                        transcript,
                        summary,
                    },
                    Err(e) => RunState::Failed(StageFailure::model(Stage::Summarize, e)),
                }
            }
            RunState::ClassifyingSentiment {
                transcript,
                summary,
            } => {
                match execute_sentiment(
                    pipeline.model.as_ref(),
                    &transcript,
                    &config.sentiment_retry,
                )
                .await
                {
                    Ok(sentiment) => RunState::Persisting(AnalysisResult {
                        transcript: transcript.into_inner(),
                        summary,
                        sentiment,
                    }),
                    Err(e) => RunState::Failed(StageFailure::model(Stage::Sentiment, e)),
                }
            }
            RunState::Persisting(result) => {
                match execute_persist(pipeline.store(), &result).await {
                    Ok(()) => RunState::Completed(result),
                    Err(e) => RunState::Failed(StageFailure::persist(e, result)),
                }
            }
            terminal @ (RunState::Completed(_) | RunState::Failed(_)) => terminal,
        };

        Self {
            pipeline,
            state: next,
        }
    }

    /// Step until a terminal state is reached
    pub async fn run_to_completion(mut self) -> PipelineOutcome {
        loop {
            match self.state {
                RunState::Completed(result) => return PipelineOutcome::Success(result),
                RunState::Failed(failure) => return PipelineOutcome::Failure(failure),
                _ => self = self.step().await,
            }
        }
    }
}
