use std::fmt;

use crate::error::{ModelError, StoreError, ValidationError};
use crate::models::AnalysisResult;

/// One step of the fixed analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validate,
    Summarize,
    Sentiment,
    Persist,
}

impl Stage {
    /// Pipeline order
    pub const ALL: [Stage; 4] = [
        Stage::Validate,
        Stage::Summarize,
        Stage::Sentiment,
        Stage::Persist,
    ];

    /// The stage label used in responses and logging
    pub fn label(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Summarize => "summarize",
            Self::Sentiment => "sentiment",
            Self::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a stage failed
#[derive(Debug)]
pub enum FailureReason {
    Validation(ValidationError),
    Model(ModelError),
    Store(StoreError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "{}", e),
            Self::Model(e) => write!(f, "{}", e),
            Self::Store(e) => write!(f, "{}", e),
        }
    }
}

/// A terminal pipeline failure, tagged with the stage it happened in
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub reason: FailureReason,
    /// Result computed before a persist failure; `None` for every other stage
    pub unsaved: Option<AnalysisResult>,
}

impl StageFailure {
    pub fn validation(error: ValidationError) -> Self {
        Self {
            stage: Stage::Validate,
            reason: FailureReason::Validation(error),
            unsaved: None,
        }
    }

    pub fn model(stage: Stage, error: ModelError) -> Self {
        Self {
            stage,
            reason: FailureReason::Model(error),
            unsaved: None,
        }
    }

    pub fn persist(error: StoreError, unsaved: AnalysisResult) -> Self {
        Self {
            stage: Stage::Persist,
            reason: FailureReason::Store(error),
            unsaved: Some(unsaved),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.reason)
    }
}

/// What the orchestrator hands back for one transcript
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Analysis finished and the record is already in the store
    Success(AnalysisResult),
    Failure(StageFailure),
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure.stage),
        }
    }

    pub fn into_result(self) -> Result<AnalysisResult, StageFailure> {
        match self {
            Self::Success(result) => Ok(result),
            Self::Failure(failure) => Err(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels_in_order() {
        let labels: Vec<&str> = Stage::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["validate", "summarize", "sentiment", "persist"]);
    }

    #[test]
    fn test_failure_display() {
        let failure = StageFailure::validation(ValidationError::EmptyInput);
        assert_eq!(
            failure.to_string(),
            "validate stage failed: Transcript cannot be empty"
        );
        assert!(failure.unsaved.is_none());
    }

    #[test]
    fn test_persist_failure_keeps_result() {
        let result = AnalysisResult {
            transcript: "call".to_string(),
            summary: "summary".to_string(),
            sentiment: "calm".to_string(),
        };
        let failure = StageFailure::persist(
            StoreError::Unavailable("disk full".to_string()),
            result.clone(),
        );
        let outcome = PipelineOutcome::Failure(failure);
        assert_eq!(outcome.failed_stage(), Some(Stage::Persist));
        let failure = outcome.into_result().unwrap_err();
        assert_eq!(failure.unsaved, Some(result));
    }
}
