pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod stages;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{load_dotenv, log_dotenv, Settings};
pub use error::{ModelError, StoreError, ValidationError};
pub use llm::{GroqClient, LanguageModel, ModelConfig};
pub use models::{
    sample_transcript, AnalysisRecord, AnalysisResult, FailureReason, HistoryStats,
    PipelineOutcome, Stage, StageFailure, Transcript, SAMPLE_TRANSCRIPTS,
};
pub use pipeline::{AnalysisPipeline, AnalysisRun, PipelineConfig, RunState};
pub use server::{build_router, serve, AppState};
pub use stages::{validate, RetryPolicy};
pub use store::{load_records, records_to_csv, CsvRecordStore, RecordStore};
