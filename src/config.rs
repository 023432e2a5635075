use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::{debug, warn};

use crate::llm::ModelConfig;
use crate::pipeline::PipelineConfig;
use crate::stages::{RetryPolicy, DEFAULT_MIN_TRANSCRIPT_CHARS};
use crate::store::{CsvRecordStore, DEFAULT_CSV_PATH};

/// Settings shared by every command
///
/// Model credentials come from the environment (see [`ModelConfig::from_env`]);
/// everything here can also be set with a flag.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// CSV file that analysis records are appended to
    #[arg(long, global = true, env = "CALL_ANALYZER_CSV", default_value = DEFAULT_CSV_PATH)]
    pub csv_path: PathBuf,

    /// Minimum transcript length in characters (after trimming)
    #[arg(long, global = true, env = "CALL_ANALYZER_MIN_CHARS", default_value_t = DEFAULT_MIN_TRANSCRIPT_CHARS)]
    pub min_chars: usize,

    /// Extra attempts for the summary call
    #[arg(long, global = true, env = "CALL_ANALYZER_SUMMARIZE_RETRIES", default_value_t = 0)]
    pub summarize_retries: u32,

    /// Extra attempts for the sentiment call
    #[arg(long, global = true, env = "CALL_ANALYZER_SENTIMENT_RETRIES", default_value_t = 0)]
    pub sentiment_retries: u32,

    /// Cut transcripts to this many characters inside prompts
    #[arg(long, global = true, env = "CALL_ANALYZER_MAX_PROMPT_CHARS")]
    pub max_transcript_chars: Option<usize>,

    /// Model identifier (overrides GROQ_MODEL)
    #[arg(long, global = true)]
    pub model: Option<String>,
}

impl Settings {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            min_transcript_chars: self.min_chars,
            summarize_retry: RetryPolicy::with_retries(self.summarize_retries),
            sentiment_retry: RetryPolicy::with_retries(self.sentiment_retries),
        }
    }

    pub fn model_config(&self) -> Result<ModelConfig> {
        let mut config = ModelConfig::from_env()?;
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        config.max_transcript_chars = self.max_transcript_chars;
        Ok(config)
    }

    pub fn open_store(&self) -> CsvRecordStore {
        CsvRecordStore::new(&self.csv_path)
    }
}

/// Load `.env` from the working directory (or a parent) if there is one
///
/// Runs before argument parsing so that `env` fallbacks see its values,
/// which is before logging is set up; pass the result to [`log_dotenv`].
pub fn load_dotenv() -> dotenvy::Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn log_dotenv(loaded: &dotenvy::Result<Option<PathBuf>>) {
    match loaded {
        Ok(Some(path)) => debug!("Loaded environment from {:?}", path),
        Ok(None) => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        settings: Settings,
    }

    #[test]
    fn test_flags_map_to_pipeline_config() {
        let cli = TestCli::parse_from([
            "test",
            "--csv-path",
            "/tmp/calls.csv",
            "--min-chars",
            "20",
            "--summarize-retries",
            "2",
        ]);

        let config = cli.settings.pipeline_config();
        assert_eq!(config.min_transcript_chars, 20);
        assert_eq!(config.summarize_retry.max_retries, 2);
        assert_eq!(config.sentiment_retry.max_retries, 0);
        assert_eq!(cli.settings.open_store().path(), std::path::Path::new("/tmp/calls.csv"));
    }
}
