use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use call_analyzer::server::DEFAULT_BIND_ADDR;
use call_analyzer::{
    load_dotenv, load_records, log_dotenv, sample_transcript, serve, AnalysisPipeline, AppState,
    GroqClient, HistoryStats, PipelineOutcome, Settings, SAMPLE_TRANSCRIPTS,
};

#[derive(Parser)]
#[command(name = "call-analyzer")]
#[command(author, version, about = "Customer call transcript summary and sentiment analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    settings: Settings,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "CALL_ANALYZER_BIND", default_value = DEFAULT_BIND_ADDR)]
        bind: SocketAddr,
    },

    /// Analyze one transcript and record the result
    Analyze {
        /// Transcript text
        #[arg(long, conflicts_with_all = ["file", "sample"])]
        text: Option<String>,

        /// Read the transcript from a file ("-" for stdin)
        #[arg(short, long, conflicts_with = "sample")]
        file: Option<PathBuf>,

        /// Use one of the built-in sample transcripts (see `samples`)
        #[arg(long)]
        sample: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent analyses and statistics
    History {
        /// Number of most recent records to show
        #[arg(short = 'n', long, default_value = "3")]
        limit: usize,

        /// Print records and statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in sample transcripts
    Samples,
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = load_dotenv();
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    log_dotenv(&dotenv);

    match cli.command {
        Commands::Serve { bind } => run_server(&cli.settings, bind).await,
        Commands::Analyze {
            text,
            file,
            sample,
            json,
        } => {
            let transcript = read_transcript(text, file, sample)?;
            analyze_once(&cli.settings, &transcript, json).await
        }
        Commands::History { limit, json } => show_history(&cli.settings, limit, json),
        Commands::Samples => {
            for (name, text) in SAMPLE_TRANSCRIPTS {
                println!("{:<22} {}", name, text);
            }
            Ok(())
        }
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn build_pipeline(settings: &Settings) -> Result<AnalysisPipeline> {
    let model_config = settings.model_config()?;
    info!(
        "Using model {} at temperature {}",
        model_config.model, model_config.temperature
    );

    Ok(AnalysisPipeline::new(
        Arc::new(GroqClient::new(model_config)),
        Arc::new(settings.open_store()),
        settings.pipeline_config(),
    ))
}

async fn run_server(settings: &Settings, bind: SocketAddr) -> Result<()> {
    let pipeline = build_pipeline(settings)?;
    info!("Recording analyses to {:?}", settings.csv_path);
    serve(AppState::new(pipeline), bind).await
}

fn read_transcript(
    text: Option<String>,
    file: Option<PathBuf>,
    sample: Option<String>,
) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    if let Some(name) = sample {
        return match sample_transcript(&name) {
            Some(text) => Ok(text.to_string()),
            None => bail!("Unknown sample '{}' (run `samples` to list them)", name),
        };
    }

    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read transcript file: {:?}", path)),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read transcript from stdin")?;
            Ok(buffer)
        }
    }
}

async fn analyze_once(settings: &Settings, transcript: &str, json: bool) -> Result<()> {
    let pipeline = build_pipeline(settings)?;

    match pipeline.analyze(transcript).await {
        PipelineOutcome::Success(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Summary");
                println!("-------");
                println!("{}", result.summary);
                println!();
                println!("Sentiment: {}", result.sentiment);
                println!();
                println!("Saved to {:?}", settings.csv_path);
            }
            Ok(())
        }
        PipelineOutcome::Failure(failure) => {
            if let Some(unsaved) = &failure.unsaved {
                warn!("Analysis completed but was not saved");
                if json {
                    println!("{}", serde_json::to_string_pretty(unsaved)?);
                } else {
                    println!("Summary (NOT SAVED): {}", unsaved.summary);
                    println!("Sentiment (NOT SAVED): {}", unsaved.sentiment);
                }
            }
            bail!("{}", failure)
        }
    }
}

fn show_history(settings: &Settings, limit: usize, json: bool) -> Result<()> {
    let store = settings.open_store();
    let records = load_records(&store)
        .with_context(|| format!("Failed to read records from {:?}", settings.csv_path))?;
    let stats = HistoryStats::from_records(&records);

    let recent: Vec<(usize, _)> = records
        .iter()
        .enumerate()
        .rev()
        .take(limit)
        .map(|(i, r)| (i + 1, r))
        .collect();

    if json {
        let recent: Vec<_> = recent.iter().map(|(_, r)| *r).collect();
        let out = serde_json::json!({ "stats": stats, "recent": recent });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No analysis data yet. Analyze your first transcript!");
        return Ok(());
    }

    println!("Analysis History");
    println!("================");
    println!("Total analyses: {}", stats.total_analyses);
    println!(
        "Most common: {}",
        stats.most_common_sentiment.as_deref().unwrap_or("N/A")
    );
    println!("Unique sentiments: {}", stats.unique_sentiments);

    for (index, record) in recent {
        println!();
        println!("#{} - {}", index, record.sentiment);
        println!("Transcript: {}", record.transcript);
        println!("Summary: {}", record.summary);
    }

    Ok(())
}
