//! rfpdeck CLI — extract RFP fields, summarize, and render slide decks.
//!
//! Usage:
//!   rfpdeck extract <file> [--json]
//!   rfpdeck summarize <file> [--max-length N] [--min-length N]
//!   rfpdeck deck <file> [--format markdown|json] [--out path]
//!   rfpdeck process <file> [--json]

use clap::{Parser, Subcommand};
use rfpdeck::{Config, DeckFormat, RfpPipeline, SummaryBounds};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "rfpdeck",
    version,
    about = "Extract RFP fields, summarize, and render slide decks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to YAML config file (default: <config dir>/rfpdeck/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Inference server base URL
    #[arg(long, global = true, env = "RFPDECK_ENDPOINT")]
    endpoint: Option<String>,
    /// Bearer token for the inference server
    #[arg(long, global = true, env = "RFPDECK_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract Goals, Deliverables, Timeline and Evaluation Criteria
    Extract {
        /// RFP document (PDF or text)
        file: PathBuf,
        /// Print JSON instead of labeled lines
        #[arg(long)]
        json: bool,
    },
    /// Summarize the document (short documents are printed unchanged)
    Summarize {
        /// RFP document (PDF or text)
        file: PathBuf,
        /// Maximum summary length in model tokens
        #[arg(long)]
        max_length: Option<usize>,
        /// Minimum summary length in model tokens
        #[arg(long)]
        min_length: Option<usize>,
    },
    /// Render the extracted fields as a slide deck
    Deck {
        /// RFP document (PDF or text)
        file: PathBuf,
        /// Output format: markdown or json
        #[arg(long, default_value_t = DeckFormat::Markdown)]
        format: DeckFormat,
        /// Write the deck here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Extract fields and summarize in one pass
    Process {
        /// RFP document (PDF or text)
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "rfpdeck=info" } else { "rfpdeck=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<Config, String> {
    let mut config = Config::load(cli.config.as_deref()).map_err(|e| e.to_string())?;
    if let Some(endpoint) = &cli.endpoint {
        config.inference.endpoint = endpoint.clone();
    }
    if let Some(token) = &cli.api_token {
        config.inference.api_token = Some(token.clone());
    }
    Ok(config)
}

async fn read_document(pipeline: &RfpPipeline, file: &Path) -> Result<String, i32> {
    pipeline.loader().load(file).await.map_err(|e| {
        eprintln!("Error: {}", e);
        1
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_extract(pipeline: &RfpPipeline, file: &Path, json: bool) -> i32 {
    let text = match read_document(pipeline, file).await {
        Ok(text) => text,
        Err(code) => return code,
    };
    let fields = pipeline.classifier().classify_fields(&text).await;
    if json {
        return print_json(&fields);
    }
    for (key, value) in fields.iter() {
        println!("{}: {}", key, value);
    }
    0
}

async fn cmd_summarize(pipeline: &RfpPipeline, file: &Path, bounds: SummaryBounds) -> i32 {
    let text = match read_document(pipeline, file).await {
        Ok(text) => text,
        Err(code) => return code,
    };
    let summary = pipeline.gate().summarize(&text, bounds).await.into_text();
    println!("{}", summary);
    0
}

async fn cmd_deck(pipeline: &RfpPipeline, file: &Path, format: DeckFormat, out: Option<&Path>) -> i32 {
    let text = match read_document(pipeline, file).await {
        Ok(text) => text,
        Err(code) => return code,
    };
    let fields = pipeline.classifier().classify_fields(&text).await;
    let renderer = format.renderer();
    let bytes = match renderer.render(&fields) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    match out {
        Some(path) => match std::fs::write(path, &bytes) {
            Ok(()) => {
                eprintln!("Wrote {} deck to {}", renderer.id(), path.display());
                0
            }
            Err(e) => {
                eprintln!("Error: cannot write '{}': {}", path.display(), e);
                1
            }
        },
        None => match std::io::stdout().write_all(&bytes) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    }
}

async fn cmd_process(pipeline: &RfpPipeline, file: &Path, json: bool) -> i32 {
    let report = match pipeline.process_document(file).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if json {
        return print_json(&report);
    }
    for (key, value) in report.fields.iter() {
        println!("{}: {}", key, value);
    }
    println!();
    println!("Summary: {}", report.summary);
    0
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let pipeline = match RfpPipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Extract { file, json } => cmd_extract(&pipeline, &file, json).await,
        Commands::Summarize {
            file,
            max_length,
            min_length,
        } => {
            let mut bounds = pipeline.bounds();
            if let Some(max) = max_length {
                bounds.max_length = max;
            }
            if let Some(min) = min_length {
                bounds.min_length = min;
            }
            cmd_summarize(&pipeline, &file, bounds).await
        }
        Commands::Deck { file, format, out } => {
            cmd_deck(&pipeline, &file, format, out.as_deref()).await
        }
        Commands::Process { file, json } => cmd_process(&pipeline, &file, json).await,
    };
    std::process::exit(code);
}
