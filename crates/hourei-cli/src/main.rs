use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use hourei_core::{AbbreviationEntry, AbbreviationRegistry};
use hourei_detect::{DetectionEngine, DetectorConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod detect;
mod display;
mod eval;

#[derive(Parser)]
#[command(
    name = "hourei",
    about = "Cross-reference detection for Japanese statutes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON detector config; flags below override it.
    #[arg(long, global = true, env = "HOUREI_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true, env = "HOUREI_CACHE_CAPACITY")]
    cache_capacity: Option<usize>,

    #[arg(long, global = true, env = "HOUREI_CACHE_TTL_SECS")]
    cache_ttl_secs: Option<u64>,

    #[arg(long, global = true)]
    no_cache: bool,

    /// Drop references below this confidence.
    #[arg(long, global = true)]
    min_confidence: Option<f32>,

    /// JSON array of extra abbreviation entries.
    #[arg(long, global = true)]
    abbreviations: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Detect references in a text file, one article per blank-line block
    Detect(DetectArgs),
    /// Score detection against a gold corpus
    Eval(EvalArgs),
}

#[derive(clap::Args)]
struct DetectArgs {
    file: PathBuf,

    /// Current article for blocks without their own heading.
    #[arg(long)]
    article: Option<String>,

    /// e-Gov id of the law the text belongs to.
    #[arg(long)]
    law_id: Option<String>,

    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(clap::Args)]
struct EvalArgs {
    gold: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Edges,
    Card,
}

impl Cli {
    fn detector_config(&self) -> anyhow::Result<DetectorConfig> {
        let mut config = match &self.config {
            Some(path) => DetectorConfig::from_path(path)?,
            None => DetectorConfig::default(),
        };
        if let Some(capacity) = self.cache_capacity {
            config.cache_capacity = capacity;
        }
        if let Some(ttl) = self.cache_ttl_secs {
            config.cache_ttl_secs = ttl;
        }
        if self.no_cache {
            config.cache_enabled = false;
        }
        if let Some(min) = self.min_confidence {
            config.min_confidence = min;
        }
        Ok(config)
    }

    fn engine(&self) -> anyhow::Result<DetectionEngine> {
        let registry = Arc::new(AbbreviationRegistry::builtin()?);
        let mut engine = DetectionEngine::new(registry, self.detector_config()?)?;
        if let Some(path) = &self.abbreviations {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading abbreviations {}", path.display()))?;
            let entries: Vec<AbbreviationEntry> = serde_json::from_str(&json)
                .with_context(|| format!("parsing abbreviations {}", path.display()))?;
            let count = entries.len();
            for entry in entries {
                engine.add_custom_abbreviation(entry)?;
            }
            info!(count, "custom abbreviations loaded");
        }
        Ok(engine)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("hourei v{}", env!("CARGO_PKG_VERSION"));
    let mut engine = cli.engine()?;

    match &cli.command {
        Command::Detect(args) => {
            let text = std::fs::read_to_string(&args.file)
                .with_context(|| format!("reading {}", args.file.display()))?;
            let output = detect::run(
                &mut engine,
                &text,
                args.article.as_deref(),
                args.law_id.as_deref(),
                args.format,
            )?;
            print!("{output}");
        }
        Command::Eval(args) => {
            let json = std::fs::read_to_string(&args.gold)
                .with_context(|| format!("reading {}", args.gold.display()))?;
            let cases = eval::parse_gold(&json)?;
            let report = eval::evaluate(&mut engine, &cases);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
        }
    }

    if let Some(stats) = engine.cache_statistics() {
        info!(
            hits = stats.hits,
            misses = stats.misses,
            size = stats.size,
            "cache summary"
        );
    }
    Ok(())
}
