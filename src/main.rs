//! Quake Risk CLI: classify one query, a preset sample location, or a batch file;
//! optionally record results to the local history.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use quake_risk::{
    config::EngineConfig,
    history::PredictionLog,
    logging::{LogEvent, StructuredLogger},
    predictor::{PredictionResult, Predictor},
    query::{Query, SampleLocation},
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "quake-risk")]
#[command(about = "Earthquake risk classification from depth, magnitude and recency")]
struct Cli {
    /// Path to JSON config (defaults to $QUAKE_RISK_CONFIG or quake-risk.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single location
    Predict {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Depth in km
        #[arg(long)]
        depth: f64,
        /// Average past magnitude
        #[arg(long)]
        magnitude: f64,
        /// Days since the last earthquake
        #[arg(long)]
        days: i64,
        /// Record the result to history
        #[arg(long)]
        save: bool,
    },
    /// Classify a built-in sample location (tokyo, sapporo, hiroshima)
    Sample {
        name: String,
        #[arg(long)]
        save: bool,
    },
    /// Classify every query in a JSON array file
    Batch {
        path: PathBuf,
        #[arg(long)]
        save: bool,
    },
    /// Show recent predictions from history
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(|| {
        std::env::var("QUAKE_RISK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("quake-risk.json"))
    })
}

fn open_history(config: &EngineConfig) -> anyhow::Result<PredictionLog> {
    if let Some(dir) = config.history.path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating history directory {}", dir.display()))?;
        }
    }
    PredictionLog::open(&config.history.path)
        .with_context(|| format!("opening history at {}", config.history.path.display()))
}

fn report(query: &Query, result: &PredictionResult, id: Option<&str>, json: bool) -> anyhow::Result<()> {
    if json {
        StructuredLogger::emit_json(&LogEvent::prediction(query, result, id), &mut std::io::stdout())
            .context("writing prediction")?;
    } else {
        println!(
            "risk: {}  confidence: {}%  accuracy: {}%  time: {}ms",
            result.risk.as_str().to_uppercase(),
            result.confidence,
            result.accuracy,
            result.processing_time_ms
        );
        println!("  {}", result.details);
    }
    Ok(())
}

async fn run_queries(
    cli: &Cli,
    config: &EngineConfig,
    queries: Vec<Query>,
    save: bool,
) -> anyhow::Result<()> {
    for (i, q) in queries.iter().enumerate() {
        q.validate().with_context(|| format!("query #{}", i + 1))?;
    }

    let history = if save {
        if !config.history.enabled {
            bail!("--save requires history.enabled in the config");
        }
        Some(open_history(config)?)
    } else {
        None
    };

    let predictor = Predictor::from_config(config);
    let results = predictor.predict_many(queries.clone()).await;

    for (query, result) in queries.iter().zip(&results) {
        let id = match &history {
            Some(log) => Some(log.insert(query, result).context("saving prediction")?),
            None => None,
        };
        report(query, result, id.as_deref(), cli.json)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = match EngineConfig::try_load(&config_path(&cli)) {
        Ok(c) => (c, None),
        Err(e) => (EngineConfig::default(), Some(e)),
    };

    StructuredLogger::init(config.log.json, &config.log.level);
    if let Some(e) = config_error {
        warn!(error = %e, "config not loaded; using defaults");
    }

    match &cli.command {
        Commands::Predict {
            lat,
            lng,
            depth,
            magnitude,
            days,
            save,
        } => {
            let query = Query {
                latitude: *lat,
                longitude: *lng,
                depth: *depth,
                magnitude: *magnitude,
                days_since_last_eq: *days,
            };
            run_queries(&cli, &config, vec![query], *save).await?;
        }
        Commands::Sample { name, save } => {
            let Some(sample) = SampleLocation::find(name) else {
                let known: Vec<_> = SampleLocation::all().iter().map(|s| s.name).collect();
                bail!("unknown sample {:?}; expected one of {}", name, known.join(", "));
            };
            info!(sample = sample.name, "loaded sample location");
            run_queries(&cli, &config, vec![sample.to_query()], *save).await?;
        }
        Commands::Batch { path, save } => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let queries: Vec<Query> = serde_json::from_str(&data)
                .with_context(|| format!("parsing {}", path.display()))?;
            info!(count = queries.len(), "batch loaded");
            run_queries(&cli, &config, queries, *save).await?;
        }
        Commands::History { limit } => {
            let log = open_history(&config)?;
            for record in log.recent(*limit)? {
                if cli.json {
                    StructuredLogger::emit_json(&record, &mut std::io::stdout())
                        .context("writing history record")?;
                } else {
                    println!(
                        "{}  {:>6}  {:>3}%  lat={} lng={} depth={} mag={} days={}",
                        record.id,
                        record.risk,
                        record.confidence,
                        record.query.latitude,
                        record.query.longitude,
                        record.query.depth,
                        record.query.magnitude,
                        record.query.days_since_last_eq
                    );
                }
            }
        }
    }

    Ok(())
}
