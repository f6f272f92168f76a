//! XTE command line
//!
//! - `train`: learn the tree edit distance threshold and store it in the
//!   configuration file
//! - `decide`: decide a single text/hypothesis pair
//! - `evaluate`: decide a whole dataset, write the result file and print
//!   precision, recall and F1 overall and per model

use anyhow::Context;
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xte_common::{graph::KnowledgeBase, XteConfig};
use xte_engine::{EngineContext, EntailmentPipeline};

#[derive(Parser)]
#[command(name = "xte")]
#[command(version, about = "Explainable textual entailment over definition graphs")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration store (`key = value` lines)
    #[arg(short, long, global = true, default_value = "config/xte.conf")]
    config: PathBuf,

    /// Knowledge base whose definition graph is navigated: WN, WKT, WKP or WBT
    #[arg(long, global = true, default_value = "WN")]
    kb: KnowledgeBase,

    /// Write a Prometheus text snapshot of the run's metrics here
    #[arg(long, global = true)]
    metrics_out: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Learn the edit distance threshold from a labelled dataset
    Train { dataset: PathBuf },
    /// Decide whether TEXT entails HYPOTHESIS
    Decide { text: String, hypothesis: String },
    /// Decide every pair of INPUT and write the results to OUTPUT
    Evaluate { input: PathBuf, output: PathBuf },
}

fn init_tracing(config: &XteConfig, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json || config.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = XteConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    init_tracing(&config, cli.json_logs);

    let recorder = match &cli.metrics_out {
        Some(_) => Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("failed to install the metrics recorder")?,
        ),
        None => None,
    };
    xte_common::metrics::register_metrics();

    info!(version = xte_common::VERSION, kb = %cli.kb, "Starting XTE");
    let ctx = EngineContext::load(&config, cli.kb).context("failed to load engine resources")?;

    match &cli.command {
        Command::Train { dataset } => {
            let learned = xte_engine::train(&ctx, dataset, &cli.config)
                .await
                .with_context(|| format!("training on {} failed", dataset.display()))?;
            println!("Threshold: {}", learned.threshold);
            println!("F-measure: {:.2}", learned.f1);
        }
        Command::Decide { text, hypothesis } => {
            let pipeline = EntailmentPipeline::new(&ctx)?;
            println!("{}", pipeline.decide_one(text, hypothesis).await?);
        }
        Command::Evaluate { input, output } => {
            let pipeline = EntailmentPipeline::new(&ctx)?;
            let evaluation = pipeline
                .decide_dataset(input, output)
                .await
                .with_context(|| format!("deciding {} failed", input.display()))?;
            println!("{}", evaluation);
        }
    }

    if let (Some(path), Some(handle)) = (&cli.metrics_out, recorder) {
        std::fs::write(path, handle.render())
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
        info!(path = %path.display(), "Metrics snapshot written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decide_with_knowledge_base() {
        let cli = Cli::try_parse_from([
            "xte",
            "--kb",
            "wkt",
            "decide",
            "A man sleeps.",
            "A person sleeps.",
        ])
        .unwrap();
        assert_eq!(cli.kb, KnowledgeBase::Wiktionary);
        assert_eq!(cli.config, PathBuf::from("config/xte.conf"));
        assert!(matches!(cli.command, Command::Decide { .. }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "xte",
            "evaluate",
            "dev.txt",
            "dev.out",
            "--metrics-out",
            "metrics.prom",
            "--config",
            "other.conf",
        ])
        .unwrap();
        assert_eq!(cli.metrics_out, Some(PathBuf::from("metrics.prom")));
        assert_eq!(cli.config, PathBuf::from("other.conf"));
        assert_eq!(cli.kb, KnowledgeBase::WordNet);
    }

    #[test]
    fn test_unknown_knowledge_base_is_rejected() {
        assert!(Cli::try_parse_from(["xte", "--kb", "XYZ", "train", "dev.txt"]).is_err());
    }
}
