//! spam-rs command line
//!
//! # Usage
//!
//! ```bash
//! # Hold out one fold of the full index as the dev set
//! spam-rs split --index data/trec06p/full/index \
//!     --train-out train_index.txt --dev-out dev_index.txt
//!
//! # Aggregate corpus statistics and dump them as JSON
//! spam-rs train --index train_index.txt --output stats.json
//!
//! # Score the dev set
//! spam-rs evaluate --stats stats.json --dev-index dev_index.txt --use-ip
//!
//! # Classify a single message
//! spam-rs --config spam-rs.toml classify --stats stats.json inmail.42
//! ```

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use spam_rs::config::{ClassifierConfig, LoggingConfig};
use spam_rs::dataset::{self, IndexEntry};
use spam_rs::eval;
use spam_rs::{Config, CorpusAggregator, CorpusStatistics, EmailParser, NaiveBayesModel};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "spam-rs")]
#[command(about = "Naive Bayes spam filter", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shuffle an index and split it into train and dev indexes
    Split {
        /// Full index file (defaults to corpus.index_file)
        #[arg(long)]
        index: Option<PathBuf>,
        #[arg(long, default_value = "train_index.txt")]
        train_out: PathBuf,
        #[arg(long, default_value = "dev_index.txt")]
        dev_out: PathBuf,
    },
    /// Aggregate corpus statistics from a training index
    Train {
        #[arg(long)]
        index: PathBuf,
        #[arg(long, default_value = "stats.json")]
        output: PathBuf,
    },
    /// Classify a dev index and print the scores
    Evaluate {
        #[command(flatten)]
        source: StatsSource,
        #[arg(long)]
        dev_index: PathBuf,
        #[command(flatten)]
        overrides: ClassifierOverrides,
    },
    /// Classify one message file
    Classify {
        #[command(flatten)]
        source: StatsSource,
        #[command(flatten)]
        overrides: ClassifierOverrides,
        /// Raw message file
        message: PathBuf,
    },
}

/// Where the corpus statistics come from
#[derive(Args)]
#[group(required = true, multiple = false)]
struct StatsSource {
    /// Statistics written by `train`
    #[arg(long)]
    stats: Option<PathBuf>,
    /// Aggregate statistics from this index instead
    #[arg(long)]
    train_index: Option<PathBuf>,
}

#[derive(Args)]
struct ClassifierOverrides {
    #[arg(long)]
    smooth: Option<f64>,
    #[arg(long)]
    use_ip: bool,
    #[arg(long)]
    use_time: bool,
    #[arg(long)]
    ip_weight: Option<f64>,
    #[arg(long)]
    time_weight: Option<f64>,
    #[arg(long)]
    num_features: Option<usize>,
}

impl ClassifierOverrides {
    fn apply(&self, config: &mut ClassifierConfig) {
        if let Some(smooth) = self.smooth {
            config.smooth_factor = smooth;
        }
        config.use_ip |= self.use_ip;
        config.use_time |= self.use_time;
        if let Some(weight) = self.ip_weight {
            config.ip_weight = weight;
        }
        if let Some(weight) = self.time_weight {
            config.time_weight = weight;
        }
        if let Some(n) = self.num_features {
            config.num_features = n;
        }
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("spam_rs={}", logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };

    init_logging(&config.logging);
    info!("Starting spam-rs v{}", env!("CARGO_PKG_VERSION"));

    let parser = EmailParser::new()?;

    match cli.command {
        Commands::Split {
            index,
            train_out,
            dev_out,
        } => {
            let Some(index) = index.or_else(|| config.corpus.index_file.clone()) else {
                bail!("no index file given (use --index or corpus.index_file)");
            };

            let entries = dataset::load_index(&index)?;
            let (train, dev) =
                dataset::split(entries, config.corpus.k_fold, config.corpus.seed)?;
            dataset::write_index(&train_out, &train)?;
            dataset::write_index(&dev_out, &dev)?;

            println!(
                "{} training examples -> {}",
                train.len(),
                train_out.display()
            );
            println!("{} dev examples -> {}", dev.len(), dev_out.display());
        }
        Commands::Train { index, output } => {
            let stats = train(&index, &config, &parser)?;

            stats
                .save(&output)
                .with_context(|| format!("writing statistics to {}", output.display()))?;

            println!(
                "Wrote statistics for {} examples to {}",
                stats.total_documents,
                output.display()
            );
        }
        Commands::Evaluate {
            source,
            dev_index,
            overrides,
        } => {
            overrides.apply(&mut config.classifier);
            let model = build_model(&source, &config, &parser)?;

            let entries = dataset::load_index(&dev_index)?;
            let records = dataset::load_records(&entries, &parser)?;
            let evaluation = eval::evaluate(&model, &records)?;

            println!("{}", evaluation);
        }
        Commands::Classify {
            source,
            overrides,
            message,
        } => {
            overrides.apply(&mut config.classifier);
            let model = build_model(&source, &config, &parser)?;

            let raw = std::fs::read(&message)
                .with_context(|| format!("reading {}", message.display()))?;
            let posterior = model.score(&parser.parse(&raw));

            println!("{}", posterior.label);
            for (label, score) in &posterior.log_scores {
                println!("  {:<4} {:.5}", label.as_str(), score);
            }
        }
    }

    Ok(())
}

fn train(index: &Path, config: &Config, parser: &EmailParser) -> anyhow::Result<CorpusStatistics> {
    let entries: Vec<IndexEntry> = dataset::sample(
        dataset::load_index(index)?,
        config.corpus.data_size,
        config.corpus.seed,
    );
    let records = dataset::load_records(&entries, parser)?;
    Ok(CorpusAggregator::aggregate_parallel(&records)?)
}

fn build_model(
    source: &StatsSource,
    config: &Config,
    parser: &EmailParser,
) -> anyhow::Result<NaiveBayesModel> {
    let stats: CorpusStatistics = match (&source.stats, &source.train_index) {
        (Some(path), _) => CorpusStatistics::load(path)
            .with_context(|| format!("loading statistics from {}", path.display()))?,
        (None, Some(index)) => train(index, config, parser)?,
        (None, None) => bail!("either --stats or --train-index is required"),
    };

    Ok(NaiveBayesModel::new(stats, config.classifier.clone())?)
}
