use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use lotto_oracle::config::{ConfigManager, OracleConfig};
use lotto_oracle::data::{DrawValidator, DrawWindow};
use lotto_oracle::engines::evaluation::evaluate;
use lotto_oracle::ml::features::FeatureExtractor;
use lotto_oracle::{Draw, Oracle, PredictionRequest, PredictionSet, StrategyName};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "lotto-oracle", author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file layered over the defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a prediction request (JSON file, or `-` for stdin)
    Predict {
        input: PathBuf,
        /// Override the request strategy
        #[arg(long)]
        strategy: Option<StrategyName>,
        /// Override the requested number of sets
        #[arg(long)]
        count: Option<usize>,
    },
    /// Pattern, trend and regime summary of a draw history
    Analyze { input: PathBuf },
    /// Per-number feature table of a draw history
    Features { input: PathBuf },
    /// Score a prediction against an actual draw
    Evaluate {
        /// Comma-separated prediction, e.g. 3,17,42,66,89
        #[arg(long)]
        prediction: String,
        /// Comma-separated actual winning numbers
        #[arg(long)]
        actual: String,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Write it to this path instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Draw histories are accepted either bare or wrapped in `{"draws": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DrawsInput {
    Wrapped { draws: Vec<Draw> },
    Bare(Vec<Draw>),
}

impl DrawsInput {
    fn into_draws(self) -> Vec<Draw> {
        match self {
            DrawsInput::Wrapped { draws } | DrawsInput::Bare(draws) => draws,
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_draws(path: &Path) -> anyhow::Result<Vec<Draw>> {
    let raw = read_input(path)?;
    let input: DrawsInput =
        serde_json::from_str(&raw).with_context(|| format!("parsing draws from {}", path.display()))?;
    Ok(input.into_draws())
}

fn parse_numbers(list: &str) -> anyhow::Result<Vec<u8>> {
    list.split(',')
        .map(|s| {
            s.trim()
                .parse::<u8>()
                .with_context(|| format!("'{}' is not a number", s.trim()))
        })
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = OracleConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Predict {
            input,
            strategy,
            count,
        } => {
            let raw = read_input(&input)?;
            let mut request: PredictionRequest = serde_json::from_str(&raw)
                .with_context(|| format!("parsing request from {}", input.display()))?;
            if let Some(strategy) = strategy {
                request.strategy = strategy;
            }
            if let Some(count) = count {
                request.count = count;
            }

            let oracle = Oracle::new(config)?;
            match oracle.predict(&request) {
                Ok(response) => print_json(&response, cli.pretty)?,
                Err(e) => {
                    print_json(&e.report(), cli.pretty)?;
                    bail!("prediction failed: {}", e);
                }
            }
        }
        Command::Analyze { input } => {
            let draws = read_draws(&input)?;
            let oracle = Oracle::new(config)?;
            let report = oracle.analyze(&draws)?;
            print_json(&report, cli.pretty)?;
        }
        Command::Features { input } => {
            let draws = read_draws(&input)?;
            DrawValidator::validate_draws(&draws)?;
            let window = DrawWindow::new(&DrawValidator::chronological(&draws));
            let table = FeatureExtractor::new(config.ml.features.clone()).extract(window.winning());
            if cli.pretty {
                println!("{}", table.to_dataframe()?);
            } else {
                print_json(&table, false)?;
            }
        }
        Command::Evaluate { prediction, actual } => {
            let prediction = PredictionSet::new(&parse_numbers(&prediction)?)?;
            let actual = parse_numbers(&actual)?;
            if actual.len() != prediction.numbers().len() {
                bail!("actual draw must have {} numbers", prediction.numbers().len());
            }
            print_json(&evaluate(&prediction, &actual), cli.pretty)?;
        }
        Command::Config { output } => {
            let manager = ConfigManager::with_config(config)?;
            match output {
                Some(path) => {
                    manager.save_to_file(&path)?;
                    log::info!("configuration written to {}", path.display());
                }
                None => println!("{}", manager.to_toml()?),
            }
        }
    }

    Ok(())
}
