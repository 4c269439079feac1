//! Evaluation driver for the n-gram model.
//!
//! Loads question/answer records from a JSON file, scores every answer with
//! a fresh model per record and prints the token-weighted accuracy of each
//! answer slot as JSON.
//!
//! ```text
//! rs-ngram-eval --path test_evaluation.json --n 2 --lookahead 3 --train-on-pred
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::info;

use rs_ngram_core::model::{ModelConfig, PredictionInput};

mod records;
mod report;
mod runner;

#[derive(Parser, Debug)]
#[command(name = "rs-ngram-eval")]
#[command(about = "Scores answer continuations with an interpolated n-gram model")]
#[command(version)]
struct Args {
    /// JSON file with question/answer records
    #[arg(long)]
    path: PathBuf,

    /// Order of the n-gram model
    #[arg(long, default_value_t = 1)]
    n: usize,

    /// Interpolation weights for orders 1..=n (uniform if omitted)
    #[arg(long, num_args = 1..)]
    lambdas: Option<Vec<f64>>,

    /// Number of tokens predicted at each position
    #[arg(long, default_value_t = 1)]
    lookahead: usize,

    /// Beam width used when lookahead > 1
    #[arg(long, default_value_t = 3)]
    beam_width: usize,

    /// Train on each true token right after predicting it
    #[arg(long)]
    train_on_pred: bool,

    /// Train on the question before scoring the answers
    #[arg(long)]
    train_on_prompt: bool,

    /// Number of records to evaluate (0 = all)
    #[arg(long, default_value_t = 100)]
    limit: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Fail fast on a bad configuration instead of once per record
    let config = ModelConfig { order: args.n, weights: args.lambdas.clone() };
    config.build()?;

    let mut input = PredictionInput::new(args.lookahead, args.beam_width)?;
    input.train_on_pred = args.train_on_pred;
    input.train_on_prompt = args.train_on_prompt;

    let mut records = records::read_records(&args.path)?;
    if args.limit > 0 {
        records.truncate(args.limit);
    }
    info!(
        "evaluating {} records from {} (n: {}, lookahead: {}, beam width: {})",
        records.len(),
        args.path.display(),
        config.order,
        input.lookahead(),
        input.beam_width()
    );

    let totals = runner::evaluate_records(records, &config, &input);
    println!("{}", serde_json::to_string_pretty(&totals.to_json())?);

    Ok(())
}
