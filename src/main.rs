//! Demand forecasting CLI.
//!
//! Runs the full pipeline on a CSV file: repair, preprocess, walk-forward
//! SARIMA selection, evaluation and forecast extension.

use anyhow::Context;
use clap::Parser;
use demand_forecast::config::ForecastConfig;
use demand_forecast::io::{read_csv, write_csv, RunStore};
use demand_forecast::models::Forecaster;
use demand_forecast::pipeline::{
    evaluate, extend_forecast, preprocess, repair, results_frame, train, train_parallel,
    ColumnMapping, FillPolicy,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "demand-forecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Repair a demand series and select a seasonal ARIMA by walk-forward validation")]
struct Args {
    /// Input CSV file
    input: PathBuf,

    /// Timestamp column name
    #[arg(short, long, default_value = "date")]
    timestamp_col: String,

    /// Demand column name
    #[arg(short, long, default_value = "demand")]
    demand_col: String,

    /// Sampling frequency (hourly, daily, weekly, monthly, quarterly)
    #[arg(short, long, default_value = "daily")]
    frequency: String,

    /// Model configuration file (JSON)
    #[arg(short, long, env = "MODEL_CONFIG_PATH")]
    config: PathBuf,

    /// Number of future steps to forecast
    #[arg(long, default_value = "12")]
    horizon: usize,

    /// Demand written into imputed rows (defaults to zero)
    #[arg(long)]
    fill_value: Option<f64>,

    /// Root directory for run artifacts
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Run identifier (defaults to the current UTC time)
    #[arg(long)]
    run_id: Option<String>,

    /// Evaluate folds in parallel
    #[arg(long)]
    parallel: bool,

    /// Write the history + forecast table to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "demand_forecast=info".into()),
        )
        .init();

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = ForecastConfig::from_path(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    let mapping = ColumnMapping::new(&args.timestamp_col, &args.demand_col, &args.frequency);
    let store = match args.run_id {
        Some(id) => RunStore::new(&args.data_dir, id),
        None => RunStore::with_timestamped_run(&args.data_dir),
    };

    let raw = read_csv(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    store.save_raw(&raw)?;

    let policy = args.fill_value.map_or(FillPolicy::Zero, FillPolicy::Constant);
    let repaired = repair(&raw, &mapping, policy)?;
    let prepared = preprocess(&repaired.frame, &mapping.demand_col, &config.params)?;
    store.save_processed(&prepared.frame)?;

    let selection = if args.parallel {
        train_parallel(&prepared, &config, &mapping)?
    } else {
        train(&prepared, &config, &mapping)?
    };

    println!("Run {}", store.run_id());
    println!(
        "Rows: {} raw, {} repaired ({} inserted), {} preprocessed",
        raw.height(),
        repaired.frame.height(),
        repaired.inserted,
        prepared.frame.height()
    );
    println!(
        "Winsorized {} values to [{:.2}, {:.2}]; differenced: {}",
        prepared.winsorization.clipped,
        prepared.winsorization.lower_bound,
        prepared.winsorization.upper_bound,
        prepared.differenced
    );
    println!(
        "Best fold {} (test rows {}..{})",
        selection.fold.index, selection.fold.test.start, selection.fold.test.end
    );

    let card = evaluate(&selection.y_test, &selection.predictions)?;
    println!("{card}");
    println!("{}", selection.model.summary()?);
    store.save_model(&selection.model)?;

    let results = results_frame(&prepared, &selection, &mapping.timestamp_col)?;
    let table = extend_forecast(
        &results,
        &prepared,
        selection.fold.test.clone(),
        &mapping.timestamp_col,
        &mapping.frequency,
        args.horizon,
        &selection.model,
    )?;

    println!("{table}");
    if let Some(path) = args.output {
        write_csv(&table, &path).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
