use std::fs::File;
use std::io::BufWriter;

use gamerec::{
    config::TrimConfig,
    data::{trim_csv, TrimThresholds},
    telemetry,
};

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = TrimConfig::from_env()?;
    let thresholds = TrimThresholds {
        min_games_per_user: config.min_games_per_user,
        min_item_ratings: config.min_item_ratings,
    };

    tracing::info!(
        input = %config.input_file.display(),
        output = %config.output_file.display(),
        "Trimming review log"
    );

    let input = File::open(&config.input_file)?;
    let output = BufWriter::new(File::create(&config.output_file)?);
    let written = trim_csv(input, output, thresholds)?;

    tracing::info!(rows = written, "Trimmed review log written");
    Ok(())
}
