use gamerec::{
    config::EvalConfig,
    data::InteractionStore,
    services::{EvaluationSettings, Evaluator},
    telemetry,
};

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = EvalConfig::from_env()?;
    let store = InteractionStore::load_csv(&config.data_file)?;

    let evaluator = Evaluator::new(store.interactions(), EvaluationSettings::from(&config))?;
    let report = evaluator.run();

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }

    Ok(())
}
