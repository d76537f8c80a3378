use gamerec::{
    config::Config,
    data::InteractionStore,
    routes::{create_router, AppState},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;

    // Model fitting is CPU-bound and runs once before serving
    let store = InteractionStore::load_csv(&config.data_file)?;
    let state = AppState::from_store(&store, config.top_k);
    drop(store);

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
