use axum::serve;
use open_nps::api::routes::create_router;
use open_nps::config::AppConfig;
use open_nps::seed;
use open_nps::store::{MemoryStore, PostgresStore, Store};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    println!("OpenNPS: Survey Delivery Server");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}",
        config.server.host, config.server.port
    );

    match config.database_url() {
        Some(database_url) => {
            println!("Connecting to PostgreSQL...");
            let postgres_store = PostgresStore::new(&database_url).await?;

            println!("Running database migrations...");
            postgres_store.migrate().await?;
            println!("Database ready");

            boot(Arc::new(postgres_store), &config).await
        }
        None => {
            println!("No database configured, serving from the in-memory store");
            boot(Arc::new(MemoryStore::new()), &config).await
        }
    }
}

async fn boot<S: Store + 'static>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<()> {
    // Load seed data for demonstration (optional)
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        println!("Loading seed data...");
        seed::load_seed_data(&*store).await?;
        println!("Seed data loaded successfully");
    }

    run_server(create_router().with_state(store), config).await
}

async fn run_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("OpenNPS server running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
