//! Key-hiding proxy in front of the generator API.
//!
//! Reads the same TOML file as the CLI (path from `DOCGEN_CONFIG`, optional)
//! and the API key from `[generator] api_key` or `GEMINI_API_KEY`.

use ba_docgen::adapters::proxy::{serve, ProxyState};
use ba_docgen::utils::logger;
use ba_docgen::utils::validation::Validate;
use ba_docgen::{AppConfig, GeminiClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logger::init_server_logger();

    let config = match std::env::var("DOCGEN_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)?,
        Err(_) => AppConfig::default(),
    };
    config.validate()?;

    let client = GeminiClient::from_config(&config.generator)?;
    let addr = config.bind_address()?;

    tracing::info!(
        "-- Starting docgen proxy on {} (model {})",
        addr,
        config.generator.model
    );

    serve(addr, ProxyState::new(client)).await?;

    Ok(())
}
