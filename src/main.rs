mod config;
mod handlers;
mod models;
mod services;
mod web; // HTTP API

#[cfg(feature = "web-server")]
use web::server::create_router;

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use config::AppConfig;
use services::{AIService, FoodAnalyzer, OpenRouterService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting FoodWise...");

    let config = AppConfig::from_env()?;

    let client = reqwest::Client::builder()
        .timeout(config.provider_timeout)
        .build()?;
    let provider = OpenRouterService::new(
        config.openrouter_api_key.clone(),
        config.openrouter_model.clone(),
    )
    .with_base_url(config.openrouter_base_url.clone())
    .with_language(config.response_language.clone())
    .with_schema(config.nutrition_schema)
    .with_client(client);
    log::info!(
        "✅ OpenRouter service initialized with model: {} ({:?} nutrition, answers in {})",
        config.openrouter_model,
        config.nutrition_schema,
        config.response_language
    );

    let analyzer = Arc::new(FoodAnalyzer::new(Arc::new(provider) as Arc<dyn AIService>));

    #[cfg(feature = "web-server")]
    {
        let app = create_router(analyzer, config.max_image_bytes);
        let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
        log::info!("🌐 Server listening on {}", config.bind_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                log::info!("🛑 Shutting down...");
            })
            .await?;
    }

    #[cfg(not(feature = "web-server"))]
    {
        let _ = analyzer;
        log::warn!("⚠️ Built without the web-server feature, nothing to serve");
    }

    Ok(())
}
