mod cli;

use chrono::{Duration, Utc};
use clap::Parser;
use dotenvy::dotenv;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use trend_monitor::{
    LifecycleManager, ProductLog, Result,
    config::{self, Settings},
    core::view,
    entities::KeywordStatus,
    generator::{self, Generator},
    repository::{Repository, SeaOrmRepository},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Load service settings
    let settings = match &args.config {
        Some(path) => config::settings::load_settings(path),
        None => config::settings::load_default_settings(),
    }
    .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Connect to the database and make sure the tables exist
    let db = connect_database().await?;
    let repository = SeaOrmRepository::new(db).with_page_size(settings.page_size);

    // 5. Build the manager with the configured generator and optional product log
    let generator = generator::from_settings(&settings.generator)
        .inspect_err(|e| error!("Failed to set up generator: {}", e))?;
    let mut manager = LifecycleManager::new(repository, generator);
    if let Some(path) = &settings.product_log {
        let log = Arc::new(ProductLog::open(path).await?);
        manager = manager.with_product_log(log);
    }

    // 6. Recover keywords left generating by an interrupted run
    if let Some(minutes) = settings.stale_generation_minutes {
        manager
            .sweep_stale_generations(Duration::minutes(i64::from(minutes)))
            .await?;
    }

    // 7. Keywords given on the command line are added and generated right away
    for text in &args.keywords {
        add_and_generate(&manager, text).await;
    }

    log_dashboard(&manager, &settings).await
}

async fn connect_database() -> Result<DatabaseConnection> {
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db).await?;
    Ok(db)
}

async fn add_and_generate<R, G>(manager: &LifecycleManager<R, G>, text: &str)
where
    R: Repository,
    G: Generator,
{
    let keyword = match manager.add_keyword(text).await {
        Ok(keyword) => keyword,
        Err(e) => {
            warn!("Could not add \"{}\": {}", text, e);
            return;
        }
    };
    match manager.generate(keyword.id).await {
        Ok(generation) => info!(
            "Generated product for \"{}\": {} {}",
            generation.keyword.keyword, generation.product.sku, generation.product.product_url
        ),
        Err(e) => warn!("Generation for \"{}\" failed: {}", keyword.keyword, e),
    }
}

async fn log_dashboard<R, G>(manager: &LifecycleManager<R, G>, settings: &Settings) -> Result<()>
where
    R: Repository,
    G: Generator,
{
    let now = Utc::now();
    for status in [
        KeywordStatus::Watching,
        KeywordStatus::Generating,
        KeywordStatus::Completed,
    ] {
        let keywords = manager.list_keywords(Some(status)).await?;
        let tab = view::tab_view(&keywords, status, now);
        info!("{} ({})", view::tab_title(status), tab.len());
        if tab.is_empty() {
            info!("  {}", view::empty_tab_message(status));
        }
        for entry in tab {
            let generated = entry
                .display
                .relative_last_generated
                .map(|label| format!(", generated {label}"))
                .unwrap_or_default();
            info!(
                "  {} [searched {}x, added {}{}]",
                entry.keyword.keyword,
                entry.keyword.search_count,
                entry.display.age_label.unwrap_or_default(),
                generated
            );
        }
    }

    let products = manager.recent_products().await?;
    info!(
        "Recent products ({} shown, page size {})",
        products.len(),
        settings.page_size
    );
    for product in products {
        info!(
            "  {} -> {} ({})",
            product.keyword_text, product.sku, product.product_url
        );
    }
    Ok(())
}
