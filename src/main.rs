use dotenvy::dotenv;
use estimate_pricing::{
    config::{self, contacts},
    core::{pricing, primitives, stage},
    errors::{Error, Result},
    render,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn parse_budget_id() -> Result<i64> {
    let arg = std::env::args().nth(1).ok_or_else(|| Error::Validation {
        field: "budget_id",
        message: "usage: estimate-pricing <budget_id>".to_string(),
    })?;
    arg.parse().map_err(|_| Error::Validation {
        field: "budget_id",
        message: format!("`{arg}` is not a budget id"),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    let budget_id = parse_budget_id()?;

    // 3. Load export configuration
    let export_config = config::export::load_default_config()
        .inspect_err(|e| error!("Failed to load config.toml: {}", e))?;

    // 4. Initialize database
    let db = config::database::create_connection().await?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Price the budget from its stage products
    stage::recompute_stage_prices(&db, budget_id).await?;
    pricing::recalculate_budget(&db, budget_id).await?;
    primitives::refresh_report_primitives(&db, budget_id).await?;

    // 6. Render exports
    let paths = render::write_exports(
        &db,
        budget_id,
        &export_config,
        &contacts::get_contact(),
        &contacts::get_engineer(),
    )
    .await?;

    info!(
        "Wrote {}, {} and {}",
        paths.document.display(),
        paths.salary.display(),
        paths.materials.display()
    );
    Ok(())
}
