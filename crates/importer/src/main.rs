//! `wxr-importer` -- imports a WordPress WXR export into the blog tables.
//!
//! Reads the export named by `EXPORT_PATH`, runs the import engine against
//! PostgreSQL (or an in-memory store with `IMPORT_DRY_RUN=1`) and logs the
//! run report. See [`ImporterConfig::from_env`] for every variable.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wxr_core::store::{IdentityDirectory, RecordStore};
use wxr_core::{Document, ImportReport, Importer, MemoryDirectory, MemoryStore, TemplateRenderer};
use wxr_importer::config::{ImporterConfig, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ImporterConfig::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        export_path = %config.export_path.display(),
        blog_id = config.defaults.blog_id,
        dry_run = config.dry_run,
        "Loaded importer configuration"
    );

    // --- Export document ---
    let xml = tokio::fs::read_to_string(&config.export_path)
        .await
        .with_context(|| format!("Failed to read {}", config.export_path.display()))?;
    let document = Document::parse(&xml)?;
    tracing::info!(nodes = document.len(), "Parsed export document");

    // --- Run ---
    let report = match &config.database_url {
        Some(url) if !config.dry_run => {
            let pool = wxr_db::create_pool(url, config.max_connections)
                .await
                .context("Failed to connect to database")?;
            wxr_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            wxr_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database ready");

            let store = wxr_db::PgStore::new(pool);
            run(store.clone(), store, &config, &document).await?
        }
        _ => {
            tracing::info!("Dry run: importing into an in-memory store");
            run(MemoryStore::new(), MemoryDirectory::new(), &config, &document).await?
        }
    };

    if config.report_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    for failure in &report.failures {
        tracing::warn!(
            source_id = %failure.source_id,
            stage = %failure.stage,
            error_kind = failure.error_kind,
            reason = %failure.reason,
            "Failed node"
        );
    }

    Ok(())
}

async fn run<S, D>(
    store: S,
    directory: D,
    config: &ImporterConfig,
    document: &Document,
) -> anyhow::Result<ImportReport>
where
    S: RecordStore,
    D: IdentityDirectory,
{
    let importer = Importer::new(
        store,
        directory,
        TemplateRenderer::default(),
        config.defaults.clone(),
    );
    Ok(importer.run(document).await?)
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wxr_importer=info,wxr_core=info".into());

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}
