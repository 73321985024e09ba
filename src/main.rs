//! Problem Bank - maintenance entry point
//!
//! Connects to the database, applies migrations and brings the testcase
//! directory tree back in line with the stored problems.

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use problembank::{
    AppError, AppResult,
    config::{CONFIG, LogFormat},
    db::{self, repositories::PgProblemRepository},
    services::ReconcileStats,
    state::AppState,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    let json = CONFIG.logging.format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| CONFIG.logging.rust_log.clone().into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting problem bank maintenance...");

    match run().await.and_then(|stats| {
        serde_json::to_string(&stats).map_err(|e| AppError::Internal(e.into()))
    }) {
        Ok(summary) => {
            // Machine-readable summary for cron wrappers
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let details = e.details();
            match serde_json::to_string(&details) {
                Ok(report) => eprintln!("{}", report),
                Err(_) => eprintln!("{}: {}", details.code, details.message),
            }
            if e.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run() -> AppResult<ReconcileStats> {
    let db_pool = db::create_pool(&CONFIG.database).await?;
    db::test_connection(&db_pool).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&db_pool).await?;

    let state = AppState::new(db_pool, CONFIG.clone());

    let total = PgProblemRepository::new(state.db().clone()).count().await?;
    tracing::info!(
        problems = total,
        testcases = ?state.problems().testcases().root(),
        media_root = ?state.config().storage.media_root,
        "Reconciling testcase directories"
    );

    let stats = state.problems().reconcile_testcase_dirs().await?;
    if !stats.orphaned.is_empty() {
        tracing::warn!(
            orphaned = ?stats.orphaned,
            "Testcase directories without a problem were left in place"
        );
    }

    tracing::info!(
        checked = stats.checked,
        created = stats.created,
        "Maintenance complete"
    );

    Ok(stats)
}
