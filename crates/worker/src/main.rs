use std::process::ExitCode;

use agora_engine::EngineConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only the JSON report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora_worker=info,agora_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = EngineConfig::from_env();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = agora_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    agora_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!(
        lookback_secs = config.auto_tally_lookback.num_seconds(),
        auto_close = config.auto_close_votes,
        "Auto-tally worker starting"
    );

    match agora_worker::sweep_once(&pool, &config, chrono::Utc::now()).await {
        Ok((report, rendered)) => {
            println!("{rendered}");
            tracing::info!(
                processed = report.processed,
                failed = report.failed,
                "Auto-tally worker finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Auto-tally sweep aborted");
            ExitCode::FAILURE
        }
    }
}
