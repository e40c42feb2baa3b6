use std::sync::Arc;
use std::time::Duration;

use doomsday::gemini::GeminiClient;
use doomsday::services::daily;
use doomsday::services::scheduler::Scheduler;
use doomsday::state::AppState;
use doomsday::{db, routes};

/// How often the daily-content check runs. The job itself is idempotent, so
/// a generous interval only bounds how late in the day the row can appear.
const DAILY_JOB_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    // Interactive gateway (non-fatal: generation endpoints answer 500 if
    // the key is missing, everything else keeps working).
    let ai: Option<Arc<dyn doomsday::gemini::GenerateText>> = match GeminiClient::from_env() {
        Ok(client) => {
            tracing::info!("Gemini client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Gemini client not configured — generation disabled");
            None
        }
    };

    let state = AppState::new(pool.clone(), ai);

    // The scheduled job gets its own client with rate-limit retries turned
    // on. Interactive requests surface a 429 to the caller instead.
    let _daily_job = GeminiClient::from_env().ok().map(|client| {
        let job_client = client.with_retry_on_rate_limit(true);
        Scheduler::start("daily-content", DAILY_JOB_INTERVAL, move || {
            let pool = pool.clone();
            let client = job_client.clone();
            async move {
                match daily::generate_for_today(&pool, &client).await {
                    Ok(daily::DailyJobOutcome::Generated(entry)) => {
                        tracing::info!(day = entry.day_number, "daily content generated");
                    }
                    Ok(daily::DailyJobOutcome::AlreadyExists(_)) => {}
                    Err(e) => tracing::error!(error = %e, "daily content job failed"),
                }
            }
        })
    });

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "doomsday listening");
    axum::serve(listener, app).await.expect("server failed");
}
