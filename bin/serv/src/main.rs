use axum::{Router, middleware, routing::get};
use lsr_api::{config::ApiConfig, state::ApiState};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    lsr_api::tracing::init_tracing(&config.env);

    let metrics_handle = lsr_api::metrics::init_metrics()?;
    tracing::info!("Prometheus metrics exporter initialized");

    let state = ApiState::from_config(&config).await?;

    // Records saved before review dates existed get one now
    let fixed = state.tracker.backfill_next_reviews().await?;
    tracing::info!(fixed, "Startup backfill complete");

    let _job_handles =
        lsr_api::jobs::start_background_jobs(state.tracker.clone(), config.due_check_interval());
    tracing::info!(
        every_secs = config.due_check_interval_secs.get(),
        "Background due-review check started"
    );

    let cors = lsr_api::middleware::cors::create_cors_layer(config.parsed_allowed_origins());

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let metrics_app = Router::new()
        .route("/metrics", get(lsr_api::metrics::metrics_handler))
        .with_state(metrics_handle);

    let app = lsr_api::router::router()
        .merge(metrics_app)
        .with_state(state)
        .layer(cors)
        .layer(trace_layer)
        .layer(middleware::from_fn(lsr_api::metrics::track_metrics))
        .layer(middleware::from_fn(
            lsr_api::middleware::request_id::request_id_middleware,
        ));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server running on http://{address} ({:?})", config.env);
    axum::serve(listener, app).await?;

    Ok(())
}
