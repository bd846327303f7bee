use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tradewatch_core::domain::context::ContextRecord;
use tradewatch_core::domain::quarter::Quarter;
use tradewatch_core::indicators::EnrichedPanel;
use tradewatch_core::pipeline::{self, Analysis, MissingEntity, PortfolioRow};
use tradewatch_core::{indicators, io};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = tradewatch_core::config::Settings::from_env()?;
    let panel_path = PathBuf::from(settings.require_panel_path()?);

    // The panel is loaded and enriched once at startup; every request reads
    // the same immutable snapshot.
    let panel = indicators::enrich(io::load_panel(&panel_path)?);
    let state = AppState {
        panel: Arc::new(panel),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/portfolio", get(get_portfolio))
        .route("/products/:hs_code/context", get(get_context))
        .route("/products/:hs_code/analysis", get(get_analysis))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    panel: Arc<EnrichedPanel>,
}

#[derive(Debug, Deserialize)]
struct QuarterQuery {
    quarter: Option<String>,
}

async fn get_portfolio(State(state): State<AppState>) -> Json<Vec<PortfolioRow>> {
    Json(pipeline::rank_portfolio(&state.panel))
}

async fn get_context(
    State(state): State<AppState>,
    Path(hs_code): Path<String>,
    Query(query): Query<QuarterQuery>,
) -> Result<Json<ContextRecord>, StatusCode> {
    let quarter = parse_quarter(query.quarter.as_deref())?;
    let ctx = pipeline::assemble(&state.panel, &hs_code, quarter.as_ref())
        .map_err(missing_as_not_found)?;
    Ok(Json(ctx))
}

async fn get_analysis(
    State(state): State<AppState>,
    Path(hs_code): Path<String>,
    Query(query): Query<QuarterQuery>,
) -> Result<Json<Analysis>, StatusCode> {
    let quarter = parse_quarter(query.quarter.as_deref())?;
    let analysis = pipeline::analyze(&state.panel, &hs_code, quarter.as_ref())
        .map_err(missing_as_not_found)?;
    Ok(Json(analysis))
}

fn parse_quarter(raw: Option<&str>) -> Result<Option<Quarter>, StatusCode> {
    raw.map(|q| q.parse::<Quarter>())
        .transpose()
        .map_err(|_| StatusCode::BAD_REQUEST)
}

fn missing_as_not_found(err: anyhow::Error) -> StatusCode {
    if err.downcast_ref::<MissingEntity>().is_some() {
        return StatusCode::NOT_FOUND;
    }
    tracing::error!(error = %err, "analysis request failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
