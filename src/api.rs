use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::analyst::{AnalystHandle, AnalystResponse, AnalystStatus};
use crate::snapshot::MarketSnapshot;
use crate::tasks::{MarketSummary, RegimeClassification, RiskAssessment, TradeLevels};

pub struct AppState {
    pub analyst: AnalystHandle,
}

/// Body of every analysis route.
#[derive(Clone, Debug, Deserialize)]
pub struct AnalysisQuery {
    pub symbol: String,
    #[serde(default)]
    pub snapshot: MarketSnapshot,
}

/// All four insights for one symbol, as the dashboard's AI panel shows them.
#[derive(Clone, Debug, Serialize)]
pub struct InsightPanel {
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub summary: AnalystResponse<MarketSummary>,
    pub regime: AnalystResponse<RegimeClassification>,
    pub risk: AnalystResponse<RiskAssessment>,
    pub levels: AnalystResponse<TradeLevels>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analysis/summary", post(market_summary))
        .route("/analysis/regime", post(market_regime))
        .route("/analysis/risk", post(risk_guardrail))
        .route("/analysis/levels", post(trade_levels))
        .route("/analysis/panel", post(insight_panel))
        .route("/analyst/status", get(analyst_status))
        .route("/analyst/refresh", post(refresh_analyst))
        .with_state(state)
}

pub async fn run_server(state: Arc<AppState>, bind_addr: &str) -> std::io::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("API Server listening on {}", bind_addr);
    axum::serve(listener, app).await
}

pub async fn market_summary(
    State(state): State<Arc<AppState>>,
    Json(query): Json<AnalysisQuery>,
) -> Json<AnalystResponse<MarketSummary>> {
    let analyst = state.analyst.get();
    Json(analyst.generate_market_summary(&query.symbol, &query.snapshot).await)
}

pub async fn market_regime(
    State(state): State<Arc<AppState>>,
    Json(query): Json<AnalysisQuery>,
) -> Json<AnalystResponse<RegimeClassification>> {
    let analyst = state.analyst.get();
    Json(analyst.detect_regime(&query.symbol, &query.snapshot).await)
}

pub async fn risk_guardrail(
    State(state): State<Arc<AppState>>,
    Json(query): Json<AnalysisQuery>,
) -> Json<AnalystResponse<RiskAssessment>> {
    let analyst = state.analyst.get();
    Json(analyst.check_risk_guardrail(&query.symbol, &query.snapshot).await)
}

pub async fn trade_levels(
    State(state): State<Arc<AppState>>,
    Json(query): Json<AnalysisQuery>,
) -> Json<AnalystResponse<TradeLevels>> {
    let analyst = state.analyst.get();
    Json(analyst.suggest_trade_levels(&query.symbol, &query.snapshot).await)
}

/// Runs the four analyses one after another against the same instance.
pub async fn insight_panel(
    State(state): State<Arc<AppState>>,
    Json(query): Json<AnalysisQuery>,
) -> Json<InsightPanel> {
    let analyst = state.analyst.get();
    let AnalysisQuery { symbol, snapshot } = query;

    let summary = analyst.generate_market_summary(&symbol, &snapshot).await;
    let regime = analyst.detect_regime(&symbol, &snapshot).await;
    let risk = analyst.check_risk_guardrail(&symbol, &snapshot).await;
    let levels = analyst.suggest_trade_levels(&symbol, &snapshot).await;

    Json(InsightPanel {
        symbol,
        generated_at: Utc::now(),
        summary,
        regime,
        risk,
        levels,
    })
}

pub async fn analyst_status(State(state): State<Arc<AppState>>) -> Json<AnalystStatus> {
    Json(state.analyst.get().status())
}

pub async fn refresh_analyst(State(state): State<Arc<AppState>>) -> Json<AnalystStatus> {
    info!("🔄 Analyst refresh requested via API");
    Json(state.analyst.refresh().status())
}
