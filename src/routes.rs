use axum::{Json, Router, extract::{Query, State}, routing::{get, post}};
use serde_json::{json, Value};

use crate::{insights, models::{CopyRequest, GeneratedCopy, GenerationRequest, GenerationResult, Insights, InsightsQuery}, orchestrator::Orchestrator};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate_ad))
        .route("/api/generate/copy", post(generate_copy))
        .route("/api/insights", get(get_insights))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn generate_ad(State(state): State<AppState>, Json(body): Json<GenerationRequest>) -> Json<GenerationResult> {
    tracing::info!(business = %body.business_name, platform = %body.platform, "📨 Ad generation requested");
    Json(state.orchestrator.generate(body).await)
}

// Copy only, with optional secondary-first ordering
pub async fn generate_copy(State(state): State<AppState>, Json(body): Json<CopyRequest>) -> Json<GeneratedCopy> {
    tracing::info!(business = %body.request.business_name, prefer_primary = body.prefer_primary, "📨 Copy generation requested");
    Json(state.orchestrator.text_chain().run_preferring(&body.request, body.prefer_primary).await)
}

pub async fn get_insights(Query(query): Query<InsightsQuery>) -> Json<Insights> {
    Json(insights::lookup(&query.business_type, &query.platform))
}
