use std::path::Path;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bracket_proto::{
    roster, GenerateBracketResponse, Team, TeamId, GENERATE_BRACKET_PATH, TEAMS_PATH,
};
use serde_json::Value;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info};

use crate::artifact::ArtifactError;
use crate::generator::GenerationError;
use crate::metrics;
use crate::state::AppState;

const SELECTION_NOT_ARRAY: &str = "Selected teams must be provided as an array";
const DESCRIPTOR_WITHOUT_ID: &str = "Each selected team must carry an integer id";

/// API routes only. See [`app`] for the served application.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route(TEAMS_PATH, get(list_teams))
        .route(GENERATE_BRACKET_PATH, post(generate_bracket))
        .with_state(state)
}

/// API routes plus the artifact document root, CORS and request tracing.
pub fn app(state: AppState, serving_dir: &Path) -> Router {
    router(state)
        .fallback_service(ServeDir::new(serving_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], metrics::gather())
}

async fn list_teams() -> Json<Vec<Team>> {
    Json(roster())
}

async fn generate_bracket(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerateBracketResponse>, ApiError> {
    let result = orchestrate(&state, payload).await;
    let label = match &result {
        Ok(_) => "success",
        Err(err) => err.metric_label(),
    };
    metrics::GENERATION_REQUESTS
        .with_label_values(&[label])
        .inc();
    result
}

async fn orchestrate(
    state: &AppState,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerateBracketResponse>, ApiError> {
    let team_ids = match payload {
        Ok(Json(body)) => selected_team_ids(&body)?,
        Err(rejection) => {
            debug!(error = %rejection, "rejected generate-bracket body");
            return Err(ApiError::BadRequest(SELECTION_NOT_ARRAY.into()));
        }
    };

    let bracket = state.generator().generate(&team_ids).await?;

    let publication = state.publisher().publish().await?;
    metrics::ARTIFACT_PUBLICATIONS
        .with_label_values(&[publication.label()])
        .inc();

    info!(
        team_ids = ?team_ids,
        champion = ?bracket.champion,
        publication = publication.label(),
        "bracket generated"
    );
    Ok(Json(GenerateBracketResponse::generated(
        state.bracket_url(),
        bracket.champion,
        bracket.message,
    )))
}

/// Pulls the ids out of `{ "selectedTeams": [ { "id": n }, .. ] }`. Count and
/// range are left to the generator.
///
/// Ids must be JSON integers: `"5"` and `5.0` are rejected with a 400 rather
/// than forwarded to the generator.
fn selected_team_ids(body: &Value) -> Result<Vec<TeamId>, ApiError> {
    let Some(teams) = body.get("selectedTeams").and_then(Value::as_array) else {
        debug!("generate-bracket body without a selectedTeams array");
        return Err(ApiError::BadRequest(SELECTION_NOT_ARRAY.into()));
    };
    teams
        .iter()
        .map(|team| {
            team.get("id")
                .and_then(Value::as_i64)
                .ok_or_else(|| ApiError::BadRequest(DESCRIPTOR_WITHOUT_ID.into()))
        })
        .collect()
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Generation(GenerationError),
    Artifact(ArtifactError),
}

impl ApiError {
    fn metric_label(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_request",
            ApiError::Generation(_) => "generation_failed",
            ApiError::Artifact(ArtifactError::Missing { .. }) => "artifact_missing",
            ApiError::Artifact(ArtifactError::Copy(_)) => "publish_failed",
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        ApiError::Generation(err)
    }
}

impl From<ArtifactError> for ApiError {
    fn from(err: ArtifactError) -> Self {
        ApiError::Artifact(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Generation(err) => {
                error!(error = %err, "bracket generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Artifact(err) => {
                error!(error = %err, "bracket artifact unavailable");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(GenerateBracketResponse::failed(message))).into_response()
    }
}
