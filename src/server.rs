use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::Connection;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::error::OrgmapError;
use crate::model::{BoundingBox, CreateLocation, CreateOrganisation, Location, LocationSummary, Organisation};
use crate::repository;
use crate::session::SessionProvider;

pub type Sessions = Arc<dyn SessionProvider>;

/// Failures a handler can answer with. Only `NotFound` is a deliberate domain
/// outcome; store trouble ends up as `Internal`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    InvalidQuery(String),
    Internal(String),
}

impl From<OrgmapError> for ApiError {
    fn from(e: OrgmapError) -> Self { Self::Internal(e.to_string()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail.to_string()),
            ApiError::InvalidQuery(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            ApiError::Internal(cause) => {
                error!(%cause, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub fn router(sessions: Sessions) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);
    Router::new()
        .route("/api/organisations", get(get_organisations))
        .route("/api/organisations/", get(get_organisations))
        .route("/api/organisations/create", post(create_organisation))
        .route("/api/organisations/create/locations", post(create_location))
        .route("/api/organisations/:organisation_id", get(get_organisation))
        .route("/api/organisations/:organisation_id/locations", get(get_organisation_locations))
        .with_state(sessions)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Runs `work` on a blocking thread with a session of its own. The session is
/// dropped before the result is handed back, whether `work` failed or not.
async fn with_session<T, F>(sessions: Sessions, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> crate::error::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let session = sessions.session()?;
        work(&session)
    })
    .await
    .map_err(|e| {
        warn!(error = %e, "Join error");
        ApiError::Internal(format!("Join error: {e}"))
    })?
    .map_err(ApiError::from)
}

async fn create_organisation(
    State(sessions): State<Sessions>,
    Json(body): Json<CreateOrganisation>,
) -> Result<Json<Organisation>, ApiError> {
    let organisation = with_session(sessions, move |session| {
        repository::create_organisation(&body.name, session)
    })
    .await?;
    Ok(Json(organisation))
}

async fn get_organisations(State(sessions): State<Sessions>) -> Result<Json<Vec<Organisation>>, ApiError> {
    let organisations = with_session(sessions, repository::get_organisations).await?;
    Ok(Json(organisations))
}

async fn get_organisation(
    State(sessions): State<Sessions>,
    Path(organisation_id): Path<i64>,
) -> Result<Json<Organisation>, ApiError> {
    let organisation = with_session(sessions, move |session| {
        repository::get_organisation_by_id(organisation_id, session)
    })
    .await?;
    match organisation {
        Some(organisation) => Ok(Json(organisation)),
        None => {
            warn!(organisation_id, "organisation not found");
            Err(ApiError::NotFound("Organisation not found"))
        }
    }
}

async fn create_location(
    State(sessions): State<Sessions>,
    Json(body): Json<CreateLocation>,
) -> Result<Json<Location>, ApiError> {
    let location = with_session(sessions, move |session| {
        repository::create_location(
            body.organisation_id,
            &body.location_name,
            body.longitude,
            body.latitude,
            session,
        )
    })
    .await?;
    Ok(Json(location))
}

/// An unknown organisation lists as empty rather than 404.
async fn get_organisation_locations(
    State(sessions): State<Sessions>,
    Path(organisation_id): Path<i64>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<LocationSummary>>, ApiError> {
    let bounding_box = BoundingBox::from_query(&query).map_err(|e| {
        warn!(organisation_id, error = %e, "rejected bounding box");
        ApiError::InvalidQuery(e.to_string())
    })?;
    let locations = with_session(sessions, move |session| {
        repository::get_locations_by_organisation_id(organisation_id, bounding_box, session)
    })
    .await?;
    Ok(Json(locations))
}
