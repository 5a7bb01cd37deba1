//! HTTP route handlers.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use tracing::warn;

use crate::domain::{EditDateTime, Facility, FacilityId, FieldChange, PostalCode, ShipmentId};
use crate::facilities::{FacilityDto, FacilityError};
use crate::session::EditingSession;
use crate::transport::{StopsClient, TransportError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/facilities/search", get(search_facilities))
        .route("/shipments/:shipment/stops", get(get_stops))
        .route("/shipments/:shipment/stops/edit", post(begin_editing))
        .route("/shipments/:shipment/stops/append", post(append_stop))
        .route("/shipments/:shipment/stops/commit", post(commit_stops))
        .route("/shipments/:shipment/stops/discard", post(discard_stops))
        .route(
            "/shipments/:shipment/stops/:index",
            patch(update_field).delete(remove_stop),
        )
        .route("/shipments/:shipment/stops/:index/move-up", post(move_up))
        .route("/shipments/:shipment/stops/:index/move-down", post(move_down))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search facilities by name fragment.
async fn search_facilities(
    State(state): State<AppState>,
    Query(req): Query<FacilitySearchRequest>,
) -> Result<Json<Vec<FacilityDto>>, AppError> {
    let limit = req.limit.unwrap_or(10).min(50);
    let facilities = state.facilities.search(&req.q, limit).await?;
    Ok(Json(facilities.as_ref().clone()))
}

/// Sessions keyed by shipment.
type Sessions = HashMap<ShipmentId, EditingSession<StopsClient>>;

/// Get the session for a shipment, opening one in viewing mode on first
/// access.
async fn open_session<'a>(
    state: &AppState,
    sessions: &'a mut Sessions,
    shipment: i64,
) -> Result<&'a mut EditingSession<StopsClient>, AppError> {
    let shipment = ShipmentId(shipment);
    match sessions.entry(shipment) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(entry) => {
            let session =
                EditingSession::open(shipment, state.stops.clone(), state.resolver.clone()).await?;
            Ok(entry.insert(session))
        }
    }
}

/// Render the re-render signal for a session.
async fn render(
    state: &AppState,
    session: &EditingSession<StopsClient>,
) -> Json<StopsSnapshot> {
    let zones = state.resolver.snapshot().await;
    Json(snapshot(session, &zones))
}

/// Current snapshot; opens a viewing session on first access.
async fn get_stops(
    State(state): State<AppState>,
    Path(shipment): Path<i64>,
) -> Result<Json<StopsSnapshot>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = open_session(&state, &mut sessions, shipment).await?;
    Ok(render(&state, session).await)
}

/// Enter editing mode.
async fn begin_editing(
    State(state): State<AppState>,
    Path(shipment): Path<i64>,
) -> Result<Json<StopsSnapshot>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = open_session(&state, &mut sessions, shipment).await?;
    session.begin_editing();
    Ok(render(&state, session).await)
}

/// Append a stop to the end of the draft.
async fn append_stop(
    State(state): State<AppState>,
    Path(shipment): Path<i64>,
) -> Result<Json<StopsSnapshot>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = open_session(&state, &mut sessions, shipment).await?;
    session.append();
    Ok(render(&state, session).await)
}

/// Swap a stop toward the start. Boundary calls are silent no-ops.
async fn move_up(
    State(state): State<AppState>,
    Path((shipment, index)): Path<(i64, usize)>,
) -> Result<Json<StopsSnapshot>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = open_session(&state, &mut sessions, shipment).await?;
    session.move_up(index);
    Ok(render(&state, session).await)
}

/// Swap a stop toward the end. Boundary calls are silent no-ops.
async fn move_down(
    State(state): State<AppState>,
    Path((shipment, index)): Path<(i64, usize)>,
) -> Result<Json<StopsSnapshot>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = open_session(&state, &mut sessions, shipment).await?;
    session.move_down(index);
    Ok(render(&state, session).await)
}

/// Remove a stop. Refused below the two-stop minimum, silently.
async fn remove_stop(
    State(state): State<AppState>,
    Path((shipment, index)): Path<(i64, usize)>,
) -> Result<Json<StopsSnapshot>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = open_session(&state, &mut sessions, shipment).await?;
    session.remove(index);
    Ok(render(&state, session).await)
}

/// Replace one logical field of a stop.
async fn update_field(
    State(state): State<AppState>,
    Path((shipment, index)): Path<(i64, usize)>,
    Json(request): Json<UpdateFieldRequest>,
) -> Result<Json<StopsSnapshot>, AppError> {
    let change = field_change(request)?;

    let mut sessions = state.sessions.lock().await;
    let session = open_session(&state, &mut sessions, shipment).await?;
    session.update_field(index, change).await;
    Ok(render(&state, session).await)
}

/// Submit the draft. A validation rejection is a normal snapshot with the
/// field errors bound; only transport failures become error responses.
async fn commit_stops(
    State(state): State<AppState>,
    Path(shipment): Path<i64>,
) -> Result<Json<StopsSnapshot>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = open_session(&state, &mut sessions, shipment).await?;
    session.commit().await?;
    Ok(render(&state, session).await)
}

/// Abandon in-progress edits and leave editing mode.
async fn discard_stops(
    State(state): State<AppState>,
    Path(shipment): Path<i64>,
) -> Result<Json<StopsSnapshot>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = open_session(&state, &mut sessions, shipment).await?;
    session.discard().await;
    Ok(render(&state, session).await)
}

/// Map a PATCH body to a domain field change.
fn field_change(request: UpdateFieldRequest) -> Result<FieldChange, AppError> {
    Ok(match request {
        UpdateFieldRequest::Kind(kind) => FieldChange::Kind(kind),
        UpdateFieldRequest::Facility(selection) => {
            // An unparseable postal code degrades to no timezone rather than
            // blocking the selection.
            let postal_code = selection
                .address_zipcode
                .as_deref()
                .and_then(|z| match PostalCode::parse(z) {
                    Ok(code) => Some(code),
                    Err(e) => {
                        warn!(error = %e, "ignoring facility postal code");
                        None
                    }
                });
            FieldChange::Facility(Facility {
                id: FacilityId(selection.id),
                name: selection.name,
                postal_code,
            })
        }
        UpdateFieldRequest::AppointmentWindowStart(v) => {
            FieldChange::AppointmentWindowStart(datetime(v)?)
        }
        UpdateFieldRequest::AppointmentWindowEnd(v) => {
            FieldChange::AppointmentWindowEnd(datetime(v)?)
        }
        UpdateFieldRequest::EstimatedArrival(v) => FieldChange::EstimatedArrival(datetime(v)?),
        UpdateFieldRequest::ArrivedAt(v) => FieldChange::ArrivedAt(datetime(v)?),
        UpdateFieldRequest::LoadedOrUnloadedAt(v) => FieldChange::LoadedOrUnloadedAt(datetime(v)?),
        UpdateFieldRequest::DepartedAt(v) => FieldChange::DepartedAt(datetime(v)?),
        UpdateFieldRequest::ReferenceNumbers(v) => FieldChange::ReferenceNumbers(none_if_empty(v)),
        UpdateFieldRequest::SpecialInstructions(v) => {
            FieldChange::SpecialInstructions(none_if_empty(v))
        }
    })
}

/// Parse an optional edit datetime; an absent or empty value clears the field.
fn datetime(value: Option<String>) -> Result<Option<EditDateTime>, AppError> {
    EditDateTime::parse_opt(value.as_deref().unwrap_or("")).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Application errors.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Upstream { message: String },
    Internal { message: String },
}

impl From<TransportError> for AppError {
    fn from(e: TransportError) -> Self {
        AppError::Upstream {
            message: e.to_string(),
        }
    }
}

impl From<FacilityError> for AppError {
    fn from(e: FacilityError) -> Self {
        AppError::Upstream {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
