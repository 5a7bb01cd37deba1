//! Data transfer objects for web requests and responses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{AppointmentKind, EditDateTime, Stop, StopKind};
use crate::draft::{FieldErrors, timing_visible};
use crate::normalize;
use crate::session::EditingSession;
use crate::timezone::TimezoneMap;
use crate::transport::StopsTransport;

/// The re-render signal: the working sequence and editing-mode flag.
#[derive(Debug, Serialize)]
pub struct StopsSnapshot {
    /// Owning shipment id
    pub shipment_id: i64,

    /// Whether the session is in editing mode
    pub editing: bool,

    /// The working sequence, in route order
    pub stops: Vec<StopView>,
}

/// One stop in a snapshot.
#[derive(Debug, Serialize)]
pub struct StopView {
    /// Persisted id; null for stops added this session
    pub id: Option<i64>,

    /// 1-based sequence number
    pub position: u32,

    /// Pickup or delivery
    pub kind: StopKind,

    /// Assigned facility
    pub facility: Option<FacilityView>,

    /// Appointment scheduling kind (read-only in this flow)
    pub appointment_kind: Option<AppointmentKind>,

    /// Resolved IANA timezone; absent means datetimes are best effort
    pub timezone: Option<String>,

    /// Whether the timing fields below are meaningful to show
    pub timing_visible: bool,

    pub appointment_window_start: Option<DatetimeView>,
    pub appointment_window_end: Option<DatetimeView>,
    pub estimated_arrival: Option<DatetimeView>,
    pub arrived_at: Option<DatetimeView>,
    pub loaded_or_unloaded_at: Option<DatetimeView>,
    pub departed_at: Option<DatetimeView>,

    pub reference_numbers: Option<String>,
    pub special_instructions: Option<String>,

    /// Validation errors bound to this stop, keyed by wire field path
    pub errors: HashMap<String, String>,
}

/// Facility reference in a snapshot.
#[derive(Debug, Serialize)]
pub struct FacilityView {
    pub id: i64,
    pub name: String,
    pub postal_code: Option<String>,
}

/// A datetime in both representations: the edit value for inputs and the
/// localized rendering for viewing mode.
#[derive(Debug, Serialize)]
pub struct DatetimeView {
    pub edit: String,
    pub display: String,
}

/// One field replacement, as the PATCH body.
///
/// There is deliberately no variant for `appointment_kind`: it has no
/// legitimate transition in this flow.
#[derive(Debug, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum UpdateFieldRequest {
    Kind(StopKind),
    Facility(FacilitySelection),
    AppointmentWindowStart(Option<String>),
    AppointmentWindowEnd(Option<String>),
    EstimatedArrival(Option<String>),
    ArrivedAt(Option<String>),
    LoadedOrUnloadedAt(Option<String>),
    DepartedAt(Option<String>),
    ReferenceNumbers(Option<String>),
    SpecialInstructions(Option<String>),
}

/// A facility picked from search results. Id, name, and postal code travel
/// together so the stop's facility reference updates atomically.
#[derive(Debug, Deserialize)]
pub struct FacilitySelection {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address_zipcode: Option<String>,
}

/// Query for facility search.
#[derive(Debug, Deserialize)]
pub struct FacilitySearchRequest {
    pub q: String,
    pub limit: Option<usize>,
}

/// Error envelope for API responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build the snapshot for a session against one consistent timezone view.
pub fn snapshot<T: StopsTransport>(
    session: &EditingSession<T>,
    zones: &TimezoneMap,
) -> StopsSnapshot {
    let stops = session.stops();
    let views = stops
        .iter()
        .enumerate()
        .map(|(index, stop)| stop_view(stop, index, stops, session.errors(), zones))
        .collect();

    StopsSnapshot {
        shipment_id: session.shipment().0,
        editing: session.is_editing(),
        stops: views,
    }
}

fn stop_view(
    stop: &Stop,
    index: usize,
    stops: &[Stop],
    errors: &FieldErrors,
    zones: &TimezoneMap,
) -> StopView {
    let tz = stop.postal_code().and_then(|code| zones.get(code));

    let datetime = |value: Option<EditDateTime>| -> Option<DatetimeView> {
        let value = value?;
        Some(DatetimeView {
            edit: value.to_string(),
            display: normalize::to_display(Some(value), tz)?,
        })
    };

    StopView {
        id: stop.id.map(|id| id.0),
        position: stop.position,
        kind: stop.kind,
        facility: stop.facility.as_ref().map(|f| FacilityView {
            id: f.id.0,
            name: f.name.clone(),
            postal_code: f.postal_code.as_ref().map(|c| c.as_str().to_string()),
        }),
        appointment_kind: stop.appointment_kind,
        timezone: tz.map(|tz| tz.name().to_string()),
        timing_visible: timing_visible(stops, index),
        appointment_window_start: datetime(stop.appointment_window_start),
        appointment_window_end: datetime(stop.appointment_window_end),
        estimated_arrival: datetime(stop.estimated_arrival),
        arrived_at: datetime(stop.arrived_at),
        loaded_or_unloaded_at: datetime(stop.loaded_or_unloaded_at),
        departed_at: datetime(stop.departed_at),
        reference_numbers: stop.reference_numbers.clone(),
        special_instructions: stop.special_instructions.clone(),
        errors: errors
            .for_stop(index)
            .into_iter()
            .map(|(path, message)| (path.to_string(), message.to_string()))
            .collect(),
    }
}
