//! Shipment stop types.
//!
//! A `Stop` is one scheduled location visit on a shipment's route. During an
//! editing session its timestamps are held in the facility-local edit
//! representation; conversion to and from absolute instants happens at the
//! load and commit boundaries.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{EditDateTime, PostalCode};

/// Persisted key of a stop. A stop created during the current editing session
/// has no id until the session commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StopId(pub i64);

/// Key of the shipment that owns a stop list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipmentId(pub i64);

/// Key of a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacilityId(pub i64);

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a stop picks freight up or delivers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopKind {
    Pickup,
    Delivery,
}

/// How the appointment at a stop is scheduled.
///
/// Read-only in the editing flow: the session exposes the value but no
/// mutation path for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    Firm,
    FirstCome,
    Live,
    Drop,
}

/// The facility a stop visits: id plus the denormalized fields the editor
/// needs without a lookup.
///
/// Kept as a single value so the id, display name, and postal code can only
/// change together; a facility reassignment can never leave a stale name or
/// a stale timezone key behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facility {
    /// Facility key.
    pub id: FacilityId,
    /// Display name, denormalized from the facility record.
    pub name: String,
    /// Location postal code; drives timezone resolution. A facility without
    /// one gets best-effort datetime handling.
    pub postal_code: Option<PostalCode>,
}

/// One leg of a shipment's physical route, in draft form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    /// Persisted key; `None` for stops added this session.
    pub id: Option<StopId>,
    /// Owning shipment. Immutable within the editing flow.
    pub shipment: ShipmentId,
    /// 1-based sequence number. Derived: always the stop's index plus one,
    /// re-established by the draft list after every insert, remove, or swap.
    pub position: u32,
    /// Pickup or delivery.
    pub kind: StopKind,
    /// Assigned facility; unset only while being edited.
    pub facility: Option<Facility>,
    /// Appointment scheduling kind. No mutation path exists in this flow.
    pub appointment_kind: Option<AppointmentKind>,
    /// Start of the appointment window, facility-local.
    pub appointment_window_start: Option<EditDateTime>,
    /// End of the appointment window, facility-local.
    pub appointment_window_end: Option<EditDateTime>,
    /// Estimated arrival, facility-local.
    pub estimated_arrival: Option<EditDateTime>,
    /// Actual arrival, facility-local.
    pub arrived_at: Option<EditDateTime>,
    /// When loading (pickup) or unloading (delivery) finished, facility-local.
    pub loaded_or_unloaded_at: Option<EditDateTime>,
    /// When the carrier left the facility, facility-local.
    pub departed_at: Option<EditDateTime>,
    /// Free-form reference numbers.
    pub reference_numbers: Option<String>,
    /// Free-form instructions for the carrier.
    pub special_instructions: Option<String>,
}

impl Stop {
    /// Create the stop appended by the "add stop" action: delivery kind,
    /// everything else unset.
    pub fn appended(shipment: ShipmentId, position: u32) -> Self {
        Self {
            id: None,
            shipment,
            position,
            kind: StopKind::Delivery,
            facility: None,
            appointment_kind: None,
            appointment_window_start: None,
            appointment_window_end: None,
            estimated_arrival: None,
            arrived_at: None,
            loaded_or_unloaded_at: None,
            departed_at: None,
            reference_numbers: None,
            special_instructions: None,
        }
    }

    /// The postal code driving this stop's timezone, if any.
    pub fn postal_code(&self) -> Option<&PostalCode> {
        self.facility.as_ref()?.postal_code.as_ref()
    }
}

/// A single logical field replacement on a stop.
///
/// `Facility` carries the whole facility value object, so the id, name, and
/// postal code are replaced atomically from the same source. There is
/// deliberately no variant for `appointment_kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Kind(StopKind),
    Facility(Facility),
    AppointmentWindowStart(Option<EditDateTime>),
    AppointmentWindowEnd(Option<EditDateTime>),
    EstimatedArrival(Option<EditDateTime>),
    ArrivedAt(Option<EditDateTime>),
    LoadedOrUnloadedAt(Option<EditDateTime>),
    DepartedAt(Option<EditDateTime>),
    ReferenceNumbers(Option<String>),
    SpecialInstructions(Option<String>),
}

impl FieldChange {
    /// Apply this change to a stop, replacing exactly one logical field.
    pub fn apply(self, stop: &mut Stop) {
        match self {
            FieldChange::Kind(kind) => stop.kind = kind,
            FieldChange::Facility(facility) => stop.facility = Some(facility),
            FieldChange::AppointmentWindowStart(v) => stop.appointment_window_start = v,
            FieldChange::AppointmentWindowEnd(v) => stop.appointment_window_end = v,
            FieldChange::EstimatedArrival(v) => stop.estimated_arrival = v,
            FieldChange::ArrivedAt(v) => stop.arrived_at = v,
            FieldChange::LoadedOrUnloadedAt(v) => stop.loaded_or_unloaded_at = v,
            FieldChange::DepartedAt(v) => stop.departed_at = v,
            FieldChange::ReferenceNumbers(v) => stop.reference_numbers = v,
            FieldChange::SpecialInstructions(v) => stop.special_instructions = v,
        }
    }
}
