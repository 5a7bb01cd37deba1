//! Wire types for the stop persistence service.
//!
//! `StopRecord` is the service's shape for one stop: absolute RFC 3339
//! instants and the field names the service's validation messages refer to
//! (`stop_type`, `appointment_at`, `left_at`, ...). Conversion to and from
//! the draft [`Stop`] happens here, at the load and commit boundaries, using
//! a timezone snapshot for the localization.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Facility, FacilityId, PostalCode, ShipmentId, Stop, StopId};
use crate::domain::{AppointmentKind, StopKind};
use crate::normalize;
use crate::timezone::TimezoneMap;

/// One stop as the persistence service sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub shipment_id: i64,
    pub stop_type: StopKind,
    pub stop_number: u32,
    #[serde(default)]
    pub facility_id: Option<i64>,
    #[serde(default)]
    pub facility: Option<FacilityRecord>,
    #[serde(default)]
    pub appointment_type: Option<AppointmentKind>,
    #[serde(default)]
    pub appointment_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub appointment_end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub eta: Option<DateTime<Utc>>,
    #[serde(default)]
    pub arrived_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub loaded_unloaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub left_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reference_numbers: Option<String>,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

/// Denormalized facility fields carried with a stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub location: Option<LocationRecord>,
}

/// Facility location fields; only the postal code matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default)]
    pub address_zipcode: Option<String>,
}

/// Outcome of a commit the service accepted for processing.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The list was persisted; the fresh persisted records come back as the
    /// new baseline.
    Saved(Vec<StopRecord>),
    /// Validation rejected the list: a flat `stops.{index}.{path} → message`
    /// map. The draft is the caller's to keep.
    Invalid(HashMap<String, String>),
}

impl StopRecord {
    /// Map a persisted record into the draft representation, localizing each
    /// instant to the facility's resolved timezone. Unresolved timezones fall
    /// back to treating instants as already local.
    pub fn to_stop(&self, zones: &TimezoneMap) -> Stop {
        let facility = self.facility.as_ref().map(|f| Facility {
            id: FacilityId(f.id),
            name: f.name.clone(),
            postal_code: f
                .location
                .as_ref()
                .and_then(|l| l.address_zipcode.as_deref())
                .and_then(|z| PostalCode::parse(z).ok()),
        });
        let tz = facility
            .as_ref()
            .and_then(|f| f.postal_code.as_ref())
            .and_then(|code| zones.get(code));

        Stop {
            id: self.id.map(StopId),
            shipment: ShipmentId(self.shipment_id),
            position: self.stop_number,
            kind: self.stop_type,
            facility,
            appointment_kind: self.appointment_type,
            appointment_window_start: normalize::to_edit(self.appointment_at, tz),
            appointment_window_end: normalize::to_edit(self.appointment_end_at, tz),
            estimated_arrival: normalize::to_edit(self.eta, tz),
            arrived_at: normalize::to_edit(self.arrived_at, tz),
            loaded_or_unloaded_at: normalize::to_edit(self.loaded_unloaded_at, tz),
            departed_at: normalize::to_edit(self.left_at, tz),
            reference_numbers: self.reference_numbers.clone(),
            special_instructions: self.special_instructions.clone(),
        }
    }

    /// Map a draft stop back to the wire shape, converting each edit value to
    /// a stored instant with the stop's resolved timezone.
    pub fn from_stop(stop: &Stop, zones: &TimezoneMap) -> Self {
        let tz = stop.postal_code().and_then(|code| zones.get(code));

        Self {
            id: stop.id.map(|StopId(id)| id),
            shipment_id: stop.shipment.0,
            stop_type: stop.kind,
            stop_number: stop.position,
            facility_id: stop.facility.as_ref().map(|f| f.id.0),
            facility: stop.facility.as_ref().map(|f| FacilityRecord {
                id: f.id.0,
                name: f.name.clone(),
                location: f.postal_code.as_ref().map(|code| LocationRecord {
                    address_zipcode: Some(code.as_str().to_string()),
                }),
            }),
            appointment_type: stop.appointment_kind,
            appointment_at: normalize::to_stored(stop.appointment_window_start, tz),
            appointment_end_at: normalize::to_stored(stop.appointment_window_end, tz),
            eta: normalize::to_stored(stop.estimated_arrival, tz),
            arrived_at: normalize::to_stored(stop.arrived_at, tz),
            loaded_unloaded_at: normalize::to_stored(stop.loaded_or_unloaded_at, tz),
            left_at: normalize::to_stored(stop.departed_at, tz),
            reference_numbers: stop.reference_numbers.clone(),
            special_instructions: stop.special_instructions.clone(),
        }
    }
}
