//! Domain types for the stop-sequence editor.
//!
//! This module contains the core model types for a shipment's stop list.
//! Validated newtypes enforce their invariants at construction time, so code
//! that receives these types can trust their validity.

mod edit_time;
mod postal_code;
mod stop;

pub use edit_time::{EditDateTime, EditTimeError};
pub use postal_code::{InvalidPostalCode, PostalCode};
pub use stop::{
    AppointmentKind, Facility, FacilityId, FieldChange, ShipmentId, Stop, StopId, StopKind,
};
