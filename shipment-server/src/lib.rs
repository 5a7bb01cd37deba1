//! Shipment stop-sequence editing server.
//!
//! Lets an operator view and edit the ordered sequence of pickup and
//! delivery stops on a shipment: facility assignment, appointment scheduling,
//! arrival/load/departure timestamps, reference data, and instructions.
//! Pending edits live in a draft, independent of the persisted list, until
//! they are committed or discarded.

pub mod domain;
pub mod draft;
pub mod facilities;
pub mod normalize;
pub mod session;
pub mod timezone;
pub mod transport;
pub mod web;
