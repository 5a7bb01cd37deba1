//! Stop persistence service client and wire types.
//!
//! The editing session's commit boundary: fetches persisted stop lists and
//! submits drafts, decoding either the fresh persisted list or a flat
//! field-error map.

mod client;
mod error;
mod mock;
mod types;

pub use client::{StopsClient, StopsClientConfig, StopsTransport};
pub use error::TransportError;
pub use mock::MockStopsClient;
pub use types::{CommitOutcome, FacilityRecord, LocationRecord, StopRecord};
