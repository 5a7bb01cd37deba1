//! Facility search client and caching.
//!
//! Backs the facility picker in the editing flow. Results carry the postal
//! code so a selection updates the stop's facility reference atomically.

mod cached;
mod client;
mod error;

pub use cached::{CachedFacilityClient, FacilityCacheConfig};
pub use client::{FacilityClient, FacilityClientConfig, FacilityDto};
pub use error::FacilityError;
