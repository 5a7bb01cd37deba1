//! Postal-code timezone resolution.
//!
//! Maps facility postal codes to IANA timezones via a batch lookup service,
//! accumulating results across lookups so each code is requested at most once
//! per process (and, via the disk cache, at most once per TTL).

mod cache;
mod client;
mod error;
mod resolver;

pub use cache::{TimezoneCacheConfig, TimezoneDiskCache};
pub use client::{TimezoneClient, TimezoneClientConfig};
pub use error::TimezoneError;
pub use resolver::{TimezoneMap, TimezoneResolver};
