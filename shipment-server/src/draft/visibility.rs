//! Timing-field visibility policy.

use crate::domain::Stop;

/// Decide whether the timing fields of the stop at `index` are meaningful.
///
/// Arrival/load/departure timing for a stop is not worth collecting until the
/// carrier has actually left the prior stop, so the first stop is always
/// visible and every later stop is visible iff its immediate predecessor has a
/// `departed_at`. Only the predecessor matters: a stop hidden behind an
/// undeparted neighbor becomes visible the instant that neighbor's departure
/// is recorded, regardless of stops further back.
///
/// Covers the four progress fields (estimated arrival, arrived, loaded or
/// unloaded, departed); appointment fields are always shown.
///
/// # Examples
///
/// ```
/// use shipment_server::domain::{ShipmentId, Stop};
/// use shipment_server::draft::timing_visible;
///
/// let stops = vec![
///     Stop::appended(ShipmentId(1), 1),
///     Stop::appended(ShipmentId(1), 2),
/// ];
/// assert!(timing_visible(&stops, 0));
/// assert!(!timing_visible(&stops, 1));
/// ```
pub fn timing_visible(stops: &[Stop], index: usize) -> bool {
    if index == 0 {
        return true;
    }
    match stops.get(index - 1) {
        Some(prev) => prev.departed_at.is_some(),
        None => true,
    }
}
