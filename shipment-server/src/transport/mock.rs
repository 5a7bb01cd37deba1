//! Mock stop persistence for testing without the shipment service.
//!
//! Serves an in-memory stop list and lets tests script commit outcomes,
//! mimicking the real `StopsClient` interface.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::domain::ShipmentId;

use super::client::StopsTransport;
use super::error::TransportError;
use super::types::{CommitOutcome, StopRecord};

struct Inner {
    stops: Vec<StopRecord>,
    scripted: VecDeque<CommitOutcome>,
    commits: Vec<Vec<StopRecord>>,
    next_id: i64,
}

/// Mock transport backed by an in-memory stop list.
///
/// By default a commit is accepted: new stops are assigned ids, the list
/// becomes the persisted baseline, and it comes back as `Saved`. Tests can
/// queue rejections with [`reject_next_commit`](MockStopsClient::reject_next_commit).
#[derive(Clone)]
pub struct MockStopsClient {
    inner: Arc<Mutex<Inner>>,
}

impl MockStopsClient {
    /// Create a mock serving the given persisted list.
    pub fn new(stops: Vec<StopRecord>) -> Self {
        let next_id = stops.iter().filter_map(|s| s.id).max().unwrap_or(0) + 1;
        Self {
            inner: Arc::new(Mutex::new(Inner {
                stops,
                scripted: VecDeque::new(),
                commits: Vec::new(),
                next_id,
            })),
        }
    }

    /// Queue a validation rejection for the next commit, with flat
    /// `stops.{index}.{path}` keys.
    pub fn reject_next_commit<'a>(&self, errors: impl IntoIterator<Item = (&'a str, &'a str)>) {
        let map: HashMap<String, String> = errors
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut inner = self.inner.lock().unwrap();
        inner.scripted.push_back(CommitOutcome::Invalid(map));
    }

    /// Number of commits attempted against this mock.
    pub fn commit_count(&self) -> usize {
        self.inner.lock().unwrap().commits.len()
    }

    /// The payload of the most recent commit, if any.
    pub fn last_commit(&self) -> Option<Vec<StopRecord>> {
        self.inner.lock().unwrap().commits.last().cloned()
    }

    /// The current persisted baseline.
    pub fn persisted(&self) -> Vec<StopRecord> {
        self.inner.lock().unwrap().stops.clone()
    }
}

impl StopsTransport for MockStopsClient {
    async fn fetch_stops(&self, _shipment: ShipmentId) -> Result<Vec<StopRecord>, TransportError> {
        Ok(self.inner.lock().unwrap().stops.clone())
    }

    async fn commit_stops(
        &self,
        _shipment: ShipmentId,
        stops: &[StopRecord],
    ) -> Result<CommitOutcome, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.commits.push(stops.to_vec());

        if let Some(outcome) = inner.scripted.pop_front() {
            return Ok(outcome);
        }

        // Accept: persist, assigning ids to stops added this session.
        let mut persisted = stops.to_vec();
        for record in &mut persisted {
            if record.id.is_none() {
                record.id = Some(inner.next_id);
                inner.next_id += 1;
            }
        }
        inner.stops = persisted.clone();

        Ok(CommitOutcome::Saved(persisted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopKind;

    fn record(id: Option<i64>, number: u32) -> StopRecord {
        StopRecord {
            id,
            shipment_id: 42,
            stop_type: StopKind::Delivery,
            stop_number: number,
            facility_id: None,
            facility: None,
            appointment_type: None,
            appointment_at: None,
            appointment_end_at: None,
            eta: None,
            arrived_at: None,
            loaded_unloaded_at: None,
            left_at: None,
            reference_numbers: None,
            special_instructions: None,
        }
    }

    #[tokio::test]
    async fn serves_persisted_list() {
        let mock = MockStopsClient::new(vec![record(Some(1), 1), record(Some(2), 2)]);
        let stops = mock.fetch_stops(ShipmentId(42)).await.unwrap();
        assert_eq!(stops.len(), 2);
    }

    #[tokio::test]
    async fn default_commit_assigns_ids_and_persists() {
        let mock = MockStopsClient::new(vec![record(Some(1), 1), record(Some(2), 2)]);

        let payload = vec![record(Some(1), 1), record(Some(2), 2), record(None, 3)];
        let outcome = mock.commit_stops(ShipmentId(42), &payload).await.unwrap();

        let CommitOutcome::Saved(saved) = outcome else {
            panic!("expected Saved");
        };
        assert_eq!(saved[2].id, Some(3));
        assert_eq!(mock.persisted().len(), 3);
        assert_eq!(mock.commit_count(), 1);
    }

    #[tokio::test]
    async fn scripted_rejection_leaves_baseline_untouched() {
        let mock = MockStopsClient::new(vec![record(Some(1), 1), record(Some(2), 2)]);
        mock.reject_next_commit([("stops.0.facility.name", "required")]);

        let payload = vec![record(Some(1), 1), record(Some(2), 2), record(None, 3)];
        let outcome = mock.commit_stops(ShipmentId(42), &payload).await.unwrap();

        let CommitOutcome::Invalid(errors) = outcome else {
            panic!("expected Invalid");
        };
        assert_eq!(
            errors.get("stops.0.facility.name").map(String::as_str),
            Some("required")
        );
        assert_eq!(mock.persisted().len(), 2);

        // The next commit is back to the accepting default.
        let outcome = mock.commit_stops(ShipmentId(42), &payload).await.unwrap();
        assert!(matches!(outcome, CommitOutcome::Saved(_)));
    }
}
