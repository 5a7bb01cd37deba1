//! The editing session for one shipment's stop list.
//!
//! Owns the draft, the bound validation errors, and the collaborator handles,
//! and drives the load / edit / commit / discard lifecycle. The draft list
//! itself stays synchronous; this is where the suspending operations live
//! (timezone batch resolution, commit) and where stored instants cross into
//! and out of the edit representation.

use tracing::{debug, warn};

use crate::domain::{FieldChange, PostalCode, ShipmentId, Stop};
use crate::draft::{DraftStopList, FieldErrors};
use crate::timezone::TimezoneResolver;
use crate::transport::{CommitOutcome, StopRecord, StopsTransport, TransportError};

/// What a commit attempt settled to. A transport failure is an `Err` from
/// [`EditingSession::commit`] instead; in every non-`Saved` case the draft
/// and editing mode survive untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitResult {
    /// Persisted; the session left editing mode and took the fresh list as
    /// its baseline.
    Saved,
    /// Validation rejected the list; the field errors are bound for lookup.
    Rejected,
}

/// A single operator's editing session over one shipment's stop list.
pub struct EditingSession<T> {
    shipment: ShipmentId,
    transport: T,
    resolver: TimezoneResolver,
    draft: DraftStopList,
    baseline: Vec<StopRecord>,
    errors: FieldErrors,
}

impl<T: StopsTransport> EditingSession<T> {
    /// Open a session by fetching the persisted list, in viewing mode.
    pub async fn open(
        shipment: ShipmentId,
        transport: T,
        resolver: TimezoneResolver,
    ) -> Result<Self, TransportError> {
        let records = transport.fetch_stops(shipment).await?;

        let mut session = Self {
            shipment,
            transport,
            resolver,
            draft: DraftStopList::new(shipment),
            baseline: Vec::new(),
            errors: FieldErrors::empty(),
        };
        session.install_baseline(records).await;
        Ok(session)
    }

    /// The shipment this session edits.
    pub fn shipment(&self) -> ShipmentId {
        self.shipment
    }

    /// The working sequence, in route order.
    pub fn stops(&self) -> &[Stop] {
        self.draft.stops()
    }

    /// Whether the session is in editing mode.
    pub fn is_editing(&self) -> bool {
        self.draft.is_editing()
    }

    /// Validation errors from the most recent rejected commit.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The timezone resolver shared with conversion code.
    pub fn resolver(&self) -> &TimezoneResolver {
        &self.resolver
    }

    /// Enter editing mode; no data change.
    pub fn begin_editing(&mut self) {
        self.draft.begin_editing();
    }

    /// Append a new stop to the end of the draft.
    pub fn append(&mut self) {
        self.draft.append();
    }

    /// Swap the stop at `index` toward the start. Refused at boundaries.
    pub fn move_up(&mut self, index: usize) -> bool {
        self.draft.move_up(index)
    }

    /// Swap the stop at `index` toward the end. Refused at boundaries.
    pub fn move_down(&mut self, index: usize) -> bool {
        self.draft.move_down(index)
    }

    /// Remove the stop at `index`. Refused below the minimum cardinality.
    pub fn remove(&mut self, index: usize) -> bool {
        self.draft.remove(index)
    }

    /// Replace one logical field of the stop at `index`.
    ///
    /// A facility change resolves the new facility's timezone first, so the
    /// stop's datetimes localize correctly from here on. Resolution failure
    /// degrades to local-instant handling rather than blocking the edit.
    pub async fn update_field(&mut self, index: usize, change: FieldChange) -> bool {
        if let FieldChange::Facility(facility) = &change
            && let Some(code) = facility.postal_code.clone()
            && let Err(e) = self.resolver.ensure_resolved(&[code]).await
        {
            warn!(error = %e, "timezone resolution failed; continuing with local instants");
        }

        self.draft.update_field(index, change)
    }

    /// Abandon in-progress edits: rebuild from the last committed baseline
    /// and leave editing mode.
    pub async fn discard(&mut self) {
        let records = self.baseline.clone();
        self.errors.clear();
        self.install_draft(records).await;
    }

    /// Submit the draft for persistence.
    ///
    /// Each edit-format datetime converts back to a stored instant with the
    /// stop's resolved timezone. On `Saved` the session leaves editing mode
    /// and the fresh persisted list becomes the baseline. On `Rejected` the
    /// bound error set is wholesale-replaced and the working sequence is left
    /// unmodified, so the operator's corrections build on their prior input.
    /// A transport failure propagates as `Err` with draft and errors
    /// untouched.
    pub async fn commit(&mut self) -> Result<CommitResult, TransportError> {
        let zones = self.resolver.snapshot().await;
        let payload: Vec<StopRecord> = self
            .draft
            .stops()
            .iter()
            .map(|stop| StopRecord::from_stop(stop, &zones))
            .collect();

        match self.transport.commit_stops(self.shipment, &payload).await? {
            CommitOutcome::Saved(records) => {
                debug!(shipment = %self.shipment, count = records.len(), "stops committed");
                self.errors.clear();
                self.install_baseline(records).await;
                Ok(CommitResult::Saved)
            }
            CommitOutcome::Invalid(flat) => {
                debug!(shipment = %self.shipment, count = flat.len(), "commit rejected");
                self.errors = FieldErrors::from_flat(&flat);
                Ok(CommitResult::Rejected)
            }
        }
    }

    /// Take `records` as the committed baseline and rebuild the draft from
    /// it, leaving editing mode.
    async fn install_baseline(&mut self, records: Vec<StopRecord>) {
        self.install_draft(records.clone()).await;
        self.baseline = records;
    }

    /// Rebuild the draft from persisted records, localizing instants with
    /// whatever timezones resolve.
    async fn install_draft(&mut self, records: Vec<StopRecord>) {
        self.resolve_zones_for(&records).await;
        let zones = self.resolver.snapshot().await;
        let stops = records.iter().map(|r| r.to_stop(&zones)).collect();
        self.draft.discard(stops);
    }

    /// Batch-resolve the timezones the given records need. Non-fatal: on
    /// failure, conversion falls back to local instants.
    async fn resolve_zones_for(&self, records: &[StopRecord]) {
        let codes: Vec<PostalCode> = records
            .iter()
            .filter_map(|r| {
                r.facility
                    .as_ref()?
                    .location
                    .as_ref()?
                    .address_zipcode
                    .as_deref()
            })
            .filter_map(|z| PostalCode::parse(z).ok())
            .collect();

        if codes.is_empty() {
            return;
        }

        if let Err(e) = self.resolver.ensure_resolved(&codes).await {
            warn!(error = %e, "timezone resolution failed; falling back to local instants");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EditDateTime, Facility, FacilityId, StopKind};
    use crate::timezone::{TimezoneClient, TimezoneClientConfig, TimezoneMap};
    use crate::transport::{FacilityRecord, LocationRecord, MockStopsClient};
    use chrono_tz::America::Chicago;

    const SHIPMENT: ShipmentId = ShipmentId(42);

    fn record(id: i64, number: u32) -> StopRecord {
        StopRecord {
            id: Some(id),
            shipment_id: SHIPMENT.0,
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

    fn chicago_record(id: i64, number: u32) -> StopRecord {
        let mut r = record(id, number);
        r.facility_id = Some(4);
        r.facility = Some(FacilityRecord {
            id: 4,
            name: "Westside Cold Storage".into(),
            location: Some(LocationRecord {
                address_zipcode: Some("60612".into()),
            }),
        });
        r
    }

    fn offline_resolver() -> TimezoneResolver {
        let config = TimezoneClientConfig::new("test").with_base_url("http://127.0.0.1:9");
        TimezoneResolver::new(TimezoneClient::new(config).unwrap())
    }

    fn chicago_resolver() -> TimezoneResolver {
        let config = TimezoneClientConfig::new("test").with_base_url("http://127.0.0.1:9");
        TimezoneResolver::with_entries(
            TimezoneClient::new(config).unwrap(),
            TimezoneMap::from_entries([(PostalCode::parse("60612").unwrap(), Chicago)]),
        )
    }

    async fn open_session(
        records: Vec<StopRecord>,
        resolver: TimezoneResolver,
    ) -> (EditingSession<MockStopsClient>, MockStopsClient) {
        let mock = MockStopsClient::new(records);
        let session = EditingSession::open(SHIPMENT, mock.clone(), resolver)
            .await
            .unwrap();
        (session, mock)
    }

    #[tokio::test]
    async fn open_starts_in_viewing_mode() {
        let (session, _) = open_session(
            vec![record(1, 1), record(2, 2)],
            offline_resolver(),
        )
        .await;

        assert!(!session.is_editing());
        assert_eq!(session.stops().len(), 2);
        assert!(session.errors().is_empty());
    }

    #[tokio::test]
    async fn commit_success_exits_editing_and_takes_new_baseline() {
        let (mut session, mock) = open_session(
            vec![record(1, 1), record(2, 2)],
            offline_resolver(),
        )
        .await;

        session.begin_editing();
        session.append();
        assert_eq!(session.stops().len(), 3);

        let result = session.commit().await.unwrap();

        assert_eq!(result, CommitResult::Saved);
        assert!(!session.is_editing());
        // The appended stop came back with a persisted id.
        assert!(session.stops()[2].id.is_some());
        assert_eq!(mock.commit_count(), 1);

        // Discard now restores the post-commit baseline, not the original.
        session.begin_editing();
        session.append();
        session.discard().await;
        assert_eq!(session.stops().len(), 3);
    }

    #[tokio::test]
    async fn rejected_commit_preserves_draft_and_binds_errors() {
        let (mut session, mock) = open_session(
            vec![record(1, 1), record(2, 2)],
            offline_resolver(),
        )
        .await;
        mock.reject_next_commit([("stops.2.facility.name", "required")]);

        session.begin_editing();
        session.append();
        session
            .update_field(0, FieldChange::ReferenceNumbers(Some("PO-1881".into())))
            .await;
        let before: Vec<Stop> = session.stops().to_vec();

        let result = session.commit().await.unwrap();

        assert_eq!(result, CommitResult::Rejected);
        assert!(session.is_editing());
        // The working sequence is exactly what it was before the attempt.
        assert_eq!(session.stops(), &before[..]);
        assert_eq!(
            session.errors().error_for(2, "facility.name"),
            Some("required")
        );
        assert_eq!(session.errors().error_for(0, "facility.name"), None);
    }

    #[tokio::test]
    async fn each_rejection_replaces_the_error_set() {
        let (mut session, mock) = open_session(
            vec![record(1, 1), record(2, 2)],
            offline_resolver(),
        )
        .await;

        session.begin_editing();

        mock.reject_next_commit([("stops.0.type", "bad")]);
        session.commit().await.unwrap();
        assert_eq!(session.errors().error_for(0, "type"), Some("bad"));

        mock.reject_next_commit([("stops.1.left_at", "before arrival")]);
        session.commit().await.unwrap();
        // Wholesale replacement: the first attempt's error is gone.
        assert_eq!(session.errors().error_for(0, "type"), None);
        assert_eq!(
            session.errors().error_for(1, "left_at"),
            Some("before arrival")
        );
    }

    #[tokio::test]
    async fn successful_commit_clears_errors() {
        let (mut session, mock) = open_session(
            vec![record(1, 1), record(2, 2)],
            offline_resolver(),
        )
        .await;

        session.begin_editing();
        mock.reject_next_commit([("stops.0.type", "bad")]);
        session.commit().await.unwrap();
        assert!(!session.errors().is_empty());

        session.commit().await.unwrap();
        assert!(session.errors().is_empty());
        assert!(!session.is_editing());
    }

    #[tokio::test]
    async fn discard_restores_baseline_and_exits_editing() {
        let (mut session, _) = open_session(
            vec![record(1, 1), record(2, 2)],
            offline_resolver(),
        )
        .await;

        session.begin_editing();
        session.append();
        session
            .update_field(0, FieldChange::Kind(StopKind::Pickup))
            .await;

        session.discard().await;

        assert!(!session.is_editing());
        assert_eq!(session.stops().len(), 2);
        assert_eq!(session.stops()[0].kind, StopKind::Delivery);
    }

    #[tokio::test]
    async fn commit_localizes_edit_values_to_stored_instants() {
        let (mut session, mock) = open_session(
            vec![chicago_record(1, 1), record(2, 2)],
            chicago_resolver(),
        )
        .await;

        session.begin_editing();
        let departed = EditDateTime::parse("2024-03-15T14:30").unwrap();
        session
            .update_field(0, FieldChange::DepartedAt(Some(departed)))
            .await;
        session.commit().await.unwrap();

        let payload = mock.last_commit().unwrap();
        // 14:30 Chicago (CDT) is 19:30Z.
        assert_eq!(
            payload[0].left_at,
            Some("2024-03-15T19:30:00Z".parse().unwrap())
        );
        // The stop without a facility carries nothing to convert.
        assert_eq!(payload[1].left_at, None);
    }

    #[tokio::test]
    async fn load_localizes_stored_instants_to_edit_values() {
        let mut seeded = chicago_record(1, 1);
        seeded.appointment_at = Some("2024-03-15T19:30:00Z".parse().unwrap());

        let (session, _) = open_session(vec![seeded, record(2, 2)], chicago_resolver()).await;

        assert_eq!(
            session.stops()[0]
                .appointment_window_start
                .unwrap()
                .to_string(),
            "2024-03-15T14:30"
        );
    }

    #[tokio::test]
    async fn facility_update_is_applied_atomically() {
        let (mut session, _) = open_session(
            vec![record(1, 1), record(2, 2)],
            chicago_resolver(),
        )
        .await;

        session.begin_editing();
        let applied = session
            .update_field(
                1,
                FieldChange::Facility(Facility {
                    id: FacilityId(9),
                    name: "Harbor Terminal".into(),
                    postal_code: Some(PostalCode::parse("60612").unwrap()),
                }),
            )
            .await;

        assert!(applied);
        let facility = session.stops()[1].facility.as_ref().unwrap();
        assert_eq!(facility.id, FacilityId(9));
        assert_eq!(facility.name, "Harbor Terminal");
    }

    #[tokio::test]
    async fn commit_payload_carries_renumbered_positions() {
        let (mut session, mock) = open_session(
            vec![record(1, 1), record(2, 2), record(3, 3)],
            offline_resolver(),
        )
        .await;

        session.begin_editing();
        session.move_up(2);
        session.commit().await.unwrap();

        let payload = mock.last_commit().unwrap();
        assert_eq!(payload[1].id, Some(3));
        let numbers: Vec<u32> = payload.iter().map(|r| r.stop_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    /// A transport that always fails, for exercising the error path.
    struct FailingTransport;

    impl StopsTransport for FailingTransport {
        async fn fetch_stops(
            &self,
            _shipment: ShipmentId,
        ) -> Result<Vec<StopRecord>, TransportError> {
            Err(TransportError::Api {
                status: 503,
                message: "unavailable".into(),
            })
        }

        async fn commit_stops(
            &self,
            _shipment: ShipmentId,
            _stops: &[StopRecord],
        ) -> Result<CommitOutcome, TransportError> {
            Err(TransportError::Api {
                status: 503,
                message: "unavailable".into(),
            })
        }
    }

    #[tokio::test]
    async fn transport_failure_preserves_draft_and_editing_mode() {
        // Open against the mock, then swap in a failing transport.
        let mock = MockStopsClient::new(vec![record(1, 1), record(2, 2)]);
        let opened = EditingSession::open(SHIPMENT, mock, offline_resolver())
            .await
            .unwrap();
        let mut session = EditingSession {
            shipment: opened.shipment,
            transport: FailingTransport,
            resolver: opened.resolver,
            draft: opened.draft,
            baseline: opened.baseline,
            errors: opened.errors,
        };

        session.begin_editing();
        session.append();
        let before: Vec<Stop> = session.stops().to_vec();

        let result = session.commit().await;

        assert!(result.is_err());
        assert!(session.is_editing());
        assert_eq!(session.stops(), &before[..]);
        assert!(session.errors().is_empty());
    }
}
