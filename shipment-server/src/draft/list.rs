//! The mutable working copy of a shipment's stop sequence.

use crate::domain::{FieldChange, ShipmentId, Stop};

/// A route needs somewhere to pick up and somewhere to deliver; removal below
/// this is refused.
pub const MIN_STOPS: usize = 2;

/// The ordered, mutable working copy of a shipment's stops, plus the
/// editing-mode flag.
///
/// The list exclusively owns its stops for the duration of a session. Every
/// mutating operation re-establishes the position invariant (`position ==
/// index + 1`); operations that would break an invariant (removal below
/// [`MIN_STOPS`], out-of-range indices, boundary swaps) are refused as no-ops
/// returning `false` — callers are expected to have disabled the triggering
/// control, so nothing is surfaced.
///
/// The list is purely synchronous. Conversion between stored instants and the
/// edit representation happens at the load and commit boundaries, in the
/// session that owns this list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftStopList {
    shipment: ShipmentId,
    stops: Vec<Stop>,
    editing: bool,
}

impl DraftStopList {
    /// Create an empty list in viewing mode.
    pub fn new(shipment: ShipmentId) -> Self {
        Self {
            shipment,
            stops: Vec::new(),
            editing: false,
        }
    }

    /// The owning shipment.
    pub fn shipment(&self) -> ShipmentId {
        self.shipment
    }

    /// The working sequence, in route order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Number of stops in the working sequence.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether the working sequence is empty (only before the first load).
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Whether the session is in editing mode.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Enter editing mode. No data change.
    pub fn begin_editing(&mut self) {
        self.editing = true;
    }

    /// Rebuild the working sequence from a persisted list.
    ///
    /// Always a full replacement, and idempotent. Invoked only at defined
    /// lifecycle points (session start, post-commit success, discard) — never
    /// as a side effect of unrelated updates. Calling it while editing
    /// overwrites in-progress edits, so callers own that decision.
    pub fn load(&mut self, stops: Vec<Stop>) {
        self.stops = stops;
        self.renumber();
    }

    /// Rebuild from the persisted list and leave editing mode; used on cancel
    /// and after a successful commit.
    pub fn discard(&mut self, stops: Vec<Stop>) {
        self.load(stops);
        self.editing = false;
    }

    /// Append a new stop: delivery kind, facility and timestamps unset.
    /// Existing entries are untouched.
    pub fn append(&mut self) {
        let position = self.stops.len() as u32 + 1;
        self.stops.push(Stop::appended(self.shipment, position));
    }

    /// Swap the stop at `index` with its predecessor. Refused at the top of
    /// the list or out of range.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.stops.len() {
            return false;
        }
        self.stops.swap(index - 1, index);
        self.renumber();
        true
    }

    /// Swap the stop at `index` with its successor. Refused at the bottom of
    /// the list or out of range.
    pub fn move_down(&mut self, index: usize) -> bool {
        if self.stops.len() < 2 || index >= self.stops.len() - 1 {
            return false;
        }
        self.stops.swap(index, index + 1);
        self.renumber();
        true
    }

    /// Remove the stop at `index`. Refused when the result would drop below
    /// [`MIN_STOPS`] or the index is out of range.
    pub fn remove(&mut self, index: usize) -> bool {
        if self.stops.len() <= MIN_STOPS || index >= self.stops.len() {
            return false;
        }
        self.stops.remove(index);
        self.renumber();
        true
    }

    /// Replace exactly one logical field of the stop at `index`. Refused out
    /// of range.
    pub fn update_field(&mut self, index: usize, change: FieldChange) -> bool {
        match self.stops.get_mut(index) {
            Some(stop) => {
                change.apply(stop);
                true
            }
            None => false,
        }
    }

    /// Re-establish `position == index + 1` for every entry.
    fn renumber(&mut self) {
        for (i, stop) in self.stops.iter_mut().enumerate() {
            stop.position = i as u32 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EditDateTime, Facility, FacilityId, PostalCode, StopId, StopKind};

    fn shipment() -> ShipmentId {
        ShipmentId(42)
    }

    /// A persisted-looking stop with an id, deliberately mis-numbered so
    /// tests can observe renumbering.
    fn persisted_stop(id: i64, position: u32) -> Stop {
        let mut stop = Stop::appended(shipment(), position);
        stop.id = Some(StopId(id));
        stop
    }

    fn loaded(count: usize) -> DraftStopList {
        let mut list = DraftStopList::new(shipment());
        list.load((0..count).map(|i| persisted_stop(i as i64, i as u32 + 1)).collect());
        list
    }

    fn positions(list: &DraftStopList) -> Vec<u32> {
        list.stops().iter().map(|s| s.position).collect()
    }

    fn ids(list: &DraftStopList) -> Vec<Option<StopId>> {
        list.stops().iter().map(|s| s.id).collect()
    }

    #[test]
    fn load_replaces_and_renumbers() {
        let mut list = DraftStopList::new(shipment());
        list.load(vec![persisted_stop(10, 7), persisted_stop(11, 3)]);

        assert_eq!(positions(&list), vec![1, 2]);
        assert_eq!(ids(&list), vec![Some(StopId(10)), Some(StopId(11))]);

        // Loading again fully replaces.
        list.load(vec![
            persisted_stop(20, 1),
            persisted_stop(21, 2),
            persisted_stop(22, 3),
        ]);
        assert_eq!(list.len(), 3);
        assert_eq!(ids(&list)[0], Some(StopId(20)));
    }

    #[test]
    fn load_preserves_editing_flag() {
        let mut list = loaded(2);
        list.begin_editing();
        list.load(vec![persisted_stop(1, 1), persisted_stop(2, 2)]);
        assert!(list.is_editing());
    }

    #[test]
    fn discard_exits_editing() {
        let mut list = loaded(3);
        list.begin_editing();
        list.discard(vec![persisted_stop(1, 1), persisted_stop(2, 2)]);
        assert!(!list.is_editing());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn append_defaults_and_positions() {
        let mut list = loaded(2);
        let before: Vec<Stop> = list.stops().to_vec();

        list.append();

        assert_eq!(list.len(), 3);
        // Existing entries untouched.
        assert_eq!(&list.stops()[..2], &before[..]);

        let appended = &list.stops()[2];
        assert_eq!(appended.id, None);
        assert_eq!(appended.kind, StopKind::Delivery);
        assert_eq!(appended.position, 3);
        assert!(appended.facility.is_none());
        assert!(appended.departed_at.is_none());
    }

    #[test]
    fn move_up_swaps_and_renumbers() {
        let mut list = loaded(3);

        assert!(list.move_up(2));

        assert_eq!(
            ids(&list),
            vec![Some(StopId(0)), Some(StopId(2)), Some(StopId(1))]
        );
        assert_eq!(positions(&list), vec![1, 2, 3]);
    }

    #[test]
    fn move_down_swaps_and_renumbers() {
        let mut list = loaded(3);

        assert!(list.move_down(0));

        assert_eq!(
            ids(&list),
            vec![Some(StopId(1)), Some(StopId(0)), Some(StopId(2))]
        );
        assert_eq!(positions(&list), vec![1, 2, 3]);
    }

    #[test]
    fn boundary_moves_are_noops() {
        let mut list = loaded(3);
        let before = list.clone();

        assert!(!list.move_up(0));
        assert!(!list.move_down(2));
        assert!(!list.move_up(5));
        assert!(!list.move_down(5));

        assert_eq!(list, before);
    }

    #[test]
    fn remove_renumbers() {
        let mut list = loaded(4);

        assert!(list.remove(1));

        assert_eq!(
            ids(&list),
            vec![Some(StopId(0)), Some(StopId(2)), Some(StopId(3))]
        );
        assert_eq!(positions(&list), vec![1, 2, 3]);
    }

    #[test]
    fn remove_refused_at_minimum_cardinality() {
        let mut list = loaded(2);
        let before = list.clone();

        assert!(!list.remove(0));
        assert!(!list.remove(1));
        assert_eq!(list, before);
    }

    #[test]
    fn remove_refused_out_of_range() {
        let mut list = loaded(3);
        let before = list.clone();

        assert!(!list.remove(3));
        assert_eq!(list, before);
    }

    #[test]
    fn update_field_replaces_one_field() {
        let mut list = loaded(2);
        let when = EditDateTime::parse("2024-03-15T09:00").unwrap();

        assert!(list.update_field(0, FieldChange::DepartedAt(Some(when))));
        assert_eq!(list.stops()[0].departed_at, Some(when));
        assert_eq!(list.stops()[1].departed_at, None);

        assert!(!list.update_field(9, FieldChange::DepartedAt(None)));
    }

    #[test]
    fn facility_update_is_atomic() {
        let mut list = loaded(2);
        let facility = Facility {
            id: FacilityId(9),
            name: "Harbor Terminal".into(),
            postal_code: Some(PostalCode::parse("90731").unwrap()),
        };

        assert!(list.update_field(1, FieldChange::Facility(facility.clone())));

        assert_eq!(list.stops()[1].facility.as_ref(), Some(&facility));
    }

    #[test]
    fn begin_editing_changes_no_data() {
        let mut list = loaded(2);
        let before = list.stops().to_vec();

        list.begin_editing();

        assert!(list.is_editing());
        assert_eq!(list.stops(), &before[..]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::StopId;
    use proptest::prelude::*;

    /// One mutation of the working sequence.
    #[derive(Debug, Clone)]
    enum Op {
        Append,
        MoveUp(usize),
        MoveDown(usize),
        Remove(usize),
    }

    fn any_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Append),
            (0usize..8).prop_map(Op::MoveUp),
            (0usize..8).prop_map(Op::MoveDown),
            (0usize..8).prop_map(Op::Remove),
        ]
    }

    fn seeded(count: usize) -> DraftStopList {
        let mut list = DraftStopList::new(ShipmentId(1));
        list.load(
            (0..count)
                .map(|i| {
                    let mut stop = Stop::appended(ShipmentId(1), i as u32 + 1);
                    stop.id = Some(StopId(i as i64));
                    stop
                })
                .collect(),
        );
        list
    }

    proptest! {
        /// Positions equal index + 1 after any operation sequence.
        #[test]
        fn renumbering_invariant(
            initial in 2usize..6,
            ops in prop::collection::vec(any_op(), 0..40),
        ) {
            let mut list = seeded(initial);

            for op in ops {
                match op {
                    Op::Append => list.append(),
                    Op::MoveUp(i) => { list.move_up(i); }
                    Op::MoveDown(i) => { list.move_down(i); }
                    Op::Remove(i) => { list.remove(i); }
                }

                for (i, stop) in list.stops().iter().enumerate() {
                    prop_assert_eq!(stop.position as usize, i + 1);
                }
            }
        }

        /// The list never drops below the minimum cardinality.
        #[test]
        fn minimum_cardinality_holds(
            initial in 2usize..6,
            ops in prop::collection::vec(any_op(), 0..40),
        ) {
            let mut list = seeded(initial);

            for op in ops {
                match op {
                    Op::Append => list.append(),
                    Op::MoveUp(i) => { list.move_up(i); }
                    Op::MoveDown(i) => { list.move_down(i); }
                    Op::Remove(i) => { list.remove(i); }
                }
                prop_assert!(list.len() >= MIN_STOPS);
            }
        }

        /// Swaps permute identity without losing or duplicating stops.
        #[test]
        fn moves_preserve_the_multiset(
            initial in 2usize..6,
            ops in prop::collection::vec(any_op(), 0..40),
        ) {
            let mut list = seeded(initial);
            let mut expected_len = initial;

            for op in ops {
                match op {
                    Op::Append => {
                        list.append();
                        expected_len += 1;
                    }
                    Op::MoveUp(i) => { list.move_up(i); }
                    Op::MoveDown(i) => { list.move_down(i); }
                    Op::Remove(i) => {
                        if list.remove(i) {
                            expected_len -= 1;
                        }
                    }
                }
            }

            prop_assert_eq!(list.len(), expected_len);

            // Persisted ids are unique, so the set survives all swaps.
            let mut ids: Vec<i64> = list
                .stops()
                .iter()
                .filter_map(|s| s.id.map(|StopId(id)| id))
                .collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert!(ids.len() <= initial);
        }

        /// A refused move changes nothing at all.
        #[test]
        fn refused_moves_change_nothing(initial in 2usize..6) {
            let mut list = seeded(initial);
            let before = list.clone();

            prop_assert!(!list.move_up(0));
            prop_assert!(!list.move_down(initial - 1));
            prop_assert_eq!(list, before);
        }
    }
}
