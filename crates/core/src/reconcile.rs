//! Minimal-diff reconciliation of entity lists onto UI row sets.
//!
//! A [`RowSet`] owns the ordered rows backing one list widget. Each
//! row is either an entity row, tagged with the id it was built for,
//! or a pinned trailer row (a fixed action such as "draw a card") kept
//! at the tail regardless of diffing. The reconciler knows nothing
//! about any UI framework; the host turns row payloads into actual
//! widgets and addresses rows by their stable [`RowHandle`].
//!
//! Reconciling tries hard to change nothing: rows whose entity is
//! still present are left untouched, keeping their handle and payload,
//! so any transient host state attached to them survives the update.

/// Opaque identity of one materialized row, stable for as long as the
/// backing entity stays present across reconciliations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowHandle(u64);

/// What one reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Entity ids rows were created for, in insertion order.
    pub created: Vec<i64>,
    /// Entity ids whose rows were removed.
    pub removed: Vec<i64>,
}

impl ReconcileOutcome {
    /// True when the pass created and removed nothing.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug)]
enum Slot<T> {
    Entity { id: i64, handle: RowHandle, value: T },
    Trailer { value: T },
}

impl<T> Slot<T> {
    fn is_trailer(&self) -> bool {
        matches!(self, Slot::Trailer { .. })
    }
}

/// A borrowed view of one row in display order.
#[derive(Debug)]
pub struct RowRef<'a, T> {
    /// Backing entity id; `None` for pinned trailers.
    pub id: Option<i64>,
    /// Stable row identity; `None` for pinned trailers.
    pub handle: Option<RowHandle>,
    /// Host payload built when the row was materialized.
    pub value: &'a T,
}

/// Ordered set of rows for one reconciled list.
#[derive(Debug, Default)]
pub struct RowSet<T> {
    slots: Vec<Slot<T>>,
    next_handle: u64,
}

impl<T> RowSet<T> {
    /// Create an empty row set.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_handle: 0,
        }
    }

    /// Append a pinned trailer row. Trailers are installed once, stay
    /// at the tail in installation order, and are never touched by
    /// [`RowSet::reconcile`].
    pub fn push_trailer(&mut self, value: T) {
        self.slots.push(Slot::Trailer { value });
    }

    /// Bring the entity rows in line with `entities`.
    ///
    /// Rows are added for entities with no existing row, removed for
    /// entities that vanished, and left alone otherwise. New rows are
    /// appended in entity order after the surviving rows, before the
    /// trailers; the builder runs only for ids being materialized, so
    /// a surviving row's payload is never rebuilt.
    pub fn reconcile<E>(
        &mut self,
        entities: &[E],
        id_of: impl Fn(&E) -> i64,
        mut build: impl FnMut(&E) -> T,
    ) -> ReconcileOutcome {
        let incoming: Vec<i64> = entities.iter().map(&id_of).collect();
        let mut outcome = ReconcileOutcome::default();

        // Detach the trailers only once an insertion is certain, so an
        // unchanged list reconciles without touching any row.
        let mut trailers: Option<Vec<Slot<T>>> = None;
        for entity in entities {
            let id = id_of(entity);
            if self.contains_entity(id) {
                continue;
            }
            if trailers.is_none() {
                let split = self
                    .slots
                    .iter()
                    .position(Slot::is_trailer)
                    .unwrap_or(self.slots.len());
                trailers = Some(self.slots.split_off(split));
            }
            let handle = RowHandle(self.next_handle);
            self.next_handle += 1;
            self.slots.push(Slot::Entity {
                id,
                handle,
                value: build(entity),
            });
            outcome.created.push(id);
        }
        if let Some(trailers) = trailers {
            self.slots.extend(trailers);
        }

        self.slots.retain(|slot| match slot {
            Slot::Trailer { .. } => true,
            Slot::Entity { id, .. } => {
                let keep = incoming.contains(id);
                if !keep {
                    outcome.removed.push(*id);
                }
                keep
            }
        });

        outcome
    }

    fn contains_entity(&self, id: i64) -> bool {
        self.slots
            .iter()
            .any(|slot| matches!(slot, Slot::Entity { id: row_id, .. } if *row_id == id))
    }

    /// Rows in display order.
    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_, T>> {
        self.slots.iter().map(|slot| match slot {
            Slot::Entity { id, handle, value } => RowRef {
                id: Some(*id),
                handle: Some(*handle),
                value,
            },
            Slot::Trailer { value } => RowRef {
                id: None,
                handle: None,
                value,
            },
        })
    }

    /// Total row count, trailers included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the set holds no rows at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The row at a display position, if any.
    pub fn row_at(&self, index: usize) -> Option<RowRef<'_, T>> {
        self.iter().nth(index)
    }

    /// Payload of the entity row for `id`, if materialized.
    pub fn get(&self, id: i64) -> Option<&T> {
        self.slots.iter().find_map(|slot| match slot {
            Slot::Entity { id: row_id, value, .. } if *row_id == id => Some(value),
            _ => None,
        })
    }

    /// Handle of the entity row for `id`, if materialized.
    pub fn handle_of(&self, id: i64) -> Option<RowHandle> {
        self.slots.iter().find_map(|slot| match slot {
            Slot::Entity { id: row_id, handle, .. } if *row_id == id => Some(*handle),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entity {
        id: i64,
        label: String,
    }

    fn entity(id: i64, label: &str) -> Entity {
        Entity {
            id,
            label: label.to_string(),
        }
    }

    fn card_set() -> RowSet<String> {
        let mut rows = RowSet::new();
        rows.push_trailer("Draw a card".to_string());
        rows
    }

    fn ids(rows: &RowSet<String>) -> Vec<Option<i64>> {
        rows.iter().map(|row| row.id).collect()
    }

    #[test]
    fn materializes_new_rows_before_trailer() {
        let mut rows = card_set();
        let outcome = rows.reconcile(
            &[entity(1, "Flood"), entity(2, "Wheat to Ames for 3")],
            |e| e.id,
            |e| e.label.clone(),
        );
        assert_eq!(outcome.created, vec![1, 2]);
        assert!(outcome.removed.is_empty());
        assert_eq!(ids(&rows), vec![Some(1), Some(2), None]);
    }

    #[test]
    fn unchanged_list_is_a_noop_and_preserves_handles() {
        let mut rows = card_set();
        let entities = [entity(1, "Flood"), entity(2, "Coal to Erie for 5")];
        rows.reconcile(&entities, |e| e.id, |e| e.label.clone());
        let before: Vec<_> = (1..=2).map(|id| rows.handle_of(id)).collect();

        let outcome = rows.reconcile(&entities, |e| e.id, |_| panic!("must not rebuild"));
        assert!(outcome.is_noop());
        let after: Vec<_> = (1..=2).map(|id| rows.handle_of(id)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn minimal_diff_counts() {
        let mut rows = card_set();
        rows.reconcile(
            &[entity(1, "a"), entity(2, "b"), entity(3, "c")],
            |e| e.id,
            |e| e.label.clone(),
        );

        // 2 survives, 1 and 3 vanish, 4 and 5 arrive.
        let outcome = rows.reconcile(
            &[entity(2, "b"), entity(4, "d"), entity(5, "e")],
            |e| e.id,
            |e| e.label.clone(),
        );
        assert_eq!(outcome.created, vec![4, 5]);
        assert_eq!(outcome.removed, vec![1, 3]);
        assert_eq!(ids(&rows), vec![Some(2), Some(4), Some(5), None]);
    }

    #[test]
    fn survivor_payload_is_never_rebuilt() {
        let mut rows = card_set();
        rows.reconcile(&[entity(1, "original")], |e| e.id, |e| e.label.clone());
        // Same id, different content: the row keeps its original text.
        rows.reconcile(&[entity(1, "changed")], |e| e.id, |e| e.label.clone());
        assert_eq!(rows.get(1).map(String::as_str), Some("original"));
    }

    #[test]
    fn trailers_stay_last_through_churn() {
        let mut rows = RowSet::new();
        rows.push_trailer("back".to_string());
        for pass in 0..4 {
            let entities: Vec<Entity> = (pass..pass + 3)
                .map(|id| entity(id, &format!("row {id}")))
                .collect();
            rows.reconcile(&entities, |e| e.id, |e| e.label.clone());
            let last = rows.row_at(rows.len() - 1).unwrap();
            assert!(last.id.is_none());
            assert_eq!(last.value, "back");
        }
    }

    #[test]
    fn trailer_survives_emptying_the_list() {
        let mut rows = card_set();
        rows.reconcile(&[entity(1, "a")], |e| e.id, |e| e.label.clone());
        let outcome = rows.reconcile(&[], |e: &Entity| e.id, |e| e.label.clone());
        assert_eq!(outcome.removed, vec![1]);
        assert_eq!(rows.len(), 1);
        assert!(rows.row_at(0).unwrap().id.is_none());
    }

    #[test]
    fn new_rows_append_after_survivors_in_snapshot_order() {
        let mut rows = card_set();
        rows.reconcile(&[entity(2, "b")], |e| e.id, |e| e.label.clone());
        // New entities 5 and 1 arrive around the survivor; they append
        // after it in snapshot order rather than sorting.
        rows.reconcile(
            &[entity(5, "e"), entity(2, "b"), entity(1, "a")],
            |e| e.id,
            |e| e.label.clone(),
        );
        assert_eq!(ids(&rows), vec![Some(2), Some(5), Some(1), None]);
    }

    #[test]
    fn draw_trailer_scenario() {
        // Initial hand: one event card. A contract card arrives.
        let mut rows = card_set();
        rows.reconcile(&[entity(1, "Flood")], |e| e.id, |e| e.label.clone());
        let handle = rows.handle_of(1).unwrap();

        let outcome = rows.reconcile(
            &[entity(1, "Flood"), entity(2, "Wheat to Ames for 3")],
            |e| e.id,
            |e| e.label.clone(),
        );
        assert_eq!(outcome.created, vec![2]);
        assert!(outcome.removed.is_empty());
        assert_eq!(rows.handle_of(1), Some(handle));
        let last = rows.row_at(rows.len() - 1).unwrap();
        assert_eq!(last.value, "Draw a card");
    }
}
