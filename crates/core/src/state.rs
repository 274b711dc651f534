//! Holder for the single live state snapshot.

use chrono::{DateTime, Utc};

use crate::models::{Card, Snapshot};

/// Owns the current [`Snapshot`] and the identity fields derived from
/// it. Storage and lookup only; no validation happens here, so a
/// malformed snapshot propagates to the page router and reconcilers,
/// which degrade field by field.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshot: Option<Snapshot>,
    applied_at: Option<DateTime<Utc>>,
}

impl SnapshotStore {
    /// Create an empty store holding no snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally replace the held snapshot.
    pub fn replace(&mut self, snapshot: Snapshot) {
        self.snapshot = Some(snapshot);
        self.applied_at = Some(Utc::now());
    }

    /// The held snapshot, if any update has arrived yet.
    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// When the held snapshot was applied.
    pub fn applied_at(&self) -> Option<DateTime<Utc>> {
        self.applied_at
    }

    /// Derived player id of the current session.
    pub fn player_id(&self) -> Option<i64> {
        self.snapshot.as_ref().and_then(|s| s.player_id)
    }

    /// Derived player name of the current session.
    pub fn player_name(&self) -> Option<&str> {
        self.snapshot
            .as_ref()
            .and_then(|s| s.player_name.as_deref())
    }

    /// Linear lookup of a held card by id. `None` when no snapshot is
    /// held or the id is absent.
    pub fn card_by_id(&self, card_id: i64) -> Option<&Card> {
        self.snapshot
            .as_ref()
            .and_then(|s| s.cards.iter().find(|card| card.id == card_id))
    }
}
