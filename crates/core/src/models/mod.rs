//! Shared domain models.
//!
//! These mirror the state JSON the crayon-rails server returns from
//! every `api/*` endpoint. The server omits fields that do not apply
//! to the current session (a logged-out snapshot is just
//! `{"player_id": null}`), so everything player-scoped is optional or
//! defaulted.

use serde::{Deserialize, Serialize};

/// Complete server-reported state of the player's session.
///
/// Exactly one snapshot is live at a time and each update wholly
/// replaces the previous one; there is no partial patching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Numeric player id, or `None` when nobody is logged in. When this
    /// is `None` every other field is meaningless.
    pub player_id: Option<i64>,
    /// Player display name, present when logged in.
    #[serde(default)]
    pub player_name: Option<String>,
    /// Name of the world being played, present when in a game.
    #[serde(default)]
    pub game: Option<String>,
    /// Joinable in-progress games, reported when logged in but not in
    /// a game.
    #[serde(default)]
    pub games: Vec<GameSummary>,
    /// World templates for starting a new game, reported alongside
    /// `games`.
    #[serde(default)]
    pub worlds: Vec<WorldSummary>,
    /// Money held by the player, reported while in a game.
    #[serde(default)]
    pub money: i64,
    /// Cards held by the player, reported while in a game.
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// A joinable in-progress game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    /// Numeric game id.
    pub id: i64,
    /// Name of the world the game is played on.
    pub world: String,
    /// Names of the players already in the game.
    #[serde(default)]
    pub players: Vec<String>,
}

/// A world template usable for a new game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSummary {
    /// Numeric world id.
    pub id: i64,
    /// World display name.
    pub name: String,
}

/// One card in the player's hand.
///
/// Ids are unique within a snapshot's card list; identity, not
/// position, determines how UI rows are matched across snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Numeric card id.
    pub id: i64,
    /// Number printed on the physical card, when the server knows it.
    #[serde(default)]
    pub number: Option<i64>,
    /// Event text, set for event cards.
    #[serde(default)]
    pub event: Option<String>,
    /// Deliverable contracts, non-empty for contract cards.
    #[serde(default)]
    pub contracts: Vec<Contract>,
}

/// Classification of a card for interaction purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    /// Carries one or more contracts; opens the contract-pick dialog.
    Contract,
    /// Carries event text only; discardable with a single confirmation.
    Event,
    /// Neither event nor contracts; discardable with a single
    /// confirmation.
    Simple,
}

impl Card {
    /// Classify this card. Contracts win over event text when a card
    /// carries both.
    pub fn kind(&self) -> CardKind {
        if !self.contracts.is_empty() {
            CardKind::Contract
        } else if self.event.is_some() {
            CardKind::Event
        } else {
            CardKind::Simple
        }
    }
}

/// A delivery contract nested inside a card.
///
/// Contract ids are unique only within their card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    /// Numeric contract id.
    pub id: i64,
    /// Good to deliver.
    pub good: String,
    /// Destination city.
    pub city: String,
    /// Payment for the delivery.
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_cards() {
        let contract = Card {
            id: 1,
            number: None,
            event: None,
            contracts: vec![Contract {
                id: 10,
                good: "Wheat".into(),
                city: "Ames".into(),
                amount: 3,
            }],
        };
        assert_eq!(contract.kind(), CardKind::Contract);

        let event = Card {
            id: 2,
            number: Some(7),
            event: Some("Flood".into()),
            contracts: Vec::new(),
        };
        assert_eq!(event.kind(), CardKind::Event);

        let blank = Card {
            id: 3,
            number: None,
            event: None,
            contracts: Vec::new(),
        };
        assert_eq!(blank.kind(), CardKind::Simple);
    }

    #[test]
    fn contracts_win_over_event_text() {
        let card = Card {
            id: 4,
            number: None,
            event: Some("Derailment".into()),
            contracts: vec![Contract {
                id: 11,
                good: "Coal".into(),
                city: "Erie".into(),
                amount: 2,
            }],
        };
        assert_eq!(card.kind(), CardKind::Contract);
    }

    #[test]
    fn logged_out_snapshot_deserializes_from_bare_object() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"player_id": null}"#).unwrap();
        assert!(snapshot.player_id.is_none());
        assert!(snapshot.games.is_empty());
        assert!(snapshot.cards.is_empty());
        assert_eq!(snapshot.money, 0);
    }

    #[test]
    fn playing_snapshot_deserializes() {
        let raw = r#"{
            "player_id": 3,
            "player_name": "dave",
            "game": "Nippon",
            "money": 120,
            "cards": [
                {"id": 1, "event": "Flood"},
                {"id": 2, "number": 14, "contracts": [
                    {"id": 10, "good": "Wheat", "city": "Ames", "amount": 3}
                ]}
            ]
        }"#;
        let snapshot: Snapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.player_id, Some(3));
        assert_eq!(snapshot.game.as_deref(), Some("Nippon"));
        assert_eq!(snapshot.money, 120);
        assert_eq!(snapshot.cards.len(), 2);
        assert_eq!(snapshot.cards[0].kind(), CardKind::Event);
        assert_eq!(snapshot.cards[1].number, Some(14));
        assert_eq!(snapshot.cards[1].contracts[0].city, "Ames");
    }
}
