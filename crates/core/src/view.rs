//! Pure description builders for list rows.
//!
//! These produce the text a row shows when it is first materialized.
//! Row content is fixed at creation time; an entity that keeps its id
//! across snapshots keeps its original description (see
//! [`crate::reconcile`]).

use crate::models::{Card, Contract, GameSummary, WorldSummary};

/// One line describing a card's event, e.g. `"! Flood"`.
pub fn describe_event(card: &Card) -> Option<String> {
    card.event.as_deref().map(|event| format!("! {event}"))
}

/// One line describing a contract, e.g. `"Wheat to Ames for 3"`.
pub fn describe_contract(contract: &Contract) -> String {
    format!(
        "{} to {} for {}",
        contract.good, contract.city, contract.amount
    )
}

/// Multi-line description of a card: printed number if known, event
/// line if any, then one line per contract. A card with none of these
/// renders as an empty row.
pub fn describe_card(card: &Card) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(number) = card.number {
        lines.push(format!("Card #{number}"));
    }
    if let Some(event) = describe_event(card) {
        lines.push(event);
    }
    for contract in &card.contracts {
        lines.push(describe_contract(contract));
    }
    lines
}

/// One line describing a joinable game: world name plus current
/// players.
pub fn describe_game(game: &GameSummary) -> String {
    if game.players.is_empty() {
        game.world.clone()
    } else {
        format!("{} {}", game.world, game.players.join(", "))
    }
}

/// One line describing a world template.
pub fn describe_world(world: &WorldSummary) -> String {
    world.name.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_line() {
        let contract = Contract {
            id: 10,
            good: "Wheat".into(),
            city: "Ames".into(),
            amount: 3,
        };
        assert_eq!(describe_contract(&contract), "Wheat to Ames for 3");
    }

    #[test]
    fn card_description_orders_number_event_contracts() {
        let card = Card {
            id: 1,
            number: Some(41),
            event: Some("Flood".into()),
            contracts: vec![
                Contract {
                    id: 10,
                    good: "Wheat".into(),
                    city: "Ames".into(),
                    amount: 3,
                },
                Contract {
                    id: 11,
                    good: "Coal".into(),
                    city: "Erie".into(),
                    amount: 5,
                },
            ],
        };
        assert_eq!(
            describe_card(&card),
            vec![
                "Card #41".to_string(),
                "! Flood".to_string(),
                "Wheat to Ames for 3".to_string(),
                "Coal to Erie for 5".to_string(),
            ]
        );
    }

    #[test]
    fn blank_card_renders_empty() {
        let card = Card {
            id: 2,
            number: None,
            event: None,
            contracts: Vec::new(),
        };
        assert!(describe_card(&card).is_empty());
    }

    #[test]
    fn game_line_includes_players() {
        let game = GameSummary {
            id: 1,
            world: "Nippon".into(),
            players: vec!["ann".into(), "bob".into()],
        };
        assert_eq!(describe_game(&game), "Nippon ann, bob");

        let empty = GameSummary {
            id: 2,
            world: "Alba".into(),
            players: Vec::new(),
        };
        assert_eq!(describe_game(&empty), "Alba");
    }
}
