//! Composition root driven by the hosting UI.
//!
//! The controller owns the snapshot store, the page selection, the
//! modal chain, and the three reconciled row sets (games, worlds,
//! cards). A host feeds it snapshots via [`GameController::apply_snapshot`]
//! and routes row/button interactions to the entry points below; entry
//! points that require a server round-trip hand back an [`Action`] for
//! the host to dispatch.

use tracing::debug;

use crate::client::Action;
use crate::modal::{ModalChain, ModalState};
use crate::models::{CardKind, Snapshot};
use crate::page::{LobbyTab, Page};
use crate::reconcile::RowSet;
use crate::state::SnapshotStore;
use crate::view;

/// What a materialized row represents, fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// A joinable game in the lobby list.
    Game,
    /// A world template in the new-game list.
    World,
    /// A card opening the single-confirmation discard dialog.
    SimpleCard,
    /// A card opening the contract-pick dialog.
    ContractCard,
    /// Pinned trailer: switch to the world list.
    NewGameAction,
    /// Pinned trailer: switch back to the game list.
    BackAction,
    /// Pinned trailer: draw a card.
    DrawAction,
}

/// Host payload of one row: its kind plus the description lines fixed
/// when the row was materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContent {
    /// What this row represents.
    pub kind: RowKind,
    /// Description text captured when the row was built.
    pub lines: Vec<String>,
}

impl RowContent {
    fn action(kind: RowKind, label: &str) -> Self {
        Self {
            kind,
            lines: vec![label.to_string()],
        }
    }
}

/// One selectable row of the contract-pick dialog: a contract, or the
/// trailing discard action when `contract` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractChoice {
    /// Contract id, or `None` for the discard action row.
    pub contract: Option<i64>,
    /// Text the dialog shows for this row.
    pub label: String,
}

/// Browser-side controller of the whole client.
#[derive(Debug)]
pub struct GameController {
    store: SnapshotStore,
    page: Page,
    lobby_tab: LobbyTab,
    modal: ModalChain,
    games: RowSet<RowContent>,
    worlds: RowSet<RowContent>,
    cards: RowSet<RowContent>,
}

impl Default for GameController {
    fn default() -> Self {
        Self::new()
    }
}

impl GameController {
    /// Create a controller with no snapshot applied yet. The pinned
    /// trailer rows are installed once here and survive every
    /// reconciliation.
    pub fn new() -> Self {
        let mut games = RowSet::new();
        games.push_trailer(RowContent::action(RowKind::NewGameAction, "Start a new game"));
        let mut worlds = RowSet::new();
        worlds.push_trailer(RowContent::action(RowKind::BackAction, "Back to game list"));
        let mut cards = RowSet::new();
        cards.push_trailer(RowContent::action(RowKind::DrawAction, "Draw a card"));
        Self {
            store: SnapshotStore::new(),
            page: Page::Login,
            lobby_tab: LobbyTab::Games,
            modal: ModalChain::new(),
            games,
            worlds,
            cards,
        }
    }

    /// Apply a fresh server snapshot: replace the store, re-derive the
    /// page, collapse the lobby sub-view, close any open dialog, and
    /// reconcile the lists the page renders.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.store.replace(snapshot);
        let Some(snapshot) = self.store.current() else {
            return;
        };
        self.page = Page::for_snapshot(snapshot);
        self.lobby_tab = LobbyTab::Games;
        self.modal.reset();

        match self.page {
            Page::Login => {}
            Page::PickGame => {
                let games = self.games.reconcile(
                    &snapshot.games,
                    |game| game.id,
                    |game| RowContent {
                        kind: RowKind::Game,
                        lines: vec![view::describe_game(game)],
                    },
                );
                let worlds = self.worlds.reconcile(
                    &snapshot.worlds,
                    |world| world.id,
                    |world| RowContent {
                        kind: RowKind::World,
                        lines: vec![view::describe_world(world)],
                    },
                );
                if !games.is_noop() || !worlds.is_noop() {
                    debug!(
                        games_created = games.created.len(),
                        games_removed = games.removed.len(),
                        worlds_created = worlds.created.len(),
                        worlds_removed = worlds.removed.len(),
                        "lobby lists reconciled"
                    );
                }
            }
            Page::Playing => {
                let outcome = self.cards.reconcile(
                    &snapshot.cards,
                    |card| card.id,
                    |card| RowContent {
                        kind: match card.kind() {
                            CardKind::Contract => RowKind::ContractCard,
                            CardKind::Event | CardKind::Simple => RowKind::SimpleCard,
                        },
                        lines: view::describe_card(card),
                    },
                );
                if !outcome.is_noop() {
                    debug!(
                        created = outcome.created.len(),
                        removed = outcome.removed.len(),
                        "card list reconciled"
                    );
                }
            }
        }
    }

    /// Page currently selected by the snapshot.
    pub fn page(&self) -> Page {
        self.page
    }

    /// Sub-view of the pick-game page.
    pub fn lobby_tab(&self) -> LobbyTab {
        self.lobby_tab
    }

    /// The modal chain state.
    pub fn modal(&self) -> &ModalState {
        self.modal.state()
    }

    /// The snapshot store, for hosts that need raw state.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Money held, per the current snapshot.
    pub fn money(&self) -> i64 {
        self.store.current().map(|s| s.money).unwrap_or(0)
    }

    /// World name of the active game, if playing.
    pub fn game_name(&self) -> Option<&str> {
        self.store.current().and_then(|s| s.game.as_deref())
    }

    /// Logged-in player name.
    pub fn player_name(&self) -> Option<&str> {
        self.store.player_name()
    }

    /// Reconciled rows of the games list.
    pub fn games_rows(&self) -> &RowSet<RowContent> {
        &self.games
    }

    /// Reconciled rows of the worlds list.
    pub fn worlds_rows(&self) -> &RowSet<RowContent> {
        &self.worlds
    }

    /// Reconciled rows of the cards list.
    pub fn cards_rows(&self) -> &RowSet<RowContent> {
        &self.cards
    }

    /// Rows of the lobby list currently showing, honoring the
    /// sub-view toggle.
    pub fn lobby_rows(&self) -> &RowSet<RowContent> {
        match self.lobby_tab {
            LobbyTab::Games => &self.games,
            LobbyTab::Worlds => &self.worlds,
        }
    }

    /// Activate a row of the showing lobby list. Game and world rows
    /// yield join/new actions; the trailers toggle the sub-view
    /// locally without touching the server.
    pub fn activate_lobby_row(&mut self, index: usize) -> Option<Action> {
        let (id, kind) = {
            let row = self.lobby_rows().row_at(index)?;
            (row.id, row.value.kind)
        };
        match (id, kind) {
            (Some(game), RowKind::Game) => Some(Action::JoinGame { game }),
            (Some(world), RowKind::World) => Some(Action::NewGame { world }),
            (None, RowKind::NewGameAction) => {
                self.lobby_tab = LobbyTab::Worlds;
                None
            }
            (None, RowKind::BackAction) => {
                self.lobby_tab = LobbyTab::Games;
                None
            }
            _ => None,
        }
    }

    /// Activate a row of the card list. The draw trailer yields an
    /// action; card rows open the appropriate dialog.
    pub fn activate_card_row(&mut self, index: usize) -> Option<Action> {
        let row = self.cards.row_at(index)?;
        match (row.id, row.value.kind) {
            (None, RowKind::DrawAction) => Some(Action::Draw),
            (Some(card), RowKind::ContractCard) => {
                self.modal.open_contract_pick(card);
                None
            }
            (Some(card), RowKind::SimpleCard) => {
                let description = row.value.lines.clone();
                self.modal.open_simple(card, description);
                None
            }
            _ => None,
        }
    }

    /// Rows of the open contract-pick dialog, re-derived from the live
    /// snapshot on every call. The trailing discard action is always
    /// present, even when the backing card has gone stale.
    pub fn contract_pick_rows(&self) -> Vec<ContractChoice> {
        let ModalState::ContractPick { card } = self.modal.state() else {
            return Vec::new();
        };
        let mut rows = Vec::new();
        if let Some(card) = self.store.card_by_id(*card) {
            for contract in &card.contracts {
                rows.push(ContractChoice {
                    contract: Some(contract.id),
                    label: view::describe_contract(contract),
                });
            }
        }
        rows.push(ContractChoice {
            contract: None,
            label: "Discard this card".to_string(),
        });
        rows
    }

    /// Activate a row of the contract-pick dialog: a contract advances
    /// to its confirmation, the discard action requests the (guarded)
    /// discard confirmation.
    pub fn activate_contract_row(&mut self, index: usize) {
        let Some(choice) = self.contract_pick_rows().into_iter().nth(index) else {
            return;
        };
        match choice.contract {
            Some(contract) => self.modal.pick_contract(contract, choice.label),
            None => self.modal.request_discard(&self.store),
        }
    }

    /// Confirm the showing dialog, yielding the action it gates. The
    /// dialog itself closes via the snapshot refresh the action
    /// triggers, not here.
    pub fn confirm_modal(&self) -> Option<Action> {
        match self.modal.state() {
            ModalState::ContractConfirm { contract, .. } => Some(Action::Complete {
                contract: *contract,
            }),
            ModalState::SimpleDiscard { card, .. } | ModalState::DiscardConfirm { card, .. } => {
                Some(Action::Discard { card: *card })
            }
            _ => None,
        }
    }

    /// Cancel the showing dialog: confirmations rewind to the pick
    /// dialog, entry dialogs close the chain.
    pub fn cancel_modal(&mut self) {
        match self.modal.state() {
            ModalState::ContractConfirm { .. } => self.modal.cancel_contract_confirm(),
            ModalState::DiscardConfirm { .. } => self.modal.cancel_discard(),
            _ => self.modal.dismiss(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Card, Contract, GameSummary, WorldSummary};

    fn lobby_snapshot() -> Snapshot {
        Snapshot {
            player_id: Some(1),
            player_name: Some("dave".into()),
            game: None,
            games: vec![GameSummary {
                id: 2,
                world: "Nippon".into(),
                players: vec!["ann".into()],
            }],
            worlds: vec![WorldSummary {
                id: 4,
                name: "Alba".into(),
            }],
            money: 0,
            cards: Vec::new(),
        }
    }

    fn playing_snapshot(cards: Vec<Card>) -> Snapshot {
        Snapshot {
            player_id: Some(1),
            player_name: Some("dave".into()),
            game: Some("Nippon".into()),
            games: Vec::new(),
            worlds: Vec::new(),
            money: 60,
            cards,
        }
    }

    fn contract_card(id: i64, contract: i64) -> Card {
        Card {
            id,
            number: None,
            event: None,
            contracts: vec![Contract {
                id: contract,
                good: "Wheat".into(),
                city: "Ames".into(),
                amount: 3,
            }],
        }
    }

    fn event_card(id: i64, text: &str) -> Card {
        Card {
            id,
            number: None,
            event: Some(text.into()),
            contracts: Vec::new(),
        }
    }

    #[test]
    fn lobby_rows_render_with_trailers() {
        let mut controller = GameController::new();
        controller.apply_snapshot(lobby_snapshot());
        assert_eq!(controller.page(), Page::PickGame);
        assert_eq!(controller.lobby_tab(), LobbyTab::Games);

        let games: Vec<_> = controller.games_rows().iter().collect();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].value.lines, vec!["Nippon ann".to_string()]);
        assert_eq!(games[1].value.kind, RowKind::NewGameAction);

        let worlds: Vec<_> = controller.worlds_rows().iter().collect();
        assert_eq!(worlds.len(), 2);
        assert_eq!(worlds[1].value.kind, RowKind::BackAction);
    }

    #[test]
    fn lobby_trailers_toggle_subview_locally() {
        let mut controller = GameController::new();
        controller.apply_snapshot(lobby_snapshot());

        // "Start a new game" is the trailer after the one game row.
        assert_eq!(controller.activate_lobby_row(1), None);
        assert_eq!(controller.lobby_tab(), LobbyTab::Worlds);
        // World row activates a new-game action.
        assert_eq!(
            controller.activate_lobby_row(0),
            Some(Action::NewGame { world: 4 })
        );
        // "Back" returns to the game list.
        assert_eq!(controller.activate_lobby_row(1), None);
        assert_eq!(controller.lobby_tab(), LobbyTab::Games);
        assert_eq!(
            controller.activate_lobby_row(0),
            Some(Action::JoinGame { game: 2 })
        );
    }

    #[test]
    fn snapshot_collapses_world_subview() {
        let mut controller = GameController::new();
        controller.apply_snapshot(lobby_snapshot());
        controller.activate_lobby_row(1);
        assert_eq!(controller.lobby_tab(), LobbyTab::Worlds);
        controller.apply_snapshot(lobby_snapshot());
        assert_eq!(controller.lobby_tab(), LobbyTab::Games);
    }

    #[test]
    fn card_rows_preserve_identity_across_snapshots() {
        let mut controller = GameController::new();
        controller.apply_snapshot(playing_snapshot(vec![event_card(1, "Flood")]));
        let handle = controller.cards_rows().handle_of(1).unwrap();

        controller.apply_snapshot(playing_snapshot(vec![
            event_card(1, "Flood"),
            contract_card(2, 10),
        ]));
        assert_eq!(controller.cards_rows().handle_of(1), Some(handle));
        let rows: Vec<_> = controller.cards_rows().iter().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].value.kind, RowKind::DrawAction);
    }

    #[test]
    fn draw_trailer_yields_draw_action() {
        let mut controller = GameController::new();
        controller.apply_snapshot(playing_snapshot(vec![event_card(1, "Flood")]));
        assert_eq!(controller.activate_card_row(1), Some(Action::Draw));
    }

    #[test]
    fn contract_flow_reaches_completion_action() {
        let mut controller = GameController::new();
        controller.apply_snapshot(playing_snapshot(vec![contract_card(5, 50)]));

        assert_eq!(controller.activate_card_row(0), None);
        assert_eq!(controller.modal(), &ModalState::ContractPick { card: 5 });

        let rows = controller.contract_pick_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "Wheat to Ames for 3");
        assert_eq!(rows[1].contract, None);

        controller.activate_contract_row(0);
        assert!(matches!(
            controller.modal(),
            ModalState::ContractConfirm { card: 5, contract: 50, .. }
        ));
        assert_eq!(
            controller.confirm_modal(),
            Some(Action::Complete { contract: 50 })
        );

        // Cancel rewinds to the pick dialog for the same card.
        controller.cancel_modal();
        assert_eq!(controller.modal(), &ModalState::ContractPick { card: 5 });
    }

    #[test]
    fn discard_action_row_is_guarded_and_confirmable() {
        let mut controller = GameController::new();
        controller.apply_snapshot(playing_snapshot(vec![contract_card(5, 50)]));
        controller.activate_card_row(0);

        // Last row is the discard action.
        controller.activate_contract_row(1);
        assert!(matches!(
            controller.modal(),
            ModalState::DiscardConfirm { card: 5, .. }
        ));
        assert_eq!(
            controller.confirm_modal(),
            Some(Action::Discard { card: 5 })
        );
        controller.cancel_modal();
        assert_eq!(controller.modal(), &ModalState::ContractPick { card: 5 });
    }

    #[test]
    fn simple_card_opens_single_confirmation() {
        let mut controller = GameController::new();
        controller.apply_snapshot(playing_snapshot(vec![event_card(7, "Flood")]));
        controller.activate_card_row(0);
        match controller.modal() {
            ModalState::SimpleDiscard { card, description } => {
                assert_eq!(*card, 7);
                assert_eq!(description, &vec!["! Flood".to_string()]);
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(
            controller.confirm_modal(),
            Some(Action::Discard { card: 7 })
        );
    }

    #[test]
    fn snapshot_refresh_closes_open_dialogs() {
        let mut controller = GameController::new();
        controller.apply_snapshot(playing_snapshot(vec![contract_card(5, 50)]));
        controller.activate_card_row(0);
        controller.activate_contract_row(0);
        assert!(matches!(
            controller.modal(),
            ModalState::ContractConfirm { .. }
        ));

        // The refreshed snapshot no longer holds card 5; the chain is
        // closed and nothing can transition out of a stale dialog.
        controller.apply_snapshot(playing_snapshot(vec![event_card(8, "Storm")]));
        assert_eq!(controller.modal(), &ModalState::Closed);
        controller.activate_contract_row(0);
        assert_eq!(controller.modal(), &ModalState::Closed);
    }

    #[test]
    fn stale_pick_dialog_keeps_only_discard_row() {
        // A pick dialog whose card vanished re-derives an empty
        // contract list and keeps just the pinned discard action.
        let mut controller = GameController::new();
        controller.apply_snapshot(playing_snapshot(vec![contract_card(5, 50)]));
        controller.activate_card_row(0);
        let rows = controller.contract_pick_rows();
        assert_eq!(rows.len(), 2);

        // Simulate the stale dialog directly at the modal level: the
        // refresh path would have closed it (previous test).
        let mut chain = ModalChain::new();
        chain.open_contract_pick(99);
        chain.request_discard(controller.store());
        assert_eq!(chain.state(), &ModalState::ContractPick { card: 99 });
    }

    #[test]
    fn logout_snapshot_lands_on_login_and_keeps_hidden_rows() {
        let mut controller = GameController::new();
        controller.apply_snapshot(lobby_snapshot());
        assert_eq!(controller.games_rows().len(), 2);

        controller.apply_snapshot(Snapshot {
            player_id: None,
            player_name: None,
            game: None,
            games: Vec::new(),
            worlds: Vec::new(),
            money: 0,
            cards: Vec::new(),
        });
        assert_eq!(controller.page(), Page::Login);
        // Lists the login page does not render are left alone; they
        // reconcile again on the next lobby snapshot.
        assert_eq!(controller.games_rows().len(), 2);
    }

    #[test]
    fn money_and_names_come_from_the_snapshot() {
        let mut controller = GameController::new();
        assert_eq!(controller.money(), 0);
        controller.apply_snapshot(playing_snapshot(vec![]));
        assert_eq!(controller.money(), 60);
        assert_eq!(controller.game_name(), Some("Nippon"));
        assert_eq!(controller.player_name(), Some("dave"));
    }
}
