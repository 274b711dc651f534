//! The modal dialog chain for card interactions.
//!
//! Card rows open a short chain of stacked dialogs: a contract card
//! goes view → pick contract → confirm (or view → confirm discard),
//! while a simple or event card needs only a single discard
//! confirmation because it carries no sub-choice. At most one dialog
//! is visible at a time; advancing or rewinding the chain swaps
//! dialogs, it never stacks them visually.

use tracing::{debug, error};

use crate::state::SnapshotStore;
use crate::view;

/// Which dialog of the chain is showing, with its transient
/// selections. Descriptions are captured when a dialog opens and stay
/// fixed while it shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    /// No dialog showing.
    #[default]
    Closed,
    /// Discard confirmation for a card without contracts.
    SimpleDiscard {
        /// Card being discarded.
        card: i64,
        /// Description lines captured from the clicked row.
        description: Vec<String>,
    },
    /// Contract selection for a contract card. The contract list
    /// itself is re-derived from the snapshot store on every render,
    /// not stored here.
    ContractPick {
        /// Card whose contracts are being picked from.
        card: i64,
    },
    /// Confirmation for completing one picked contract.
    ContractConfirm {
        /// Card the contract belongs to.
        card: i64,
        /// Contract being completed.
        contract: i64,
        /// Description of the picked contract.
        description: String,
    },
    /// Discard confirmation reached from the contract-pick dialog.
    DiscardConfirm {
        /// Card being discarded.
        card: i64,
        /// Description of the card, derived when the dialog opened.
        description: Vec<String>,
    },
}

/// State machine owning the dialog chain.
#[derive(Debug, Default)]
pub struct ModalChain {
    state: ModalState,
}

impl ModalChain {
    /// Create a closed chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current dialog state.
    pub fn state(&self) -> &ModalState {
        &self.state
    }

    /// True when any dialog is showing.
    pub fn is_open(&self) -> bool {
        self.state != ModalState::Closed
    }

    /// Force the chain closed. Invoked on every snapshot application:
    /// dialogs are never re-opened by a refresh, so any successful
    /// action implicitly dismisses them.
    pub fn reset(&mut self) {
        self.state = ModalState::Closed;
    }

    /// Close whatever is showing (Esc / backdrop dismissal).
    pub fn dismiss(&mut self) {
        self.state = ModalState::Closed;
    }

    /// A simple or event card row was clicked: show its discard
    /// confirmation, recording the id and the row's description.
    pub fn open_simple(&mut self, card: i64, description: Vec<String>) {
        self.state = ModalState::SimpleDiscard { card, description };
    }

    /// A contract card row was clicked: show the contract-pick dialog.
    pub fn open_contract_pick(&mut self, card: i64) {
        self.state = ModalState::ContractPick { card };
    }

    /// A contract row inside the pick dialog was clicked: swap to the
    /// confirmation dialog. Ignored outside `ContractPick`.
    pub fn pick_contract(&mut self, contract: i64, description: String) {
        match self.state {
            ModalState::ContractPick { card } => {
                self.state = ModalState::ContractConfirm {
                    card,
                    contract,
                    description,
                };
            }
            _ => debug!(contract, "contract pick outside pick dialog ignored"),
        }
    }

    /// Cancel out of the contract confirmation, rewinding to the pick
    /// dialog for the same card. Ignored elsewhere.
    pub fn cancel_contract_confirm(&mut self) {
        match self.state {
            ModalState::ContractConfirm { card, .. } => {
                self.state = ModalState::ContractPick { card };
            }
            _ => debug!("contract confirm cancel outside confirm dialog ignored"),
        }
    }

    /// The discard action inside the pick dialog was clicked: swap to
    /// the discard confirmation, but only if the card still resolves
    /// in the store. A stale id aborts the transition and leaves the
    /// pick dialog showing.
    pub fn request_discard(&mut self, store: &SnapshotStore) {
        match self.state {
            ModalState::ContractPick { card } => match store.card_by_id(card) {
                Some(held) => {
                    self.state = ModalState::DiscardConfirm {
                        card,
                        description: view::describe_card(held),
                    };
                }
                None => {
                    error!(card, "discard requested for a card no longer held");
                }
            },
            _ => debug!("discard request outside pick dialog ignored"),
        }
    }

    /// Cancel out of the discard confirmation, rewinding to the pick
    /// dialog. Ignored elsewhere.
    pub fn cancel_discard(&mut self) {
        match self.state {
            ModalState::DiscardConfirm { card, .. } => {
                self.state = ModalState::ContractPick { card };
            }
            _ => debug!("discard cancel outside discard dialog ignored"),
        }
    }
}
