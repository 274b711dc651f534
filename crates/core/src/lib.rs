#![warn(clippy::all, missing_docs)]

//! Core client logic for crail, a crayon-rails trading card game.
//!
//! This crate hosts the data models, the snapshot store, the
//! minimal-diff list reconciler, the page and modal state machines,
//! and the HTTP API client used by the terminal UI and any future
//! frontends. Nothing here depends on a UI framework; hosts render
//! the controller's row sets and dialogs however they like.

pub mod client;
pub mod config;
pub mod controller;
pub mod modal;
pub mod models;
pub mod page;
pub mod reconcile;
pub mod state;
pub mod view;

pub use client::{Action, ApiClient, ApiError};
pub use config::AppConfig;
pub use controller::{ContractChoice, GameController, RowContent, RowKind};
pub use modal::{ModalChain, ModalState};
pub use models::{Card, CardKind, Contract, GameSummary, Snapshot, WorldSummary};
pub use page::{LobbyTab, Page};
pub use reconcile::{ReconcileOutcome, RowHandle, RowRef, RowSet};
pub use state::SnapshotStore;
