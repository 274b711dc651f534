//! HTTP client for the crayon-rails server API.
//!
//! Every endpoint returns the complete session state on success, so
//! each call resolves to a fresh [`Snapshot`]. Failures are not
//! differentiated beyond transport-versus-status and are never
//! retried; a failed action simply leaves the client's state where it
//! was.

use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::AppConfig;
use crate::models::Snapshot;

/// A state-mutating user action, ready to be dispatched.
///
/// Each variant maps one to one onto a server endpoint and its JSON
/// request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Log in by name; any name is accepted by the server.
    Login {
        /// Name to log in as.
        name: String,
    },
    /// Log out of the session.
    Logout,
    /// Join an existing game by id.
    JoinGame {
        /// Game to join.
        game: i64,
    },
    /// Start (and join) a new game on a world.
    NewGame {
        /// World to start the game on.
        world: i64,
    },
    /// Leave the current game.
    LeaveGame,
    /// Gain money. `None` forwards a JSON `null` for the server to
    /// reject, mirroring unparsable form input.
    Gain {
        /// Parsed amount, or `None` for unparsable input.
        amount: Option<i64>,
    },
    /// Spend money; same `null` pass-through as [`Action::Gain`].
    Spend {
        /// Parsed amount, or `None` for unparsable input.
        amount: Option<i64>,
    },
    /// Draw a card.
    Draw,
    /// Discard a held card by id.
    Discard {
        /// Card to discard.
        card: i64,
    },
    /// Complete a contract by id, collecting its payment.
    Complete {
        /// Contract to complete.
        contract: i64,
    },
}

impl Action {
    /// Build a gain action from free-text amount input. Unparsable
    /// input is not rejected locally; it travels as `null` and the
    /// server refuses it.
    pub fn gain(input: &str) -> Self {
        Action::Gain {
            amount: input.trim().parse().ok(),
        }
    }

    /// Build a spend action from free-text amount input.
    pub fn spend(input: &str) -> Self {
        Action::Spend {
            amount: input.trim().parse().ok(),
        }
    }

    /// Server endpoint this action posts to, relative to the base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Action::Login { .. } => "api/login",
            Action::Logout => "api/logout",
            Action::JoinGame { .. } => "api/game/join",
            Action::NewGame { .. } => "api/game/new",
            Action::LeaveGame => "api/game/leave",
            Action::Gain { .. } => "api/gain",
            Action::Spend { .. } => "api/spend",
            Action::Draw => "api/draw",
            Action::Discard { .. } => "api/discard",
            Action::Complete { .. } => "api/complete",
        }
    }

    /// JSON request body for this action.
    pub fn body(&self) -> Value {
        match self {
            Action::Login { name } => json!({ "name": name }),
            Action::JoinGame { game } => json!({ "game": game }),
            Action::NewGame { world } => json!({ "world": world }),
            Action::Gain { amount } => json!({ "amount": amount }),
            Action::Spend { amount } => json!({ "amount": amount }),
            Action::Discard { card } => json!({ "card": card }),
            Action::Complete { contract } => json!({ "contract": contract }),
            Action::Logout | Action::LeaveGame | Action::Draw => json!({}),
        }
    }
}

/// Failure of one API call. The rest of the client treats every
/// variant identically: no state change happened.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure, timeout, or undecodable body.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered outside the 2xx range.
    #[error("server returned {status}")]
    Status {
        /// The offending status code.
        status: reqwest::StatusCode,
    },
}

/// Thin request/response wrapper over the server API.
///
/// The session is cookie-based, so the underlying client keeps a
/// cookie store; cloning shares it, which lets concurrent in-flight
/// requests belong to the same login.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client against the configured server.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Fetch the current session state (initial page load).
    pub async fn fetch_state(&self) -> Result<Snapshot, ApiError> {
        let response = self.http.get(self.url("api/state")).send().await?;
        Self::decode(response).await
    }

    /// Dispatch one action and return the snapshot the server answers
    /// with.
    pub async fn dispatch(&self, action: &Action) -> Result<Snapshot, ApiError> {
        debug!(endpoint = action.endpoint(), "dispatching action");
        let response = self
            .http
            .post(self.url(action.endpoint()))
            .json(&action.body())
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> Result<Snapshot, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status });
        }
        Ok(response.json().await?)
    }
}
