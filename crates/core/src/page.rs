//! Top-level page selection.

use crate::models::Snapshot;

/// The mutually exclusive pages of the client.
///
/// Which page is showing is a pure function of the current snapshot;
/// there is no stored previous page. A late response can therefore
/// move the user from [`Page::Playing`] back to [`Page::PickGame`] if
/// the server reports no active game, and that is accepted: the
/// server snapshot is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Nobody logged in; only the login form shows.
    Login,
    /// Logged in without a game; game and world pickers show.
    PickGame,
    /// Logged in and in a game; money and the card list show.
    Playing,
}

impl Page {
    /// Derive the page from a snapshot. Only the presence of
    /// `player_id` and `game` matters; missing fields count as absent.
    pub fn for_snapshot(snapshot: &Snapshot) -> Self {
        match (snapshot.player_id.is_some(), snapshot.game.is_some()) {
            (false, _) => Page::Login,
            (true, false) => Page::PickGame,
            (true, true) => Page::Playing,
        }
    }
}

/// Local sub-view of [`Page::PickGame`]. Toggled only by the explicit
/// "start a new game" / "back" actions; every applied snapshot
/// collapses it back to [`LobbyTab::Games`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LobbyTab {
    /// Pick an existing game (the default).
    #[default]
    Games,
    /// Pick a world for a new game.
    Worlds,
}
