//! Action enum: all user-initiated intents and internal events.

use radio_core::station::Station;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    DiscoverList,
    SearchBar,
    SearchList,
    FavoritesList,
    PlaylistIndex,
    PlaylistItems,
}

/// Which tab is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Discover,
    Search,
    Favorites,
    Playlists,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Discover, Tab::Search, Tab::Favorites, Tab::Playlists];

    pub fn label(self) -> &'static str {
        match self {
            Self::Discover => "discover",
            Self::Search => "search",
            Self::Favorites => "favorites",
            Self::Playlists => "playlists",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Discover => 0,
            Self::Search => 1,
            Self::Favorites => 2,
            Self::Playlists => 3,
        }
    }

    pub fn from_index(idx: usize) -> Option<Tab> {
        Self::ALL.get(idx).copied()
    }

    pub fn next(self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    Play(Station),
    TogglePause,
    Stop,

    // ── Directory ────────────────────────────────────────────────────────────
    LoadDiscover,
    PlayTop,
    SurpriseMe,
    Search(String),
    ListTag,

    // ── Library ──────────────────────────────────────────────────────────────
    ToggleFavorite(Station),
    /// Ask which playlist to add the station to.
    AddToPlaylist(Station),
    AddStationTo(usize, Station),
    /// Ask before clearing; `ConfirmClearFavorites` does it.
    ClearFavorites,
    ConfirmClearFavorites,
    NewPlaylist,
    CreatePlaylist(String),
    DeletePlaylist(usize),
    ConfirmDeletePlaylist(usize),
    AddAllFavorites(usize),
    RemoveFromPlaylist(usize, String),
    SelectPlaylist(usize),

    // ── Navigation ───────────────────────────────────────────────────────────
    SwitchTab(Tab),
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── Text entry ───────────────────────────────────────────────────────────
    OpenInput,
    CloseInput,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleLogs,
    ToggleHelp,
    ToggleKeys,
    CopyToClipboard(String),
    Notify(String),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}
