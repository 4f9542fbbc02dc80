//! AppState: shared read-only data passed to all components during render/event.
//!
//! Components read this, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use std::collections::HashSet;
use std::path::PathBuf;

use radio_core::library::Playlist;
use radio_core::station::Station;

use crate::action::Tab;
use crate::player::PlayerSnapshot;
use crate::widgets::status_bar::InputMode;

/// One result region filled by directory requests.
#[derive(Debug, Clone, Default)]
pub struct RegionState {
    pub stations: Vec<Station>,
    pub loading: bool,
    /// Shown instead of the list after a failed request.
    pub error: Option<String>,
    /// Summary line above the list, e.g. "12 results for \"gospel\"".
    pub caption: Option<String>,
}

impl RegionState {
    pub fn start_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn finish(&mut self, stations: Vec<Station>, caption: String) {
        self.loading = false;
        self.error = None;
        self.caption = Some(caption);
        self.stations = stations;
    }

    pub fn fail(&mut self, error: String) {
        self.loading = false;
        self.error = Some(error);
        self.stations.clear();
        self.caption = None;
    }
}

/// The full shared state of the application.
pub struct AppState {
    // ── UI mode ─────────────────────────────────────────────────────────────
    pub tab: Tab,
    pub input_mode: InputMode,

    // ── Directory results ───────────────────────────────────────────────────
    pub discover: RegionState,
    pub search: RegionState,
    /// Tag the Discover tab is built around.
    pub discover_tag: String,

    // ── Library mirror ──────────────────────────────────────────────────────
    pub favorites: Vec<Station>,
    pub favorite_ids: HashSet<String>,
    pub playlists: Vec<Playlist>,
    /// Playlist whose items the right-hand pane shows.
    pub selected_playlist: usize,

    // ── Playback ────────────────────────────────────────────────────────────
    pub player: PlayerSnapshot,

    // ── Log ─────────────────────────────────────────────────────────────────
    pub log_path: PathBuf,
    /// Cached tail of santoplay.log (refreshed periodically by App).
    pub log_lines: Vec<String>,
}

impl AppState {
    pub fn new(discover_tag: String, log_path: PathBuf) -> Self {
        Self {
            tab: Tab::Discover,
            input_mode: InputMode::Normal,
            discover: RegionState::default(),
            search: RegionState::default(),
            discover_tag,
            favorites: Vec::new(),
            favorite_ids: HashSet::new(),
            playlists: Vec::new(),
            selected_playlist: 0,
            player: PlayerSnapshot::default(),
            log_path,
            log_lines: Vec::new(),
        }
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorite_ids.contains(id)
    }

    pub fn is_current(&self, id: &str) -> bool {
        self.player.current.as_ref().map(Station::id) == Some(id)
    }

    /// Replace the library mirror after a mutation.
    pub fn set_library(&mut self, favorites: &[Station], playlists: &[Playlist]) {
        self.favorites = favorites.to_vec();
        self.favorite_ids = favorites.iter().map(|s| s.id().to_string()).collect();
        self.playlists = playlists.to_vec();
        if self.selected_playlist >= self.playlists.len() {
            self.selected_playlist = self.playlists.len().saturating_sub(1);
        }
    }

    pub fn current_playlist(&self) -> Option<&Playlist> {
        self.playlists.get(self.selected_playlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str) -> Station {
        Station {
            stationuuid: id.into(),
            name: id.into(),
            ..Station::default()
        }
    }

    #[test]
    fn library_mirror_tracks_ids_and_clamps_selection() {
        let mut state = AppState::new("gospel".into(), PathBuf::new());
        let playlists = vec![
            Playlist {
                name: "a".into(),
                items: vec![],
            },
            Playlist {
                name: "b".into(),
                items: vec![],
            },
        ];
        state.selected_playlist = 1;
        state.set_library(&[station("A")], &playlists);
        assert!(state.is_favorite("A"));
        assert_eq!(state.current_playlist().map(|p| p.name.as_str()), Some("b"));

        state.set_library(&[], &playlists[..1]);
        assert!(!state.is_favorite("A"));
        assert_eq!(state.selected_playlist, 0);
    }

    #[test]
    fn failed_region_drops_stale_results() {
        let mut region = RegionState::default();
        region.start_loading();
        region.finish(vec![station("A")], "1 result".into());
        assert!(!region.loading);
        region.start_loading();
        region.fail("network down".into());
        assert!(region.stations.is_empty());
        assert_eq!(region.error.as_deref(), Some("network down"));
    }
}
