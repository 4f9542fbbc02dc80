//! Favorites and playlists.
//!
//! [`Library`] owns both collections and is the only way to change them.
//! Every mutation rewrites the affected collection through the store before
//! returning.  When that write fails the in-memory change is kept and the
//! error is handed back, so the session keeps working and the caller can
//! tell the user that the change was not saved.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::station::Station;
use crate::store::{CollectionStore, StoreError, StoreKey};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub items: Vec<Station>,
}

impl Playlist {
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|s| s.id() == id)
    }
}

/// Favorite state of a station after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Added,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
    NoSuchPlaylist,
}

pub struct Library<S> {
    store: S,
    favorites: Vec<Station>,
    playlists: Vec<Playlist>,
}

impl<S: CollectionStore> Library<S> {
    /// Load both collections.  Absent or corrupt data starts empty.
    pub fn load(store: S) -> Self {
        let favorites: Vec<Station> = store.load(StoreKey::Favorites, Vec::new());
        let playlists: Vec<Playlist> = store.load(StoreKey::Playlists, Vec::new());
        info!(
            "library: {} favorites, {} playlists",
            favorites.len(),
            playlists.len()
        );
        Self {
            store,
            favorites,
            playlists,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn favorites(&self) -> &[Station] {
        &self.favorites
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|s| s.id() == id)
    }

    /// Remove `station` from favorites if present, otherwise add it at the front.
    pub fn toggle_favorite(&mut self, station: &Station) -> Result<Membership, StoreError> {
        let membership = match self.favorites.iter().position(|s| s.id() == station.id()) {
            Some(pos) => {
                self.favorites.remove(pos);
                Membership::Removed
            }
            None => {
                self.favorites.insert(0, station.normalized());
                Membership::Added
            }
        };
        debug!("library: favorite {} {:?}", station.id(), membership);
        self.save_favorites()?;
        Ok(membership)
    }

    pub fn clear_favorites(&mut self) -> Result<(), StoreError> {
        self.favorites.clear();
        self.save_favorites()
    }

    /// Create an empty playlist at the front.  Blank names are ignored and
    /// return `false`.
    pub fn create_playlist(&mut self, name: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        self.playlists.insert(
            0,
            Playlist {
                name: name.to_string(),
                items: Vec::new(),
            },
        );
        self.save_playlists()?;
        Ok(true)
    }

    /// Remove the playlist at `index`, returning it.  Out of range is a no-op.
    pub fn delete_playlist(&mut self, index: usize) -> Result<Option<Playlist>, StoreError> {
        if index >= self.playlists.len() {
            return Ok(None);
        }
        let removed = self.playlists.remove(index);
        self.save_playlists()?;
        Ok(Some(removed))
    }

    pub fn add_station_to_playlist(
        &mut self,
        index: usize,
        station: &Station,
    ) -> Result<AddOutcome, StoreError> {
        let Some(playlist) = self.playlists.get_mut(index) else {
            return Ok(AddOutcome::NoSuchPlaylist);
        };
        if playlist.contains(station.id()) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        playlist.items.push(station.normalized());
        self.save_playlists()?;
        Ok(AddOutcome::Added)
    }

    /// Append every favorite the playlist does not already hold, in favorites
    /// order.  Returns how many were appended, or `None` for a bad index.
    pub fn add_all_favorites_to_playlist(
        &mut self,
        index: usize,
    ) -> Result<Option<usize>, StoreError> {
        let Some(playlist) = self.playlists.get_mut(index) else {
            return Ok(None);
        };
        let mut added = 0;
        for station in &self.favorites {
            if !playlist.contains(station.id()) {
                playlist.items.push(station.clone());
                added += 1;
            }
        }
        if added > 0 {
            self.save_playlists()?;
        }
        Ok(Some(added))
    }

    pub fn remove_station_from_playlist(
        &mut self,
        index: usize,
        id: &str,
    ) -> Result<bool, StoreError> {
        let Some(playlist) = self.playlists.get_mut(index) else {
            return Ok(false);
        };
        let before = playlist.items.len();
        playlist.items.retain(|s| s.id() != id);
        if playlist.items.len() == before {
            return Ok(false);
        }
        self.save_playlists()?;
        Ok(true)
    }

    pub fn view_playlist(&self, index: usize) -> Option<&[Station]> {
        self.playlists.get(index).map(|p| p.items.as_slice())
    }

    fn save_favorites(&mut self) -> Result<(), StoreError> {
        self.store.save(StoreKey::Favorites, &self.favorites)
    }

    fn save_playlists(&mut self) -> Result<(), StoreError> {
        self.store.save(StoreKey::Playlists, &self.playlists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn station(id: &str, name: &str) -> Station {
        Station {
            stationuuid: id.into(),
            name: name.into(),
            url_resolved: Some(format!("http://{}/stream", id)),
            ..Station::default()
        }
    }

    fn ids(stations: &[Station]) -> Vec<&str> {
        stations.iter().map(Station::id).collect()
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let mut lib = Library::load(MemoryStore::new());
        let a = station("A", "Rádio X");

        assert_eq!(lib.toggle_favorite(&a).unwrap(), Membership::Added);
        assert_eq!(ids(lib.favorites()), vec!["A"]);
        assert!(lib.is_favorite("A"));

        assert_eq!(lib.toggle_favorite(&a).unwrap(), Membership::Removed);
        assert!(lib.favorites().is_empty());
        assert!(!lib.is_favorite("A"));
    }

    #[test]
    fn newest_favorite_comes_first() {
        let mut lib = Library::load(MemoryStore::new());
        lib.toggle_favorite(&station("A", "a")).unwrap();
        lib.toggle_favorite(&station("B", "b")).unwrap();
        assert_eq!(ids(lib.favorites()), vec!["B", "A"]);

        lib.clear_favorites().unwrap();
        assert!(lib.favorites().is_empty());
    }

    #[test]
    fn blank_playlist_names_are_rejected() {
        let mut lib = Library::load(MemoryStore::new());
        assert!(!lib.create_playlist("  ").unwrap());
        assert!(lib.playlists().is_empty());
        assert_eq!(lib.store().raw(StoreKey::Playlists), None);

        assert!(lib.create_playlist("Manhã").unwrap());
        assert!(lib.create_playlist("Oração").unwrap());
        assert_eq!(lib.playlists().len(), 2);
        assert_eq!(
            lib.playlists()[0],
            Playlist {
                name: "Oração".into(),
                items: vec![]
            }
        );
    }

    #[test]
    fn adding_twice_is_a_no_op() {
        let mut lib = Library::load(MemoryStore::new());
        lib.create_playlist("p").unwrap();
        let a = station("A", "a");
        assert_eq!(lib.add_station_to_playlist(0, &a).unwrap(), AddOutcome::Added);
        assert_eq!(
            lib.add_station_to_playlist(0, &a).unwrap(),
            AddOutcome::AlreadyPresent
        );
        assert_eq!(ids(lib.view_playlist(0).unwrap()), vec!["A"]);
        assert_eq!(
            lib.add_station_to_playlist(3, &a).unwrap(),
            AddOutcome::NoSuchPlaylist
        );
    }

    #[test]
    fn add_all_favorites_is_idempotent() {
        let mut lib = Library::load(MemoryStore::new());
        lib.create_playlist("p").unwrap();
        lib.add_station_to_playlist(0, &station("B", "b")).unwrap();
        lib.toggle_favorite(&station("A", "a")).unwrap();
        lib.toggle_favorite(&station("B", "b")).unwrap();
        lib.toggle_favorite(&station("C", "c")).unwrap();

        // favorites are C, B, A; B is already in the playlist
        assert_eq!(lib.add_all_favorites_to_playlist(0).unwrap(), Some(2));
        assert_eq!(ids(lib.view_playlist(0).unwrap()), vec!["B", "C", "A"]);

        assert_eq!(lib.add_all_favorites_to_playlist(0).unwrap(), Some(0));
        assert_eq!(ids(lib.view_playlist(0).unwrap()), vec!["B", "C", "A"]);

        assert_eq!(lib.add_all_favorites_to_playlist(1).unwrap(), None);
    }

    #[test]
    fn delete_keeps_relative_order() {
        let mut lib = Library::load(MemoryStore::new());
        for name in ["one", "two", "three", "four"] {
            lib.create_playlist(name).unwrap();
        }
        // four, three, two, one
        let removed = lib.delete_playlist(1).unwrap().unwrap();
        assert_eq!(removed.name, "three");
        let names: Vec<&str> = lib.playlists().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["four", "two", "one"]);

        assert!(lib.delete_playlist(7).unwrap().is_none());
        assert_eq!(lib.playlists().len(), 3);
    }

    #[test]
    fn remove_station_from_playlist() {
        let mut lib = Library::load(MemoryStore::new());
        lib.create_playlist("p").unwrap();
        lib.add_station_to_playlist(0, &station("A", "a")).unwrap();
        lib.add_station_to_playlist(0, &station("B", "b")).unwrap();

        assert!(lib.remove_station_from_playlist(0, "A").unwrap());
        assert!(!lib.remove_station_from_playlist(0, "A").unwrap());
        assert!(!lib.remove_station_from_playlist(5, "B").unwrap());
        assert_eq!(ids(lib.view_playlist(0).unwrap()), vec!["B"]);
    }

    #[test]
    fn reload_yields_identical_content() {
        let mut lib = Library::load(MemoryStore::new());
        lib.toggle_favorite(&station("A", "Rádio X")).unwrap();
        lib.toggle_favorite(&station("B", "Louvor FM")).unwrap();
        lib.create_playlist("Oração").unwrap();
        lib.add_all_favorites_to_playlist(0).unwrap();
        lib.create_playlist("vazia").unwrap();

        let reloaded = Library::load(lib.store().clone());
        assert_eq!(reloaded.favorites(), lib.favorites());
        assert_eq!(reloaded.playlists(), lib.playlists());
    }

    #[test]
    fn corrupt_storage_starts_empty() {
        let store = MemoryStore::new()
            .with_raw(StoreKey::Favorites, "not json")
            .with_raw(StoreKey::Playlists, r#"{"name": 3}"#);
        let lib = Library::load(store);
        assert!(lib.favorites().is_empty());
        assert!(lib.playlists().is_empty());
    }

    #[test]
    fn failed_save_keeps_the_change() {
        let mut lib = Library::load(MemoryStore::read_only());
        assert!(lib.toggle_favorite(&station("A", "a")).is_err());
        assert!(lib.is_favorite("A"));
        assert!(lib.create_playlist("p").is_err());
        assert_eq!(lib.playlists().len(), 1);
    }

    #[test]
    fn stored_playlists_use_name_and_items() {
        let mut lib = Library::load(MemoryStore::new());
        lib.create_playlist("p").unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(lib.store().raw(StoreKey::Playlists).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!([{ "name": "p", "items": [] }]));
    }
}
