mod common;

use common::station;
use radio_core::library::{AddOutcome, Library, Membership};
use radio_core::station::{normalize, RawStation};
use radio_core::store::{JsonFileStore, StoreKey};

#[test]
fn collections_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    let (favorites, playlists) = {
        let mut lib = Library::load(JsonFileStore::new(dir.path()));
        assert_eq!(
            lib.toggle_favorite(&station("A", "Rádio X")).unwrap(),
            Membership::Added
        );
        lib.toggle_favorite(&station("B", "Louvor 24h")).unwrap();
        assert!(lib.create_playlist("Oração").unwrap());
        assert!(lib.create_playlist("Domingo").unwrap());
        assert_eq!(lib.add_all_favorites_to_playlist(1).unwrap(), Some(2));
        assert_eq!(
            lib.add_station_to_playlist(0, &station("C", "Coral")).unwrap(),
            AddOutcome::Added
        );
        (lib.favorites().to_vec(), lib.playlists().to_vec())
    };

    let reloaded = Library::load(JsonFileStore::new(dir.path()));
    assert_eq!(reloaded.favorites(), favorites.as_slice());
    assert_eq!(reloaded.playlists(), playlists.as_slice());
    assert_eq!(reloaded.playlists()[0].name, "Domingo");
    assert_eq!(reloaded.view_playlist(1).unwrap().len(), 2);
}

#[test]
fn corrupt_files_start_fresh_and_are_replaced() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("favorites.json"), "[{\"stationuuid\":").unwrap();
    std::fs::write(dir.path().join("playlists.json"), "42").unwrap();

    let mut lib = Library::load(JsonFileStore::new(dir.path()));
    assert!(lib.favorites().is_empty());
    assert!(lib.playlists().is_empty());

    lib.toggle_favorite(&station("A", "a")).unwrap();
    let reloaded = Library::load(JsonFileStore::new(dir.path()));
    assert_eq!(reloaded.favorites().len(), 1);
}

#[test]
fn stored_stations_read_back_as_directory_records() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let path = store.path_for(StoreKey::Favorites);
    let mut lib = Library::load(store);
    let a = station("A", "Rádio X");
    lib.toggle_favorite(&a).unwrap();

    let content = std::fs::read_to_string(path).unwrap();
    let raw: Vec<RawStation> = serde_json::from_str(&content).unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(normalize(raw[0].clone()), a);
    assert!(!content.contains("clickcount"));
}
