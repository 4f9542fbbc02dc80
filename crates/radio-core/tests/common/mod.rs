#![allow(dead_code)]

use radio_core::station::{RawStation, Station};
use serde_json::json;

pub fn raw_station(id: &str, name: &str, url: Option<&str>) -> RawStation {
    serde_json::from_value(json!({
        "changeuuid": format!("change-{}", id),
        "stationuuid": id,
        "name": name,
        "url": url.map(|u| format!("{}.pls", u)),
        "url_resolved": url,
        "country": "Brazil",
        "tags": "gospel,louvor",
        "codec": "MP3",
        "bitrate": 128,
        "votes": 10,
        "clickcount": 99,
    }))
    .unwrap()
}

pub fn station(id: &str, name: &str) -> Station {
    radio_core::station::normalize(raw_station(id, name, Some(&format!("http://{}.example/stream", id))))
}

pub fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
