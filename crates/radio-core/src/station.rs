//! Station records: the raw directory shape and the normalized form the rest
//! of the client depends on.

use serde::{Deserialize, Serialize};

/// How many tags a station row shows.
pub const MAX_DISPLAY_TAGS: usize = 3;

/// A station record as returned by the directory API.
///
/// Only the fields we keep are declared; everything else in the response is
/// ignored by serde.  Every field is optional because the directory does not
/// guarantee any of them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawStation {
    #[serde(default)]
    pub stationuuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url_resolved: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
}

/// Normalized station.  Field names match the directory's so that a stored
/// station decodes as a [`RawStation`] again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Station {
    pub stationuuid: String,
    pub name: String,
    pub url_resolved: Option<String>,
    pub country: String,
    /// Comma-separated, as delivered by the directory.
    pub tags: String,
    pub bitrate: Option<u32>,
    pub codec: Option<String>,
    pub homepage: Option<String>,
    pub favicon: Option<String>,
}

impl From<RawStation> for Station {
    fn from(raw: RawStation) -> Self {
        Self {
            stationuuid: raw.stationuuid,
            name: raw.name.unwrap_or_default(),
            url_resolved: raw.url_resolved,
            country: raw.country.unwrap_or_default(),
            tags: raw.tags.unwrap_or_default(),
            bitrate: raw.bitrate,
            codec: raw.codec,
            homepage: raw.homepage,
            favicon: raw.favicon,
        }
    }
}

impl From<Station> for RawStation {
    fn from(st: Station) -> Self {
        Self {
            stationuuid: st.stationuuid,
            name: Some(st.name),
            url_resolved: st.url_resolved,
            country: Some(st.country),
            tags: Some(st.tags),
            bitrate: st.bitrate,
            codec: st.codec,
            homepage: st.homepage,
            favicon: st.favicon,
        }
    }
}

/// Reduce a directory record to the fields the client keeps.
pub fn normalize(raw: RawStation) -> Station {
    Station::from(raw)
}

impl Station {
    /// Re-apply normalization.  Always equal to `self`.
    pub fn normalized(&self) -> Station {
        normalize(RawStation::from(self.clone()))
    }

    pub fn id(&self) -> &str {
        &self.stationuuid
    }

    pub fn display_name(&self) -> &str {
        match self.name.trim() {
            "" => "Unnamed station",
            name => name,
        }
    }

    /// The resolved stream URL, if there is a usable one.
    pub fn stream_url(&self) -> Option<&str> {
        non_blank(self.url_resolved.as_deref())
    }

    pub fn is_playable(&self) -> bool {
        self.stream_url().is_some()
    }

    pub fn homepage_url(&self) -> Option<&str> {
        non_blank(self.homepage.as_deref())
    }

    /// First few non-empty tags, trimmed.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .take(MAX_DISPLAY_TAGS)
            .collect()
    }

    /// `"128 kbps"`, or `None` when the directory reports no bitrate.
    pub fn bitrate_label(&self) -> Option<String> {
        self.bitrate.filter(|b| *b > 0).map(|b| format!("{} kbps", b))
    }

    /// `country • codec • bitrate`, skipping the parts that are missing.
    pub fn meta_line(&self) -> String {
        let parts: Vec<String> = [
            non_blank(Some(self.country.as_str())).map(str::to_string),
            non_blank(self.codec.as_deref()).map(str::to_string),
            self.bitrate_label(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if parts.is_empty() {
            "Live radio".to_string()
        } else {
            parts.join(" • ")
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
