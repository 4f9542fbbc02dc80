//! Read-only client for the radio-browser station directory.
//!
//! The directory is served by several interchangeable mirrors.  Every call
//! picks one of them at random and surfaces its failure as-is: there is no
//! stickiness and no automatic retry on another mirror.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DirectoryConfig;
use crate::station::{normalize, RawStation, Station};

/// Sort key for tag listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Popularity.
    ClickCount,
    Random,
    Votes,
    Name,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClickCount => "clickcount",
            Self::Random => "random",
            Self::Votes => "votes",
            Self::Name => "name",
        }
    }
}

/// The query shapes the directory supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Free-text name search.
    ByName { name: String, limit: u32 },
    /// Stations carrying a tag, sorted server-side.
    ByTag {
        tag: String,
        order: Order,
        reverse: bool,
        limit: u32,
    },
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("type something to search")]
    EmptyQuery,
    #[error("no directory mirrors configured")]
    NoMirrors,
    #[error("invalid directory mirror '{url}': {reason}")]
    InvalidMirror { url: String, reason: String },
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("directory mirror {mirror} answered {status}")]
    Status { mirror: String, status: StatusCode },
    #[error("could not reach directory mirror {mirror}: {source}")]
    Network {
        mirror: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unreadable response from directory mirror {mirror}: {source}")]
    Decode {
        mirror: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    mirrors: Vec<Url>,
}

impl DirectoryClient {
    pub fn new(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let mirrors = config
            .mirrors
            .iter()
            .map(|m| parse_mirror(m))
            .collect::<Result<Vec<_>, _>>()?;
        if mirrors.is_empty() {
            return Err(DirectoryError::NoMirrors);
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(DirectoryError::Client)?;

        Ok(Self { http, mirrors })
    }

    pub fn mirrors(&self) -> &[Url] {
        &self.mirrors
    }

    /// One mirror, uniformly at random.
    pub fn pick_mirror(&self) -> Result<&Url, DirectoryError> {
        self.mirrors
            .choose(&mut rand::thread_rng())
            .ok_or(DirectoryError::NoMirrors)
    }

    /// Issue `query` against one randomly chosen mirror.
    pub async fn fetch(&self, query: &Query) -> Result<Vec<RawStation>, DirectoryError> {
        let mirror = self.pick_mirror()?;
        let label = mirror_label(mirror);
        let url = request_url(mirror, query);
        debug!("directory: GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| DirectoryError::Network {
                mirror: label.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                mirror: label,
                status,
            });
        }

        let stations = response
            .json::<Vec<RawStation>>()
            .await
            .map_err(|source| {
                if source.is_decode() {
                    DirectoryError::Decode {
                        mirror: label.clone(),
                        source,
                    }
                } else {
                    DirectoryError::Network {
                        mirror: label.clone(),
                        source,
                    }
                }
            })?;

        info!("directory: {} stations from {}", stations.len(), label);
        Ok(stations)
    }

    /// Name search.  A blank name is rejected before any request is made.
    /// Stations without a stream URL are dropped.
    pub async fn search_by_name(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<Station>, DirectoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DirectoryError::EmptyQuery);
        }
        let raw = self
            .fetch(&Query::ByName {
                name: name.to_string(),
                limit,
            })
            .await?;
        Ok(playable(raw))
    }

    /// Most-clicked stations for `tag`, unfiltered.
    pub async fn top_by_tag(&self, tag: &str, limit: u32) -> Result<Vec<Station>, DirectoryError> {
        let raw = self
            .fetch(&Query::ByTag {
                tag: tag.to_string(),
                order: Order::ClickCount,
                reverse: true,
                limit,
            })
            .await?;
        Ok(raw.into_iter().map(normalize).collect())
    }

    /// Most-clicked playable stations for `tag`.
    pub async fn list_by_tag(
        &self,
        tag: &str,
        limit: u32,
    ) -> Result<Vec<Station>, DirectoryError> {
        let stations = self.top_by_tag(tag, limit).await?;
        Ok(stations.into_iter().filter(Station::is_playable).collect())
    }

    /// Playable stations for `tag` in server-side random order.
    pub async fn random_by_tag(
        &self,
        tag: &str,
        limit: u32,
    ) -> Result<Vec<Station>, DirectoryError> {
        let raw = self
            .fetch(&Query::ByTag {
                tag: tag.to_string(),
                order: Order::Random,
                reverse: true,
                limit,
            })
            .await?;
        Ok(playable(raw))
    }
}

/// Build the request URL for `query` on `mirror`.  The mirror may carry a
/// base path; the API path is appended to it.
pub fn request_url(mirror: &Url, query: &Query) -> Url {
    let mut url = mirror.clone();
    url.set_query(None);
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty();
        match query {
            Query::ByName { .. } => {
                segments.extend(["json", "stations", "search"]);
            }
            Query::ByTag { tag, .. } => {
                segments.extend(["json", "stations", "bytag", tag.as_str()]);
            }
        }
    }
    {
        let mut pairs = url.query_pairs_mut();
        match query {
            Query::ByName { name, limit } => {
                pairs
                    .append_pair("name", name)
                    .append_pair("limit", &limit.to_string());
            }
            Query::ByTag {
                order,
                reverse,
                limit,
                ..
            } => {
                pairs
                    .append_pair("order", order.as_str())
                    .append_pair("reverse", if *reverse { "true" } else { "false" })
                    .append_pair("limit", &limit.to_string());
            }
        }
    }
    url
}

/// Normalize and keep only stations that can be played.
pub fn playable(raw: Vec<RawStation>) -> Vec<Station> {
    raw.into_iter()
        .map(normalize)
        .filter(Station::is_playable)
        .collect()
}

/// "Surprise me": a random playable station from `stations`.
pub fn pick_random(stations: &[Station]) -> Option<&Station> {
    let candidates: Vec<&Station> = stations.iter().filter(|s| s.is_playable()).collect();
    candidates.choose(&mut rand::thread_rng()).copied()
}

fn parse_mirror(raw: &str) -> Result<Url, DirectoryError> {
    let url = Url::parse(raw.trim()).map_err(|e| DirectoryError::InvalidMirror {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(DirectoryError::InvalidMirror {
            url: raw.to_string(),
            reason: "expected an http(s) base URL".to_string(),
        });
    }
    Ok(url)
}

fn mirror_label(mirror: &Url) -> String {
    mirror.as_str().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::{Path, Query as Params, State};
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    type Hits = Arc<AtomicUsize>;

    async fn search(
        State(hits): State<Hits>,
        Params(params): Params<HashMap<String, String>>,
    ) -> Json<Value> {
        hits.fetch_add(1, Ordering::SeqCst);
        let name = params.get("name").cloned().unwrap_or_default();
        let limit = params.get("limit").cloned().unwrap_or_default();
        Json(json!([
            { "stationuuid": "s1", "name": name, "url_resolved": "http://a/stream", "tags": limit, "votes": 3 },
            { "stationuuid": "s2", "name": "silent", "url_resolved": "" },
        ]))
    }

    async fn by_tag(
        State(hits): State<Hits>,
        Path(tag): Path<String>,
        Params(params): Params<HashMap<String, String>>,
    ) -> Json<Value> {
        hits.fetch_add(1, Ordering::SeqCst);
        let echo = format!(
            "{}|{}|{}|{}",
            tag,
            params.get("order").map(String::as_str).unwrap_or(""),
            params.get("reverse").map(String::as_str).unwrap_or(""),
            params.get("limit").map(String::as_str).unwrap_or(""),
        );
        Json(json!([
            { "stationuuid": "t1", "name": echo, "url_resolved": "http://t/1" },
            { "stationuuid": "t2", "name": "no url" },
        ]))
    }

    async fn spawn_mirror() -> (String, Hits) {
        let hits: Hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/json/stations/search", get(search))
            .route("/json/stations/bytag/:tag", get(by_tag))
            .route(
                "/broken/json/stations/search",
                get(|| async { AxumStatus::SERVICE_UNAVAILABLE }),
            )
            .route(
                "/garbage/json/stations/search",
                get(|| async { "<html>maintenance</html>" }),
            )
            .with_state(hits.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), hits)
    }

    fn client_for(mirrors: &[String]) -> DirectoryClient {
        let config = DirectoryConfig {
            mirrors: mirrors.to_vec(),
            timeout_secs: 5,
            ..DirectoryConfig::default()
        };
        DirectoryClient::new(&config).unwrap()
    }

    #[test]
    fn name_query_is_escaped() {
        let mirror = Url::parse("https://de1.api.radio-browser.info").unwrap();
        let url = request_url(
            &mirror,
            &Query::ByName {
                name: "Rádio X&y".into(),
                limit: 30,
            },
        );
        assert_eq!(
            url.as_str(),
            "https://de1.api.radio-browser.info/json/stations/search?name=R%C3%A1dio+X%26y&limit=30"
        );
    }

    #[test]
    fn tag_is_escaped_as_one_path_segment() {
        let mirror = Url::parse("https://nl1.api.radio-browser.info/").unwrap();
        let url = request_url(
            &mirror,
            &Query::ByTag {
                tag: "hip hop/rap".into(),
                order: Order::Random,
                reverse: true,
                limit: 20,
            },
        );
        assert_eq!(url.path(), "/json/stations/bytag/hip%20hop%2Frap");
        assert_eq!(url.query(), Some("order=random&reverse=true&limit=20"));
    }

    #[test]
    fn mirror_base_path_is_kept() {
        let mirror = Url::parse("http://localhost:8080/radio").unwrap();
        let url = request_url(
            &mirror,
            &Query::ByTag {
                tag: "jazz".into(),
                order: Order::ClickCount,
                reverse: false,
                limit: 5,
            },
        );
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/radio/json/stations/bytag/jazz?order=clickcount&reverse=false&limit=5"
        );
    }

    #[test]
    fn invalid_mirrors_are_rejected() {
        let config = DirectoryConfig {
            mirrors: vec!["not a url".into()],
            ..DirectoryConfig::default()
        };
        assert!(matches!(
            DirectoryClient::new(&config),
            Err(DirectoryError::InvalidMirror { .. })
        ));

        let config = DirectoryConfig {
            mirrors: Vec::new(),
            ..DirectoryConfig::default()
        };
        assert!(matches!(
            DirectoryClient::new(&config),
            Err(DirectoryError::NoMirrors)
        ));
    }

    #[test]
    fn every_mirror_gets_picked() {
        let client = client_for(&[
            "https://a.example".to_string(),
            "https://b.example".to_string(),
            "https://c.example".to_string(),
        ]);
        let seen: HashSet<String> = (0..300)
            .map(|_| client.pick_mirror().unwrap().to_string())
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test]
    async fn search_decodes_and_drops_unplayable() {
        let (base, hits) = spawn_mirror().await;
        let client = client_for(&[base]);
        let stations = client.search_by_name("  Rádio X  ", 30).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id(), "s1");
        assert_eq!(stations[0].name, "Rádio X");
        assert_eq!(stations[0].tags, "30");
    }

    #[tokio::test]
    async fn empty_search_issues_no_request() {
        let (base, hits) = spawn_mirror().await;
        let client = client_for(&[base]);
        let err = client.search_by_name("   ", 30).await.unwrap_err();
        assert!(matches!(err, DirectoryError::EmptyQuery));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tag_listings_pass_order_and_limit() {
        let (base, _) = spawn_mirror().await;
        let client = client_for(&[base]);

        let top = client.top_by_tag("gospel", 12).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "gospel|clickcount|true|12");

        let random = client.random_by_tag("gospel", 20).await.unwrap();
        assert_eq!(random.len(), 1);
        assert_eq!(random[0].name, "gospel|random|true|20");

        let listed = client.list_by_tag("gospel", 30).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, _) = spawn_mirror().await;
        let client = client_for(&[format!("{}/broken", base)]);
        match client.search_by_name("x", 5).await {
            Err(DirectoryError::Status { status, mirror }) => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert!(mirror.ends_with("/broken"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_an_error() {
        let (base, _) = spawn_mirror().await;
        let client = client_for(&[format!("{}/garbage", base)]);
        assert!(matches!(
            client.search_by_name("x", 5).await,
            Err(DirectoryError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_mirror_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(&[format!("http://{}", addr)]);
        assert!(matches!(
            client.top_by_tag("gospel", 1).await,
            Err(DirectoryError::Network { .. })
        ));
    }

    #[test]
    fn pick_random_only_returns_playable() {
        let stations = vec![
            Station {
                stationuuid: "a".into(),
                ..Station::default()
            },
            Station {
                stationuuid: "b".into(),
                url_resolved: Some("http://b".into()),
                ..Station::default()
            },
        ];
        for _ in 0..20 {
            assert_eq!(pick_random(&stations).map(Station::id), Some("b"));
        }
        assert!(pick_random(&stations[..1]).is_none());
    }
}
