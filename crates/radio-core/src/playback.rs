//! Playback state for the single audio output.
//!
//! [`PlaybackController`] is the only thing that drives the output.  It keeps
//! the current station and a coarse status that the header renders; the
//! output reports what actually happens through [`OutputEvent`]s.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::station::Station;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
    #[error("audio output rejected the command: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("{name} has no valid stream URL")]
    MissingStreamUrl { name: String },
    #[error("playback did not start: {source}")]
    StartRejected {
        #[source]
        source: OutputError,
    },
    #[error("nothing is loaded")]
    NothingLoaded,
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Something that can play one stream at a time.
#[async_trait]
pub trait AudioOutput: Send {
    /// Replace whatever is loaded with `url` and start playing it.
    async fn load(&mut self, url: &str) -> Result<(), OutputError>;
    async fn pause(&mut self) -> Result<(), OutputError>;
    async fn resume(&mut self) -> Result<(), OutputError>;
    /// Seek back to the start.  Live streams usually refuse.
    async fn rewind(&mut self) -> Result<(), OutputError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Error(String),
}

impl PlaybackStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Loading => "LOADING",
            Self::Playing => "PLAYING",
            Self::Paused => "PAUSED",
            Self::Error(_) => "ERROR",
        }
    }
}

/// What the output reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    Loading,
    Playing,
    Paused,
    Errored(String),
    Ended,
}

pub struct PlaybackController<O> {
    output: O,
    current: Option<Station>,
    status: PlaybackStatus,
    /// The last start was refused; only an explicit resume retries it.
    awaiting_gesture: bool,
    /// Resuming must reload the stream rather than unpause.
    reload_on_resume: bool,
}

impl<O: AudioOutput> PlaybackController<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            current: None,
            status: PlaybackStatus::Idle,
            awaiting_gesture: false,
            reload_on_resume: false,
        }
    }

    pub fn current(&self) -> Option<&Station> {
        self.current.as_ref()
    }

    pub fn status(&self) -> &PlaybackStatus {
        &self.status
    }

    pub fn awaiting_gesture(&self) -> bool {
        self.awaiting_gesture
    }

    /// Whether the next resume loads the stream again instead of unpausing.
    pub fn reloads_on_resume(&self) -> bool {
        self.reload_on_resume
            || matches!(self.status, PlaybackStatus::Idle | PlaybackStatus::Error(_))
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Start `station`.  A station without a stream URL is refused and
    /// leaves the current state untouched.
    pub async fn play(&mut self, station: &Station) -> Result<(), PlaybackError> {
        let station = station.normalized();
        let Some(url) = station.stream_url().map(str::to_string) else {
            warn!("playback: {} has no stream url", station.id());
            return Err(PlaybackError::MissingStreamUrl {
                name: station.display_name().to_string(),
            });
        };

        info!("playback: loading {} ({})", station.display_name(), url);
        self.current = Some(station);
        self.start(&url).await
    }

    pub async fn pause(&mut self) -> Result<(), PlaybackError> {
        if self.current.is_none() {
            return Err(PlaybackError::NothingLoaded);
        }
        self.output.pause().await?;
        self.status = PlaybackStatus::Paused;
        Ok(())
    }

    /// Continue the current station.  After a refused start, an error or the
    /// end of the stream, this loads it again.
    pub async fn resume(&mut self) -> Result<(), PlaybackError> {
        let Some(url) = self
            .current
            .as_ref()
            .and_then(Station::stream_url)
            .map(str::to_string)
        else {
            return Err(PlaybackError::NothingLoaded);
        };

        if self.reloads_on_resume() {
            debug!("playback: reloading {}", url);
            return self.start(&url).await;
        }

        self.output.resume().await?;
        if self.status == PlaybackStatus::Paused {
            self.status = PlaybackStatus::Loading;
        }
        Ok(())
    }

    pub async fn toggle_pause(&mut self) -> Result<(), PlaybackError> {
        match self.status {
            PlaybackStatus::Playing | PlaybackStatus::Loading => self.pause().await,
            _ => self.resume().await,
        }
    }

    /// Pause and seek to the start.
    pub async fn stop(&mut self) -> Result<(), PlaybackError> {
        self.pause().await?;
        if let Err(e) = self.output.rewind().await {
            debug!("playback: rewind ignored: {}", e);
        }
        Ok(())
    }

    pub fn on_output_event(&mut self, event: OutputEvent) {
        if self.current.is_none() {
            debug!("playback: ignoring {:?} with nothing loaded", event);
            return;
        }
        match event {
            OutputEvent::Loading => self.status = PlaybackStatus::Loading,
            OutputEvent::Playing => {
                self.status = PlaybackStatus::Playing;
                self.awaiting_gesture = false;
                self.reload_on_resume = false;
            }
            OutputEvent::Paused => {
                if !matches!(self.status, PlaybackStatus::Error(_)) {
                    self.status = PlaybackStatus::Paused;
                }
            }
            OutputEvent::Errored(reason) => {
                warn!("playback: stream failed: {}", reason);
                self.status = PlaybackStatus::Error(reason);
                self.reload_on_resume = true;
            }
            OutputEvent::Ended => {
                info!("playback: stream ended");
                self.status = PlaybackStatus::Paused;
                self.reload_on_resume = true;
            }
        }
    }

    /// The line shown next to the status badge.
    pub fn status_text(&self) -> String {
        match &self.status {
            PlaybackStatus::Idle => "Pick a station to start listening".to_string(),
            PlaybackStatus::Loading => "Loading stream…".to_string(),
            PlaybackStatus::Playing => "Playing".to_string(),
            PlaybackStatus::Paused if self.awaiting_gesture => {
                "Playback did not start. Press space to retry".to_string()
            }
            PlaybackStatus::Paused if self.reload_on_resume => {
                "Stream ended. Press space to reconnect".to_string()
            }
            PlaybackStatus::Paused => "Paused".to_string(),
            PlaybackStatus::Error(reason) => format!("Stream failed: {}", reason),
        }
    }

    async fn start(&mut self, url: &str) -> Result<(), PlaybackError> {
        self.status = PlaybackStatus::Loading;
        self.awaiting_gesture = false;
        self.reload_on_resume = false;
        match self.output.load(url).await {
            Ok(()) => Ok(()),
            Err(source) => {
                warn!("playback: start rejected: {}", source);
                self.status = PlaybackStatus::Paused;
                self.awaiting_gesture = true;
                self.reload_on_resume = true;
                Err(PlaybackError::StartRejected { source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeOutput {
        calls: Vec<String>,
        refuse_load: bool,
        refuse_rewind: bool,
    }

    #[async_trait]
    impl AudioOutput for FakeOutput {
        async fn load(&mut self, url: &str) -> Result<(), OutputError> {
            self.calls.push(format!("load {}", url));
            if self.refuse_load {
                return Err(OutputError::Rejected("blocked".into()));
            }
            Ok(())
        }

        async fn pause(&mut self) -> Result<(), OutputError> {
            self.calls.push("pause".into());
            Ok(())
        }

        async fn resume(&mut self) -> Result<(), OutputError> {
            self.calls.push("resume".into());
            Ok(())
        }

        async fn rewind(&mut self) -> Result<(), OutputError> {
            self.calls.push("rewind".into());
            if self.refuse_rewind {
                return Err(OutputError::Rejected("live stream".into()));
            }
            Ok(())
        }
    }

    fn station(id: &str, url: Option<&str>) -> Station {
        Station {
            stationuuid: id.into(),
            name: format!("Station {}", id),
            url_resolved: url.map(str::to_string),
            ..Station::default()
        }
    }

    #[tokio::test]
    async fn play_loads_and_tracks_current() {
        let mut ctl = PlaybackController::new(FakeOutput::default());
        assert_eq!(ctl.status(), &PlaybackStatus::Idle);

        ctl.play(&station("A", Some("http://a/stream"))).await.unwrap();
        assert_eq!(ctl.current().map(Station::id), Some("A"));
        assert_eq!(ctl.status(), &PlaybackStatus::Loading);
        assert_eq!(ctl.output().calls, vec!["load http://a/stream"]);

        ctl.on_output_event(OutputEvent::Playing);
        assert_eq!(ctl.status(), &PlaybackStatus::Playing);
        assert_eq!(ctl.status_text(), "Playing");
    }

    #[tokio::test]
    async fn missing_url_leaves_state_untouched() {
        let mut ctl = PlaybackController::new(FakeOutput::default());
        ctl.play(&station("A", Some("http://a/stream"))).await.unwrap();
        ctl.on_output_event(OutputEvent::Playing);

        let err = ctl.play(&station("B", Some("  "))).await.unwrap_err();
        assert!(matches!(err, PlaybackError::MissingStreamUrl { .. }));
        assert_eq!(ctl.current().map(Station::id), Some("A"));
        assert_eq!(ctl.status(), &PlaybackStatus::Playing);
        assert_eq!(ctl.output().calls.len(), 1);
    }

    #[tokio::test]
    async fn rejected_start_waits_for_explicit_resume() {
        let mut ctl = PlaybackController::new(FakeOutput {
            refuse_load: true,
            ..FakeOutput::default()
        });
        let err = ctl.play(&station("A", Some("http://a/stream"))).await.unwrap_err();
        assert!(matches!(err, PlaybackError::StartRejected { .. }));
        assert_eq!(ctl.current().map(Station::id), Some("A"));
        assert_eq!(ctl.status(), &PlaybackStatus::Paused);
        assert!(ctl.awaiting_gesture());
        assert!(ctl.status_text().contains("Press space"));
        assert!(ctl.reloads_on_resume());

        ctl.output_mut().refuse_load = false;
        ctl.resume().await.unwrap();
        assert!(!ctl.awaiting_gesture());
        assert_eq!(ctl.status(), &PlaybackStatus::Loading);
        assert_eq!(
            ctl.output().calls,
            vec!["load http://a/stream", "load http://a/stream"]
        );
    }

    #[tokio::test]
    async fn pause_resume_and_toggle() {
        let mut ctl = PlaybackController::new(FakeOutput::default());
        assert!(matches!(ctl.pause().await, Err(PlaybackError::NothingLoaded)));
        assert!(matches!(ctl.resume().await, Err(PlaybackError::NothingLoaded)));

        ctl.play(&station("A", Some("http://a/stream"))).await.unwrap();
        ctl.on_output_event(OutputEvent::Playing);

        ctl.toggle_pause().await.unwrap();
        assert_eq!(ctl.status(), &PlaybackStatus::Paused);
        ctl.toggle_pause().await.unwrap();
        assert_eq!(ctl.status(), &PlaybackStatus::Loading);
        assert_eq!(
            ctl.output().calls,
            vec!["load http://a/stream", "pause", "resume"]
        );
    }

    #[tokio::test]
    async fn stop_ignores_rewind_failure() {
        let mut ctl = PlaybackController::new(FakeOutput {
            refuse_rewind: true,
            ..FakeOutput::default()
        });
        ctl.play(&station("A", Some("http://a/stream"))).await.unwrap();
        ctl.stop().await.unwrap();
        assert_eq!(ctl.status(), &PlaybackStatus::Paused);
        assert_eq!(
            ctl.output().calls,
            vec!["load http://a/stream", "pause", "rewind"]
        );
    }

    #[tokio::test]
    async fn errors_are_not_retried_until_resume() {
        let mut ctl = PlaybackController::new(FakeOutput::default());
        ctl.play(&station("A", Some("http://a/stream"))).await.unwrap();
        ctl.on_output_event(OutputEvent::Errored("no audio".into()));
        assert_eq!(ctl.status(), &PlaybackStatus::Error("no audio".into()));
        assert_eq!(ctl.status_text(), "Stream failed: no audio");

        // A late pause notification does not hide the error.
        ctl.on_output_event(OutputEvent::Paused);
        assert_eq!(ctl.status().label(), "ERROR");
        assert_eq!(ctl.output().calls.len(), 1);

        ctl.resume().await.unwrap();
        assert_eq!(ctl.output().calls.len(), 2);
        assert_eq!(ctl.status(), &PlaybackStatus::Loading);
    }

    #[tokio::test]
    async fn ended_stream_reloads_on_resume() {
        let mut ctl = PlaybackController::new(FakeOutput::default());
        ctl.play(&station("A", Some("http://a/stream"))).await.unwrap();
        ctl.on_output_event(OutputEvent::Playing);
        ctl.on_output_event(OutputEvent::Ended);
        assert_eq!(ctl.status(), &PlaybackStatus::Paused);
        assert!(ctl.status_text().contains("reconnect"));

        ctl.resume().await.unwrap();
        assert_eq!(ctl.output().calls.last().map(String::as_str), Some("load http://a/stream"));
    }

    #[test]
    fn events_without_a_station_are_ignored() {
        let mut ctl = PlaybackController::new(FakeOutput::default());
        ctl.on_output_event(OutputEvent::Playing);
        assert_eq!(ctl.status(), &PlaybackStatus::Idle);
    }
}
