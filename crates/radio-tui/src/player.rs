//! Player task: single owner of the playback controller and the mpv process.
//!
//! The UI sends `PlayerCommand`s; the task answers with `PlayerUpdate`s
//! whenever the visible playback state changes.
//!
//! mpv is observed, not polled: `core-idle` and `pause` property changes and
//! the `start-file` / `end-file` events are folded into `ObservedState`,
//! which turns them into `OutputEvent`s for the controller.  A heartbeat
//! checks process liveness and the start timeout.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use radio_core::config::MpvConfig;
use radio_core::playback::{OutputEvent, PlaybackController, PlaybackError, PlaybackStatus};
use radio_core::station::Station;

use crate::mpv::{MpvEvent, MpvOutput, OBS_CORE_IDLE, OBS_PAUSE};

const HEARTBEAT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub enum PlayerCommand {
    Play(Station),
    TogglePause,
    Stop,
}

/// What the header needs to render playback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerSnapshot {
    pub current: Option<Station>,
    pub status: PlaybackStatus,
    pub status_text: String,
    pub awaiting_gesture: bool,
}

#[derive(Debug, Clone)]
pub enum PlayerUpdate {
    State(PlayerSnapshot),
    /// A command failed; shown as a toast.
    Failed(String),
}

// ── ObservedState ─────────────────────────────────────────────────────────────

/// Last values mpv pushed, and the output event they amount to.
#[derive(Debug)]
pub struct ObservedState {
    core_idle: Option<bool>,
    pause: bool,
    /// When we started waiting for audio.
    loading_since: Option<Instant>,
    /// The stream ended or failed; ignore property noise until the next file.
    halted: bool,
    timeout: Duration,
}

impl ObservedState {
    pub fn new(timeout: Duration) -> Self {
        Self {
            core_idle: None,
            pause: false,
            loading_since: None,
            halted: false,
            timeout,
        }
    }

    /// A new load was issued.
    pub fn reset(&mut self, now: Instant) {
        self.core_idle = None;
        self.pause = false;
        self.loading_since = Some(now);
        self.halted = false;
    }

    pub fn on_mpv_event(&mut self, evt: &MpvEvent, now: Instant) -> Option<OutputEvent> {
        if let Some((obs_id, data)) = evt.as_property_change() {
            match obs_id {
                OBS_CORE_IDLE => self.core_idle = data.as_bool(),
                OBS_PAUSE => self.pause = data.as_bool().unwrap_or(false),
                _ => return None,
            }
            if self.halted {
                return None;
            }
            return Some(self.derive(now));
        }

        match evt.event_name() {
            Some("start-file") => {
                debug!("player: start-file");
                self.halted = false;
                self.core_idle = Some(true);
                Some(self.derive(now))
            }
            Some("end-file") => {
                let reason = evt.end_reason().unwrap_or("unknown");
                info!("player: end-file reason={}", reason);
                self.loading_since = None;
                match reason {
                    "error" | "network" => {
                        self.halted = true;
                        Some(OutputEvent::Errored(format!("{} error", reason)))
                    }
                    "eof" => {
                        self.halted = true;
                        Some(OutputEvent::Ended)
                    }
                    // "stop" comes from replacing the file ourselves.
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Checked on every heartbeat.
    pub fn check_timeout(&mut self, now: Instant) -> Option<OutputEvent> {
        if self.halted || self.pause {
            return None;
        }
        match self.derive(now) {
            OutputEvent::Errored(reason) => Some(OutputEvent::Errored(reason)),
            _ => None,
        }
    }

    /// mpv went away underneath us.
    pub fn on_process_died(&mut self) -> Option<OutputEvent> {
        let was_active = !self.halted && !self.pause;
        self.core_idle = None;
        self.loading_since = None;
        self.halted = true;
        was_active.then(|| OutputEvent::Errored("audio player exited".to_string()))
    }

    fn derive(&mut self, now: Instant) -> OutputEvent {
        if self.pause {
            self.loading_since = None;
            return OutputEvent::Paused;
        }
        match self.core_idle {
            Some(false) => {
                self.loading_since = None;
                OutputEvent::Playing
            }
            _ => {
                let since = *self.loading_since.get_or_insert(now);
                let elapsed = now.saturating_duration_since(since);
                if elapsed >= self.timeout {
                    warn!("player: no audio after {}s", elapsed.as_secs());
                    self.halted = true;
                    self.loading_since = None;
                    OutputEvent::Errored(format!("no audio after {}s", elapsed.as_secs()))
                } else {
                    OutputEvent::Loading
                }
            }
        }
    }
}

// ── Player task ───────────────────────────────────────────────────────────────

pub struct Player {
    ctl: PlaybackController<MpvOutput>,
    observed: ObservedState,
    update_tx: mpsc::Sender<PlayerUpdate>,
    last_snapshot: Option<PlayerSnapshot>,
}

/// Start the player task.  Dropping the returned sender shuts mpv down.
pub fn spawn(config: &MpvConfig, update_tx: mpsc::Sender<PlayerUpdate>) -> mpsc::Sender<PlayerCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (mpv_tx, mpv_rx) = mpsc::channel(256);
    let player = Player {
        ctl: PlaybackController::new(MpvOutput::new(config.default_volume, mpv_tx)),
        observed: ObservedState::new(Duration::from_secs(config.start_timeout_secs)),
        update_tx,
        last_snapshot: None,
    };
    tokio::spawn(player.run(cmd_rx, mpv_rx));
    cmd_tx
}

impl Player {
    async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<PlayerCommand>,
        mut mpv_rx: mpsc::Receiver<MpvEvent>,
    ) {
        info!("player: starting event loop");
        let mut heartbeat = tokio::time::interval(HEARTBEAT);
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        self.publish().await;

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => {
                        info!("player: command channel closed, shutting down");
                        break;
                    }
                },
                Some(evt) = mpv_rx.recv() => {
                    if let Some(out) = self.observed.on_mpv_event(&evt, Instant::now()) {
                        self.ctl.on_output_event(out);
                    }
                }
                _ = heartbeat.tick() => {
                    if !self.ctl.output_mut().check_alive() {
                        if let Some(out) = self.observed.on_process_died() {
                            self.ctl.on_output_event(out);
                        }
                    } else if self.ctl.current().is_some() {
                        if let Some(out) = self.observed.check_timeout(Instant::now()) {
                            self.ctl.on_output_event(out);
                        }
                    }
                }
            }
            self.publish().await;
        }

        self.ctl.output_mut().shutdown().await;
    }

    async fn handle_command(&mut self, cmd: PlayerCommand) {
        info!("player: command {:?}", cmd);
        let result = match cmd {
            PlayerCommand::Play(station) => {
                let result = self.ctl.play(&station).await;
                if !matches!(result, Err(PlaybackError::MissingStreamUrl { .. })) {
                    self.observed.reset(Instant::now());
                }
                result
            }
            PlayerCommand::TogglePause => {
                let reloading = self.ctl.reloads_on_resume()
                    && !matches!(
                        self.ctl.status(),
                        PlaybackStatus::Playing | PlaybackStatus::Loading
                    );
                let result = self.ctl.toggle_pause().await;
                if reloading && result.is_ok() {
                    self.observed.reset(Instant::now());
                }
                result
            }
            PlayerCommand::Stop => self.ctl.stop().await,
        };

        if let Err(e) = result {
            match e {
                PlaybackError::NothingLoaded => debug!("player: {}", e),
                PlaybackError::StartRejected { .. } => {
                    warn!("player: {}", e);
                    let message = format!("{}, press space to retry", e);
                    let _ = self.update_tx.send(PlayerUpdate::Failed(message)).await;
                }
                _ => {
                    warn!("player: {}", e);
                    let _ = self.update_tx.send(PlayerUpdate::Failed(e.to_string())).await;
                }
            }
        }
    }

    async fn publish(&mut self) {
        let snapshot = PlayerSnapshot {
            current: self.ctl.current().cloned(),
            status: self.ctl.status().clone(),
            status_text: self.ctl.status_text(),
            awaiting_gesture: self.ctl.awaiting_gesture(),
        };
        if self.last_snapshot.as_ref() == Some(&snapshot) {
            return;
        }
        debug!("player: status {}", snapshot.status.label());
        self.last_snapshot = Some(snapshot.clone());
        let _ = self.update_tx.send(PlayerUpdate::State(snapshot)).await;
    }
}
