/// mpv IPC driver with separated reader/writer tasks.
///
/// Architecture:
///
/// ```text
///   MpvDriver::spawn_and_connect()
///         │
///         ├── writer_task   ← receives PendingRequest via mpsc, serialises → socket
///         └── reader_task   ← reads JSON lines from socket
///                                ├── response (has request_id) → matched oneshot::Sender
///                                └── event / property-change   → event_tx channel
/// ```
///
/// `MpvOutput` wraps the driver as the client's [`AudioOutput`]: the process
/// is spawned on the first load and respawned if it dies.
///
/// Platform notes:
/// - Unix:   Unix domain sockets
/// - Windows: Named pipes  \\.\pipe\<name>
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use radio_core::platform;
use radio_core::playback::{AudioOutput, OutputError};

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

/// Fixed observe_property IDs, matched in property-change events.
pub const OBS_CORE_IDLE: u64 = 1;
pub const OBS_PAUSE: u64 = 2;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<anyhow::Result<Value>>>>>;

struct PendingRequest {
    req_id: u64,
    payload: String, // serialised JSON line (already has '\n')
    reply: oneshot::Sender<anyhow::Result<Value>>,
}

/// An mpv event / property-change that arrived unsolicited (no request_id).
#[derive(Debug, Clone)]
pub struct MpvEvent {
    pub raw: Value,
}

impl MpvEvent {
    /// Returns `Some((obs_id, data))` if this is a property-change event.
    pub fn as_property_change(&self) -> Option<(u64, &Value)> {
        if self.raw.get("event")?.as_str()? == "property-change" {
            let id = self.raw.get("id")?.as_u64()?;
            let data = self.raw.get("data").unwrap_or(&Value::Null);
            Some((id, data))
        } else {
            None
        }
    }

    /// Returns the event name, e.g. "end-file", "start-file", "file-loaded".
    pub fn event_name(&self) -> Option<&str> {
        self.raw.get("event")?.as_str()
    }

    /// `reason` of an end-file event.
    pub fn end_reason(&self) -> Option<&str> {
        self.raw.get("reason")?.as_str()
    }
}

/// Cloneable handle to the mpv writer task.  Use `send()` to fire a command
/// and await the response.
#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<PendingRequest>,
}

impl MpvHandle {
    pub async fn send(&self, command: Value) -> anyhow::Result<Value> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let msg = json!({ "command": command, "request_id": req_id });
        let mut raw = serde_json::to_string(&msg)?;
        raw.push('\n');

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PendingRequest {
                req_id,
                payload: raw,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(tokio::time::Duration::from_secs(5), reply_rx)
            .await
            .map_err(|_| anyhow::anyhow!("mpv IPC timeout for req={}", req_id))?
            .map_err(|_| anyhow::anyhow!("mpv reply channel dropped req={}", req_id))?
    }

    /// Replace the current file with `url` and make sure it is not paused.
    pub async fn load_stream(&self, url: &str, volume: f32) -> anyhow::Result<()> {
        debug!("mpv: loadfile {}", url);
        self.send(json!(["loadfile", url, "replace"])).await?;
        self.set_pause(false).await?;
        let vol_pct = (volume * 100.0).clamp(0.0, 100.0);
        let _ = self.send(json!(["set_property", "volume", vol_pct])).await;
        Ok(())
    }

    pub async fn set_pause(&self, paused: bool) -> anyhow::Result<()> {
        self.send(json!(["set_property", "pause", paused])).await?;
        Ok(())
    }

    pub async fn seek_to(&self, secs: f64) -> anyhow::Result<()> {
        self.send(json!(["set_property", "time-pos", secs])).await?;
        Ok(())
    }

    /// Register observe_property for the playback properties.  Must be called
    /// after every fresh connection.
    pub async fn observe_playback_properties(&self) {
        let props = [(OBS_CORE_IDLE, "core-idle"), (OBS_PAUSE, "pause")];
        for (id, name) in &props {
            match self.send(json!(["observe_property", id, name])).await {
                Ok(_) => debug!("mpv: observe_property id={} name={}", id, name),
                Err(e) => warn!("mpv: observe_property {} failed: {}", name, e),
            }
        }
    }
}

/// Owns the mpv child process and manages (re)connection.
pub struct MpvDriver {
    pub socket_name: String,
    process: Option<tokio::process::Child>,
    pub last_volume: f32,
}

impl MpvDriver {
    pub fn new(volume: f32) -> Self {
        Self {
            socket_name: platform::mpv_socket_name(),
            process: None,
            last_volume: volume,
        }
    }

    pub fn process_alive(&mut self) -> bool {
        if let Some(ref mut child) = self.process {
            match child.try_wait() {
                Ok(None) => true,
                Ok(Some(status)) => {
                    if let Some(code) = status.code() {
                        warn!("mpv process exited with code: {}", code);
                    } else {
                        warn!("mpv process terminated by signal");
                    }
                    false
                }
                Err(e) => {
                    warn!("mpv process_alive check failed: {}", e);
                    false
                }
            }
        } else {
            false
        }
    }

    pub async fn kill(&mut self) {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
            // A killed mpv leaves its per-process socket behind.
            #[cfg(unix)]
            let _ = tokio::fs::remove_file(&self.socket_name).await;
        }
    }

    fn command(&self) -> anyhow::Result<tokio::process::Command> {
        let mpv_binary = platform::find_mpv_binary()
            .ok_or_else(|| anyhow::anyhow!("mpv binary not found (set MPV_PATH or install mpv)"))?;
        let vol_arg = format!(
            "--volume={}",
            (self.last_volume * 100.0).clamp(0.0, 100.0).round() as i64
        );
        let mut cmd = tokio::process::Command::new(mpv_binary);
        cmd.arg("--no-video")
            .arg("--idle=yes")
            .arg(platform::mpv_socket_arg())
            .arg("--quiet")
            .arg(vol_arg)
            .stdout(std::process::Stdio::null())
            .kill_on_drop(true);
        Ok(cmd)
    }

    #[cfg(unix)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;

        let socket_path = std::path::PathBuf::from(&self.socket_name);
        let _ = tokio::fs::remove_file(&socket_path).await;

        info!("mpv: spawning new process");
        let stderr_path = platform::data_dir().join("mpv-stderr.log");
        if let Some(parent) = stderr_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stderr_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&stderr_path)?;
        info!("mpv: logging stderr to {:?}", stderr_path);

        let child = self.command()?.stderr(stderr_file).spawn()?;
        info!("mpv: spawned process with pid {:?}", child.id());
        self.process = Some(child);

        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if socket_path.exists() {
                break;
            }
        }
        if !socket_path.exists() {
            anyhow::bail!("mpv IPC socket did not appear");
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

        let stream = UnixStream::connect(&socket_path).await?;
        info!("mpv: connected to IPC socket");
        let (read_half, write_half) = stream.into_split();
        Ok(start_io_tasks(read_half, write_half, event_tx))
    }

    #[cfg(windows)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;

        info!("mpv: spawning new process");
        let child = self
            .command()?
            .stderr(std::process::Stdio::null())
            .spawn()?;
        self.process = Some(child);

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if let Ok(client) = ClientOptions::new().open(&pipe_path) {
                info!("mpv: connected to named pipe");
                let (read_half, write_half) = tokio::io::split(client);
                return Ok(start_io_tasks(read_half, write_half, event_tx));
            }
        }
        anyhow::bail!("mpv named pipe did not appear")
    }
}

fn start_io_tasks<R, W>(read_half: R, write_half: W, event_tx: mpsc::Sender<MpvEvent>) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    // req_id → reply channel, shared between writer (inserts) and reader (resolves)
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<PendingRequest>(64);

    tokio::spawn(writer_task(write_half, cmd_rx, pending.clone()));
    tokio::spawn(reader_task(BufReader::new(read_half), pending, event_tx));

    MpvHandle { tx: cmd_tx }
}

async fn reader_task<R>(mut reader: BufReader<R>, pending: PendingMap, event_tx: mpsc::Sender<MpvEvent>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("mpv reader: connection closed");
                let mut map = pending.lock().await;
                for (_, tx) in map.drain() {
                    let _ = tx.send(Err(anyhow::anyhow!("mpv IPC connection closed")));
                }
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let val: Value = match serde_json::from_str(trimmed) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("mpv reader: invalid json '{}': {}", trimmed, e);
                        continue;
                    }
                };

                if let Some(req_id) = val.get("request_id").and_then(|v| v.as_u64()) {
                    let mut map = pending.lock().await;
                    if let Some(tx) = map.remove(&req_id) {
                        let result = if val["error"].as_str() == Some("success") {
                            Ok(val)
                        } else {
                            let err = val["error"].as_str().unwrap_or("unknown error").to_string();
                            debug!("mpv reader: response req={} err={}", req_id, err);
                            Err(anyhow::anyhow!("mpv error: {}", err))
                        };
                        let _ = tx.send(result);
                    } else {
                        debug!("mpv reader: response for unknown req={}", req_id);
                    }
                } else {
                    debug!("mpv reader: event {}", trimmed);
                    let _ = event_tx.send(MpvEvent { raw: val }).await;
                }
            }
            Err(e) => {
                warn!("mpv reader: read error: {}", e);
                let mut map = pending.lock().await;
                for (_, tx) in map.drain() {
                    let _ = tx.send(Err(anyhow::anyhow!("mpv IPC read error: {}", e)));
                }
                break;
            }
        }
    }
}

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<PendingRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // Register before writing so the reader can match the reply
        pending.lock().await.insert(req.req_id, req.reply);
        debug!("mpv writer: send req={} payload={}", req.req_id, req.payload.trim());
        if let Err(e) = writer.write_all(req.payload.as_bytes()).await {
            warn!("mpv writer: write error: {}", e);
            if let Some(tx) = pending.lock().await.remove(&req.req_id) {
                let _ = tx.send(Err(anyhow::anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: task exiting");
}

/// mpv as the client's single audio output.
pub struct MpvOutput {
    driver: MpvDriver,
    handle: Option<MpvHandle>,
    event_tx: mpsc::Sender<MpvEvent>,
}

impl MpvOutput {
    /// Unsolicited mpv events are delivered to `event_tx`.
    pub fn new(volume: f32, event_tx: mpsc::Sender<MpvEvent>) -> Self {
        Self {
            driver: MpvDriver::new(volume),
            handle: None,
            event_tx,
        }
    }

    /// Whether mpv died since the last command.  Drops the stale handle.
    pub fn check_alive(&mut self) -> bool {
        if self.handle.is_some() && !self.driver.process_alive() {
            warn!("mpv: process died, dropping handle");
            self.handle = None;
            return false;
        }
        true
    }

    pub async fn shutdown(&mut self) {
        self.handle = None;
        self.driver.kill().await;
    }

    async fn ensure_handle(&mut self) -> Result<MpvHandle, OutputError> {
        self.check_alive();
        if let Some(h) = &self.handle {
            return Ok(h.clone());
        }
        let handle = self
            .driver
            .spawn_and_connect(self.event_tx.clone())
            .await
            .map_err(|e| OutputError::Unavailable(e.to_string()))?;
        handle.observe_playback_properties().await;
        self.handle = Some(handle.clone());
        Ok(handle)
    }

    /// Handle for commands that need a running mpv but must not spawn one.
    fn live_handle(&mut self) -> Result<MpvHandle, OutputError> {
        self.check_alive();
        self.handle
            .clone()
            .ok_or_else(|| OutputError::Unavailable("mpv is not running".to_string()))
    }
}

#[async_trait]
impl AudioOutput for MpvOutput {
    async fn load(&mut self, url: &str) -> Result<(), OutputError> {
        let handle = self.ensure_handle().await?;
        handle
            .load_stream(url, self.driver.last_volume)
            .await
            .map_err(|e| OutputError::Rejected(e.to_string()))
    }

    async fn pause(&mut self) -> Result<(), OutputError> {
        self.live_handle()?
            .set_pause(true)
            .await
            .map_err(|e| OutputError::Rejected(e.to_string()))
    }

    async fn resume(&mut self) -> Result<(), OutputError> {
        self.live_handle()?
            .set_pause(false)
            .await
            .map_err(|e| OutputError::Rejected(e.to_string()))
    }

    async fn rewind(&mut self) -> Result<(), OutputError> {
        self.live_handle()?
            .seek_to(0.0)
            .await
            .map_err(|e| OutputError::Rejected(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_change_is_recognised() {
        let evt = MpvEvent {
            raw: json!({"event": "property-change", "id": 1, "name": "core-idle", "data": false}),
        };
        let (id, data) = evt.as_property_change().unwrap();
        assert_eq!(id, OBS_CORE_IDLE);
        assert_eq!(data.as_bool(), Some(false));
        assert_eq!(evt.end_reason(), None);
    }

    #[test]
    fn end_file_reason() {
        let evt = MpvEvent {
            raw: json!({"event": "end-file", "reason": "network"}),
        };
        assert!(evt.as_property_change().is_none());
        assert_eq!(evt.event_name(), Some("end-file"));
        assert_eq!(evt.end_reason(), Some("network"));
    }

    #[tokio::test]
    async fn handle_routes_replies_and_events() {
        let (client, server) = tokio::io::duplex(4096);
        let (client_read, client_write) = tokio::io::split(client);
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let handle = start_io_tasks(client_read, client_write, event_tx);

        // A fake mpv: answer every request, and push one event first.
        tokio::spawn(async move {
            let (server_read, mut server_write) = tokio::io::split(server);
            let mut lines = BufReader::new(server_read).lines();
            server_write
                .write_all(b"{\"event\":\"start-file\"}\n")
                .await
                .unwrap();
            while let Ok(Some(line)) = lines.next_line().await {
                let req: Value = serde_json::from_str(&line).unwrap();
                let id = req["request_id"].as_u64().unwrap();
                let reply = if req["command"][0] == "bad" {
                    json!({"request_id": id, "error": "invalid parameter"})
                } else {
                    json!({"request_id": id, "error": "success", "data": null})
                };
                let mut out = reply.to_string();
                out.push('\n');
                server_write.write_all(out.as_bytes()).await.unwrap();
            }
        });

        handle.set_pause(true).await.unwrap();
        assert!(handle.send(json!(["bad"])).await.is_err());
        let evt = event_rx.recv().await.unwrap();
        assert_eq!(evt.event_name(), Some("start-file"));
    }
}
