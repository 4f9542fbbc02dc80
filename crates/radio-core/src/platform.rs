use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag to control whether to use system-installed binaries from PATH
/// instead of a bundled mpv beside the executable.
static USE_SYSTEM_DEPS: AtomicBool = AtomicBool::new(false);

const APP_DIR: &str = "santoplay";

/// Set whether to use system dependencies (from PATH) instead of bundled ones.
pub fn set_use_system_deps(use_system: bool) {
    USE_SYSTEM_DEPS.store(use_system, Ordering::Relaxed);
}

/// Check whether to use system dependencies from PATH.
pub fn should_use_system_deps() -> bool {
    USE_SYSTEM_DEPS.load(Ordering::Relaxed)
}

/// IPC endpoint for this process's mpv.  Scoped by pid so concurrent
/// santoplay instances never share a socket.
#[cfg(unix)]
pub fn mpv_socket_name() -> String {
    format!(
        "{}/santoplay-mpv-{}.sock",
        std::env::temp_dir().display(),
        std::process::id()
    )
}

#[cfg(windows)]
pub fn mpv_socket_name() -> String {
    format!("santoplay-mpv-{}", std::process::id())
}

#[cfg(unix)]
pub fn mpv_socket_arg() -> String {
    format!("--input-ipc-server={}", mpv_socket_name())
}

#[cfg(windows)]
pub fn mpv_socket_arg() -> String {
    format!("--input-ipc-server=\\\\.\\pipe\\{}", mpv_socket_name())
}

pub fn data_dir() -> PathBuf {
    // ~/.local/share/santoplay on macOS too, for consistency with Linux
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        // Portable install: a data/ directory beside the executable wins
        if let Some(dir) = exe_dir() {
            let portable_data = dir.join("data");
            if portable_data.exists() {
                return portable_data;
            }
        }

        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(windows)]
    {
        if let Some(dir) = exe_dir() {
            if dir.join("config.toml").exists() {
                return dir;
            }
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }
}

#[cfg(unix)]
pub fn mpv_binary_name() -> &'static str {
    "mpv"
}

#[cfg(windows)]
pub fn mpv_binary_name() -> &'static str {
    "mpv.exe"
}

fn exe_dir() -> Option<PathBuf> {
    let current_exe = std::env::current_exe().ok()?;
    current_exe.parent().map(|p| p.to_path_buf())
}

fn find_beside_exe(name: &str) -> Option<PathBuf> {
    let dir = exe_dir()?;
    let p = dir.join(name);
    if p.exists() {
        return Some(p);
    }
    let p = dir.join("external").join(name);
    if p.exists() {
        return Some(p);
    }
    None
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|p| p.exists())
}

/// Find the mpv binary used as the audio output.
///
/// Searches in order:
/// 1. `MPV_PATH` environment variable
/// 2. Beside the current executable (skipped with `--system-deps`)
/// 3. PATH
pub fn find_mpv_binary() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("MPV_PATH") {
        let path = PathBuf::from(p);
        if path.exists() {
            return Some(path);
        }
    }

    if !should_use_system_deps() {
        if let Some(p) = find_beside_exe(mpv_binary_name()) {
            return Some(p);
        }
    }

    find_on_path(mpv_binary_name())
}
