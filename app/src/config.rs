use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug)]
pub enum StartupError {
    Io(PathBuf, io::Error),
    Parse(PathBuf, serde_json::Error),
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::Io(path, e) => write!(f, "config '{}': {}", path.display(), e),
            StartupError::Parse(path, e) => write!(f, "config '{}': {}", path.display(), e),
        }
    }
}

impl std::error::Error for StartupError {}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "KAGURA".to_string(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub master: f32,
    pub bgm: f32,
    pub se: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master: 1.0,
            bgm: 0.8,
            se: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub window: WindowConfig,
    pub audio: AudioConfig,
    /// The logic-module dylib the host loads and watches.
    pub module_path: PathBuf,
    pub watch_module: bool,
    /// Frame cap for headless runs; absent means run until interrupted.
    pub max_frames: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            audio: AudioConfig::default(),
            module_path: default_module_path(),
            watch_module: true,
            max_frames: None,
        }
    }
}

fn default_module_path() -> PathBuf {
    let file = format!(
        "{}kagura_logic{}",
        std::env::consts::DLL_PREFIX,
        std::env::consts::DLL_SUFFIX
    );
    Path::new("target").join("debug").join(file)
}

/// Loads the startup config, falling back to defaults when the file does not
/// exist. A present-but-broken file is an error; silently ignoring it would
/// hide typos.
pub fn load_or_default(path: &Path) -> Result<RuntimeConfig, StartupError> {
    if !path.exists() {
        log::info!(target: "startup", "no '{}', using defaults", path.display());
        return Ok(RuntimeConfig::default());
    }
    let raw = std::fs::read(path).map_err(|e| StartupError::Io(path.to_path_buf(), e))?;
    let config = serde_json::from_slice::<RuntimeConfig>(&raw)
        .map_err(|e| StartupError::Parse(path.to_path_buf(), e))?;
    log::info!(target: "startup", "config loaded from '{}'", path.display());
    Ok(config)
}
