//! Hot-reload controller.
//!
//! A watcher thread blocks on filesystem events and raises a
//! single-writer/single-reader atomic flag; the main thread observes it at
//! frame boundaries only. The swap itself keeps the old module and handle
//! alive until the replacement is fully validated: serialize → shadow copy →
//! load → version gate → deserialize, and only then destroy the old handle
//! and drop the old library. Any failure rolls back to the running module.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, RecvTimeoutError};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::bridge::{EngineHost, GameInstance, LoadedModule};
use crate::error::ReloadError;

const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Watches the logic-module binary for rebuilds. Owns the one auxiliary
/// thread in the system; it only ever stores into the pending flag.
pub struct ReloadWatcher {
    _watcher: RecommendedWatcher,
    pending: Arc<AtomicBool>,
}

impl ReloadWatcher {
    pub fn new(module_path: &Path) -> Result<Self, notify::Error> {
        let watch_dir = module_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = module_path.file_name().map(|n| n.to_os_string());

        let (tx, rx) = unbounded::<()>();
        let mut watcher = notify::recommended_watcher(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    let matches = match &file_name {
                        Some(name) => event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == Some(name.as_os_str())),
                        None => true,
                    };
                    if matches {
                        let _ = tx.send(());
                    }
                }
                Err(e) => log::error!(target: "reload", "watcher error: {e}"),
            },
        )?;
        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        let pending = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&pending);
        thread::Builder::new()
            .name("kagura-reload-watch".into())
            .spawn(move || loop {
                // Block until the first event, then swallow the burst a
                // rebuild produces before raising the flag once.
                match rx.recv() {
                    Ok(()) => loop {
                        match rx.recv_timeout(DEBOUNCE_WINDOW) {
                            Ok(()) => continue,
                            Err(RecvTimeoutError::Timeout) => {
                                flag.store(true, Ordering::Release);
                                break;
                            }
                            Err(RecvTimeoutError::Disconnected) => return,
                        }
                    },
                    Err(_) => return,
                }
            })
            .map_err(|e| notify::Error::generic(&e.to_string()))?;

        log::info!(
            target: "reload",
            "watching '{}' for module changes",
            watch_dir.display()
        );

        Ok(Self {
            _watcher: watcher,
            pending,
        })
    }

    /// Destructive read of the pending flag, called once per frame boundary.
    #[inline]
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::Acquire)
    }
}

/// Performs one reload attempt. On success `module` and `game` refer to the
/// new binary and the migrated state; on failure both are untouched and the
/// previous module keeps running.
pub fn reload_module(
    host: &mut EngineHost,
    module: &mut LoadedModule,
    game: &mut GameInstance,
    module_path: &Path,
    generation: &mut u64,
) -> Result<(), ReloadError> {
    log::info!(target: "reload", "reload requested, serializing live state");

    // The encoded form must be fully host-owned before the module is
    // touched; serialize() copies and releases the module buffer.
    let encoded = game.serialize().map_err(ReloadError::Serialize)?;

    *generation += 1;
    let shadow = shadow_copy(module_path, *generation)?;

    let next_module = LoadedModule::load(&shadow).map_err(ReloadError::Load)?;
    let api = host.host_api();
    let next_game = GameInstance::deserialize(next_module.vtable(), api, &encoded)
        .map_err(ReloadError::Deserialize)?;

    // Only now is the old state retired: destroy the old handle through its
    // own table, then let the old library unload.
    let old_game = std::mem::replace(game, next_game);
    drop(old_game);
    let _old_module = std::mem::replace(module, next_module);

    log::info!(target: "reload", "reload complete (generation {generation})");
    Ok(())
}

/// Copies the module binary to a generation-suffixed path before loading.
/// Loading the original path again could hand back the already-mapped image
/// on some platforms.
fn shadow_copy(module_path: &Path, generation: u64) -> Result<PathBuf, ReloadError> {
    let stem = module_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "module".to_string());
    let ext = module_path
        .extension()
        .map(|e| e.to_string_lossy().into_owned());

    let mut name = format!("{stem}-hot{generation}");
    if let Some(ext) = ext {
        name.push('.');
        name.push_str(&ext);
    }
    let target = std::env::temp_dir().join(name);

    std::fs::copy(module_path, &target).map_err(|error| ReloadError::ShadowCopy {
        path: module_path.to_path_buf(),
        error,
    })?;
    Ok(target)
}
