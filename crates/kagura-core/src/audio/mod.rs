//! Audio engine guard.
//!
//! Owns the output device and two logical mixing groups (background music,
//! sound effects) behind atomic readiness flags. Every entry point is safe
//! to call from the logic module's advance callback: if the engine failed to
//! initialize, calls are no-ops; if a group failed, playback falls back to
//! the engine's default routing.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSettings {
    pub master: f32,
    pub bgm: f32,
    pub se: f32,
}

impl Default for AudioSettings {
    #[inline]
    fn default() -> Self {
        Self {
            master: 1.0,
            bgm: 1.0,
            se: 1.0,
        }
    }
}

pub struct AudioEngine {
    engine_ready: AtomicBool,
    bgm_group_ready: AtomicBool,
    se_group_ready: AtomicBool,

    // The single active background track. Replacing it (stop + release +
    // start) must be one atomic sequence because it can be entered from the
    // advance callback.
    bgm_track: Mutex<Option<Sink>>,
    settings: Mutex<AudioSettings>,

    // Declared after the track mutex: sinks must drop before the stream.
    output: Option<(OutputStream, OutputStreamHandle)>,
}

impl AudioEngine {
    /// Opens the default output device. Engine init failure disables the
    /// whole subsystem rather than propagating errors per call.
    pub fn new() -> Self {
        match OutputStream::try_default() {
            Ok((stream, handle)) => {
                log::info!(target: "audio", "engine ready (default output device)");
                Self {
                    engine_ready: AtomicBool::new(true),
                    bgm_group_ready: AtomicBool::new(true),
                    se_group_ready: AtomicBool::new(true),
                    bgm_track: Mutex::new(None),
                    settings: Mutex::new(AudioSettings::default()),
                    output: Some((stream, handle)),
                }
            }
            Err(e) => {
                log::warn!(target: "audio", "engine init failed, audio disabled: {e}");
                Self::disabled()
            }
        }
    }

    /// An engine with no device; every call is a no-op. Also what tests use
    /// to exercise the guard.
    pub fn disabled() -> Self {
        Self {
            engine_ready: AtomicBool::new(false),
            bgm_group_ready: AtomicBool::new(false),
            se_group_ready: AtomicBool::new(false),
            bgm_track: Mutex::new(None),
            settings: Mutex::new(AudioSettings::default()),
            output: None,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.engine_ready.load(Ordering::Acquire)
    }

    /// Fire-and-forget effect playback through the SE group, or the engine
    /// default when the group is unavailable. No handle, no completion
    /// notification.
    pub fn play_sound(&self, path: &Path) {
        if !self.is_ready() {
            return;
        }
        let Some((_, handle)) = &self.output else {
            return;
        };
        let Some(source) = open_source(path) else {
            return;
        };
        let sink = match Sink::try_new(handle) {
            Ok(s) => s,
            Err(e) => {
                log::warn!(target: "audio", "sound '{}' dropped: {e}", path.display());
                return;
            }
        };
        sink.set_volume(self.group_volume(&self.se_group_ready, |s| s.se));
        sink.append(source);
        sink.detach();
    }

    /// Replaces the active background track. The previous track is stopped
    /// and released and the new one started while the track lock is held.
    pub fn play_bgm(&self, path: &Path, looped: bool) {
        if !self.is_ready() {
            return;
        }
        let Some((_, handle)) = &self.output else {
            return;
        };

        let mut track = self.bgm_track.lock();
        if let Some(previous) = track.take() {
            previous.stop();
        }

        let Some(source) = open_source(path) else {
            return;
        };
        let sink = match Sink::try_new(handle) {
            Ok(s) => s,
            Err(e) => {
                log::warn!(target: "audio", "bgm '{}' dropped: {e}", path.display());
                return;
            }
        };
        sink.set_volume(self.group_volume(&self.bgm_group_ready, |s| s.bgm));
        if looped {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        log::info!(target: "audio", "bgm: '{}' (looped: {looped})", path.display());
        *track = Some(sink);
    }

    /// Clamps each value to [0, 1] and applies independently; a missing
    /// group is silently skipped. The live background track is retuned.
    pub fn set_runtime_settings(&self, master: f32, bgm: f32, se: f32) {
        let applied = AudioSettings {
            master: master.clamp(0.0, 1.0),
            bgm: bgm.clamp(0.0, 1.0),
            se: se.clamp(0.0, 1.0),
        };
        *self.settings.lock() = applied;

        if !self.is_ready() {
            return;
        }
        let volume = self.group_volume(&self.bgm_group_ready, |s| s.bgm);
        if let Some(sink) = self.bgm_track.lock().as_ref() {
            sink.set_volume(volume);
        }
    }

    #[inline]
    pub fn settings(&self) -> AudioSettings {
        *self.settings.lock()
    }

    pub fn bgm_playing(&self) -> bool {
        self.bgm_track.lock().is_some()
    }

    /// Tears the subsystem down. The order is mandated by the underlying
    /// device layer: active track, then SE group, then BGM group, then the
    /// engine itself.
    pub fn shutdown(&mut self) {
        if let Some(track) = self.bgm_track.lock().take() {
            track.stop();
        }
        self.se_group_ready.store(false, Ordering::Release);
        self.bgm_group_ready.store(false, Ordering::Release);
        self.engine_ready.store(false, Ordering::Release);
        self.output = None;
        log::info!(target: "audio", "engine shut down");
    }

    fn group_volume(&self, group_ready: &AtomicBool, pick: impl Fn(&AudioSettings) -> f32) -> f32 {
        let settings = *self.settings.lock();
        if group_ready.load(Ordering::Acquire) {
            settings.master * pick(&settings)
        } else {
            // Group unavailable: route through the engine default.
            settings.master
        }
    }
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        if self.is_ready() {
            self.shutdown();
        }
    }
}

fn open_source(path: &Path) -> Option<Decoder<BufReader<File>>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            log::warn!(target: "audio", "cannot open '{}': {e}", path.display());
            return None;
        }
    };
    match Decoder::new(BufReader::new(file)) {
        Ok(source) => Some(source),
        Err(e) => {
            log::warn!(target: "audio", "cannot decode '{}': {e}", path.display());
            None
        }
    }
}
