#![forbid(unsafe_op_in_unsafe_fn)]

//! The reverse-direction bridge: extern "C" trampolines from the opaque
//! context pointer onto [`HostContext`].
//!
//! Every trampoline re-borrows the context for the duration of one call and
//! degrades to a sentinel/no-op on a null pointer; nothing here unwinds.

use std::path::Path;

use kagura_module_api::{
    CollisionEventSlice, HostApi, HostCtx, RawStr, Vec2, BODY_POSITION_SENTINEL, HOST_LOG_DEBUG,
    HOST_LOG_ERROR, HOST_LOG_INFO, HOST_LOG_WARN, INVALID_BODY_ID,
};

use crate::assets::{AssetBackend, AssetStore};
use crate::audio::AudioEngine;
use crate::physics::PhysicsWorld;

/// The engine context: every host-owned subsystem the logic module can
/// reach. Constructed once at startup and threaded explicitly; there is no
/// process-wide singleton.
pub struct HostContext {
    pub physics: PhysicsWorld,
    pub audio: AudioEngine,
    pub assets: AssetStore,
}

impl HostContext {
    pub fn new(audio: AudioEngine, asset_backend: Box<dyn AssetBackend>) -> Self {
        Self {
            physics: PhysicsWorld::new(),
            audio,
            assets: AssetStore::new(asset_backend),
        }
    }
}

/// Owner of the boxed [`HostContext`]. The raw pointer embedded in every
/// [`HostApi`] handed out points into the box and must not outlive it; keep
/// the `EngineHost` alive for as long as any module may call back.
pub struct EngineHost {
    ctx: Box<HostContext>,
}

impl EngineHost {
    pub fn new(ctx: HostContext) -> Self {
        Self { ctx: Box::new(ctx) }
    }

    /// Builds the host-API table for the current context. Tables are cheap
    /// copies; hand a fresh one to every created/deserialized game.
    pub fn host_api(&mut self) -> HostApi {
        HostApi {
            ctx: self.ctx.as_mut() as *mut HostContext as *mut HostCtx,
            log: host_log,
            create_dynamic_box: host_create_dynamic_box,
            create_static_box: host_create_static_box,
            get_body_position: host_get_body_position,
            step_physics: host_step_physics,
            get_collision_events: host_get_collision_events,
            play_sound: host_play_sound,
            play_bgm: host_play_bgm,
            set_audio_settings: host_set_audio_settings,
        }
    }

    #[inline]
    pub fn ctx(&self) -> &HostContext {
        &self.ctx
    }

    #[inline]
    pub fn ctx_mut(&mut self) -> &mut HostContext {
        &mut self.ctx
    }
}

/// # Safety
///
/// `ctx` must be null or the pointer produced by [`EngineHost::host_api`]
/// while its `EngineHost` is still alive, with no other live borrow of the
/// context (bridge calls are strictly sequential on the main thread).
unsafe fn deref_ctx<'a>(ctx: *mut HostCtx) -> Option<&'a mut HostContext> {
    unsafe { (ctx as *mut HostContext).as_mut() }
}

extern "C" fn host_log(_ctx: *mut HostCtx, level: u32, message: RawStr) {
    let message = unsafe { message.as_str() };
    match level {
        HOST_LOG_ERROR => log::error!(target: "module", "{message}"),
        HOST_LOG_WARN => log::warn!(target: "module", "{message}"),
        HOST_LOG_INFO => log::info!(target: "module", "{message}"),
        HOST_LOG_DEBUG => log::debug!(target: "module", "{message}"),
        other => log::debug!(target: "module", "(level {other}) {message}"),
    }
}

extern "C" fn host_create_dynamic_box(
    ctx: *mut HostCtx,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> u64 {
    match unsafe { deref_ctx(ctx) } {
        Some(host) => host.physics.create_dynamic_box(x, y, width, height),
        None => INVALID_BODY_ID,
    }
}

extern "C" fn host_create_static_box(
    ctx: *mut HostCtx,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> u64 {
    match unsafe { deref_ctx(ctx) } {
        Some(host) => host.physics.create_static_box(x, y, width, height),
        None => INVALID_BODY_ID,
    }
}

extern "C" fn host_get_body_position(ctx: *mut HostCtx, id: u64) -> Vec2 {
    let Some(host) = (unsafe { deref_ctx(ctx) }) else {
        return BODY_POSITION_SENTINEL;
    };
    match host.physics.body_position(id) {
        Some(position) => position,
        None => {
            log::warn!(target: "physics", "position query for unknown body {id}");
            BODY_POSITION_SENTINEL
        }
    }
}

extern "C" fn host_step_physics(ctx: *mut HostCtx) {
    if let Some(host) = unsafe { deref_ctx(ctx) } {
        host.physics.step();
    }
}

extern "C" fn host_get_collision_events(ctx: *mut HostCtx) -> CollisionEventSlice {
    match unsafe { deref_ctx(ctx) } {
        Some(host) => CollisionEventSlice::from_slice(host.physics.collision_events()),
        None => CollisionEventSlice::empty(),
    }
}

extern "C" fn host_play_sound(ctx: *mut HostCtx, path: RawStr) {
    if let Some(host) = unsafe { deref_ctx(ctx) } {
        let path = unsafe { path.as_str() };
        host.audio.play_sound(Path::new(path));
    }
}

extern "C" fn host_play_bgm(ctx: *mut HostCtx, path: RawStr, looped: bool) {
    if let Some(host) = unsafe { deref_ctx(ctx) } {
        let path = unsafe { path.as_str() };
        host.audio.play_bgm(Path::new(path), looped);
    }
}

extern "C" fn host_set_audio_settings(ctx: *mut HostCtx, master: f32, bgm: f32, se: f32) {
    if let Some(host) = unsafe { deref_ctx(ctx) } {
        host.audio.set_runtime_settings(master, bgm, se);
    }
}
