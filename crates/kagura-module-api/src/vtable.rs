//! The two function-pointer tables.
//!
//! [`LogicVTable`] is the entire callable surface of the logic module,
//! fetched once through the module's single exported symbol. Its first field
//! is the encoded ABI version; the host must reject the table on a major
//! mismatch before calling anything else, since the layout beyond that field
//! cannot be trusted.
//!
//! [`HostApi`] is the reverse direction: the host hands it to
//! `create_game`/`deserialize_game`, and the module calls back through it
//! synchronously from inside `update_game`. Every entry takes the host
//! context pointer explicitly; there is no ambient host state.

use std::os::raw::c_char;

use crate::slice::{AssetCommandSlice, CollisionEventSlice, RawStr, RenderableSlice, TextCommandSlice};
use crate::types::{AssetCommand, InputState, TextCommand, Vec2};

/// Opaque module-owned game/world state. The host never sees its layout and
/// must destroy it exactly once through the table that created it.
#[repr(C)]
pub struct GameHandle {
    _private: [u8; 0],
}

/// Opaque host-owned engine context behind every [`HostApi`] entry.
#[repr(C)]
pub struct HostCtx {
    _private: [u8; 0],
}

/// Name of the module's one exported symbol:
/// `extern "C" fn() -> LogicVTable`, pure, callable immediately after load.
pub const VTABLE_SYMBOL: &[u8] = b"kagura_logic_vtable\0";
pub const VTABLE_SYMBOL_NAME: &str = "kagura_logic_vtable";

/// Host services callable from the logic module.
///
/// All calls are synchronous and must complete before `update_game` returns.
/// Failures never unwind; they come back as sentinel values
/// ([`crate::INVALID_BODY_ID`], [`crate::BODY_POSITION_SENTINEL`]) or are
/// absorbed (audio on an unready engine).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct HostApi {
    pub ctx: *mut HostCtx,

    /// Leveled log sink; `level` is one of the `HOST_LOG_*` constants.
    pub log: extern "C" fn(ctx: *mut HostCtx, level: u32, message: RawStr),

    pub create_dynamic_box:
        extern "C" fn(ctx: *mut HostCtx, x: f32, y: f32, width: f32, height: f32) -> u64,
    pub create_static_box:
        extern "C" fn(ctx: *mut HostCtx, x: f32, y: f32, width: f32, height: f32) -> u64,
    pub get_body_position: extern "C" fn(ctx: *mut HostCtx, id: u64) -> Vec2,
    pub step_physics: extern "C" fn(ctx: *mut HostCtx),
    /// Begun contacts from the most recent step; the view is invalidated by
    /// the next `step_physics` call.
    pub get_collision_events: extern "C" fn(ctx: *mut HostCtx) -> CollisionEventSlice,

    pub play_sound: extern "C" fn(ctx: *mut HostCtx, path: RawStr),
    pub play_bgm: extern "C" fn(ctx: *mut HostCtx, path: RawStr, looped: bool),
    pub set_audio_settings: extern "C" fn(ctx: *mut HostCtx, master: f32, bgm: f32, se: f32),
}

/// The complete callable surface of a logic module.
///
/// Slice-returning entries hand out borrows of module-owned storage, valid
/// only until the next call that may mutate it. String-returning entries
/// allocate; each returned pointer must be released exactly once through the
/// paired free entry of the *same* table instance.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct LogicVTable {
    /// Encoded ABI version; see [`crate::version`]. Checked first, always.
    pub abi_version: u32,

    pub create_game: extern "C" fn(host: HostApi) -> *mut GameHandle,
    pub destroy_game: extern "C" fn(game: *mut GameHandle),

    /// Self-contained encoded state, or null on failure. Pair with
    /// `free_serialized`.
    pub serialize_game: extern "C" fn(game: *const GameHandle) -> *mut c_char,
    /// Rebuilds a game from an encoded form, or null on failure.
    pub deserialize_game: extern "C" fn(host: HostApi, encoded: *const c_char) -> *mut GameHandle,
    pub free_serialized: extern "C" fn(encoded: *mut c_char),

    /// The single per-frame advance entry point.
    pub update_game: extern "C" fn(game: *mut GameHandle),
    pub update_input_state: extern "C" fn(game: *mut GameHandle, input: *const InputState),

    pub get_renderables: extern "C" fn(game: *mut GameHandle) -> RenderableSlice,

    pub get_asset_commands: extern "C" fn(game: *mut GameHandle) -> AssetCommandSlice,
    pub clear_asset_commands: extern "C" fn(game: *mut GameHandle),
    pub notify_asset_loaded:
        extern "C" fn(game: *mut GameHandle, request_id: u32, asset_id: u32),

    pub get_text_commands: extern "C" fn(game: *mut GameHandle) -> TextCommandSlice,
    pub clear_text_commands: extern "C" fn(game: *mut GameHandle),

    /// Owned NUL-terminated copies of command strings; pair with
    /// `free_cstring`.
    pub asset_command_path: extern "C" fn(command: *const AssetCommand) -> *mut c_char,
    pub text_command_text: extern "C" fn(command: *const TextCommand) -> *mut c_char,
    pub free_cstring: extern "C" fn(s: *mut c_char),

    pub request_fullscreen: extern "C" fn(fullscreen: bool),
    pub has_pending_fullscreen_request: extern "C" fn() -> bool,
    /// Destructive read of the pending request; returns one of the
    /// `FULLSCREEN_REQUEST_*` tags and clears the flag.
    pub consume_pending_fullscreen_request: extern "C" fn() -> u32,
}
