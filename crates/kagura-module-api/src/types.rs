//! POD value types crossing the boundary.
//!
//! Everything here is `#[repr(C)]`, `Copy`, and free of destructors; these
//! are the only shapes either side may pass through the tables.

use crate::slice::RawStr;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Renderable transform. The host must honor at least translation and scale.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

/// One object the logic module wants drawn this frame. Produced fresh each
/// advance; only meaningful inside the frame that produced it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderableObject {
    pub transform: Transform,
    pub mesh_id: u32,
    pub material_id: u32,
    pub texture_id: u32,
}

/// Asset command kinds. Deliberately an open `u32` rather than a Rust enum:
/// the host must survive kinds it does not recognize.
pub const ASSET_CMD_LOAD_TEXTURE: u32 = 0;
pub const ASSET_CMD_RELOAD_TEXTURE: u32 = 1;

/// Sentinel asset id reported back through `notify_asset_loaded` when the
/// host could not satisfy a request.
pub const INVALID_ASSET_ID: u32 = 0;

/// A queued asset request. `path` borrows module-owned bytes and is valid
/// until the queue is cleared; hosts wanting an owned copy go through the
/// table's `asset_command_path` + `free_cstring` pair.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AssetCommand {
    pub kind: u32,
    pub request_id: u32,
    pub path: RawStr,
}

/// A queued text draw. Same ownership discipline as [`AssetCommand`].
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TextCommand {
    pub position: Vec2,
    pub color: Vec4,
    pub font_size: f32,
    pub text: RawStr,
}

/// Per-frame input snapshot, written by the host before each advance.
///
/// `mouse_clicked` is a press edge: true for exactly the frame the button
/// went down, false on every later frame of a hold.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub action: bool,
    pub mouse_pos: Vec2,
    pub mouse_clicked: bool,
}

/// Reserved "invalid"/"not found" body id; real ids start at 1.
pub const INVALID_BODY_ID: u64 = 0;

/// Position reported for an unknown body id. Distinguishable from a real
/// position only by convention; callers should track the ids they created.
pub const BODY_POSITION_SENTINEL: Vec2 = Vec2 { x: -1.0, y: -1.0 };

/// A begun contact between two registered bodies, valid until the next
/// physics step. Both ids are always non-zero.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub body_a: u64,
    pub body_b: u64,
}

/// Tagged value returned by `consume_pending_fullscreen_request`. A single
/// tag carries both "pending" and the requested mode, so a reader can never
/// observe a stale value paired with a fresh pending flag.
pub const FULLSCREEN_REQUEST_NONE: u32 = 0;
pub const FULLSCREEN_REQUEST_WINDOWED: u32 = 1;
pub const FULLSCREEN_REQUEST_FULLSCREEN: u32 = 2;

/// Levels for the host-side log entry in [`crate::HostApi`].
pub const HOST_LOG_ERROR: u32 = 1;
pub const HOST_LOG_WARN: u32 = 2;
pub const HOST_LOG_INFO: u32 = 3;
pub const HOST_LOG_DEBUG: u32 = 4;
