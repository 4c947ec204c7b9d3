#![forbid(unsafe_op_in_unsafe_fn)]

//! The KAGURA module ABI: everything the host and a logic module agree on.
//!
//! This crate is the single point of contact between the two sides of the
//! binary boundary. It contains nothing but the contract: the encoded ABI
//! version, the POD value types exchanged every frame, the non-owning slice
//! views, and the two function-pointer tables ([`LogicVTable`] going
//! host→module, [`HostApi`] going module→host).

pub mod slice;
pub mod types;
pub mod version;
pub mod vtable;

pub use slice::{AssetCommandSlice, CollisionEventSlice, RawSlice, RawStr, RenderableSlice, TextCommandSlice};
pub use types::{
    AssetCommand, CollisionEvent, InputState, RenderableObject, TextCommand, Transform, Vec2,
    Vec3, Vec4, ASSET_CMD_LOAD_TEXTURE, ASSET_CMD_RELOAD_TEXTURE, BODY_POSITION_SENTINEL,
    FULLSCREEN_REQUEST_FULLSCREEN, FULLSCREEN_REQUEST_NONE, FULLSCREEN_REQUEST_WINDOWED,
    HOST_LOG_DEBUG, HOST_LOG_ERROR, HOST_LOG_INFO, HOST_LOG_WARN, INVALID_ASSET_ID,
    INVALID_BODY_ID,
};
pub use version::{
    abi_compatible, abi_major, abi_minor, abi_patch, encode_abi_version, ABI_VERSION,
    ABI_VERSION_MAJOR, ABI_VERSION_MINOR, ABI_VERSION_PATCH,
};
pub use vtable::{GameHandle, HostApi, HostCtx, LogicVTable, VTABLE_SYMBOL, VTABLE_SYMBOL_NAME};
