#![forbid(unsafe_op_in_unsafe_fn)]

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;

use libloading::Library;

use kagura_module_api::{
    abi_compatible, AssetCommand, GameHandle, HostApi, InputState, LogicVTable, RenderableObject,
    TextCommand, Vec2, Vec4, ABI_VERSION, FULLSCREEN_REQUEST_FULLSCREEN,
    FULLSCREEN_REQUEST_WINDOWED, VTABLE_SYMBOL,
};

use crate::error::BridgeError;

/// Rejects a table whose major version differs from the host's. Must run
/// before any other entry point of the table is invoked; past the version
/// field, an incompatible table's layout cannot be trusted.
pub fn check_abi(vtable: &LogicVTable) -> Result<(), BridgeError> {
    if !abi_compatible(ABI_VERSION, vtable.abi_version) {
        return Err(BridgeError::AbiMismatch {
            host: ABI_VERSION,
            module: vtable.abi_version,
        });
    }
    if vtable.abi_version != ABI_VERSION {
        log::info!(
            target: "bridge",
            "ABI minor/patch drift tolerated: host {:#x}, module {:#x}",
            ABI_VERSION,
            vtable.abi_version
        );
    }
    Ok(())
}

/// A loaded logic-module binary plus its version-checked vtable. The
/// `Library` is kept alive alongside the table; every pointer in the table
/// dangles the moment the library drops.
pub struct LoadedModule {
    _lib: Library,
    vtable: LogicVTable,
}

impl LoadedModule {
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        log::info!(target: "bridge", "loading logic module '{}'", path.display());

        let lib = unsafe { Library::new(path) }.map_err(|e| BridgeError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let sym: libloading::Symbol<unsafe extern "C" fn() -> LogicVTable> =
            unsafe { lib.get(VTABLE_SYMBOL) }.map_err(|e| BridgeError::SymbolMissing {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let vtable = unsafe { sym() };
        check_abi(&vtable)?;

        log::info!(
            target: "bridge",
            "module ready, ABI {:#x}",
            vtable.abi_version
        );

        Ok(Self { _lib: lib, vtable })
    }

    #[inline]
    pub fn vtable(&self) -> &LogicVTable {
        &self.vtable
    }
}

/// An asset command copied fully into host memory: POD fields plus the path
/// duplicated through the extraction + paired-free entry points.
#[derive(Debug, Clone)]
pub struct DrainedAssetCommand {
    pub kind: u32,
    pub request_id: u32,
    pub path: Option<String>,
}

/// A text command copied fully into host memory.
#[derive(Debug, Clone)]
pub struct DrainedTextCommand {
    pub text: String,
    pub position: Vec2,
    pub font_size: f32,
    pub color: Vec4,
}

/// Owning wrapper around one opaque game handle.
///
/// The handle is valid from successful creation until drop, which destroys
/// it through the same table that created it, exactly once.
pub struct GameInstance {
    handle: *mut GameHandle,
    vtable: LogicVTable,
}

impl GameInstance {
    pub fn create(vtable: &LogicVTable, host: HostApi) -> Result<Self, BridgeError> {
        let handle = (vtable.create_game)(host);
        if handle.is_null() {
            return Err(BridgeError::CreateFailed);
        }
        Ok(Self {
            handle,
            vtable: *vtable,
        })
    }

    /// Rebuilds a game from a previously captured encoded form, through the
    /// (possibly newer) table that will own the new handle.
    pub fn deserialize(
        vtable: &LogicVTable,
        host: HostApi,
        encoded: &str,
    ) -> Result<Self, BridgeError> {
        let encoded = CString::new(encoded).map_err(|_| BridgeError::EncodedFormNul)?;
        let handle = (vtable.deserialize_game)(host, encoded.as_ptr());
        if handle.is_null() {
            return Err(BridgeError::DeserializeFailed);
        }
        Ok(Self {
            handle,
            vtable: *vtable,
        })
    }

    /// Captures the module's state as a host-owned string. The module-owned
    /// buffer is released through the paired free before this returns, so
    /// the result survives a later unload.
    pub fn serialize(&self) -> Result<String, BridgeError> {
        let ptr = (self.vtable.serialize_game)(self.handle);
        if ptr.is_null() {
            return Err(BridgeError::SerializeFailed);
        }
        let encoded = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
        (self.vtable.free_serialized)(ptr);
        Ok(encoded)
    }

    #[inline]
    pub fn write_input(&mut self, input: &InputState) {
        (self.vtable.update_input_state)(self.handle, input as *const InputState);
    }

    /// The single per-frame advance entry point. All module simulation and
    /// command emission for the frame happens inside this call.
    #[inline]
    pub fn advance(&mut self) {
        (self.vtable.update_game)(self.handle);
    }

    /// Callback-scoped view of this frame's renderables. The slice is a
    /// borrow of module memory and cannot escape the closure; copy out what
    /// must outlive the frame.
    pub fn with_renderables<R>(&mut self, f: impl FnOnce(&[RenderableObject]) -> R) -> R {
        let view = (self.vtable.get_renderables)(self.handle);
        let slice = unsafe { view.as_slice() };
        f(slice)
    }

    /// Copies the queued asset commands (including their paths) into host
    /// memory. Does not clear the queue; the paired clear call is issued by
    /// the frame driver after every command was notified.
    pub fn take_asset_commands(&mut self) -> Vec<DrainedAssetCommand> {
        let view = (self.vtable.get_asset_commands)(self.handle);
        let slice = unsafe { view.as_slice() };
        let mut out = Vec::with_capacity(slice.len());
        for cmd in slice {
            let path = self.copy_cstring((self.vtable.asset_command_path)(cmd as *const AssetCommand));
            out.push(DrainedAssetCommand {
                kind: cmd.kind,
                request_id: cmd.request_id,
                path,
            });
        }
        out
    }

    /// Copies the queued text commands into host memory.
    pub fn take_text_commands(&mut self) -> Vec<DrainedTextCommand> {
        let view = (self.vtable.get_text_commands)(self.handle);
        let slice = unsafe { view.as_slice() };
        let mut out = Vec::with_capacity(slice.len());
        for cmd in slice {
            let text = self
                .copy_cstring((self.vtable.text_command_text)(cmd as *const TextCommand))
                .unwrap_or_default();
            out.push(DrainedTextCommand {
                text,
                position: cmd.position,
                font_size: cmd.font_size,
                color: cmd.color,
            });
        }
        out
    }

    #[inline]
    pub fn clear_asset_commands(&mut self) {
        (self.vtable.clear_asset_commands)(self.handle);
    }

    #[inline]
    pub fn clear_text_commands(&mut self) {
        (self.vtable.clear_text_commands)(self.handle);
    }

    #[inline]
    pub fn notify_asset_loaded(&mut self, request_id: u32, asset_id: u32) {
        (self.vtable.notify_asset_loaded)(self.handle, request_id, asset_id);
    }

    /// Destructive read of the module's pending window-mode request.
    pub fn consume_fullscreen_request(&self) -> Option<bool> {
        if !(self.vtable.has_pending_fullscreen_request)() {
            return None;
        }
        match (self.vtable.consume_pending_fullscreen_request)() {
            FULLSCREEN_REQUEST_WINDOWED => Some(false),
            FULLSCREEN_REQUEST_FULLSCREEN => Some(true),
            _ => None,
        }
    }

    /// Duplicates a module-allocated C string into host memory and releases
    /// it through the same table's paired free.
    fn copy_cstring(&self, ptr: *mut c_char) -> Option<String> {
        if ptr.is_null() {
            return None;
        }
        let copied = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
        (self.vtable.free_cstring)(ptr);
        Some(copied)
    }
}

impl Drop for GameInstance {
    fn drop(&mut self) {
        (self.vtable.destroy_game)(self.handle);
    }
}
