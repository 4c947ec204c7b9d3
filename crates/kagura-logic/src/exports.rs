//! The extern "C" surface of the module.
//!
//! Every entry point here is reachable through the vtable and therefore
//! callable from a foreign binary: null pointers degrade to no-ops or null
//! returns, nothing unwinds, and every allocation handed out has a paired
//! free in the same table.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::atomic::{AtomicU32, Ordering};

use kagura_module_api::{
    AssetCommand, AssetCommandSlice, GameHandle, HostApi, InputState, LogicVTable,
    RenderableSlice, TextCommand, TextCommandSlice, ABI_VERSION, FULLSCREEN_REQUEST_FULLSCREEN,
    FULLSCREEN_REQUEST_NONE, FULLSCREEN_REQUEST_WINDOWED,
};

use crate::game::Game;
use crate::host::Host;

/// Pending window-mode request. One tagged atomic instead of a separate
/// pending flag and value, so a stale value can never pair with a fresh
/// flag. Written by game logic, consumed destructively by the host.
static FULLSCREEN_REQUEST: AtomicU32 = AtomicU32::new(FULLSCREEN_REQUEST_NONE);

pub(crate) fn submit_fullscreen_request(fullscreen: bool) {
    let tag = if fullscreen {
        FULLSCREEN_REQUEST_FULLSCREEN
    } else {
        FULLSCREEN_REQUEST_WINDOWED
    };
    FULLSCREEN_REQUEST.store(tag, Ordering::Release);
}

fn game_mut<'a>(handle: *mut GameHandle) -> Option<&'a mut Game> {
    unsafe { (handle as *mut Game).as_mut() }
}

fn game_ref<'a>(handle: *const GameHandle) -> Option<&'a Game> {
    unsafe { (handle as *const Game).as_ref() }
}

extern "C" fn create_game(host: HostApi) -> *mut GameHandle {
    let game = Game::new(Host::new(host));
    Box::into_raw(Box::new(game)) as *mut GameHandle
}

extern "C" fn destroy_game(handle: *mut GameHandle) {
    if handle.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(handle as *mut Game) });
}

extern "C" fn serialize_game(handle: *const GameHandle) -> *mut c_char {
    let Some(game) = game_ref(handle) else {
        return ptr::null_mut();
    };
    let encoded = match game.to_encoded() {
        Ok(s) => s,
        Err(_) => return ptr::null_mut(),
    };
    match CString::new(encoded) {
        Ok(c) => c.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

extern "C" fn deserialize_game(host: HostApi, encoded: *const c_char) -> *mut GameHandle {
    if encoded.is_null() {
        return ptr::null_mut();
    }
    let host = Host::new(host);
    let encoded = unsafe { CStr::from_ptr(encoded) };
    let Ok(encoded) = encoded.to_str() else {
        host.log_warn("deserialize: encoded form is not UTF-8");
        return ptr::null_mut();
    };
    match Game::from_encoded(host, encoded) {
        Ok(game) => Box::into_raw(Box::new(game)) as *mut GameHandle,
        Err(e) => {
            // `host` moved into the failed game; log through the plain
            // logger so the error is not lost.
            log::warn!("deserialize failed: {e}");
            ptr::null_mut()
        }
    }
}

extern "C" fn free_serialized(encoded: *mut c_char) {
    if encoded.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(encoded) });
}

extern "C" fn update_game(handle: *mut GameHandle) {
    if let Some(game) = game_mut(handle) {
        game.advance();
    }
}

extern "C" fn update_input_state(handle: *mut GameHandle, input: *const InputState) {
    let Some(game) = game_mut(handle) else {
        return;
    };
    let Some(input) = (unsafe { input.as_ref() }) else {
        return;
    };
    game.set_input(*input);
}

extern "C" fn get_renderables(handle: *mut GameHandle) -> RenderableSlice {
    match game_mut(handle) {
        Some(game) => RenderableSlice::from_slice(game.renderables()),
        None => RenderableSlice::empty(),
    }
}

extern "C" fn get_asset_commands(handle: *mut GameHandle) -> AssetCommandSlice {
    match game_mut(handle) {
        Some(game) => AssetCommandSlice::from_slice(game.asset_commands()),
        None => AssetCommandSlice::empty(),
    }
}

extern "C" fn clear_asset_commands(handle: *mut GameHandle) {
    if let Some(game) = game_mut(handle) {
        game.clear_asset_commands();
    }
}

extern "C" fn notify_asset_loaded(handle: *mut GameHandle, request_id: u32, asset_id: u32) {
    if let Some(game) = game_mut(handle) {
        game.notify_asset_loaded(request_id, asset_id);
    }
}

extern "C" fn get_text_commands(handle: *mut GameHandle) -> TextCommandSlice {
    match game_mut(handle) {
        Some(game) => TextCommandSlice::from_slice(game.text_commands()),
        None => TextCommandSlice::empty(),
    }
}

extern "C" fn clear_text_commands(handle: *mut GameHandle) {
    if let Some(game) = game_mut(handle) {
        game.clear_text_commands();
    }
}

extern "C" fn asset_command_path(command: *const AssetCommand) -> *mut c_char {
    let Some(command) = (unsafe { command.as_ref() }) else {
        return ptr::null_mut();
    };
    let path = unsafe { command.path.as_str() };
    match CString::new(path) {
        Ok(c) => c.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

extern "C" fn text_command_text(command: *const TextCommand) -> *mut c_char {
    let Some(command) = (unsafe { command.as_ref() }) else {
        return ptr::null_mut();
    };
    let text = unsafe { command.text.as_str() };
    match CString::new(text) {
        Ok(c) => c.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

extern "C" fn free_cstring(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(s) });
}

extern "C" fn request_fullscreen(fullscreen: bool) {
    submit_fullscreen_request(fullscreen);
}

extern "C" fn has_pending_fullscreen_request() -> bool {
    FULLSCREEN_REQUEST.load(Ordering::Acquire) != FULLSCREEN_REQUEST_NONE
}

extern "C" fn consume_pending_fullscreen_request() -> u32 {
    FULLSCREEN_REQUEST.swap(FULLSCREEN_REQUEST_NONE, Ordering::AcqRel)
}

/// The module's complete callable surface, version first.
pub fn vtable() -> LogicVTable {
    LogicVTable {
        abi_version: ABI_VERSION,
        create_game,
        destroy_game,
        serialize_game,
        deserialize_game,
        free_serialized,
        update_game,
        update_input_state,
        get_renderables,
        get_asset_commands,
        clear_asset_commands,
        notify_asset_loaded,
        get_text_commands,
        clear_text_commands,
        asset_command_path,
        text_command_text,
        free_cstring,
        request_fullscreen,
        has_pending_fullscreen_request,
        consume_pending_fullscreen_request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub_host::StubHost;
    use kagura_module_api::Vec2;

    fn copy_and_free(table: &LogicVTable, ptr: *mut c_char) -> Option<String> {
        if ptr.is_null() {
            return None;
        }
        let s = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
        (table.free_cstring)(ptr);
        Some(s)
    }

    #[test]
    fn vtable_reports_the_contract_version_first() {
        assert_eq!(vtable().abi_version, ABI_VERSION);
    }

    #[test]
    fn full_frame_protocol_over_the_raw_table() {
        let table = vtable();
        let mut stub = StubHost::new();
        let game = (table.create_game)(stub.api());
        assert!(!game.is_null());

        // Idle -> InputWritten -> Advanced: click the Start button.
        let input = InputState {
            mouse_pos: Vec2::new(400.0, 280.0),
            mouse_clicked: true,
            ..InputState::default()
        };
        (table.update_input_state)(game, &input as *const InputState);
        (table.update_game)(game);

        // Drain: renderables plus the stage texture requests.
        let renderables = (table.get_renderables)(game);
        assert!(renderables.len > 0);

        let commands = (table.get_asset_commands)(game);
        let commands_view = unsafe { commands.as_slice() }.to_vec();
        assert!(!commands_view.is_empty());
        for (i, command) in commands_view.iter().enumerate() {
            let path = copy_and_free(&table, (table.asset_command_path)(command))
                .expect("command path must extract");
            assert!(path.starts_with("assets/"), "unexpected path: {path}");
            (table.notify_asset_loaded)(game, command.request_id, 10 + i as u32);
        }
        (table.clear_asset_commands)(game);
        assert_eq!((table.get_asset_commands)(game).len, 0);

        let texts = (table.get_text_commands)(game);
        let texts_view = unsafe { texts.as_slice() }.to_vec();
        for command in &texts_view {
            let text = copy_and_free(&table, (table.text_command_text)(command))
                .expect("text must extract");
            assert!(!text.is_empty());
        }
        if !texts_view.is_empty() {
            (table.clear_text_commands)(game);
        }

        (table.destroy_game)(game);
    }

    #[test]
    fn serialize_round_trips_through_the_table() {
        let table = vtable();
        let mut stub = StubHost::new();
        let game = (table.create_game)(stub.api());
        (table.update_game)(game);

        let encoded_ptr = (table.serialize_game)(game);
        assert!(!encoded_ptr.is_null());
        let encoded = unsafe { CStr::from_ptr(encoded_ptr) }
            .to_string_lossy()
            .into_owned();
        (table.free_serialized)(encoded_ptr);

        let c_encoded = CString::new(encoded.clone()).unwrap();
        let restored = (table.deserialize_game)(stub.api(), c_encoded.as_ptr());
        assert!(!restored.is_null());

        let restored_ptr = (table.serialize_game)(restored);
        let restored_encoded = unsafe { CStr::from_ptr(restored_ptr) }
            .to_string_lossy()
            .into_owned();
        (table.free_serialized)(restored_ptr);
        assert_eq!(restored_encoded, encoded);

        (table.destroy_game)(game);
        (table.destroy_game)(restored);
    }

    #[test]
    fn deserialize_of_garbage_returns_null() {
        let table = vtable();
        let mut stub = StubHost::new();
        let garbage = CString::new("not a save").unwrap();
        assert!((table.deserialize_game)(stub.api(), garbage.as_ptr()).is_null());
        assert!((table.deserialize_game)(stub.api(), ptr::null()).is_null());
    }

    #[test]
    fn null_handles_are_ignored_everywhere() {
        let table = vtable();
        (table.destroy_game)(ptr::null_mut());
        (table.update_game)(ptr::null_mut());
        (table.clear_asset_commands)(ptr::null_mut());
        (table.clear_text_commands)(ptr::null_mut());
        (table.notify_asset_loaded)(ptr::null_mut(), 1, 1);
        (table.free_serialized)(ptr::null_mut());
        (table.free_cstring)(ptr::null_mut());
        assert_eq!((table.get_renderables)(ptr::null_mut()).len, 0);
        assert!((table.serialize_game)(ptr::null()).is_null());
    }

    #[test]
    fn fullscreen_request_is_consumed_destructively() {
        let table = vtable();
        // Drain anything a sibling test left behind.
        (table.consume_pending_fullscreen_request)();

        assert!(!(table.has_pending_fullscreen_request)());
        (table.request_fullscreen)(true);
        assert!((table.has_pending_fullscreen_request)());
        assert_eq!(
            (table.consume_pending_fullscreen_request)(),
            FULLSCREEN_REQUEST_FULLSCREEN
        );
        assert!(!(table.has_pending_fullscreen_request)());
        assert_eq!(
            (table.consume_pending_fullscreen_request)(),
            FULLSCREEN_REQUEST_NONE
        );

        (table.request_fullscreen)(false);
        assert_eq!(
            (table.consume_pending_fullscreen_request)(),
            FULLSCREEN_REQUEST_WINDOWED
        );
    }
}
