//! Drives the frame-exchange protocol end to end: once against a minimal
//! in-file logic module (to pin the driver's drain/notify/clear discipline,
//! including unknown command kinds), and once against the real game module
//! linked in-process.

use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use kagura_core::{
    AudioEngine, EngineHost, FrameDriver, GameInstance, HostContext, InputCollector,
    NullTextureBackend, RenderBatches, SceneRenderer, TextRenderer,
};
use kagura_module_api::{
    encode_abi_version, AssetCommand, AssetCommandSlice, GameHandle, HostApi, InputState,
    LogicVTable, RawStr, RenderableSlice, TextCommandSlice, Vec2, Vec4, ABI_VERSION,
    ASSET_CMD_LOAD_TEXTURE, INVALID_ASSET_ID,
};

fn test_host() -> EngineHost {
    EngineHost::new(HostContext::new(
        AudioEngine::disabled(),
        Box::new(NullTextureBackend),
    ))
}

#[derive(Default)]
struct RecordingScene {
    frames: u32,
    renderables: usize,
}

impl SceneRenderer for RecordingScene {
    fn draw_batches(&mut self, batches: &RenderBatches) {
        self.frames += 1;
        self.renderables = batches.len();
    }
}

#[derive(Default)]
struct RecordingText {
    texts: Vec<String>,
}

impl TextRenderer for RecordingText {
    fn draw_text(&mut self, text: &str, _position: Vec2, _font_size: f32, _color: Vec4) {
        self.texts.push(text.to_string());
    }
}

/* =============================================================================================
   A minimal fake logic module, just enough table to pin the driver
   ============================================================================================= */

const UNKNOWN_COMMAND_KIND: u32 = 77;

struct FakeGame {
    paths: Vec<CString>,
    commands: Vec<AssetCommand>,
    notified: Vec<(u32, u32)>,
    clears: u32,
}

impl FakeGame {
    fn with_commands(specs: &[(u32, u32, &str)]) -> Self {
        let paths: Vec<CString> = specs
            .iter()
            .map(|(_, _, p)| CString::new(*p).expect("test path"))
            .collect();
        let commands = specs
            .iter()
            .zip(paths.iter())
            .map(|(&(kind, request_id, _), path)| AssetCommand {
                kind,
                request_id,
                path: RawStr {
                    ptr: path.as_ptr() as *const u8,
                    len: path.as_bytes().len(),
                },
            })
            .collect();
        Self {
            paths,
            commands,
            notified: Vec::new(),
            clears: 0,
        }
    }
}

static mut FAKE_GAME: Option<FakeGame> = None;

fn fake_game() -> &'static mut FakeGame {
    unsafe {
        let slot = &mut *ptr::addr_of_mut!(FAKE_GAME);
        slot.as_mut().expect("fake game installed")
    }
}

extern "C" fn fake_create(_host: HostApi) -> *mut GameHandle {
    // The singleton stands in for module-owned state; the handle is a tag.
    ptr::NonNull::<GameHandle>::dangling().as_ptr()
}

extern "C" fn fake_destroy(_game: *mut GameHandle) {}

extern "C" fn fake_serialize(_game: *const GameHandle) -> *mut c_char {
    ptr::null_mut()
}

extern "C" fn fake_deserialize(_host: HostApi, _encoded: *const c_char) -> *mut GameHandle {
    ptr::null_mut()
}

extern "C" fn fake_free_serialized(_encoded: *mut c_char) {}

extern "C" fn fake_update(_game: *mut GameHandle) {}

extern "C" fn fake_update_input(_game: *mut GameHandle, _input: *const InputState) {}

extern "C" fn fake_get_renderables(_game: *mut GameHandle) -> RenderableSlice {
    RenderableSlice::empty()
}

extern "C" fn fake_get_asset_commands(_game: *mut GameHandle) -> AssetCommandSlice {
    AssetCommandSlice::from_slice(&fake_game().commands)
}

extern "C" fn fake_clear_asset_commands(_game: *mut GameHandle) {
    let game = fake_game();
    game.commands.clear();
    game.clears += 1;
}

extern "C" fn fake_notify(_game: *mut GameHandle, request_id: u32, asset_id: u32) {
    fake_game().notified.push((request_id, asset_id));
}

extern "C" fn fake_get_text_commands(_game: *mut GameHandle) -> TextCommandSlice {
    TextCommandSlice::empty()
}

extern "C" fn fake_clear_text_commands(_game: *mut GameHandle) {}

extern "C" fn fake_asset_command_path(command: *const AssetCommand) -> *mut c_char {
    let command = unsafe { command.as_ref() }.expect("command pointer");
    let path = unsafe { command.path.as_str() };
    CString::new(path).expect("path").into_raw()
}

extern "C" fn fake_text_command_text(_command: *const kagura_module_api::TextCommand) -> *mut c_char {
    ptr::null_mut()
}

extern "C" fn fake_free_cstring(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

extern "C" fn fake_request_fullscreen(_fullscreen: bool) {}

extern "C" fn fake_has_pending_fullscreen() -> bool {
    false
}

extern "C" fn fake_consume_pending_fullscreen() -> u32 {
    kagura_module_api::FULLSCREEN_REQUEST_NONE
}

fn fake_vtable() -> LogicVTable {
    LogicVTable {
        abi_version: ABI_VERSION,
        create_game: fake_create,
        destroy_game: fake_destroy,
        serialize_game: fake_serialize,
        deserialize_game: fake_deserialize,
        free_serialized: fake_free_serialized,
        update_game: fake_update,
        update_input_state: fake_update_input,
        get_renderables: fake_get_renderables,
        get_asset_commands: fake_get_asset_commands,
        clear_asset_commands: fake_clear_asset_commands,
        notify_asset_loaded: fake_notify,
        get_text_commands: fake_get_text_commands,
        clear_text_commands: fake_clear_text_commands,
        asset_command_path: fake_asset_command_path,
        text_command_text: fake_text_command_text,
        free_cstring: fake_free_cstring,
        request_fullscreen: fake_request_fullscreen,
        has_pending_fullscreen_request: fake_has_pending_fullscreen,
        consume_pending_fullscreen_request: fake_consume_pending_fullscreen,
    }
}

/* =============================================================================================
   Driver discipline against the fake module
   ============================================================================================= */

#[test]
fn every_command_is_notified_before_the_single_clear() {
    unsafe {
        *ptr::addr_of_mut!(FAKE_GAME) = Some(FakeGame::with_commands(&[
            (ASSET_CMD_LOAD_TEXTURE, 1, "assets/textures/a.png"),
            (ASSET_CMD_LOAD_TEXTURE, 2, "assets/textures/b.png"),
            (UNKNOWN_COMMAND_KIND, 3, "assets/unknown.bin"),
        ]));
    }

    let table = fake_vtable();
    let mut host = test_host();
    let api = host.host_api();
    let mut game = GameInstance::create(&table, api).expect("fake create");

    let mut driver = FrameDriver::new();
    let mut scene = RecordingScene::default();
    let mut text = RecordingText::default();
    let input = InputState::default();
    driver.drive_frame(&mut host, &mut game, &input, &mut scene, &mut text);
    drop(game);

    let fake = fake_game();
    // Exactly N notifies, matching request ids in order, before the clear.
    assert_eq!(fake.notified.len(), 3);
    assert_eq!(fake.notified[0].0, 1);
    assert_eq!(fake.notified[1].0, 2);
    assert_eq!(fake.notified[2], (3, INVALID_ASSET_ID));
    // The two real loads resolved through the asset store.
    assert_ne!(fake.notified[0].1, INVALID_ASSET_ID);
    assert_ne!(fake.notified[1].1, INVALID_ASSET_ID);
    assert_eq!(fake.clears, 1);
    assert_eq!(host.ctx().assets.len(), 2);
}

/* =============================================================================================
   The real module, linked in-process
   ============================================================================================= */

fn click_at(input: &mut InputCollector, x: f32, y: f32) -> InputState {
    input.on_mouse_moved(x, y);
    input.on_mouse_button(true);
    let snap = input.snapshot();
    input.on_mouse_button(false);
    snap
}

#[test]
fn real_module_plays_through_menu_and_physics() {
    let table = kagura_logic::vtable();
    assert_eq!(table.abi_version, ABI_VERSION);
    kagura_core::bridge::check_abi(&table).expect("in-process table must pass the gate");

    let mut host = test_host();
    let api = host.host_api();
    let mut game = GameInstance::create(&table, api).expect("create");

    let mut driver = FrameDriver::new();
    let mut scene = RecordingScene::default();
    let mut text = RecordingText::default();
    let mut input = InputCollector::new();

    // Frame 1: click Start. The module creates the ground and player bodies
    // through the reverse bridge and requests its textures.
    let snap = click_at(&mut input, 400.0, 280.0);
    driver.drive_frame(&mut host, &mut game, &snap, &mut scene, &mut text);

    assert_eq!(host.ctx().physics.body_count(), 2);
    assert_eq!(host.ctx().assets.len(), 3);
    assert!(scene.renderables > 0);

    // Two seconds of frames: the player box falls and lands.
    for _ in 0..120 {
        let snap = input.snapshot();
        driver.drive_frame(&mut host, &mut game, &snap, &mut scene, &mut text);
    }

    assert_eq!(scene.frames, 121);

    let encoded = game.serialize().expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&encoded).expect("encoded form is JSON");
    let player_id = value["payload"]["player_body"]
        .as_u64()
        .expect("player body id");

    let y = host
        .ctx()
        .physics
        .body_position(player_id)
        .expect("player body exists")
        .y;
    assert!((0.8..=1.2).contains(&y), "player should rest on the ground, y = {y}");
    assert_eq!(value["payload"]["landed"], serde_json::Value::Bool(true));
    assert!(text.texts.iter().any(|t| t == "landed"));
}

#[test]
fn version_gate_rejects_a_foreign_major() {
    let mut table = kagura_logic::vtable();
    table.abi_version = encode_abi_version(
        kagura_module_api::abi_major(ABI_VERSION) + 1,
        0,
        0,
    );
    assert!(kagura_core::bridge::check_abi(&table).is_err());

    table.abi_version = ABI_VERSION;
    assert!(kagura_core::bridge::check_abi(&table).is_ok());
}
