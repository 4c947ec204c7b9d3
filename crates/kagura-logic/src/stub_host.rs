//! Test double for the host side of the bridge: a recording [`HostApi`]
//! backed by a plain struct, so game logic can be driven without an engine.

use std::collections::HashMap;

use kagura_module_api::{
    CollisionEvent, CollisionEventSlice, HostApi, HostCtx, RawStr, Vec2, BODY_POSITION_SENTINEL,
};

#[derive(Default)]
pub(crate) struct StubHost {
    pub next_body_id: u64,
    pub dynamic_boxes: Vec<(f32, f32, f32, f32)>,
    pub static_boxes: Vec<(f32, f32, f32, f32)>,
    pub positions: HashMap<u64, Vec2>,
    pub steps: u32,
    pub events: Vec<CollisionEvent>,
    pub sounds: Vec<String>,
    pub bgm: Vec<(String, bool)>,
    pub settings: Vec<(f32, f32, f32)>,
    pub logs: Vec<(u32, String)>,
}

impl StubHost {
    pub fn new() -> Self {
        Self {
            next_body_id: 1,
            ..Self::default()
        }
    }

    /// The table games under test call back through. The pointer stays
    /// valid for as long as this stub does.
    pub fn api(&mut self) -> HostApi {
        HostApi {
            ctx: self as *mut StubHost as *mut HostCtx,
            log: stub_log,
            create_dynamic_box: stub_create_dynamic_box,
            create_static_box: stub_create_static_box,
            get_body_position: stub_get_body_position,
            step_physics: stub_step_physics,
            get_collision_events: stub_get_collision_events,
            play_sound: stub_play_sound,
            play_bgm: stub_play_bgm,
            set_audio_settings: stub_set_audio_settings,
        }
    }
}

unsafe fn stub<'a>(ctx: *mut HostCtx) -> &'a mut StubHost {
    unsafe { &mut *(ctx as *mut StubHost) }
}

extern "C" fn stub_log(ctx: *mut HostCtx, level: u32, message: RawStr) {
    let s = unsafe { stub(ctx) };
    s.logs.push((level, unsafe { message.as_str() }.to_string()));
}

extern "C" fn stub_create_dynamic_box(
    ctx: *mut HostCtx,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> u64 {
    let s = unsafe { stub(ctx) };
    let id = s.next_body_id;
    s.next_body_id += 1;
    s.dynamic_boxes.push((x, y, width, height));
    s.positions.insert(id, Vec2::new(x, y));
    id
}

extern "C" fn stub_create_static_box(
    ctx: *mut HostCtx,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> u64 {
    let s = unsafe { stub(ctx) };
    let id = s.next_body_id;
    s.next_body_id += 1;
    s.static_boxes.push((x, y, width, height));
    s.positions.insert(id, Vec2::new(x, y));
    id
}

extern "C" fn stub_get_body_position(ctx: *mut HostCtx, id: u64) -> Vec2 {
    let s = unsafe { stub(ctx) };
    s.positions.get(&id).copied().unwrap_or(BODY_POSITION_SENTINEL)
}

extern "C" fn stub_step_physics(ctx: *mut HostCtx) {
    let s = unsafe { stub(ctx) };
    s.steps += 1;
}

extern "C" fn stub_get_collision_events(ctx: *mut HostCtx) -> CollisionEventSlice {
    let s = unsafe { stub(ctx) };
    CollisionEventSlice::from_slice(&s.events)
}

extern "C" fn stub_play_sound(ctx: *mut HostCtx, path: RawStr) {
    let s = unsafe { stub(ctx) };
    s.sounds.push(unsafe { path.as_str() }.to_string());
}

extern "C" fn stub_play_bgm(ctx: *mut HostCtx, path: RawStr, looped: bool) {
    let s = unsafe { stub(ctx) };
    s.bgm.push((unsafe { path.as_str() }.to_string(), looped));
}

extern "C" fn stub_set_audio_settings(ctx: *mut HostCtx, master: f32, bgm: f32, se: f32) {
    let s = unsafe { stub(ctx) };
    s.settings.push((master, bgm, se));
}
