//! Safe wrapper over the reverse-direction host table.
//!
//! All calls are synchronous; slice-returning entries are copied out
//! immediately so no host borrow ever escapes a call site.

use kagura_module_api::{
    CollisionEvent, HostApi, RawStr, Vec2, HOST_LOG_INFO, HOST_LOG_WARN,
};

pub struct Host {
    api: HostApi,
}

impl Host {
    #[inline]
    pub fn new(api: HostApi) -> Self {
        Self { api }
    }

    #[inline]
    pub fn create_dynamic_box(&self, x: f32, y: f32, width: f32, height: f32) -> u64 {
        (self.api.create_dynamic_box)(self.api.ctx, x, y, width, height)
    }

    #[inline]
    pub fn create_static_box(&self, x: f32, y: f32, width: f32, height: f32) -> u64 {
        (self.api.create_static_box)(self.api.ctx, x, y, width, height)
    }

    /// Position of a body, or the host's sentinel for an unknown id. We only
    /// query ids we created ourselves, so the sentinel is not disambiguated
    /// here.
    #[inline]
    pub fn body_position(&self, id: u64) -> Vec2 {
        (self.api.get_body_position)(self.api.ctx, id)
    }

    #[inline]
    pub fn step_physics(&self) {
        (self.api.step_physics)(self.api.ctx)
    }

    /// Contacts begun in the most recent step, copied out of the host's
    /// buffer before it can be invalidated by the next step.
    pub fn collision_events(&self) -> Vec<CollisionEvent> {
        let view = (self.api.get_collision_events)(self.api.ctx);
        unsafe { view.as_slice() }.to_vec()
    }

    #[inline]
    pub fn play_sound(&self, path: &str) {
        (self.api.play_sound)(self.api.ctx, RawStr::from_str(path))
    }

    #[inline]
    pub fn play_bgm(&self, path: &str, looped: bool) {
        (self.api.play_bgm)(self.api.ctx, RawStr::from_str(path), looped)
    }

    #[inline]
    pub fn set_audio_settings(&self, master: f32, bgm: f32, se: f32) {
        (self.api.set_audio_settings)(self.api.ctx, master, bgm, se)
    }

    #[inline]
    pub fn log_info(&self, message: &str) {
        (self.api.log)(self.api.ctx, HOST_LOG_INFO, RawStr::from_str(message))
    }

    #[inline]
    pub fn log_warn(&self, message: &str) {
        (self.api.log)(self.api.ctx, HOST_LOG_WARN, RawStr::from_str(message))
    }
}
