//! Frame exchange driver.
//!
//! One frame walks Idle → InputWritten → Advanced → Drained → Idle. The
//! sequencing invariants live here: input precedes advance, advance precedes
//! every drain, each asset command is notified before the paired clear, and
//! a clear is only issued when the drained slice was non-empty.

use kagura_module_api::{
    InputState, ASSET_CMD_LOAD_TEXTURE, ASSET_CMD_RELOAD_TEXTURE, INVALID_ASSET_ID,
};

use crate::bridge::{EngineHost, GameInstance};
use crate::render::{RenderBatches, SceneRenderer, TextRenderer};

/// Drives the per-frame protocol against one game instance. Owns the
/// copy-out batching buffers so they are reused across frames.
#[derive(Default)]
pub struct FrameDriver {
    batches: RenderBatches,
}

impl FrameDriver {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drive_frame(
        &mut self,
        host: &mut EngineHost,
        game: &mut GameInstance,
        input: &InputState,
        scene: &mut dyn SceneRenderer,
        text: &mut dyn TextRenderer,
    ) {
        // Idle -> InputWritten
        game.write_input(input);

        // InputWritten -> Advanced. Everything the module does this frame,
        // including callbacks into physics and audio, happens inside this
        // one call.
        game.advance();

        // Advanced -> Drained. The renderable slice is a borrow; it is
        // copied into the host-owned batches before anything else touches
        // the module.
        let batches = &mut self.batches;
        batches.clear();
        game.with_renderables(|renderables| {
            for r in renderables {
                batches.push(*r);
            }
        });
        scene.draw_batches(&self.batches);

        let commands = game.take_asset_commands();
        let drained_assets = commands.len();
        for command in commands {
            let result = self.dispatch_asset_command(host, command.kind, command.path.as_deref());
            game.notify_asset_loaded(command.request_id, result);
        }

        let texts = game.take_text_commands();
        for t in &texts {
            text.draw_text(&t.text, t.position, t.font_size, t.color);
        }

        // Drained -> Idle. Skipping the clear for an empty slice is an
        // allowed optimization.
        if drained_assets > 0 {
            game.clear_asset_commands();
        }
        if !texts.is_empty() {
            game.clear_text_commands();
        }
    }

    fn dispatch_asset_command(
        &mut self,
        host: &mut EngineHost,
        kind: u32,
        path: Option<&str>,
    ) -> u32 {
        let Some(path) = path else {
            log::warn!(target: "assets", "asset command without a readable path");
            return INVALID_ASSET_ID;
        };
        match kind {
            ASSET_CMD_LOAD_TEXTURE => host.ctx_mut().assets.load_texture(path),
            ASSET_CMD_RELOAD_TEXTURE => host.ctx_mut().assets.reload_texture(path),
            other => {
                // Unknown kinds must not crash the host; the request is
                // still answered so the module's slot is not leaked.
                log::warn!(target: "assets", "unknown asset command kind {other} for '{path}'");
                INVALID_ASSET_ID
            }
        }
    }
}
