//! Rendering seams and host-side copy-out batching.
//!
//! Actual GPU submission and text shaping are external collaborators; the
//! core only defines the interfaces it drives and the [`RenderBatches`]
//! structure the renderable borrow is copied into before it expires.

use std::collections::HashMap;

use kagura_module_api::{RenderableObject, Vec2, Vec4};

/// Draw-submission service for the renderable batches of one frame.
pub trait SceneRenderer {
    fn draw_batches(&mut self, batches: &RenderBatches);
}

/// Immediate text drawing service; commands are only valid within the frame.
pub trait TextRenderer {
    fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Vec4);
}

/// Host-owned copy of the frame's renderables, grouped by texture so the
/// renderer can submit one batch per texture. Reused across frames to avoid
/// re-allocating.
#[derive(Default)]
pub struct RenderBatches {
    by_texture: HashMap<u32, Vec<RenderableObject>>,
    total: usize,
}

impl RenderBatches {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties every batch but keeps their allocations.
    pub fn clear(&mut self) {
        for batch in self.by_texture.values_mut() {
            batch.clear();
        }
        self.total = 0;
    }

    #[inline]
    pub fn push(&mut self, renderable: RenderableObject) {
        self.by_texture
            .entry(renderable.texture_id)
            .or_default()
            .push(renderable);
        self.total += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn batches(&self) -> impl Iterator<Item = (u32, &[RenderableObject])> {
        self.by_texture
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(&texture, v)| (texture, v.as_slice()))
    }
}

/// Renderer that narrates to the log instead of a GPU. Stands in wherever a
/// real device is out of reach (headless runs, tests).
#[derive(Default)]
pub struct ConsoleRenderer {
    pub frames: u64,
}

impl SceneRenderer for ConsoleRenderer {
    fn draw_batches(&mut self, batches: &RenderBatches) {
        self.frames += 1;
        for (texture, batch) in batches.batches() {
            log::debug!(target: "render", "texture {texture}: {} renderable(s)", batch.len());
        }
    }
}

impl TextRenderer for ConsoleRenderer {
    fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, _color: Vec4) {
        log::debug!(
            target: "render",
            "text at ({}, {}) size {font_size}: {text:?}",
            position.x,
            position.y
        );
    }
}
