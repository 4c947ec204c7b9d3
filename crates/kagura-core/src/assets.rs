//! Texture asset store.
//!
//! The actual texture storage and GPU upload live behind the
//! [`AssetBackend`] seam; the store owns the path→id mapping the frame
//! protocol needs. Ids start at 1 and stay stable across reloads of the same
//! path; 0 is the failure sentinel reported back to the logic module.

use std::collections::HashMap;
use std::path::Path;

use kagura_module_api::INVALID_ASSET_ID;

use crate::error::AssetError;

/// The opaque texture service the host delegates to.
pub trait AssetBackend {
    /// Loads (or reloads) the texture at `path` for the given id.
    fn load_texture(&mut self, id: u32, path: &Path) -> Result<(), AssetError>;
}

/// Backend that accepts everything and stores nothing. Used headless and in
/// tests.
#[derive(Default)]
pub struct NullTextureBackend;

impl AssetBackend for NullTextureBackend {
    fn load_texture(&mut self, id: u32, path: &Path) -> Result<(), AssetError> {
        log::debug!(target: "assets", "texture {id}: '{}' (null backend)", path.display());
        Ok(())
    }
}

pub struct AssetStore {
    backend: Box<dyn AssetBackend>,
    by_path: HashMap<String, u32>,
    next_id: u32,
}

impl AssetStore {
    pub fn new(backend: Box<dyn AssetBackend>) -> Self {
        Self {
            backend,
            by_path: HashMap::new(),
            next_id: 1,
        }
    }

    /// Loads a texture and returns its id, or [`INVALID_ASSET_ID`] on
    /// failure. Loading an already-known path returns the existing id.
    pub fn load_texture(&mut self, path: &str) -> u32 {
        if let Some(&id) = self.by_path.get(path) {
            return id;
        }
        let id = self.next_id;
        match self.backend.load_texture(id, Path::new(path)) {
            Ok(()) => {
                self.next_id += 1;
                self.by_path.insert(path.to_string(), id);
                log::info!(target: "assets", "texture {id}: loaded '{path}'");
                id
            }
            Err(e) => {
                log::warn!(target: "assets", "texture load failed '{path}': {e}");
                INVALID_ASSET_ID
            }
        }
    }

    /// Re-pushes a known path through the backend, keeping its id stable.
    /// An unknown path behaves like a first load.
    pub fn reload_texture(&mut self, path: &str) -> u32 {
        let Some(&id) = self.by_path.get(path) else {
            return self.load_texture(path);
        };
        match self.backend.load_texture(id, Path::new(path)) {
            Ok(()) => {
                log::info!(target: "assets", "texture {id}: reloaded '{path}'");
                id
            }
            Err(e) => {
                log::warn!(target: "assets", "texture reload failed '{path}': {e}");
                INVALID_ASSET_ID
            }
        }
    }

    #[inline]
    pub fn texture_id(&self, path: &str) -> Option<u32> {
        self.by_path.get(path).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}
