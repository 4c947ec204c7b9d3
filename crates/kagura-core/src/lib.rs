#![forbid(unsafe_op_in_unsafe_fn)]

//! KAGURA host core: the stateful side of the ABI bridge.
//!
//! Owns the physics body registry, the audio engine guard, the asset store,
//! module loading and handle lifetime, the per-frame exchange protocol, and
//! the hot-reload controller. Window, GPU and font plumbing are external
//! collaborators reached through the seams in [`render`].

pub mod assets;
pub mod audio;
pub mod bridge;
pub mod error;
pub mod frame;
pub mod input;
pub mod physics;
pub mod reload;
pub mod render;

pub use assets::{AssetBackend, AssetStore, NullTextureBackend};
pub use audio::{AudioEngine, AudioSettings};
pub use bridge::{EngineHost, GameInstance, HostContext, LoadedModule};
pub use error::{AssetError, BridgeError, ReloadError};
pub use frame::FrameDriver;
pub use input::InputCollector;
pub use physics::PhysicsWorld;
pub use reload::{reload_module, ReloadWatcher};
pub use render::{ConsoleRenderer, RenderBatches, SceneRenderer, TextRenderer};
