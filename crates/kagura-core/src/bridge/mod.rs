//! Host side of the ABI bridge.
//!
//! [`LoadedModule`] loads the logic module binary and gates it on the ABI
//! major version before anything else is called. [`GameInstance`] owns one
//! opaque game handle and is the only place raw handles and module-owned
//! borrows are touched. [`EngineHost`] owns the engine context and builds
//! the reverse-direction [`kagura_module_api::HostApi`] table.

mod host_api;
mod module;

pub use host_api::{EngineHost, HostContext};
pub use module::{check_abi, DrainedAssetCommand, DrainedTextCommand, GameInstance, LoadedModule};
