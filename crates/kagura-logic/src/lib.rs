#![forbid(unsafe_op_in_unsafe_fn)]

//! KAGURA sample game logic module.
//!
//! Built as a `cdylib` for the host to load and hot-swap, and as an `rlib`
//! so the full protocol can be exercised in-process by tests. The entire
//! callable surface is the vtable returned by the one exported symbol.

mod exports;
mod game;
mod host;
pub mod save;
#[cfg(test)]
pub(crate) mod stub_host;
mod ui;

pub use exports::vtable;
pub use game::{Game, GameState, Sprite, TextureSlot, World};
pub use host::Host;
pub use ui::{Button, ButtonAction, Rect};

use kagura_module_api::LogicVTable;

/// The module's single exported symbol. Pure; callable immediately after the
/// library is mapped.
#[export_name = "kagura_logic_vtable"]
pub extern "C" fn kagura_logic_vtable() -> LogicVTable {
    exports::vtable()
}
