// Library crate: placement engine, editor state and persistence.
// The binary only wires these up to the JSON command protocol.

pub mod catalog;
pub mod command;
pub mod fixtures;
pub mod geometry;
pub mod harness;
pub mod persistence;
pub mod room;
pub mod sanitize;
pub mod snap;
pub mod state;
pub mod templates;
