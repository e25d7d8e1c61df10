//! The clip viewer built on the engine layer.
//!
//! - `catalog` lists the shipped assets and resolves their files
//! - `input` maps number keys to assets
//! - `loader` reads and decodes assets off the UI thread
//! - `mixer` plays one clip on a loop
//! - `session` owns the displayed model and guards against stale loads
//! - `flow` wires all of it into the event loop

pub mod catalog;
pub mod flow;
pub mod input;
pub mod loader;
pub mod mixer;
pub mod session;
