//! clip-viewer
//!
//! A small animated model viewer. It shows one FBX character at a time on a
//! fogged stage with decorative cones, plays the first animation clip of the
//! model on a loop and swaps models with the number keys.
//!
//! High-level modules
//! - `camera`: orbit camera, its controller and the view/projection uniform
//! - `config`: scene constants and the asset root
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: engine data models (meshes, instances, scene graph)
//! - `error`: asset load errors
//! - `flow`: the event loop and the flow abstraction
//! - `pipelines`: the Phong pipeline and its light uniform
//! - `render`: render composition
//! - `resources`: FBX decoding and GPU upload
//! - `viewer`: the viewer flow, its session and input bindings
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewer;

pub use config::ViewerConfig;
pub use error::{AssetLoadFailure, LoadCause};
