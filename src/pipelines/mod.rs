//! Render pipelines.
//!
//! - `basic` is the Phong pipeline all models are drawn with
//! - `light` holds the light/fog uniform and its bind group

pub mod basic;
pub mod light;
