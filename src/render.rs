//! Render composition and pipeline batching.
//!
//! Flows describe what they want drawn with a [`Render`] value. The frame loop
//! flattens all of them into one list of [`Instanced`] draws for the Phong
//! pipeline.

use crate::data_structures::{model::Model, scene_graph::SceneNode};

/// Data for instanced object rendering: a model and its instance buffer.
///
/// The instance buffer holds one [`crate::data_structures::instance::InstanceRaw`]
/// per drawn copy of the model.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// Specifies how a scene object should be rendered.
///
/// - `Defaults(Vec<Instanced>)` renders a batch of instanced objects
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
pub enum Render<'a> {
    Defaults(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    /// Appends every draw in this render tree to `basics`.
    pub(crate) fn collect(self, basics: &mut Vec<Instanced<'a>>) {
        match self {
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.collect(basics)),
        }
    }
}

impl<'a> From<&'a dyn SceneNode> for Render<'a> {
    fn from(sn: &'a dyn SceneNode) -> Self {
        Render::Defaults(sn.get_render())
    }
}
