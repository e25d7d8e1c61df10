//! Scene graph and hierarchical scene organization.
//!
//! Every node holds a list of `(local, world)` instance pairs. World
//! transforms are propagated top-down: instance `i` of a child is placed
//! relative to instance `i` of its parent. Imported models use a single
//! instance per node; decor such as the cone field uses one node with many.

use std::ops::Range;

use log::warn;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        model,
    },
    render::Instanced,
    resources::animation::Pose,
};

pub trait SceneNode {
    /// Index of the asset node this scene node was built from. Poses are keyed by it.
    fn node_index(&self) -> Option<usize>;

    fn set_local_transform(&mut self, idx: usize, instance: Instance);

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    fn write_to_buffers(&mut self, queue: &wgpu::Queue);

    /**
     * Multiple instances of a parent can be passed down to multiple instances of multiple children.
     * The argument `parents_world_transform` with a matching `range` size provides control over which instances are transformed.
     */
    fn update_world_transforms(
        &mut self,
        range: Range<usize>,
        parents_world_transform: &Vec<Instance>,
    );

    fn update_world_transform_all(&mut self);

    fn get_render(&self) -> Vec<Instanced<'_>>;

    /// Releases the GPU buffers of this node and all of its descendants.
    fn dispose(&mut self);

    /// Overwrites the first local transform of every node that appears in `pose`.
    fn apply_pose(&mut self, pose: &Pose) {
        if let Some(local) = self.node_index().and_then(|idx| pose.get(&idx)) {
            self.set_local_transform(0, *local);
        }
        for child in self.get_children_mut() {
            child.apply_pose(pose);
        }
    }
}

/// Shared world-transform propagation for both node kinds.
fn propagate(
    instances: &mut [(Instance, Instance)],
    children: &mut [Box<dyn SceneNode>],
    range: Range<usize>,
    parents_world_transform: &Vec<Instance>,
) {
    if parents_world_transform.len() > instances.len() {
        warn!(
            "You tried to transform with len {}, but there are only {} instances to transform.",
            parents_world_transform.len(),
            instances.len()
        );
        return;
    }
    let len = instances.len();
    let Some(targets) = instances.get_mut(range.clone()) else {
        warn!(
            "You tried to transform range {}..{}, which is out of bounds for parent len {}.",
            range.start, range.end, len,
        );
        return;
    };
    let world_transforms = targets
        .iter_mut()
        .zip(parents_world_transform.iter())
        .map(|((local, world), parent)| {
            *world = parent * &*local;
            *world
        })
        .collect::<Vec<_>>();
    for child in children.iter_mut() {
        child.update_world_transforms(range.clone(), &world_transforms);
    }
}

fn identity_instances(amount: usize) -> Vec<(Instance, Instance)> {
    (0..amount)
        .map(|_| (Instance::default(), Instance::default()))
        .collect()
}

/// A transform-only node (an FBX null, bone, or group).
pub struct ContainerNode {
    pub children: Vec<Box<dyn SceneNode>>,
    pub instances: Vec<(Instance, Instance)>,
    node_index: Option<usize>,
}

impl ContainerNode {
    pub fn new(amount: usize, node_index: Option<usize>) -> Self {
        Self {
            instances: identity_instances(amount),
            children: vec![],
            node_index,
        }
    }
}

impl SceneNode for ContainerNode {
    fn node_index(&self) -> Option<usize> {
        self.node_index
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn update_world_transforms(
        &mut self,
        range: Range<usize>,
        parents_world_transform: &Vec<Instance>,
    ) {
        propagate(
            &mut self.instances,
            &mut self.children,
            range,
            parents_world_transform,
        );
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn update_world_transform_all(&mut self) {
        let range = 0..self.instances.len();
        let default_instances = range.clone().map(|_| Instance::default()).collect();
        self.update_world_transforms(range, &default_instances);
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }

    fn dispose(&mut self) {
        self.children.iter_mut().for_each(|child| child.dispose());
    }
}

/// A node that draws a [`model::Model`] once per instance.
pub struct ModelNode {
    children: Vec<Box<dyn SceneNode>>,
    instance_buffer: wgpu::Buffer,
    instances: Vec<(Instance, Instance)>,
    model: model::Model,
    node_index: Option<usize>,
}

impl ModelNode {
    pub fn from_model(
        amount: usize,
        device: &wgpu::Device,
        model: model::Model,
        node_index: Option<usize>,
    ) -> Self {
        let instances = identity_instances(amount);

        let instance_data = instances
            .iter()
            .map(|(_, world)| world.to_raw())
            .collect::<Vec<_>>();

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&instance_data),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            children: vec![],
            instance_buffer,
            instances,
            model,
            node_index,
        }
    }
}

impl SceneNode for ModelNode {
    fn node_index(&self) -> Option<usize> {
        self.node_index
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn update_world_transforms(
        &mut self,
        range: Range<usize>,
        parents_world_transform: &Vec<Instance>,
    ) {
        propagate(
            &mut self.instances,
            &mut self.children,
            range,
            parents_world_transform,
        );
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    /// The instance count is fixed at construction, so the buffer is rewritten in place.
    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        let raw_instances: Vec<InstanceRaw> = self
            .instances
            .iter()
            .map(|(_, world)| world.to_raw())
            .collect();
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&raw_instances),
        );
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn update_world_transform_all(&mut self) {
        let range = 0..self.instances.len();
        let default_instances = range.clone().map(|_| Instance::default()).collect();
        self.update_world_transforms(range, &default_instances);
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .chain([Instanced {
                instance: &self.instance_buffer,
                model: &self.model,
                amount: self.instances.len(),
            }])
            .collect()
    }

    fn dispose(&mut self) {
        self.model.dispose();
        self.instance_buffer.destroy();
        self.children.iter_mut().for_each(|child| child.dispose());
    }
}
