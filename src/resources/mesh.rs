//! CPU geometry generators and GPU upload of decoded assets.

use cgmath::InnerSpace;
use rand::Rng;
use wgpu::util::DeviceExt;

use crate::{
    config::ConeFieldConfig,
    data_structures::{
        instance::Instance,
        model::{self, ModelVertex},
        scene_graph::{ContainerNode, ModelNode, SceneNode},
    },
    resources::{
        import::{MaterialData, MeshData, ModelAsset},
        material::{material_layout, upload_material},
    },
};

/// A cone centred on the origin with its apex on +Y.
///
/// Every triangle gets its own three vertices carrying the face normal, so
/// the result looks faceted regardless of the material.
pub fn cone(radius: f32, height: f32, radial_segments: u32, material: MaterialData) -> MeshData {
    let segments = radial_segments.max(3);
    let half = height / 2.0;
    let apex = cgmath::Vector3::new(0.0, half, 0.0);
    let base_centre = cgmath::Vector3::new(0.0, -half, 0.0);
    let rim = |i: u32| {
        let theta = i as f32 / segments as f32 * std::f32::consts::TAU;
        cgmath::Vector3::new(radius * theta.sin(), -half, radius * theta.cos())
    };

    let mut vertices = Vec::with_capacity(segments as usize * 6);
    let mut push_triangle = |a: cgmath::Vector3<f32>, b: cgmath::Vector3<f32>, c: cgmath::Vector3<f32>| {
        let normal = (b - a).cross(c - a).normalize();
        for position in [a, b, c] {
            vertices.push(ModelVertex {
                position: position.into(),
                normal: normal.into(),
            });
        }
    };
    for i in 0..segments {
        push_triangle(apex, rim(i), rim(i + 1));
        push_triangle(base_centre, rim(i + 1), rim(i));
    }

    let indices = (0..vertices.len() as u32).collect();
    MeshData {
        name: "Cone".to_string(),
        vertices,
        indices,
        material,
        cast_shadow: false,
        receive_shadow: false,
    }
}

/// Random cone placements on the ground plane.
pub fn cone_field_instances(config: &ConeFieldConfig, rng: &mut impl Rng) -> Vec<Instance> {
    let half = config.spread / 2.0;
    (0..config.count)
        .map(|_| {
            Instance::from(cgmath::Vector3::new(
                rng.gen_range(-half..half),
                config.elevation,
                rng.gen_range(-half..half),
            ))
        })
        .collect()
}

/// The decorative cone field as one instanced node.
pub fn mk_cone_field(config: &ConeFieldConfig, device: &wgpu::Device) -> Box<dyn SceneNode> {
    let data = cone(
        config.radius,
        config.height,
        config.radial_segments,
        MaterialData::flat_phong(config.colour),
    );
    let layout = material_layout(device);
    let model = model::Model {
        meshes: vec![upload_mesh(device, &data, 0)],
        materials: vec![upload_material(device, &layout, &data.material)],
    };
    let instances = cone_field_instances(config, &mut rand::thread_rng());
    let mut node = ModelNode::from_model(instances.len(), device, model, None);
    for (idx, instance) in instances.into_iter().enumerate() {
        node.set_local_transform(idx, instance);
    }
    Box::new(node)
}

pub fn upload_mesh(device: &wgpu::Device, data: &MeshData, material: usize) -> model::Mesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Vertex Buffer", data.name)),
        contents: bytemuck::cast_slice(&data.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Index Buffer", data.name)),
        contents: bytemuck::cast_slice(&data.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    model::Mesh {
        name: data.name.clone(),
        vertex_buffer,
        index_buffer,
        num_elements: data.indices.len() as u32,
        material,
        cast_shadow: data.cast_shadow,
        receive_shadow: data.receive_shadow,
    }
}

/// Uploads a decoded asset and rebuilds its node hierarchy as a scene graph.
///
/// Every node gets exactly one instance. The returned root is a container
/// holding the asset's root nodes.
pub fn upload_asset(asset: &ModelAsset, device: &wgpu::Device) -> Box<dyn SceneNode> {
    let layout = material_layout(device);
    let mut root = ContainerNode::new(1, None);
    for node in asset.roots() {
        root.add_child(upload_node(asset, node, device, &layout));
    }
    Box::new(root)
}

fn upload_node(
    asset: &ModelAsset,
    idx: usize,
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
) -> Box<dyn SceneNode> {
    let data = &asset.nodes[idx];
    let mut scene_node: Box<dyn SceneNode> = if data.meshes.is_empty() {
        Box::new(ContainerNode::new(1, Some(idx)))
    } else {
        // Each mesh gets its own material slot, so nothing is shared between nodes.
        let (meshes, materials) = data
            .meshes
            .iter()
            .filter_map(|&mesh| asset.meshes.get(mesh))
            .enumerate()
            .map(|(slot, mesh)| {
                (
                    upload_mesh(device, mesh, slot),
                    upload_material(device, layout, &mesh.material),
                )
            })
            .unzip();
        let model = model::Model { meshes, materials };
        Box::new(ModelNode::from_model(1, device, model, Some(idx)))
    };
    scene_node.set_local_transform(0, data.local);
    for child in asset.children_of(idx) {
        scene_node.add_child(upload_node(asset, child, device, layout));
    }
    scene_node
}
