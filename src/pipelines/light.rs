use wgpu::util::DeviceExt;

use crate::config::{hex_to_linear, DirectionalLight, ViewerConfig};

/// Scene lighting and fog, bound at group 2 of the Phong pipeline.
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

// Uniforms require 16 byte (4 float) spacing, hence the padding fields.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub key_direction: [f32; 3],
    _padding: u32,
    pub key_colour: [f32; 3],
    _padding2: u32,
    pub fill_direction: [f32; 3],
    _padding3: u32,
    pub fill_colour: [f32; 3],
    _padding4: u32,
    pub ambient: [f32; 3],
    pub fog_density: f32,
    pub fog_colour: [f32; 3],
    _padding5: u32,
}

/// Linear radiance of a light. Lambert's 1/π is folded in here so the
/// shader can stay a plain Phong sum.
fn radiance(colour: u32, intensity: f32) -> [f32; 3] {
    hex_to_linear(colour).map(|c| c * intensity / std::f32::consts::PI)
}

fn direction(light: &DirectionalLight) -> [f32; 3] {
    use cgmath::InnerSpace;
    let position = cgmath::Vector3::from(light.position);
    if position.magnitude2() == 0.0 {
        [0.0, 1.0, 0.0]
    } else {
        position.normalize().into()
    }
}

impl LightUniform {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            key_direction: direction(&config.key_light),
            _padding: 0,
            key_colour: radiance(config.key_light.colour, config.key_light.intensity),
            _padding2: 0,
            fill_direction: direction(&config.fill_light),
            _padding3: 0,
            fill_colour: radiance(config.fill_light.colour, config.fill_light.intensity),
            _padding4: 0,
            ambient: radiance(config.ambient, 1.0),
            fog_density: config.fog_density,
            fog_colour: hex_to_linear(config.fog_colour),
            _padding5: 0,
        }
    }
}

impl LightResources {
    pub fn new(uniform: LightUniform, device: &wgpu::Device) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}
