//! The depth buffer.
//!
//! The viewer shades with flat Phong colours and samples no textures, so the
//! only texture it owns is the depth attachment. It follows the surface size.

#[derive(Debug)]
pub struct DepthTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// A depth attachment of `width` × `height`; zero sizes are clamped to one.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Replaces the attachment with one of the new size, releasing the old one.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.texture.destroy();
        *self = Self::new(device, width, height);
    }
}
