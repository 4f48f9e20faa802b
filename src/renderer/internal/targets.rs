use crate::renderer::device::{CubeFace, TargetDescriptor, TargetKind};

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub(crate) const CAPTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub(crate) struct DepthTexture {
    _texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

impl DepthTexture {
    pub(crate) fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        sampled: bool,
    ) -> Self {
        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        if sampled {
            usage |= wgpu::TextureUsages::TEXTURE_BINDING;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label}View")),
            ..Default::default()
        });

        Self {
            _texture: texture,
            view,
        }
    }
}

/// Colour cube with one render view per face and a depth buffer shared by
/// all faces.
pub(crate) struct CubeTexture {
    _texture: wgpu::Texture,
    pub(crate) cube_view: wgpu::TextureView,
    face_views: Vec<wgpu::TextureView>,
    pub(crate) depth: DepthTexture,
}

impl CubeTexture {
    fn new(device: &wgpu::Device, label: &str, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CAPTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let cube_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label}CubeView")),
            format: Some(CAPTURE_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: 0,
            mip_level_count: None,
            base_array_layer: 0,
            array_layer_count: Some(6),
            ..Default::default()
        });

        let face_views = CubeFace::ALL
            .iter()
            .map(|face| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("{label}Face{:?}", face)),
                    format: Some(CAPTURE_FORMAT),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    aspect: wgpu::TextureAspect::All,
                    base_mip_level: 0,
                    mip_level_count: None,
                    base_array_layer: face.layer(),
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let depth = DepthTexture::new(device, &format!("{label}Depth"), size, size, false);

        Self {
            _texture: texture,
            cube_view,
            face_views,
            depth,
        }
    }

    pub(crate) fn face_view(&self, face: CubeFace) -> &wgpu::TextureView {
        &self.face_views[face.layer() as usize]
    }
}

pub(crate) enum GpuTarget {
    Depth(DepthTexture),
    Cube(CubeTexture),
}

impl GpuTarget {
    pub(crate) fn new(device: &wgpu::Device, descriptor: &TargetDescriptor) -> Self {
        match descriptor.kind {
            TargetKind::Depth => GpuTarget::Depth(DepthTexture::new(
                device,
                &descriptor.label,
                descriptor.size,
                descriptor.size,
                true,
            )),
            TargetKind::ColorCube => GpuTarget::Cube(CubeTexture::new(
                device,
                &descriptor.label,
                descriptor.size,
            )),
        }
    }
}
