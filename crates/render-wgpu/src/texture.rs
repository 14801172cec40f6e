//! PNG decoding and mipmapped texture upload.

use std::path::Path;
use std::sync::Arc;

use image::{RgbaImage, imageops};

use crate::device::WgpuDevice;

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureOptions {
    /// Flip rows so the first row of the file lands at texcoord v = 0.
    pub flip_vertically: bool,
    /// Keep the source alpha channel. Otherwise alpha is forced opaque.
    pub alpha: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            flip_vertically: true,
            alpha: false,
        }
    }
}

/// Texture, view, sampler and the bind group that exposes them to a shader.
#[derive(Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
}

/// Shared handle; drawables keep clones.
pub type TextureHandle = Arc<GpuTexture>;

/// Decodes an encoded image into RGBA8.
pub fn decode_rgba(bytes: &[u8], options: TextureOptions) -> Result<RgbaImage, TextureError> {
    let mut decoded = image::load_from_memory(bytes)?;
    if options.flip_vertically {
        decoded = decoded.flipv();
    }
    let rgba = if options.alpha {
        decoded.to_rgba8()
    } else {
        image::DynamicImage::ImageRgb8(decoded.to_rgb8()).to_rgba8()
    };
    Ok(rgba)
}

/// Reads and decodes an image file into RGBA8.
pub fn read_rgba(path: &Path, options: TextureOptions) -> Result<RgbaImage, TextureError> {
    let bytes = std::fs::read(path)?;
    decode_rgba(&bytes, options)
}

/// Full mip chain down to 1x1, level 0 first.
pub fn mip_chain(base: &RgbaImage) -> Vec<RgbaImage> {
    let (width, height) = base.dimensions();
    let levels = 32 - width.max(height).max(1).leading_zeros();
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base.clone());
    for level in 1..levels {
        let w = (width >> level).max(1);
        let h = (height >> level).max(1);
        chain.push(imageops::resize(base, w, h, imageops::FilterType::Triangle));
    }
    chain
}

pub fn load_texture_from_memory(
    device: &WgpuDevice,
    bytes: &[u8],
    options: TextureOptions,
    label: &str,
) -> Result<TextureHandle, TextureError> {
    let rgba = decode_rgba(bytes, options)?;
    Ok(upload(device, &rgba, label))
}

pub fn load_texture_from_file(
    device: &WgpuDevice,
    path: &Path,
    options: TextureOptions,
) -> Result<TextureHandle, TextureError> {
    let rgba = read_rgba(path, options)?;
    let label = path.file_stem().and_then(|s| s.to_str()).unwrap_or("texture");
    Ok(upload(device, &rgba, label))
}

fn upload(device: &WgpuDevice, rgba: &RgbaImage, label: &str) -> TextureHandle {
    let chain = mip_chain(rgba);
    let (width, height) = rgba.dimensions();
    tracing::debug!(label, width, height, mips = chain.len(), "uploading texture");

    let texture = device.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: chain.len() as u32,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (level, image) in chain.iter().enumerate() {
        let (w, h) = image.dimensions();
        device.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
    }

    let view = texture.create_view(&Default::default());
    let sampler = device.device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });
    let bind_group = device.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: device.texture_layout(),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    Arc::new(GpuTexture {
        texture,
        view,
        sampler,
        bind_group,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn encode(img: &RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn two_rows() -> RgbaImage {
        RgbaImage::from_fn(2, 2, |_, y| {
            if y == 0 {
                Rgba([255, 0, 0, 100])
            } else {
                Rgba([0, 0, 255, 100])
            }
        })
    }

    #[test]
    fn decode_without_alpha_is_opaque() {
        let png = encode(&two_rows());
        let options = TextureOptions {
            flip_vertically: false,
            alpha: false,
        };
        let rgba = decode_rgba(&png, options).unwrap();
        assert!(rgba.pixels().all(|p| p[3] == 255));
        assert_eq!(rgba.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn decode_keeps_alpha_and_flips() {
        let png = encode(&two_rows());
        let rgba = decode_rgba(
            &png,
            TextureOptions {
                flip_vertically: true,
                alpha: true,
            },
        )
        .unwrap();
        assert_eq!(*rgba.get_pixel(0, 0), Rgba([0, 0, 255, 100]));
        assert_eq!(*rgba.get_pixel(1, 1), Rgba([255, 0, 0, 100]));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_rgba(b"not a png", TextureOptions::default()).unwrap_err();
        assert!(matches!(err, TextureError::Decode(_)));
    }

    #[test]
    fn mip_chain_halves_to_one_pixel() {
        let base = RgbaImage::new(64, 16);
        let chain = mip_chain(&base);
        assert_eq!(chain.len(), 7);
        assert_eq!(chain[1].dimensions(), (32, 8));
        assert_eq!(chain[5].dimensions(), (2, 1));
        assert_eq!(chain[6].dimensions(), (1, 1));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.png");
        let err = read_rgba(&missing, TextureOptions::default()).unwrap_err();
        assert!(matches!(err, TextureError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn reads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.png");
        std::fs::write(&path, encode(&two_rows())).unwrap();

        let options = TextureOptions {
            flip_vertically: true,
            alpha: true,
        };
        let rgba = read_rgba(&path, options).unwrap();
        assert_eq!(rgba.dimensions(), (2, 2));
        assert_eq!(*rgba.get_pixel(0, 0), Rgba([0, 0, 255, 100]));
    }

    #[test]
    fn corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"\x89PNG but not really").unwrap();
        let err = read_rgba(&path, TextureOptions::default()).unwrap_err();
        assert!(matches!(err, TextureError::Decode(_)));
    }
}
