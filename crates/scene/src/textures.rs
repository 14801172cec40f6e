//! Built-in textures, generated procedurally and encoded as PNG so they go
//! through the same decode path as files on disk.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::SceneError;
use crate::config::TexturePaths;

const SIZE: u32 = 64;

/// Encoded image plus how it should be decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSource {
    pub name: String,
    pub png: Vec<u8>,
    /// Keep the alpha channel (overlays); otherwise decode as opaque.
    pub alpha: bool,
}

/// Every texture the arena binds.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSources {
    pub brick: TextureSource,
    pub grass: TextureSource,
    pub dry_grass: TextureSource,
    pub faces: [TextureSource; 3],
}

/// The same set of textures, uploaded to some backend.
#[derive(Debug, Clone)]
pub struct ArenaTextures<T> {
    pub brick: T,
    pub grass: T,
    pub dry_grass: T,
    pub faces: [T; 3],
}

impl TextureSources {
    /// Built-in textures, with any configured file taking precedence.
    pub fn load(paths: &TexturePaths) -> Result<Self, SceneError> {
        let [f0, f1, f2] = &paths.faces;
        Ok(Self {
            brick: source("brick", paths.brick.as_deref(), false, brick)?,
            grass: source("grass", paths.grass.as_deref(), false, || {
                speckled([34, 92, 30], 0x9e37)
            })?,
            dry_grass: source("dry_grass", paths.dry_grass.as_deref(), false, || {
                speckled([168, 150, 82], 0x5bd1)
            })?,
            faces: [
                source("awesome_face", f0.as_deref(), true, || face(Mouth::Smile))?,
                source("shocked_face", f1.as_deref(), true, || face(Mouth::Open))?,
                source("incredulous_face", f2.as_deref(), true, || face(Mouth::Flat))?,
            ],
        })
    }

    pub fn builtin() -> Result<Self, SceneError> {
        Self::load(&TexturePaths::default())
    }

    /// Converts every source with `upload`, sharing nothing between calls.
    pub fn upload<T, E>(
        &self,
        mut upload: impl FnMut(&TextureSource) -> Result<T, E>,
    ) -> Result<ArenaTextures<T>, E> {
        let [f0, f1, f2] = &self.faces;
        Ok(ArenaTextures {
            brick: upload(&self.brick)?,
            grass: upload(&self.grass)?,
            dry_grass: upload(&self.dry_grass)?,
            faces: [upload(f0)?, upload(f1)?, upload(f2)?],
        })
    }
}

fn source(
    name: &str,
    path: Option<&Path>,
    alpha: bool,
    generate: impl FnOnce() -> RgbaImage,
) -> Result<TextureSource, SceneError> {
    let png = match path {
        Some(path) => {
            tracing::debug!(name, path = %path.display(), "loading texture file");
            std::fs::read(path)?
        }
        None => encode(&generate())?,
    };
    Ok(TextureSource {
        name: name.to_string(),
        png,
        alpha,
    })
}

fn encode(image: &RgbaImage) -> Result<Vec<u8>, SceneError> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Cheap integer hash for per-pixel variation.
fn noise(x: u32, y: u32, seed: u32) -> u8 {
    let mut h = x.wrapping_mul(374_761_393) ^ y.wrapping_mul(668_265_263) ^ seed;
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    (h ^ (h >> 16)) as u8
}

fn shade(base: [u8; 3], n: u8, spread: i32) -> Rgba<u8> {
    let delta = (n as i32 - 128) * spread / 128;
    let c = |v: u8| (v as i32 + delta).clamp(0, 255) as u8;
    Rgba([c(base[0]), c(base[1]), c(base[2]), 255])
}

fn brick() -> RgbaImage {
    const ROW: u32 = 16;
    const COURSE: u32 = 32;
    RgbaImage::from_fn(SIZE, SIZE, |x, y| {
        let row = y / ROW;
        let offset = if row % 2 == 0 { 0 } else { COURSE / 2 };
        let col = (x + offset) / COURSE;
        let mortar = y % ROW < 2 || (x + offset) % COURSE < 2;
        if mortar {
            shade([190, 185, 170], noise(x, y, 7), 12)
        } else {
            let tint = noise(col, row, 3) as i32 / 8;
            shade(
                [(150 + tint) as u8, 58, 40],
                noise(x, y, 11),
                18,
            )
        }
    })
}

fn speckled(base: [u8; 3], seed: u32) -> RgbaImage {
    RgbaImage::from_fn(SIZE, SIZE, |x, y| shade(base, noise(x, y, seed), 28))
}

#[derive(Debug, Clone, Copy)]
enum Mouth {
    Smile,
    Open,
    Flat,
}

fn face(mouth: Mouth) -> RgbaImage {
    let centre = SIZE as f32 / 2.0;
    let radius = centre - 4.0;
    let ink = Rgba([40, 30, 20, 255]);
    RgbaImage::from_fn(SIZE, SIZE, |px, py| {
        let (x, y) = (px as f32 + 0.5 - centre, py as f32 + 0.5 - centre);
        let r = (x * x + y * y).sqrt();
        if r > radius {
            return Rgba([0, 0, 0, 0]);
        }
        if r > radius - 2.0 {
            return ink;
        }

        // Rows grow downwards; eyes sit above the centre.
        let eye = |ex: f32| ((x - ex).powi(2) + (y + 8.0).powi(2)).sqrt() < 4.0;
        let on_mouth = match mouth {
            Mouth::Smile => y > 4.0 && (r - 16.0).abs() < 2.0,
            Mouth::Open => (x * x + (y - 12.0).powi(2)).sqrt() < 6.0,
            Mouth::Flat => (y - 12.0).abs() < 1.5 && x.abs() < 12.0,
        };
        if eye(-10.0) || eye(10.0) || on_mouth {
            ink
        } else {
            Rgba([250, 210, 60, 255])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(source: &TextureSource) -> RgbaImage {
        image::load_from_memory(&source.png).unwrap().to_rgba8()
    }

    #[test]
    fn builtin_textures_decode() {
        let sources = TextureSources::builtin().unwrap();
        for s in [&sources.brick, &sources.grass, &sources.dry_grass] {
            let img = decode(s);
            assert_eq!(img.dimensions(), (SIZE, SIZE));
            assert!(!s.alpha);
            assert!(img.pixels().all(|p| p[3] == 255));
        }
        assert!(sources.faces.iter().all(|f| f.alpha));
    }

    #[test]
    fn faces_have_transparent_corners() {
        let sources = TextureSources::builtin().unwrap();
        for f in &sources.faces {
            let img = decode(f);
            assert_eq!(img.get_pixel(0, 0)[3], 0);
            assert_eq!(img.get_pixel(SIZE / 2, SIZE / 2)[3], 255);
        }
        assert_ne!(sources.faces[0].png, sources.faces[1].png);
    }

    #[test]
    fn configured_path_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brick.png");
        let custom = encode(&RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]))).unwrap();
        std::fs::write(&path, &custom).unwrap();

        let paths = TexturePaths {
            brick: Some(path),
            ..Default::default()
        };
        let sources = TextureSources::load(&paths).unwrap();
        assert_eq!(sources.brick.png, custom);
    }

    #[test]
    fn missing_override_is_io_error() {
        let paths = TexturePaths {
            grass: Some("/nonexistent/grass.png".into()),
            ..Default::default()
        };
        assert!(matches!(TextureSources::load(&paths), Err(SceneError::Io(_))));
    }

    #[test]
    fn upload_maps_every_texture() {
        let sources = TextureSources::builtin().unwrap();
        let mut names = Vec::new();
        let uploaded = sources
            .upload(|s| {
                names.push(s.name.clone());
                Ok::<_, ()>(names.len())
            })
            .unwrap();
        assert_eq!(uploaded.brick, 1);
        assert_eq!(uploaded.faces, [4, 5, 6]);
        assert_eq!(names[1], "grass");
    }
}
