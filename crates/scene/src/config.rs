use std::path::{Path, PathBuf};

use arena_math::{Vec3, radians};
use arena_render::{CameraDesc, INSTANCE_STRIDE};
use serde::{Deserialize, Serialize};

/// Errors from loading or validating an [`ArenaConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Largest instance buffer the arena will request, matching wgpu's default
/// `max_buffer_size` (256 MiB).
pub const MAX_INSTANCE_BUFFER_BYTES: u64 = 256 << 20;

/// Scene configuration. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Cage width in tiles; odd values are rounded up.
    pub width: u32,
    /// Cage length in tiles; odd values are rounded up.
    pub length: u32,
    pub camera: CameraConfig,
    pub ball: BallConfig,
    pub grid: GridConfig,
    /// Clear color, RGBA.
    pub background: [f32; 4],
    pub textures: TexturePaths,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 30,
            length: 30,
            camera: CameraConfig::default(),
            ball: BallConfig::default(),
            grid: GridConfig::default(),
            background: [0.1, 0.1, 0.15, 1.0],
            textures: TexturePaths::default(),
        }
    }
}

impl ArenaConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 2 || self.length < 2 {
            return Err(ConfigError::Invalid(format!(
                "arena must be at least 2x2, got {}x{}",
                self.width, self.length
            )));
        }
        // The grid is the largest drawable: twice the cage in each direction.
        let grid_tiles = u64::from(self.cage_width())
            .saturating_mul(u64::from(self.cage_length()))
            .saturating_mul(4);
        if grid_tiles.saturating_mul(INSTANCE_STRIDE) > MAX_INSTANCE_BUFFER_BYTES {
            return Err(ConfigError::Invalid(format!(
                "arena {}x{} needs {grid_tiles} grid tiles, more than fit in {} bytes",
                self.width, self.length, MAX_INSTANCE_BUFFER_BYTES
            )));
        }
        if self.ball.skin >= crate::BALL_SKINS {
            return Err(ConfigError::Invalid(format!(
                "ball skin {} out of range (0..{})",
                self.ball.skin,
                crate::BALL_SKINS
            )));
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return Err(ConfigError::Invalid(format!(
                "camera planes must satisfy 0 < near < far, got near={} far={}",
                self.camera.near, self.camera.far
            )));
        }
        self.camera.validate()
    }

    pub fn cage_width(&self) -> u32 {
        self.width.saturating_add(self.width % 2)
    }

    pub fn cage_length(&self) -> u32 {
        self.length.saturating_add(self.length % 2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub forward: [f32; 3],
    pub up: [f32; 3],
    pub half_fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, -40.0],
            forward: [0.0, 0.0, 1.0],
            up: [0.0, -1.0, 0.0],
            half_fov_degrees: 25.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    /// `forward` and `up` must be non-zero and not parallel, or the look-at
    /// basis degenerates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let forward = Vec3::from(self.forward);
        let up = Vec3::from(self.up);
        if forward.length() < 1e-6 || up.length() < 1e-6 {
            return Err(ConfigError::Invalid(format!(
                "camera forward {:?} and up {:?} must be non-zero",
                self.forward, self.up
            )));
        }
        if forward.normalize().cross(&up.normalize()).length() < 1e-4 {
            return Err(ConfigError::Invalid(format!(
                "camera forward {:?} is parallel to up {:?}",
                self.forward, self.up
            )));
        }
        Ok(())
    }

    pub fn to_desc(&self, screen_width: u32, screen_height: u32) -> CameraDesc {
        CameraDesc {
            eye: Vec3::from(self.eye),
            forward: Vec3::from(self.forward),
            up: Vec3::from(self.up),
            half_fov: radians(self.half_fov_degrees),
            near: self.near,
            far: self.far,
            screen_width,
            screen_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Distance per tick along each axis.
    pub speed: [f32; 3],
    /// Sign of motion per axis; flipped on bounce.
    pub direction: [f32; 3],
    /// Spin per axis, multiplied by the elapsed time in centiseconds (as degrees).
    pub turn_rate: [f32; 3],
    pub skin: usize,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            speed: [0.1, 0.1, 0.0],
            direction: [1.0, 1.0, 0.0],
            turn_rate: [1.0, 0.5, 0.25],
            skin: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub enabled: bool,
    pub color: [f32; 4],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: [0.35, 0.35, 0.35, 1.0],
        }
    }
}

/// Optional PNG files that replace the built-in textures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TexturePaths {
    pub brick: Option<PathBuf>,
    pub grass: Option<PathBuf>,
    pub dry_grass: Option<PathBuf>,
    pub faces: [Option<PathBuf>; 3],
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_render::Camera;

    #[test]
    fn odd_dimensions_round_up() {
        let config = ArenaConfig {
            width: 31,
            length: 30,
            ..Default::default()
        };
        assert_eq!(config.cage_width(), 32);
        assert_eq!(config.cage_length(), 30);
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut config = ArenaConfig::default();
        config.ball.skin = 2;
        config.grid.enabled = false;
        config.save(tmp.path()).unwrap();

        let loaded = ArenaConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: ArenaConfig =
            serde_json::from_str(r#"{ "width": 20, "ball": { "skin": 1 } }"#).unwrap();
        assert_eq!(config.width, 20);
        assert_eq!(config.length, 30);
        assert_eq!(config.ball.skin, 1);
        assert_eq!(config.ball.speed, BallConfig::default().speed);
    }

    #[test]
    fn invalid_skin_rejected_on_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), r#"{ "ball": { "skin": 7 } }"#).unwrap();
        let err = ArenaConfig::load(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "{ width: ").unwrap();
        assert!(matches!(ArenaConfig::load(tmp.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn oversized_cage_rejected() {
        let config = ArenaConfig {
            width: 70_000,
            length: 70_000,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        // 4 * 1024 * 1024 tiles * 64 bytes is exactly the limit.
        let at_limit = ArenaConfig {
            width: 1024,
            length: 1024,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
        let over = ArenaConfig {
            width: 1025,
            ..at_limit
        };
        assert!(matches!(over.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn cage_size_saturates() {
        let config = ArenaConfig {
            width: u32::MAX,
            ..Default::default()
        };
        assert_eq!(config.cage_width(), u32::MAX);
        assert!(config.validate().is_err());
    }

    #[test]
    fn degenerate_camera_basis_rejected() {
        let mut config = ArenaConfig::default();
        config.camera.up = [0.0, 0.0, -3.0];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.camera.up = [0.0, 0.0, 0.0];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.camera.up = [0.0, -1.0, 0.0];
        config.camera.forward = [0.0, 0.0, 0.0];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn default_camera_frames_the_cage() {
        let config = ArenaConfig::default();
        let mut camera = Camera::new(config.camera.to_desc(1280, 720));
        let scene = camera.update().scene.value;
        let (hw, hl) = (config.cage_width() as f32 / 2.0, config.cage_length() as f32 / 2.0);
        for (x, y) in [(-hw, -hl), (-hw, hl), (hw, -hl), (hw, hl)] {
            let ndc = scene.transform_point(Vec3::new(x, y, 0.0));
            assert!(ndc.x().abs() <= 1.0 && ndc.y().abs() <= 1.0, "{x},{y} -> {ndc:?}");
            assert!((0.0..=1.0).contains(&ndc.z()));
        }
    }

    #[test]
    fn camera_desc_converts_degrees() {
        let desc = CameraConfig::default().to_desc(800, 600);
        assert!((desc.half_fov - 25f32.to_radians()).abs() < 1e-6);
        assert_eq!(desc.eye, Vec3::new(0.0, 0.0, -40.0));
        assert_eq!((desc.screen_width, desc.screen_height), (800, 600));
    }
}
