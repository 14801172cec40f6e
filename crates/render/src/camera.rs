//! Perspective camera with cached view/projection matrices and unprojection.
//!
//! Mutating the camera marks it pending. [`Camera::update`] recomputes the
//! matrices and marks it current; until then the cached matrices are not
//! handed out.

use arena_math::{Mat3, Mat4, Vec3, Vec4, radians};

use crate::error::CameraError;

/// Scene rotation in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

/// A matrix and its transposed, GPU-ready copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixPair {
    pub value: Mat4,
    pub device: Mat4,
}

impl MatrixPair {
    fn new(value: Mat4) -> Self {
        Self {
            value,
            device: value.transpose(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub look_at: MatrixPair,
    pub projection: MatrixPair,
    /// `projection * look_at`.
    pub scene: MatrixPair,
}

/// Unnormalized pick ray through a screen pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub x: f32,
    pub y: f32,
    pub origin: Vec3,
    pub direction: Vec3,
    /// Near-plane point before the perspective divide.
    pub near: Vec4,
    /// Far-plane point before the perspective divide.
    pub far: Vec4,
}

/// Construction parameters. `forward` and `up` need not be normalized, but
/// must be non-zero and not parallel; otherwise the view matrix is NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraDesc {
    pub eye: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical half field-of-view in radians.
    pub half_fov: f32,
    pub near: f32,
    pub far: f32,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 10.0),
            forward: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            half_fov: radians(25.0),
            near: 0.1,
            far: 1000.0,
            screen_width: 1,
            screen_height: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Current,
}

/// A vector and the value it had at construction.
#[derive(Debug, Clone, Copy)]
struct Tracked {
    value: Vec3,
    default: Vec3,
}

impl Tracked {
    fn new(value: Vec3) -> Self {
        Self {
            value,
            default: value,
        }
    }

    fn reset(&mut self) {
        self.value = self.default;
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    eye: Tracked,
    forward: Tracked,
    up: Tracked,
    orientation: Orientation,
    half_fov: f32,
    near: f32,
    far: f32,
    screen_width: f32,
    screen_height: f32,
    matrices: CameraMatrices,
    state: State,
}

impl Camera {
    /// Builds the camera and computes its matrices, so it starts current.
    pub fn new(desc: CameraDesc) -> Self {
        let identity = MatrixPair::new(Mat4::IDENTITY);
        let mut camera = Self {
            eye: Tracked::new(desc.eye),
            forward: Tracked::new(desc.forward),
            up: Tracked::new(desc.up),
            orientation: Orientation::default(),
            half_fov: desc.half_fov,
            near: desc.near,
            far: desc.far,
            screen_width: desc.screen_width.max(1) as f32,
            screen_height: desc.screen_height.max(1) as f32,
            matrices: CameraMatrices {
                look_at: identity,
                projection: identity,
                scene: identity,
            },
            state: State::Pending,
        };
        camera.update();
        camera
    }

    pub fn set_position(&mut self, eye: Vec3) {
        self.eye.value = eye;
        self.invalidate();
    }

    pub fn set_x_position(&mut self, x: f32) {
        self.eye.value[0] = x;
        self.invalidate();
    }

    pub fn set_y_position(&mut self, y: f32) {
        self.eye.value[1] = y;
        self.invalidate();
    }

    pub fn set_z_position(&mut self, z: f32) {
        self.eye.value[2] = z;
        self.invalidate();
    }

    /// Restores the construction-time eye.
    pub fn reset_position(&mut self) {
        self.eye.reset();
        self.invalidate();
    }

    /// Restores the construction-time forward and up, and zeroes the orientation.
    pub fn reset_rotation(&mut self) {
        self.forward.reset();
        self.up.reset();
        self.orientation = Orientation::default();
        self.invalidate();
    }

    /// Zero dimensions are clamped to one pixel.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.screen_width = width.max(1) as f32;
        self.screen_height = height.max(1) as f32;
        self.invalidate();
    }

    /// Sets pitch, yaw and roll from the x, y and z components.
    pub fn set_scene_rotation(&mut self, rotation: Vec3) {
        self.orientation = Orientation {
            pitch: rotation.x(),
            yaw: rotation.y(),
            roll: rotation.z(),
        };
        self.invalidate();
    }

    pub fn set_scene_pitch(&mut self, pitch: f32) {
        self.orientation.pitch = pitch;
        self.invalidate();
    }

    pub fn set_scene_yaw(&mut self, yaw: f32) {
        self.orientation.yaw = yaw;
        self.invalidate();
    }

    pub fn set_scene_roll(&mut self, roll: f32) {
        self.orientation.roll = roll;
        self.invalidate();
    }

    pub fn set_half_fov(&mut self, half_fov: f32) {
        self.half_fov = half_fov;
        self.invalidate();
    }

    /// Recomputes look-at, projection and scene matrices.
    pub fn update(&mut self) -> &CameraMatrices {
        let look_at = self.look_at();
        let projection = Mat4::perspective_rh(
            self.half_fov,
            self.screen_width / self.screen_height,
            self.near,
            self.far,
        );
        self.matrices = CameraMatrices {
            look_at: MatrixPair::new(look_at),
            projection: MatrixPair::new(projection),
            scene: MatrixPair::new(projection * look_at),
        };
        self.state = State::Current;
        tracing::trace!(eye = ?self.eye.value.to_array(), "camera updated");
        &self.matrices
    }

    /// Cached matrices, or `None` if the camera moved since the last update.
    pub fn matrices(&self) -> Option<&CameraMatrices> {
        match self.state {
            State::Current => Some(&self.matrices),
            State::Pending => None,
        }
    }

    pub fn is_current(&self) -> bool {
        self.state == State::Current
    }

    /// Ray through pixel `(x, y)` using the cached matrices.
    pub fn unproject(&self, x: f32, y: f32) -> Result<Ray, CameraError> {
        let matrices = self.matrices().ok_or(CameraError::Stale)?;
        self.unproject_with(x, y, &matrices.look_at.value, &matrices.projection.value)
    }

    /// Ray through pixel `(x, y)` using caller-supplied row-major matrices.
    pub fn unproject_with(
        &self,
        x: f32,
        y: f32,
        look_at: &Mat4,
        projection: &Mat4,
    ) -> Result<Ray, CameraError> {
        let inverse = (*projection * *look_at)
            .inverse()
            .ok_or(CameraError::Singular)?;
        let ndc_x = 2.0 * x / self.screen_width - 1.0;
        let ndc_y = 1.0 - 2.0 * y / self.screen_height;

        let near = inverse * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = inverse * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let direction = far.xyz() / far.w() - near.xyz() / near.w();

        Ok(Ray {
            x,
            y,
            origin: self.eye.value,
            direction,
            near,
            far,
        })
    }

    pub fn screen_width(&self) -> f32 {
        self.screen_width
    }

    pub fn screen_height(&self) -> f32 {
        self.screen_height
    }

    pub fn position(&self) -> Vec3 {
        self.eye.value
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn invalidate(&mut self) {
        self.state = State::Pending;
    }

    fn look_at(&self) -> Mat4 {
        let Orientation { pitch, yaw, roll } = self.orientation;
        let up = self.up.value.normalize();

        let yawed = Mat3::from_axis_angle(up, yaw) * self.forward.value.normalize();
        let right = yawed.cross(&up).normalize();
        let forward = Mat3::from_axis_angle(right, pitch) * yawed;
        let up = Mat3::from_axis_angle(forward, roll) * right.cross(&forward);

        let eye = self.eye.value;
        Mat4::look_at_rh(eye, eye + forward, up)
    }
}
