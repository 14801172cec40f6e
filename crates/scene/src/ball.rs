use arena_math::{Mat4, Mat4Builder, Vec3, radians};

use crate::config::BallConfig;

/// The ball reverses along an axis once it comes this close to the cage edge.
pub const HIT_OFFSET: f32 = 3.0;
/// Ball height above the floor plane (towards the camera).
pub const BALL_Z: f32 = -1.0;

/// Position, motion and skin of the bouncing ball.
#[derive(Debug, Clone, PartialEq)]
pub struct BallState {
    pub skin: usize,
    pub direction: Vec3,
    pub speed: Vec3,
    pub turn_rate: Vec3,
    position: Vec3,
}

impl BallState {
    pub fn new(config: &BallConfig) -> Self {
        Self {
            skin: config.skin,
            direction: Vec3::from(config.direction),
            speed: Vec3::from(config.speed),
            turn_rate: Vec3::from(config.turn_rate),
            position: Vec3::new(0.0, 0.0, BALL_Z),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Advances one step inside a `cage_width` x `cage_length` cage and
    /// returns the device-ready model matrix.
    ///
    /// `elapsed_ms` is the total running time; it drives the spin, not the
    /// motion.
    pub fn tick(&mut self, cage_width: f32, cage_length: f32, elapsed_ms: f32) -> Mat4 {
        let x = self.position[0] + self.speed[0] * self.direction[0];
        let y = self.position[1] + self.speed[1] * self.direction[1];
        self.position = Vec3::new(x, y, BALL_Z);

        if x < HIT_OFFSET - cage_width / 2.0 || x > cage_width / 2.0 - HIT_OFFSET {
            self.direction[0] = -self.direction[0];
        }
        if y < HIT_OFFSET - cage_length / 2.0 || y > cage_length / 2.0 - HIT_OFFSET {
            self.direction[1] = -self.direction[1];
        }

        let spin = self.turn_rate * radians(elapsed_ms / 10.0);
        Mat4Builder::default()
            .translate(self.position)
            .rotate_x(spin[0])
            .rotate_y(spin[1])
            .rotate_z(spin[2])
            .build()
            .transpose()
    }
}
