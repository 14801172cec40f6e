use arena_math::Mat4;
use arena_render::{DrawContext, Drawable, GpuDevice, InstancedMesh, ProgramKind};

use crate::ball::BallState;
use crate::config::{ArenaConfig, ConfigError};
use crate::textures::ArenaTextures;
use crate::{BALL_SKINS, SceneError, layout};

/// Instance count and capacity of one drawable, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawableStats {
    pub name: &'static str,
    pub instances: u32,
    pub capacity: u32,
}

/// The complete scene: grid, cage wall, grass inside and outside the cage,
/// and the ball in one of three skins.
pub struct Arena<D: GpuDevice> {
    grid: InstancedMesh<D>,
    wall: InstancedMesh<D>,
    grass: InstancedMesh<D>,
    dry_grass: InstancedMesh<D>,
    balls: [InstancedMesh<D>; BALL_SKINS],
    ball: BallState,
    cage_width: u32,
    cage_length: u32,
    show_grid: bool,
}

impl<D: GpuDevice> Arena<D> {
    pub fn new(
        device: &mut D,
        config: &ArenaConfig,
        textures: &ArenaTextures<D::Texture>,
    ) -> Result<Self, SceneError> {
        let _span = tracing::info_span!("arena_setup").entered();
        config.validate()?;

        let (cage_width, cage_length) = (config.cage_width(), config.cage_length());
        let too_large =
            || ConfigError::Invalid(format!("arena {cage_width}x{cage_length} is too large"));
        let grid_width = cage_width.checked_mul(2).ok_or_else(too_large)?;
        let grid_length = cage_length.checked_mul(2).ok_or_else(too_large)?;
        let grid_tiles = grid_width.checked_mul(grid_length).ok_or_else(too_large)?;
        let cage_tiles = cage_width.checked_mul(cage_length).ok_or_else(too_large)?;

        let mut grid = InstancedMesh::grid_square(device, grid_tiles);
        grid.reset(device, &layout::build_grid(grid_width, grid_length))?;

        let brick = [textures.brick.clone(), textures.brick.clone()];
        let mut wall = InstancedMesh::cube(device, &brick, cage_tiles)?;
        wall.reset(device, &layout::build_wall(cage_width, cage_length))?;

        let grass_pair = [textures.grass.clone(), textures.grass.clone()];
        let mut grass = InstancedMesh::square(device, &grass_pair, cage_tiles)?;
        grass.extend(device, &layout::grass_tiles(cage_width, cage_length))?;

        let dry_pair = [textures.dry_grass.clone(), textures.dry_grass.clone()];
        let mut dry_grass = InstancedMesh::square(device, &dry_pair, grid_tiles)?;
        dry_grass.extend(device, &layout::dry_grass_tiles(cage_width, cage_length))?;

        let [b0, b1, b2] = [0, 1, 2].map(|skin| {
            let skin_textures = [textures.brick.clone(), textures.faces[skin].clone()];
            InstancedMesh::cube(device, &skin_textures, 1)
        });
        let mut balls = [b0?, b1?, b2?];
        for ball in balls.iter_mut() {
            ball.push(device, &Mat4::IDENTITY)?;
        }

        let arena = Self {
            grid,
            wall,
            grass,
            dry_grass,
            balls,
            ball: BallState::new(&config.ball),
            cage_width,
            cage_length,
            show_grid: config.grid.enabled,
        };
        for stats in arena.stats() {
            tracing::debug!(
                drawable = stats.name,
                instances = stats.instances,
                capacity = stats.capacity,
                "arena drawable ready"
            );
        }
        Ok(arena)
    }

    /// Moves the ball one step and uploads its transform.
    pub fn tick(&mut self, device: &mut D, elapsed_ms: f32) -> Result<(), SceneError> {
        let model = self
            .ball
            .tick(self.cage_width as f32, self.cage_length as f32, elapsed_ms);
        self.balls[self.ball.skin].modify(device, &model, 0)?;
        Ok(())
    }

    /// Draws the grid with the flat-color program, then everything else with
    /// the textured program. Scene uniforms must already be set.
    pub fn draw(&self, ctx: &mut dyn DrawContext<D>) {
        if self.show_grid {
            ctx.use_program(ProgramKind::FlatColor);
            self.grid.draw(ctx);
        }
        ctx.use_program(ProgramKind::Textured);
        self.wall.draw(ctx);
        self.grass.draw(ctx);
        self.dry_grass.draw(ctx);
        self.balls[self.ball.skin].draw(ctx);
    }

    pub fn skin(&self) -> usize {
        self.ball.skin
    }

    /// Selects the ball skin. Out-of-range values are ignored.
    pub fn set_skin(&mut self, skin: usize) {
        if skin < BALL_SKINS {
            self.ball.skin = skin;
        }
    }

    pub fn grid_visible(&self) -> bool {
        self.show_grid
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.show_grid = visible;
    }

    pub fn ball(&self) -> &BallState {
        &self.ball
    }

    pub fn cage_size(&self) -> (u32, u32) {
        (self.cage_width, self.cage_length)
    }

    pub fn stats(&self) -> Vec<DrawableStats> {
        let stat = |name, d: &InstancedMesh<D>| DrawableStats {
            name,
            instances: d.instance_count(),
            capacity: d.capacity(),
        };
        let mut stats = vec![
            stat("grid", &self.grid),
            stat("wall", &self.wall),
            stat("grass", &self.grass),
            stat("dry_grass", &self.dry_grass),
        ];
        for (name, ball) in ["ball_awesome", "ball_shocked", "ball_incredulous"]
            .into_iter()
            .zip(&self.balls)
        {
            stats.push(stat(name, ball));
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_render::{CommandRecorder, DrawCommand, RecordingDevice, TextureId};

    fn textures(device: &mut RecordingDevice) -> ArenaTextures<TextureId> {
        ArenaTextures {
            brick: device.create_texture(),
            grass: device.create_texture(),
            dry_grass: device.create_texture(),
            faces: [
                device.create_texture(),
                device.create_texture(),
                device.create_texture(),
            ],
        }
    }

    fn arena() -> (RecordingDevice, Arena<RecordingDevice>) {
        let mut device = RecordingDevice::new();
        let tex = textures(&mut device);
        let arena = Arena::new(&mut device, &ArenaConfig::default(), &tex).unwrap();
        (device, arena)
    }

    #[test]
    fn default_layout_counts() {
        let (_, arena) = arena();
        let counts: Vec<(&str, u32, u32)> = arena
            .stats()
            .iter()
            .map(|s| (s.name, s.instances, s.capacity))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("grid", 3600, 3600),
                ("wall", 36, 900),
                ("grass", 729, 900),
                ("dry_grass", 3006, 3600),
                ("ball_awesome", 1, 1),
                ("ball_shocked", 1, 1),
                ("ball_incredulous", 1, 1),
            ]
        );
    }

    #[test]
    fn draw_order_and_programs() {
        let (_, arena) = arena();
        let mut ctx = CommandRecorder::new();
        arena.draw(&mut ctx);

        let programs: Vec<_> = ctx
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::UseProgram(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(programs, vec![ProgramKind::FlatColor, ProgramKind::Textured]);

        let draws: Vec<_> = ctx.draw_calls().collect();
        assert_eq!(draws, vec![(6, 3600), (36, 36), (6, 729), (6, 3006), (36, 1)]);
    }

    #[test]
    fn hidden_grid_is_skipped() {
        let (_, mut arena) = arena();
        arena.set_grid_visible(false);
        let mut ctx = CommandRecorder::new();
        arena.draw(&mut ctx);
        assert_eq!(ctx.commands()[0], DrawCommand::UseProgram(ProgramKind::Textured));
        assert_eq!(ctx.draw_calls().count(), 4);
    }

    #[test]
    fn ball_binds_brick_under_its_face() {
        let mut device = RecordingDevice::new();
        let tex = textures(&mut device);
        let mut arena = Arena::new(&mut device, &ArenaConfig::default(), &tex).unwrap();
        arena.set_skin(2);
        arena.set_skin(9);
        assert_eq!(arena.skin(), 2);

        let mut ctx = CommandRecorder::new();
        arena.draw(&mut ctx);
        assert_eq!(ctx.state().texture_units.get(&0), Some(&tex.brick));
        assert_eq!(ctx.state().texture_units.get(&1), Some(&tex.faces[2]));
    }

    #[test]
    fn tick_updates_selected_ball_record() {
        let (mut device, mut arena) = arena();
        arena.tick(&mut device, 0.0).unwrap();
        let expected_x = arena.ball().position()[0];
        assert!(expected_x > 0.0);

        let ball_buffer = device
            .buffers()
            .iter()
            .rposition(|b| b.label == "cube" && b.bytes.len() == 64)
            .map(arena_render::BufferId)
            .unwrap();
        // The last ball buffer belongs to skin 2; skin 0 is selected.
        assert_eq!(device.read_record(ball_buffer, 0), Mat4::IDENTITY);

        let mut ctx = CommandRecorder::new();
        arena.draw(&mut ctx);
        let Some(&(_, instance)) = ctx.state().mesh.as_ref() else {
            panic!("no mesh bound");
        };
        assert_eq!(device.read_record(instance, 0)[(3, 0)], expected_x);
    }

    #[test]
    fn oversized_cage_is_an_error() {
        let mut device = RecordingDevice::new();
        let tex = textures(&mut device);
        let config = ArenaConfig {
            width: 70_000,
            length: 70_000,
            ..Default::default()
        };
        assert!(matches!(
            Arena::new(&mut device, &config, &tex),
            Err(SceneError::Config(ConfigError::Invalid(_)))
        ));
        assert!(device.buffers().is_empty());
    }

    #[test]
    fn invalid_config_rejected() {
        let mut device = RecordingDevice::new();
        let tex = textures(&mut device);
        let config = ArenaConfig {
            width: 1,
            ..Default::default()
        };
        assert!(matches!(
            Arena::new(&mut device, &config, &tex),
            Err(SceneError::Config(_))
        ));
    }
}
