//! Instance transforms for the arena's static geometry.
//!
//! The arena lies in the z = 0 plane. Every matrix returned here is already
//! device-ready (transposed), so it can go straight into a drawable.

use arena_math::{Mat4, Mat4Builder, Vec3};

/// Thickness of the cage wall, in tiles.
pub const WALL_THICKNESS: i32 = 2;
/// Side length of one wall block.
pub const WALL_BLOCK: i32 = 3;

fn tile(x: f32, y: f32) -> Mat4 {
    Mat4::translation(Vec3::new(x, y, 0.0)).transpose()
}

/// Grid tiles on a unit lattice, centred on half-integer coordinates.
///
/// Produces `ceil(w/2) * ceil(l/2) * 4` tiles covering `[-ceil(w/2), ceil(w/2))`
/// by `[-ceil(l/2), ceil(l/2))`.
pub fn build_grid(width: u32, length: u32) -> Vec<Mat4> {
    let xs = width.div_ceil(2) as i32;
    let ys = length.div_ceil(2) as i32;
    let mut grid = Vec::with_capacity(xs as usize * ys as usize * 4);
    for i in -xs..xs {
        for j in -ys..ys {
            grid.push(tile(i as f32 + 0.5, j as f32 + 0.5));
        }
    }
    grid
}

/// 3x3 wall blocks along the four sides of a `width` x `length` cage, one
/// unit towards the camera (z = -1).
pub fn build_wall(width: u32, length: u32) -> Vec<Mat4> {
    let (w, l) = (width as i32, length as i32);
    let block = |x: i32, y: i32| {
        Mat4Builder::default()
            .translate(Vec3::new(x as f32, y as f32, -1.0))
            .scale(Vec3::new(WALL_BLOCK as f32, WALL_BLOCK as f32, 1.0))
            .build()
            .transpose()
    };

    let along_length = 1 - l / 2 / WALL_BLOCK..l / 2 / WALL_BLOCK;
    let along_width = 1 - w / 2 / WALL_BLOCK..w / 2 / WALL_BLOCK;

    let mut wall = Vec::new();
    wall.extend(along_length.clone().map(|i| block(w / 2 - 1, i * WALL_BLOCK)));
    wall.extend(along_length.map(|i| block(1 - w / 2, i * WALL_BLOCK)));
    wall.extend(along_width.clone().map(|i| block(i * WALL_BLOCK, l / 2 - 1)));
    wall.extend(along_width.map(|i| block(i * WALL_BLOCK, 1 - l / 2)));
    wall
}

/// Dry grass covering the grid outside the cage: the full-width bands above
/// and below it and the side strips reaching one tile under the wall.
pub fn dry_grass_tiles(cage_width: u32, cage_length: u32) -> Vec<Mat4> {
    // The grid is twice the cage, so its half-extent equals the cage size.
    let (grid_w, grid_l) = (cage_width as i32, cage_length as i32);
    let (cage_w, cage_l) = (grid_w / 2, grid_l / 2);

    let mut tiles = Vec::new();
    let mut fill = |rows: std::ops::RangeInclusive<i32>, cols: std::ops::RangeInclusive<i32>| {
        for i in rows {
            for j in cols.clone() {
                tiles.push(tile(j as f32, i as f32));
            }
        }
    };

    fill(cage_l..=grid_l, -grid_w..=grid_w);
    fill(-cage_l..=cage_l, -grid_w..=1 - cage_w);
    fill(-cage_l..=cage_l, cage_w - 1..=grid_w);
    fill(-grid_l..=-cage_l, -grid_w..=grid_w);
    tiles
}

/// Fresh grass inside the cage, inset by the wall thickness.
pub fn grass_tiles(cage_width: u32, cage_length: u32) -> Vec<Mat4> {
    let (half_w, half_l) = (cage_width as i32 / 2, cage_length as i32 / 2);
    let mut tiles = Vec::new();
    for i in WALL_THICKNESS - half_l..=half_l - WALL_THICKNESS {
        for j in WALL_THICKNESS - half_w..=half_w - WALL_THICKNESS {
            tiles.push(tile(j as f32, i as f32));
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(device: &Mat4) -> (f32, f32, f32) {
        (device[(3, 0)], device[(3, 1)], device[(3, 2)])
    }

    #[test]
    fn grid_tile_count_and_offsets() {
        let grid = build_grid(60, 60);
        assert_eq!(grid.len(), 3600);
        assert_eq!(position(&grid[0]), (-29.5, -29.5, 0.0));
        assert_eq!(position(grid.last().unwrap()), (29.5, 29.5, 0.0));

        assert_eq!(build_grid(3, 1).len(), 2 * 1 * 4);
    }

    #[test]
    fn wall_has_nine_blocks_per_side() {
        let wall = build_wall(30, 30);
        assert_eq!(wall.len(), 36);
        // West side first, then east, north, south.
        assert_eq!(position(&wall[0]), (14.0, -12.0, -1.0));
        assert_eq!(position(&wall[9]), (-14.0, -12.0, -1.0));
        assert_eq!(position(&wall[18]), (-12.0, 14.0, -1.0));
        assert_eq!(position(&wall[35]), (12.0, -14.0, -1.0));
        assert_eq!(wall[0][(0, 0)], 3.0);
        assert_eq!(wall[0][(1, 1)], 3.0);
        assert_eq!(wall[0][(2, 2)], 1.0);
    }

    #[test]
    fn grass_is_inset_by_wall() {
        let grass = grass_tiles(30, 30);
        assert_eq!(grass.len(), 27 * 27);
        assert_eq!(position(&grass[0]), (-13.0, -13.0, 0.0));
        assert!(grass.iter().all(|m| m[(3, 0)].abs() <= 13.0 && m[(3, 1)].abs() <= 13.0));
    }

    #[test]
    fn dry_grass_surrounds_cage() {
        let dry = dry_grass_tiles(30, 30);
        // Two 16x61 bands plus two 31x17 strips.
        assert_eq!(dry.len(), 2 * 16 * 61 + 2 * 31 * 17);
        assert!(dry.len() <= 60 * 60);
        assert!(dry.iter().all(|m| {
            let (x, y, _) = position(m);
            x.abs() >= 14.0 || y.abs() >= 15.0
        }));
    }
}
