//! The periodic cube field.
//!
//! Ten cubes sit inside one cell of side `world_size`. The cell is repeated on
//! a `(2n + 1)^3` lattice around the origin so the field looks endless, and the
//! camera itself wraps around the cell (see [`World::wrap`]) so it can never
//! fly off the edge of the lattice.

use glam::{Mat4, Vec3};

/// Cube centres inside the origin cell.
pub const CUBE_POSITIONS: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 5.0, -10.0),
    Vec3::new(-4.5, -2.2, -2.5),
    Vec3::new(-5.8, -6.0, -8.3),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, 7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(7.5, 7.0, -5.5),
    Vec3::new(3.5, 0.2, -1.5),
    Vec3::new(-1.3, 4.0, 4.5),
];

/// Every cube spins about this (unnormalised) axis.
pub const SPIN_AXIS: Vec3 = Vec3::new(1.0, 0.3, 0.5);

/// Immutable cube placements plus the lattice of periodic displacements.
#[derive(Clone, Debug)]
pub struct World {
    world_size: f32,
    placements: Vec<Vec3>,
    displacements: Vec<Vec3>,
}

impl World {
    /// Build the field for a cell of side `world_size`, repeated `repeat`
    /// cells in each direction along every axis.
    pub fn new(world_size: f32, repeat: i32) -> Self {
        let mut displacements = Vec::with_capacity(((2 * repeat + 1).pow(3)) as usize);
        for i in -repeat..=repeat {
            for j in -repeat..=repeat {
                for k in -repeat..=repeat {
                    displacements.push(world_size * Vec3::new(i as f32, j as f32, k as f32));
                }
            }
        }

        Self {
            world_size,
            placements: CUBE_POSITIONS.to_vec(),
            displacements,
        }
    }

    pub fn world_size(&self) -> f32 {
        self.world_size
    }

    pub fn placements(&self) -> &[Vec3] {
        &self.placements
    }

    pub fn displacements(&self) -> &[Vec3] {
        &self.displacements
    }

    /// Number of cube instances drawn per frame.
    pub fn instance_count(&self) -> usize {
        self.placements.len() * self.displacements.len()
    }

    /// Spin angle in radians of cube `index` at `time` seconds.
    pub fn spin_angle(index: usize, time: f32) -> f32 {
        (1.0 + 0.2 * index as f32) * time
    }

    /// Model matrix: translate to the displaced placement, then spin.
    pub fn model_matrix(placement: Vec3, displacement: Vec3, angle: f32) -> Mat4 {
        Mat4::from_translation(placement + displacement)
            * Mat4::from_axis_angle(SPIN_AXIS.normalize(), angle)
    }

    /// Replace `out` with the model matrix of every instance at `time`,
    /// grouped by placement.
    pub fn fill_instances(&self, time: f32, out: &mut Vec<Mat4>) {
        out.clear();
        out.reserve(self.instance_count());
        for (index, placement) in self.placements.iter().enumerate() {
            let angle = Self::spin_angle(index, time);
            out.extend(
                self.displacements
                    .iter()
                    .map(|displacement| Self::model_matrix(*placement, *displacement, angle)),
            );
        }
    }

    /// Toroidal wraparound: any axis that left `[-size/2, size/2]` re-enters
    /// from the opposite side, keeping its overshoot.
    pub fn wrap(&self, position: Vec3) -> Vec3 {
        let half = self.world_size / 2.0;
        let size = self.world_size;
        let wrap_axis = |v: f32| {
            if v > half {
                v - size
            } else if v < -half {
                v + size
            } else {
                v
            }
        };
        Vec3::new(
            wrap_axis(position.x),
            wrap_axis(position.y),
            wrap_axis(position.z),
        )
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(crate::config::WORLD_SIZE, crate::config::LATTICE_REPEAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lattice_has_343_cells() {
        let world = World::default();
        assert_eq!(world.displacements().len(), 343);
        assert_eq!(world.placements().len(), 10);
        assert_eq!(world.instance_count(), 3430);
    }

    #[test]
    fn displacements_are_multiples_of_world_size() {
        let world = World::new(10.0, 3);
        assert_eq!(world.displacements()[0], Vec3::splat(-30.0));
        assert_eq!(world.displacements()[342], Vec3::splat(30.0));
        assert!(world.displacements().contains(&Vec3::ZERO));
        for d in world.displacements() {
            for c in d.to_array() {
                assert_eq!(c % 10.0, 0.0);
                assert!(c.abs() <= 30.0);
            }
        }
    }

    #[test]
    fn instances_cover_every_placement_and_cell() {
        let world = World::new(10.0, 1);
        let mut out = vec![Mat4::IDENTITY; 3];
        world.fill_instances(0.0, &mut out);
        assert_eq!(out.len(), 270);

        // At t = 0 nothing is rotated, so the translation is the whole story.
        let origin = out[13].transform_point3(Vec3::ZERO);
        assert_eq!(origin, CUBE_POSITIONS[0]);
        let second = out[27 + 13].w_axis.truncate();
        assert_eq!(second, CUBE_POSITIONS[1]);
    }

    #[test]
    fn spin_speeds_up_with_index() {
        assert_eq!(World::spin_angle(0, 2.0), 2.0);
        assert!((World::spin_angle(5, 2.0) - 4.0).abs() < 1e-6);
        assert!(World::spin_angle(9, 1.0) > World::spin_angle(8, 1.0));
    }

    #[test]
    fn model_matrix_spins_about_skew_axis() {
        let axis = SPIN_AXIS.normalize();
        let model = World::model_matrix(Vec3::ONE, Vec3::new(10.0, 0.0, 0.0), 1.3);
        // Points on the spin axis only see the translation.
        let on_axis = model.transform_point3(axis * 0.5);
        assert!((on_axis - (Vec3::new(11.0, 1.0, 1.0) + axis * 0.5)).length() < 1e-5);
        assert!((model.w_axis.truncate() - Vec3::new(11.0, 1.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn wrap_is_toroidal() {
        let world = World::new(10.0, 3);
        let eps = 0.25;
        assert_eq!(world.wrap(Vec3::new(5.0 + eps, 0.0, 0.0)).x, -5.0 + eps);
        assert_eq!(world.wrap(Vec3::new(0.0, -5.0 - eps, 0.0)).y, 5.0 - eps);
        assert_eq!(world.wrap(Vec3::new(0.0, 0.0, 5.0 + eps)).z, -5.0 + eps);

        let inside = Vec3::new(4.9, -4.9, 5.0);
        assert_eq!(world.wrap(inside), inside);

        let corner = world.wrap(Vec3::new(5.5, -5.5, 5.5));
        assert_eq!(corner, Vec3::new(-4.5, 4.5, -4.5));
    }
}
