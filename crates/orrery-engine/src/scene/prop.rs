use glam::{Mat4, Vec2, Vec3};
use rand::Rng;

use super::MeshId;

/// Wander speed in units per second.
pub const WANDER_SPEED: f32 = 2.5;

/// Half-extent of the square wander area, centered on the origin.
pub const WANDER_BOUNDS: f32 = 10.0;

/// How a prop moves.
///
/// The two variants are intentionally distinct behaviors, not parameters of
/// one another: wanderers translate and face their heading, spinners stay
/// put and rotate in place.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Motion {
    /// Bounded random walk: integrate a unit velocity; on leaving the wander
    /// area, clamp back in and draw a fresh random heading.
    Wander { velocity: Vec2 },

    /// Rotate about the vertical axis at a constant rate, in degrees per
    /// second. The angle stays wrapped into [0, 360).
    Spin { angle_deg: f32, rate_deg: f32 },
}

/// A renderable object with a planar position and one of two motions.
///
/// The planar coordinates are the world XZ plane; Y is always 0.
pub struct Prop {
    mesh: MeshId,
    position: Vec2,
    motion: Motion,
    transform: Mat4,
}

impl Prop {
    /// Creates a wandering prop at a random position with a random heading.
    pub fn wander(mesh: MeshId, rng: &mut impl Rng) -> Self {
        let mut prop = Self {
            mesh,
            position: random_position(rng),
            motion: Motion::Wander {
                velocity: random_unit(rng),
            },
            transform: Mat4::IDENTITY,
        };
        prop.recompute_transform();
        prop
    }

    /// Creates a spinning prop at a random position with a random phase.
    pub fn spin(mesh: MeshId, rate_deg: f32, rng: &mut impl Rng) -> Self {
        let mut prop = Self {
            mesh,
            position: random_position(rng),
            motion: Motion::Spin {
                angle_deg: rng.gen_range(0.0..360.0),
                rate_deg,
            },
            transform: Mat4::IDENTITY,
        };
        prop.recompute_transform();
        prop
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    /// Planar position on the XZ plane.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Current render transform (translate, then orient).
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Advances the motion by `dt` seconds and recomputes the transform.
    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) {
        match &mut self.motion {
            Motion::Wander { velocity } => {
                self.position += *velocity * dt * WANDER_SPEED;

                let out_of_bounds = self.position.x.abs() > WANDER_BOUNDS
                    || self.position.y.abs() > WANDER_BOUNDS;
                if out_of_bounds {
                    *velocity = random_unit(rng);
                    self.position = self
                        .position
                        .clamp(Vec2::splat(-WANDER_BOUNDS), Vec2::splat(WANDER_BOUNDS));
                }
            }

            Motion::Spin { angle_deg, rate_deg } => {
                *angle_deg = (*angle_deg + *rate_deg * dt).rem_euclid(360.0);
            }
        }

        self.recompute_transform();
    }

    fn recompute_transform(&mut self) {
        let translation = Vec3::new(self.position.x, 0.0, self.position.y);

        let rotation = match self.motion {
            // Orient the mesh to face along the heading: the inverse of a
            // look-at from the origin toward the velocity direction.
            Motion::Wander { velocity } => {
                let heading = Vec3::new(velocity.x, 0.0, velocity.y);
                Mat4::look_at_rh(Vec3::ZERO, heading, Vec3::Y).inverse()
            }
            Motion::Spin { angle_deg, .. } => Mat4::from_rotation_y(angle_deg.to_radians()),
        };

        self.transform = Mat4::from_translation(translation) * rotation;
    }
}

fn random_position(rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.gen_range(-WANDER_BOUNDS..=WANDER_BOUNDS),
        rng.gen_range(-WANDER_BOUNDS..=WANDER_BOUNDS),
    )
}

/// Draws a random unit vector.
///
/// Near-zero candidates are re-rolled so the normalization never divides by
/// (almost) zero.
fn random_unit(rng: &mut impl Rng) -> Vec2 {
    loop {
        let v = Vec2::new(rng.gen_range(-1.0f32..=1.0), rng.gen_range(-1.0f32..=1.0));
        if v.length_squared() > 1e-6 {
            return v.normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn wanderer_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut prop = Prop::wander(MeshId(0), &mut rng);

        for _ in 0..10_000 {
            prop.update(DT, &mut rng);
            let p = prop.position();
            assert!(p.x >= -WANDER_BOUNDS && p.x <= WANDER_BOUNDS, "x out of bounds: {p:?}");
            assert!(p.y >= -WANDER_BOUNDS && p.y <= WANDER_BOUNDS, "z out of bounds: {p:?}");
        }
    }

    #[test]
    fn wanderer_velocity_is_always_unit_length() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut prop = Prop::wander(MeshId(0), &mut rng);

        for _ in 0..10_000 {
            prop.update(DT, &mut rng);
            let Motion::Wander { velocity } = prop.motion() else {
                panic!("motion variant changed");
            };
            assert!((velocity.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn random_unit_never_degenerates() {
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..1_000 {
            let v = random_unit(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn spinner_angle_stays_wrapped() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut prop = Prop::spin(MeshId(0), 270.0, &mut rng);

        for _ in 0..1_000 {
            prop.update(0.5, &mut rng);
            let Motion::Spin { angle_deg, .. } = prop.motion() else {
                panic!("motion variant changed");
            };
            assert!((0.0..360.0).contains(&angle_deg), "angle {angle_deg}");
        }
    }

    #[test]
    fn spinner_position_is_fixed() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut prop = Prop::spin(MeshId(0), 90.0, &mut rng);
        let start = prop.position();

        for _ in 0..100 {
            prop.update(DT, &mut rng);
        }
        assert_eq!(prop.position(), start);
    }

    #[test]
    fn transform_translates_to_planar_position() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut prop = Prop::wander(MeshId(0), &mut rng);
        prop.update(DT, &mut rng);

        let p = prop.position();
        let t = prop.transform().w_axis;
        assert!((t.x - p.x).abs() < 1e-5);
        assert!(t.y.abs() < 1e-5);
        assert!((t.z - p.y).abs() < 1e-5);
    }

    #[test]
    fn wanderer_faces_its_heading() {
        let mut prop = Prop {
            mesh: MeshId(0),
            position: Vec2::ZERO,
            motion: Motion::Wander {
                velocity: Vec2::new(0.0, -1.0),
            },
            transform: Mat4::IDENTITY,
        };
        prop.recompute_transform();

        // A heading of -Z is the look-at rest orientation: no rotation.
        assert!(prop.transform().abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}
