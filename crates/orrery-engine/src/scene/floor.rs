use glam::Mat4;

use super::MeshId;

/// A static renderable: the ground plane.
///
/// The transform is reset to identity every frame, mirroring the dynamic
/// objects' recompute-from-state update shape even though nothing changes.
pub struct Floor {
    mesh: MeshId,
    transform: Mat4,
}

impl Floor {
    pub fn new(mesh: MeshId) -> Self {
        Self {
            mesh,
            transform: Mat4::IDENTITY,
        }
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn update(&mut self) {
        self.transform = Mat4::IDENTITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_is_identity_after_any_number_of_updates() {
        let mut floor = Floor::new(MeshId(0));
        for _ in 0..600 {
            floor.update();
            assert_eq!(floor.transform(), Mat4::IDENTITY);
        }
    }
}
