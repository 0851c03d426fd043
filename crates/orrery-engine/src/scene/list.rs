use glam::Mat4;

use super::MeshId;

/// One draw: a mesh and the model matrix to render it with.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub model: Mat4,
}

/// Renderer-agnostic draw stream collected from the scene each frame.
///
/// Items keep the order the objects were traversed in, which is the order
/// they are drawn in.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
}

impl DrawList {
    pub fn push(&mut self, mesh: MeshId, model: Mat4) {
        self.items.push(DrawItem { mesh, model });
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
