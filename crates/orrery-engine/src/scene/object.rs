use rand::Rng;

use super::camera::{Camera, ViewTransforms};
use super::floor::Floor;
use super::list::DrawList;
use super::prop::Prop;
use super::FrameInput;

/// A scene object: one of the three lesson variants.
///
/// Dispatch is a plain match over the variants; all objects share the same
/// update/render contract and are traversed in list order.
pub enum Object {
    Prop(Prop),
    Floor(Floor),
    Camera(Camera),
}

impl Object {
    /// Advances the object by one time step.
    ///
    /// Only the camera produces view/projection output.
    pub fn update(&mut self, frame: &FrameInput<'_>, rng: &mut impl Rng) -> Option<ViewTransforms> {
        match self {
            Object::Prop(prop) => {
                prop.update(frame.dt, rng);
                None
            }
            Object::Floor(floor) => {
                floor.update();
                None
            }
            Object::Camera(camera) => Some(camera.update(frame)),
        }
    }

    /// Contributes this object's draw items, if any.
    ///
    /// The camera renders nothing.
    pub fn render(&self, out: &mut DrawList) {
        match self {
            Object::Prop(prop) => out.push(prop.mesh(), prop.transform()),
            Object::Floor(floor) => out.push(floor.mesh(), floor.transform()),
            Object::Camera(_) => {}
        }
    }
}

impl From<Prop> for Object {
    fn from(prop: Prop) -> Self {
        Object::Prop(prop)
    }
}

impl From<Floor> for Object {
    fn from(floor: Floor) -> Self {
        Object::Floor(floor)
    }
}

impl From<Camera> for Object {
    fn from(camera: Camera) -> Self {
        Object::Camera(camera)
    }
}
