//! Scene model.
//!
//! Responsibilities:
//! - own the shader/mesh arenas and the ordered object list
//! - drive the per-frame update pass (input → object state → camera output)
//! - collect a draw list and replay it through one render pass
//!
//! Objects reference GPU resources through integer arena ids; the camera's
//! view/projection output flows through return values instead of shared
//! globals.

mod camera;
mod floor;
mod list;
mod object;
mod prop;

pub use camera::{Camera, ViewTransforms, FOV_Y_DEG, LOOK_RATE_DEG, MOVE_SPEED};
pub use floor::Floor;
pub use list::{DrawItem, DrawList};
pub use object::Object;
pub use prop::{Motion, Prop, WANDER_BOUNDS, WANDER_SPEED};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::input::InputState;
use crate::render::{Mesh, RenderCtx, RenderTarget, ShaderProgram};

/// Arena index of a [`ShaderProgram`] in a scene.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderId(pub(crate) usize);

/// Arena index of a [`Mesh`] in a scene.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MeshId(pub(crate) usize);

/// Drawable size of the window in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height; 1.0 when the viewport is degenerate.
    pub fn aspect(self) -> f32 {
        if self.is_valid() {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Per-frame context passed into every object update.
///
/// Carrying input and viewport explicitly here is what replaces the original
/// process-wide mutable game state.
pub struct FrameInput<'a> {
    /// Delta time in seconds.
    pub dt: f32,

    /// Current drawable size.
    pub viewport: Viewport,

    /// Input snapshot for this frame.
    pub input: &'a InputState,
}

/// The scene: resource arenas plus the ordered object list.
///
/// Update and render both traverse objects in insertion order, so draw order
/// is deterministic.
pub struct Scene {
    shaders: Vec<ShaderProgram>,
    meshes: Vec<Mesh>,
    objects: Vec<Object>,
    rng: StdRng,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a scene with a caller-provided RNG (used by tests for
    /// deterministic prop motion).
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            shaders: Vec::new(),
            meshes: Vec::new(),
            objects: Vec::new(),
            rng,
        }
    }

    pub fn add_shader(&mut self, shader: ShaderProgram) -> ShaderId {
        self.shaders.push(shader);
        ShaderId(self.shaders.len() - 1)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn add_object(&mut self, object: impl Into<Object>) {
        self.objects.push(object.into());
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Borrows the scene RNG, e.g. for spawning randomized props.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Advances every object by one time step, in list order.
    ///
    /// Returns the camera's view/projection output for this frame; identity
    /// transforms when the scene has no camera.
    pub fn update(&mut self, frame: &FrameInput<'_>) -> ViewTransforms {
        let Scene { objects, rng, .. } = self;

        let mut view = ViewTransforms::IDENTITY;
        for object in objects.iter_mut() {
            if let Some(v) = object.update(frame, rng) {
                view = v;
            }
        }
        view
    }

    /// Collects this frame's draw items from objects, in list order.
    pub(crate) fn collect_draws(&self) -> DrawList {
        let mut draws = DrawList::default();
        for object in &self.objects {
            object.render(&mut draws);
        }
        draws
    }

    /// Per-program draw counts for a frame's draw list.
    ///
    /// Items carrying ids this scene never minted, or pairing a mesh with an
    /// ineligible program, are skipped rather than counted.
    fn per_shader_draw_counts(&self, draws: &DrawList) -> Vec<u32> {
        let mut counts = vec![0u32; self.shaders.len()];
        for item in draws.items() {
            let Some(mesh) = self.meshes.get(item.mesh.0) else {
                continue;
            };
            let Some(shader) = self.shaders.get(mesh.shader.0) else {
                continue;
            };
            if draw_eligible(mesh, shader) {
                counts[mesh.shader.0] += 1;
            }
        }
        counts
    }

    /// Records one render pass replaying the scene's draw list.
    ///
    /// Model matrices are uploaded to per-program slot buffers before the
    /// pass is recorded; items whose mesh or program is not ready, or whose
    /// topologies disagree, are silently skipped.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        view: &ViewTransforms,
    ) {
        let draws = self.collect_draws();
        let counts = self.per_shader_draw_counts(&draws);

        // Buffer growth recreates bind groups, so it must precede the pass.
        for (shader, count) in self.shaders.iter_mut().zip(&counts) {
            if *count == 0 {
                continue;
            }
            shader.ensure_model_capacity(ctx.device, *count);
            shader.write_view(ctx.queue, view);
        }

        // Assign a slot per eligible item, in draw order, and upload its
        // model matrix.
        let mut next_slot = vec![0u32; self.shaders.len()];
        let mut slots: Vec<Option<u32>> = Vec::with_capacity(draws.items().len());
        for item in draws.items() {
            let slot = self.meshes.get(item.mesh.0).and_then(|mesh| {
                let shader = self.shaders.get(mesh.shader.0)?;
                if !draw_eligible(mesh, shader) {
                    return None;
                }
                let slot = next_slot[mesh.shader.0];
                next_slot[mesh.shader.0] += 1;
                shader.write_model(ctx.queue, slot, item.model);
                Some(slot)
            });
            slots.push(slot);
        }

        let mut rpass = target
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("orrery scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: target.depth_view.map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

        for (item, slot) in draws.items().iter().zip(&slots) {
            let Some(slot) = slot else {
                continue;
            };
            let mesh = &self.meshes[item.mesh.0];
            let shader = &self.shaders[mesh.shader.0];
            shader.bind(&mut rpass, *slot);
            mesh.draw(&mut rpass);
        }
    }
}

/// True when this mesh/program pair can be drawn in the scene pass: the mesh
/// has geometry, the program has a pipeline, and their topologies agree.
fn draw_eligible(mesh: &Mesh, shader: &ShaderProgram) -> bool {
    mesh.is_drawable() && shader.is_ready() && mesh.topology() == shader.topology()
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    fn headless_mesh(shader: ShaderId) -> Mesh {
        Mesh {
            shader,
            vertex_buffer: None,
            topology: wgpu::PrimitiveTopology::TriangleList,
            vertex_count: 0,
        }
    }

    fn test_scene() -> Scene {
        Scene::with_rng(StdRng::seed_from_u64(7))
    }

    #[test]
    fn arena_ids_are_sequential() {
        let mut scene = test_scene();
        let s0 = scene.add_shader(ShaderProgram::default());
        let m0 = scene.add_mesh(headless_mesh(s0));
        let m1 = scene.add_mesh(headless_mesh(s0));
        assert_eq!(m0, MeshId(0));
        assert_eq!(m1, MeshId(1));
    }

    #[test]
    fn update_without_camera_yields_identity_transforms() {
        let mut scene = test_scene();
        let s0 = scene.add_shader(ShaderProgram::default());
        let m0 = scene.add_mesh(headless_mesh(s0));
        scene.add_object(Floor::new(m0));

        let input = InputState::default();
        let frame = FrameInput {
            dt: 1.0 / 60.0,
            viewport: Viewport::new(800.0, 600.0),
            input: &input,
        };
        let view = scene.update(&frame);
        assert_eq!(view.view, Mat4::IDENTITY);
        assert_eq!(view.projection, Mat4::IDENTITY);
    }

    #[test]
    fn update_with_camera_returns_its_transforms() {
        let mut scene = test_scene();
        scene.add_object(Camera::new());

        let input = InputState::default();
        let frame = FrameInput {
            dt: 1.0 / 60.0,
            viewport: Viewport::new(800.0, 600.0),
            input: &input,
        };
        let view = scene.update(&frame);
        assert_ne!(view.projection, Mat4::IDENTITY);
    }

    #[test]
    fn draw_list_follows_object_insertion_order() {
        let mut scene = test_scene();
        let s0 = scene.add_shader(ShaderProgram::default());
        let m0 = scene.add_mesh(headless_mesh(s0));
        let m1 = scene.add_mesh(headless_mesh(s0));

        scene.add_object(Camera::new());
        scene.add_object(Floor::new(m0));
        let prop = Prop::wander(m1, &mut StdRng::seed_from_u64(1));
        scene.add_object(prop);

        let draws = scene.collect_draws();
        // The camera contributes no draw item.
        assert_eq!(draws.items().len(), 2);
        assert_eq!(draws.items()[0].mesh, m0);
        assert_eq!(draws.items()[1].mesh, m1);
    }

    #[test]
    fn draw_counting_skips_foreign_ids_without_panicking() {
        let mut scene = test_scene();
        let s0 = scene.add_shader(ShaderProgram::default());
        let m0 = scene.add_mesh(headless_mesh(s0));
        // A mesh carrying a shader id this scene never minted.
        let m1 = scene.add_mesh(headless_mesh(ShaderId(42)));

        let mut draws = DrawList::default();
        draws.push(m0, Mat4::IDENTITY);
        draws.push(m1, Mat4::IDENTITY);
        draws.push(MeshId(99), Mat4::IDENTITY);

        assert_eq!(scene.per_shader_draw_counts(&draws), vec![0]);
    }

    #[test]
    fn undrawable_or_unready_pairs_are_ineligible() {
        // No vertex buffer and no pipeline: ineligible on every count.
        let mesh = headless_mesh(ShaderId(0));
        let shader = ShaderProgram::default();
        assert!(!draw_eligible(&mesh, &shader));
    }

    #[test]
    fn viewport_aspect_handles_degenerate_sizes() {
        assert_eq!(Viewport::new(800.0, 600.0).aspect(), 800.0 / 600.0);
        assert_eq!(Viewport::new(0.0, 600.0).aspect(), 1.0);
        assert!(!Viewport::default().is_valid());
    }
}
