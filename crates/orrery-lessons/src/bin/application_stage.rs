//! First lesson: a window, a shader program, and one static triangle.
//!
//! No camera and no depth buffer. The triangle's scene transforms stay at
//! identity, so its vertex positions land directly in clip space.

use anyhow::Result;

use orrery_engine::core::{App, AppControl, FrameCtx};
use orrery_engine::device::GpuInit;
use orrery_engine::input::Key;
use orrery_engine::logging::{init_logging, LoggingConfig};
use orrery_engine::render::{prop_triangle, Mesh, ShaderProgram, ShaderSource};
use orrery_engine::scene::{Floor, Scene};
use orrery_engine::window::{Runtime, RuntimeConfig};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

struct ApplicationStage {
    // Built on the first frame; GPU resources need a live device.
    scene: Option<Scene>,
}

impl ApplicationStage {
    fn build_scene(ctx: &FrameCtx<'_, '_>) -> Result<Scene> {
        let source = ShaderSource::scene()?;
        let device = ctx.gpu.device();

        let mut scene = Scene::new();
        let shader = scene.add_shader(ShaderProgram::new(
            device,
            ctx.gpu.surface_format(),
            ctx.gpu.depth_format(),
            wgpu::PrimitiveTopology::TriangleList,
            &source,
        ));
        let triangle = scene.add_mesh(Mesh::new(
            device,
            shader,
            &prop_triangle(),
            wgpu::PrimitiveTopology::TriangleList,
        ));

        // A static renderable is all this lesson needs; with no camera the
        // scene reports identity view/projection transforms.
        scene.add_object(Floor::new(triangle));
        Ok(scene)
    }
}

impl App for ApplicationStage {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input.key_down(Key::Escape) {
            return AppControl::Exit;
        }

        if self.scene.is_none() {
            match Self::build_scene(ctx) {
                Ok(scene) => self.scene = Some(scene),
                // Shader or resource failure at startup: abort so the
                // process exits non-zero before anything is presented.
                Err(err) => return AppControl::Abort(err.context("scene setup failed")),
            }
        }
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Exit;
        };

        let view = scene.update(&ctx.scene_input());

        ctx.render(CLEAR_COLOR, |rctx, target| {
            scene.render(rctx, target, &view);
        })
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig {
            title: "orrery: application stage".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        ApplicationStage { scene: None },
    )
}
