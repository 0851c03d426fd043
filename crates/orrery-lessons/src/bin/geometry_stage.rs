//! Second lesson: a depth-tested 3D scene.
//!
//! Gray floor, a crowd of wandering props sharing one triangle mesh, and a
//! first-person camera (WASD/arrow movement, mouse look, Escape quits).

use anyhow::Result;

use orrery_engine::core::{App, AppControl, FrameCtx};
use orrery_engine::device::GpuInit;
use orrery_engine::input::Key;
use orrery_engine::logging::{init_logging, LoggingConfig};
use orrery_engine::render::{floor_quad, prop_triangle, Mesh, ShaderProgram, ShaderSource};
use orrery_engine::scene::{Camera, Floor, Prop, Scene};
use orrery_engine::window::{Runtime, RuntimeConfig};

const PROP_COUNT: usize = 100;

struct GeometryStage {
    // Built on the first frame; GPU resources need a live device.
    scene: Option<Scene>,
}

impl GeometryStage {
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
        let floor_mesh = scene.add_mesh(Mesh::new(
            device,
            shader,
            &floor_quad(),
            wgpu::PrimitiveTopology::TriangleList,
        ));
        let prop_mesh = scene.add_mesh(Mesh::new(
            device,
            shader,
            &prop_triangle(),
            wgpu::PrimitiveTopology::TriangleList,
        ));

        scene.add_object(Camera::new());
        scene.add_object(Floor::new(floor_mesh));
        for _ in 0..PROP_COUNT {
            let prop = Prop::wander(prop_mesh, scene.rng_mut());
            scene.add_object(prop);
        }
        Ok(scene)
    }
}

impl App for GeometryStage {
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

        ctx.render(wgpu::Color::BLACK, |rctx, target| {
            scene.render(rctx, target, &view);
        })
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig {
            title: "orrery: geometry stage".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit {
            depth_format: Some(wgpu::TextureFormat::Depth32Float),
            ..GpuInit::default()
        },
        GeometryStage { scene: None },
    )
}
