use anyhow::anyhow;
use winit::window::Window;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::InputState;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{FrameInput, Viewport};
use crate::time::FrameTime;

use super::app::AppControl;

/// Window handle and immutable window metadata.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the drawable size as `(width, height)` in physical pixels.
    pub fn physical_size(&self) -> (f32, f32) {
        let size = self.window.inner_size();
        (size.width as f32, size.height as f32)
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub time: FrameTime,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Current drawable size.
    pub fn viewport(&self) -> Viewport {
        let (w, h) = self.window.physical_size();
        Viewport::new(w, h)
    }

    /// Bundles this frame's timing, viewport and input for scene updates.
    pub fn scene_input(&self) -> FrameInput<'_> {
        FrameInput {
            dt: self.time.dt,
            viewport: self.viewport(),
            input: self.input,
        }
    }

    /// Clears the surface (and depth buffer, when configured) with `clear`,
    /// calls `draw` with a ready [`RenderCtx`] and [`RenderTarget`], then
    /// presents the frame.
    pub fn render<F>(&mut self, clear: wgpu::Color, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        AppControl::Abort(anyhow!("surface is out of memory"))
                    }
                    _ => AppControl::Continue,
                };
            }
        };

        // Clear pass — dropped before the encoder is moved into submit().
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("orrery clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: frame.depth_view.as_ref().map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let rctx = RenderCtx {
            device: self.gpu.device(),
            queue: self.gpu.queue(),
            surface_format: self.gpu.surface_format(),
            depth_format: self.gpu.depth_format(),
        };

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget {
                encoder: &mut frame.encoder,
                color_view: &frame.view,
                depth_view: frame.depth_view.as_ref(),
            };
            draw(&rctx, &mut target);
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
