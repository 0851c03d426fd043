use winit::event::WindowEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug)]
pub enum AppControl {
    Continue,
    Exit,
    /// Terminate because of an unrecoverable failure. The runtime stops the
    /// event loop and surfaces the error from `Runtime::run`, so the process
    /// exits non-zero.
    Abort(anyhow::Error),
}

/// Application contract implemented by the lesson programs.
pub trait App {
    /// Called for window events.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
