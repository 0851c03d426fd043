use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::translate_window_event;
use crate::input::InputState;
use crate::time::{FrameClock, FrameTime};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "orrery".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `app` against a single window until it exits.
    ///
    /// Window creation, GPU initialization, event-loop failures and app
    /// aborts ([`AppControl::Abort`]) are returned to the caller; the lesson
    /// binaries treat them as fatal and exit with a non-zero status.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        if let Some(err) = state.fatal_error.take() {
            return Err(err);
        }

        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    window_id: Option<WindowId>,
    exit_requested: bool,
    fatal_error: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            window_id: None,
            exit_requested: false,
            fatal_error: None,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Folds an app control directive into the loop state.
    ///
    /// Returns true when the event loop should stop. An abort stores its
    /// error for [`Runtime::run`] to return; the first abort wins.
    fn absorb_control(&mut self, control: AppControl) -> bool {
        match control {
            AppControl::Continue => false,
            AppControl::Exit => {
                self.exit_requested = true;
                true
            }
            AppControl::Abort(err) => {
                log::error!("fatal: {err:#}");
                if self.fatal_error.is_none() {
                    self.fatal_error = Some(err);
                }
                self.exit_requested = true;
                true
            }
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        self.window_id = Some(window.id());
        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()?;

        self.entry = Some(entry);
        Ok(())
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.absorb_control(AppControl::Abort(e.context("startup failed")));
            event_loop.exit();
            return;
        }

        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw: the lessons animate every frame.
        event_loop.set_control_flow(ControlFlow::Poll);

        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.window_id != Some(window_id) {
            return;
        }

        // Split borrows so the app and the entry can be used together.
        let (app, entry) = (&mut self.app, self.entry.as_mut());
        let Some(entry) = entry else {
            return;
        };

        if let Some(ev) = translate_window_event(&event) {
            entry.with_input_state_mut(|state| state.apply_event(ev));
        }

        let control = app.on_window_event(&event);
        if self.absorb_control(control) {
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.entry = None;
                self.request_exit();
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => {
                let mut control = AppControl::Continue;

                let (app, entry) = (&mut self.app, self.entry.as_mut());
                if let Some(entry) = entry {
                    entry.with_mut(|fields| {
                        let ft: FrameTime = fields.clock.tick();

                        // Scope so `ctx` releases its borrows before the
                        // cursor baseline is rolled forward.
                        {
                            let mut ctx = FrameCtx {
                                window: WindowCtx {
                                    window: fields.window,
                                },
                                gpu: fields.gpu,
                                input: fields.input_state,
                                time: ft,
                            };

                            control = app.on_frame(&mut ctx);
                        }

                        fields.input_state.end_frame();
                    });
                }

                if self.absorb_control(control) {
                    event_loop.exit();
                }
            }

            _ => {}
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct IdleApp;

    impl CoreApp for IdleApp {
        fn on_frame(&mut self, _ctx: &mut FrameCtx<'_, '_>) -> AppControl {
            AppControl::Continue
        }
    }

    fn test_state() -> AppState<IdleApp> {
        AppState::new(RuntimeConfig::default(), GpuInit::default(), IdleApp)
    }

    #[test]
    fn exit_directive_stops_the_loop_without_error() {
        let mut state = test_state();
        assert!(!state.absorb_control(AppControl::Continue));
        assert!(state.absorb_control(AppControl::Exit));
        assert!(state.exit_requested);
        assert!(state.fatal_error.is_none());
    }

    #[test]
    fn abort_directive_is_surfaced_as_the_run_error() {
        let mut state = test_state();
        let control = AppControl::Abort(anyhow::anyhow!("shader linking failed"));
        assert!(state.absorb_control(control));
        assert!(state.exit_requested);

        // This is the error Runtime::run returns after run_app comes back,
        // turning the abort into a non-zero process exit.
        let err = state.fatal_error.take().expect("abort must store its error");
        assert!(err.to_string().contains("shader linking failed"));
    }

    #[test]
    fn first_abort_error_wins() {
        let mut state = test_state();
        state.absorb_control(AppControl::Abort(anyhow::anyhow!("first")));
        state.absorb_control(AppControl::Abort(anyhow::anyhow!("second")));
        assert_eq!(state.fatal_error.take().unwrap().to_string(), "first");
    }
}
