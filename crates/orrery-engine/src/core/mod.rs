//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the runtime (platform
//! loop) and the lesson programs: an application trait plus a per-frame
//! context. It avoids leaking runtime internals into lesson code.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
