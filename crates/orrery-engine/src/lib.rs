//! Orrery engine crate.
//!
//! A small real-time 3D engine used by the lesson binaries: it owns the
//! platform + GPU runtime pieces and a minimal scene model (props, floor,
//! first-person camera).

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod render;
pub mod scene;
