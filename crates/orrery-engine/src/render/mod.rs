//! GPU rendering resources.
//!
//! Shader programs and meshes live in arenas owned by the scene and are
//! addressed by integer ids. The scene traversal produces a draw list; the
//! render pass replays it through these types.
//!
//! Convention:
//! - vertex data is interleaved position + color, object space
//! - the vertex shader maps object space to clip space with the
//!   model/view/projection uniforms

mod ctx;
mod geometry;
mod mesh;
mod shader;

pub use ctx::{RenderCtx, RenderTarget};
pub use geometry::{floor_quad, prop_triangle};
pub use mesh::{Mesh, Vertex};
pub use shader::{ShaderError, ShaderProgram, ShaderSource};
