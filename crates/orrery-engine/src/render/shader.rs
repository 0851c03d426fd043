use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use thiserror::Error;

use crate::scene::ViewTransforms;

use super::mesh::Vertex;

/// Stride of one per-object model slot in the dynamic uniform buffer.
///
/// 256 is the default `min_uniform_buffer_offset_alignment`, valid on every
/// backend without raising device limits.
pub(crate) const MODEL_SLOT_STRIDE: u64 = 256;

const MODEL_UNIFORM_SIZE: u64 = std::mem::size_of::<ModelUniform>() as u64;

/// Shader construction failure.
///
/// Both kinds are detected at startup and treated as fatal by the lessons;
/// there is no retry path.
#[derive(Debug, Error)]
pub enum ShaderError {
    /// The WGSL source failed to parse. Carries the front-end diagnostic.
    #[error("shader compilation failed:\n{0}")]
    Compile(String),

    /// The parsed module failed validation or entry-point resolution.
    #[error("shader linking failed:\n{0}")]
    Link(String),
}

/// A WGSL source that has passed naga parsing and validation.
///
/// Running the frontend on the CPU before handing the text to wgpu keeps the
/// diagnostic in our hands (wgpu would otherwise report the error through its
/// uncaptured-error machinery) and makes compilation testable without a GPU.
#[derive(Debug)]
pub struct ShaderSource {
    wgsl: String,
}

impl ShaderSource {
    /// Parses and validates a WGSL source.
    ///
    /// The source must expose a `vs_main` vertex entry point and an `fs_main`
    /// fragment entry point.
    pub fn compile(wgsl: &str) -> Result<Self, ShaderError> {
        let module = naga::front::wgsl::parse_str(wgsl)
            .map_err(|e| ShaderError::Compile(e.emit_to_string(wgsl)))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| ShaderError::Link(e.emit_to_string(wgsl)))?;

        for (name, stage) in [
            ("vs_main", naga::ShaderStage::Vertex),
            ("fs_main", naga::ShaderStage::Fragment),
        ] {
            if !module
                .entry_points
                .iter()
                .any(|ep| ep.name == name && ep.stage == stage)
            {
                return Err(ShaderError::Link(format!(
                    "entry point `{name}` not found for stage {stage:?}"
                )));
            }
        }

        Ok(Self {
            wgsl: wgsl.to_string(),
        })
    }

    /// The built-in vertex-colored scene shader used by all lessons.
    pub fn scene() -> Result<Self, ShaderError> {
        Self::compile(include_str!("shaders/scene.wgsl"))
    }

    pub fn as_str(&self) -> &str {
        &self.wgsl
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlobalsUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
}

/// A linked render pipeline with its cached uniform bindings.
///
/// Group 0 carries the per-frame view/projection matrices; group 1 carries
/// per-object model matrices in a dynamically-offset buffer that grows to the
/// number of draws in a frame.
///
/// A default-constructed program has no pipeline and every operation on it is
/// a no-op; successful construction through [`ShaderProgram::new`] always
/// yields a ready program.
#[derive(Default)]
pub struct ShaderProgram {
    pipeline: Option<wgpu::RenderPipeline>,

    globals_buffer: Option<wgpu::Buffer>,
    globals_bind_group: Option<wgpu::BindGroup>,

    model_layout: Option<wgpu::BindGroupLayout>,
    model_buffer: Option<wgpu::Buffer>,
    model_bind_group: Option<wgpu::BindGroup>,
    model_capacity: u32,

    topology: wgpu::PrimitiveTopology,
}

impl ShaderProgram {
    /// Builds the pipeline and uniform bindings from a validated source.
    ///
    /// `depth_format` must match the depth attachment the scene pass renders
    /// with (or `None` for color-only lessons).
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
        topology: wgpu::PrimitiveTopology,
        source: &ShaderSource,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("orrery scene shader"),
            source: wgpu::ShaderSource::Wgsl(source.as_str().into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orrery globals bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<GlobalsUniform>() as u64
                    ),
                },
                count: None,
            }],
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orrery model bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(MODEL_UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("orrery scene pipeline layout"),
            bind_group_layouts: &[&globals_layout, &model_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("orrery scene pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("orrery globals ubo"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("orrery globals bind group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline: Some(pipeline),
            globals_buffer: Some(globals_buffer),
            globals_bind_group: Some(globals_bind_group),
            model_layout: Some(model_layout),
            model_buffer: None,
            model_bind_group: None,
            model_capacity: 0,
            topology,
        }
    }

    /// Returns true when the program holds a linked pipeline.
    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    /// The primitive topology this pipeline rasterizes.
    pub fn topology(&self) -> wgpu::PrimitiveTopology {
        self.topology
    }

    /// Uploads the per-frame view/projection matrices.
    pub fn write_view(&self, queue: &wgpu::Queue, view: &ViewTransforms) {
        let Some(buffer) = self.globals_buffer.as_ref() else {
            return;
        };
        let globals = GlobalsUniform {
            view: view.view.to_cols_array_2d(),
            projection: view.projection.to_cols_array_2d(),
        };
        queue.write_buffer(buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Grows the per-object model buffer to hold at least `count` slots.
    ///
    /// Must be called before the render pass is recorded; growing recreates
    /// the bind group.
    pub fn ensure_model_capacity(&mut self, device: &wgpu::Device, count: u32) {
        let Some(layout) = self.model_layout.as_ref() else {
            return;
        };
        if self.model_capacity >= count && self.model_buffer.is_some() {
            return;
        }

        let capacity = count.next_power_of_two().max(16);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("orrery model slots"),
            size: capacity as u64 * MODEL_SLOT_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("orrery model bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(MODEL_UNIFORM_SIZE),
                }),
            }],
        });

        self.model_buffer = Some(buffer);
        self.model_bind_group = Some(bind_group);
        self.model_capacity = capacity;
    }

    /// Uploads one object's model matrix into its slot.
    ///
    /// Writes to distinct slots land before the pass executes, so every draw
    /// reads its own matrix.
    pub fn write_model(&self, queue: &wgpu::Queue, slot: u32, model: Mat4) {
        let Some(buffer) = self.model_buffer.as_ref() else {
            return;
        };
        debug_assert!(slot < self.model_capacity);
        let uniform = ModelUniform {
            model: model.to_cols_array_2d(),
        };
        queue.write_buffer(
            buffer,
            slot as u64 * MODEL_SLOT_STRIDE,
            bytemuck::bytes_of(&uniform),
        );
    }

    /// Activates the pipeline and bind groups for one model slot.
    ///
    /// No-op when the program has no pipeline.
    pub fn bind(&self, rpass: &mut wgpu::RenderPass<'_>, slot: u32) {
        let (Some(pipeline), Some(globals), Some(models)) = (
            self.pipeline.as_ref(),
            self.globals_bind_group.as_ref(),
            self.model_bind_group.as_ref(),
        ) else {
            return;
        };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, globals, &[]);
        rpass.set_bind_group(1, models, &[slot * MODEL_SLOT_STRIDE as u32]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_shader_compiles() {
        let source = ShaderSource::scene().expect("built-in shader must be valid");
        assert!(source.as_str().contains("vs_main"));
    }

    #[test]
    fn syntax_error_reports_compile_failure() {
        let err = ShaderSource::compile("@vertex fn vs_main( -> oops {").unwrap_err();
        match err {
            ShaderError::Compile(msg) => assert!(!msg.is_empty()),
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn missing_entry_point_reports_link_failure() {
        // Valid WGSL, but no fs_main.
        let src = "@vertex fn vs_main() -> @builtin(position) vec4<f32> {\
                   return vec4<f32>(0.0, 0.0, 0.0, 1.0); }";
        let err = ShaderSource::compile(src).unwrap_err();
        match err {
            ShaderError::Link(msg) => assert!(msg.contains("fs_main")),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn default_program_is_not_ready() {
        let program = ShaderProgram::default();
        assert!(!program.is_ready());
    }
}
