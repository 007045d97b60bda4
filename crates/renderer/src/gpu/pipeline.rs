use std::borrow::Cow;

use wgpu::naga;

use crate::compile::{CompiledStage, UniformUsage};
use crate::error::{CompileDiagnostic, ShaderStage};
use crate::types::ShaderRef;

use super::geometry::QuadGeometry;

/// Bind group layout shared by every program on one context.
pub(crate) struct ProgramLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
}

impl ProgramLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        Self { uniform_layout }
    }
}

/// A linked program: one vertex and one fragment stage baked into a render
/// pipeline, plus the uniform usage reflected from the fragment source.
///
/// Exclusively owned by the lifecycle manager; the render loop borrows it
/// for one frame at a time.
pub(crate) struct ShaderProgram {
    pub pipeline: wgpu::RenderPipeline,
    pub uniforms: UniformUsage,
    pub reference: ShaderRef,
}

/// Links validated stages into a render pipeline.
///
/// Runs inside a validation error scope so a rejected module or pipeline
/// surfaces as a `Link` diagnostic; the partially created objects are
/// released when their locals drop.
pub(crate) fn link(
    device: &wgpu::Device,
    layouts: &ProgramLayouts,
    surface_format: wgpu::TextureFormat,
    vertex: &CompiledStage,
    fragment: &CompiledStage,
    reference: ShaderRef,
) -> Result<ShaderProgram, CompileDiagnostic> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("quad vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(&vertex.glsl),
            stage: naga::ShaderStage::Vertex,
            defines: &[],
        },
    });

    let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("user fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(&fragment.glsl),
            stage: naga::ShaderStage::Fragment,
            defines: &[],
        },
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("shader program layout"),
        bind_group_layouts: &[&layouts.uniform_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("shader program"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some("main"),
            buffers: &[QuadGeometry::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    });

    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        return Err(CompileDiagnostic::new(ShaderStage::Link, error.to_string()));
    }

    Ok(ShaderProgram {
        pipeline,
        uniforms: fragment.uniforms,
        reference,
    })
}
