// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Pipeline
//!
//! One render pass with a single presentable color attachment, an empty pipeline layout, and a
//! graphics pipeline whose vertices come from the vertex shader itself.  Shader modules only live
//! for the duration of the pipeline build.

use std::io::Cursor;

use ash::vk;
use tracing::info;

use crate::gpu::Gpu;
use crate::lifecycle::{Ledger, Owned};
use crate::prelude::*;

const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Compiled vertex and fragment programs.  Only their length and bytes matter here.
#[derive(Debug, Clone, Default)]
pub struct ShaderBlobs {
    pub vertex: Vec<u8>,
    pub fragment: Vec<u8>,
}

/// Reinterpret a blob as SPIR-V words.  Rejects anything that cannot be a module.
pub fn spirv_words(name: &str, bytes: &[u8]) -> Result<Vec<u32>, VulkanError> {
    let words = ash::util::read_spv(&mut Cursor::new(bytes))
        .map_err(|e| VulkanError::InvalidShader(format!("{name}: {e}")))?;
    match words.first() {
        Some(&SPIRV_MAGIC) => Ok(words),
        Some(_) => Err(VulkanError::InvalidShader(format!(
            "{name}: not a SPIR-V module"
        ))),
        None => Err(VulkanError::InvalidShader(format!("{name}: empty"))),
    }
}

/// Cleared on load, kept on store, handed to presentation afterwards.
pub fn color_attachment(format: vk::Format) -> vk::AttachmentDescription {
    vk::AttachmentDescription::default()
        .format(format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)
}

pub fn viewport(extent: vk::Extent2D) -> vk::Viewport {
    vk::Viewport {
        x: 0.0,
        y: 0.0,
        width: extent.width as f32,
        height: extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    }
}

pub fn scissor(extent: vk::Extent2D) -> vk::Rect2D {
    vk::Rect2D {
        offset: vk::Offset2D { x: 0, y: 0 },
        extent,
    }
}

pub fn rasterization_state() -> vk::PipelineRasterizationStateCreateInfo<'static> {
    vk::PipelineRasterizationStateCreateInfo::default()
        .depth_clamp_enable(false)
        .rasterizer_discard_enable(false)
        .polygon_mode(vk::PolygonMode::FILL)
        .line_width(1.0)
        .cull_mode(vk::CullModeFlags::BACK)
        .front_face(vk::FrontFace::CLOCKWISE)
        .depth_bias_enable(false)
}

pub fn multisample_state() -> vk::PipelineMultisampleStateCreateInfo<'static> {
    vk::PipelineMultisampleStateCreateInfo::default()
        .sample_shading_enable(false)
        .rasterization_samples(vk::SampleCountFlags::TYPE_1)
}

/// Straight write of all four channels.
pub fn blend_attachment() -> vk::PipelineColorBlendAttachmentState {
    vk::PipelineColorBlendAttachmentState::default()
        .blend_enable(false)
        .color_write_mask(vk::ColorComponentFlags::RGBA)
}

/// Render pass, layout, and pipeline.  The ledger owns the handles; this is a view of them.
#[derive(Debug, Clone, Copy)]
pub struct RenderPipelineState {
    pub render_pass: vk::RenderPass,
    pub layout: vk::PipelineLayout,
    pub pipeline: vk::Pipeline,
}

impl RenderPipelineState {
    pub fn new(
        gpu: &mut impl Gpu,
        ledger: &mut Ledger,
        format: vk::Format,
        extent: vk::Extent2D,
        shaders: &ShaderBlobs,
    ) -> Result<Self, SetupError> {
        let render_pass = create_render_pass(gpu, format)?;
        ledger.push(Owned::RenderPass(render_pass));

        // No descriptor sets and no push constants.
        let layout_ci = vk::PipelineLayoutCreateInfo::default();
        let layout = gpu
            .create_pipeline_layout(&layout_ci)
            .at(Stage::PipelineLayout)?;
        ledger.push(Owned::PipelineLayout(layout));

        let pipeline = build_pipeline(gpu, render_pass, layout, extent, shaders)?;
        ledger.push(Owned::Pipeline(pipeline));

        info!("graphics pipeline ready");
        Ok(Self {
            render_pass,
            layout,
            pipeline,
        })
    }
}

fn create_render_pass(gpu: &mut impl Gpu, format: vk::Format) -> Result<vk::RenderPass, SetupError> {
    let attachments = [color_attachment(format)];
    let color_refs = [vk::AttachmentReference {
        attachment: 0,
        layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    }];
    let subpasses = [vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_refs)];

    let render_pass_ci = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses);
    gpu.create_render_pass(&render_pass_ci).at(Stage::RenderPass)
}

fn create_module(gpu: &mut impl Gpu, code: &[u32]) -> Result<vk::ShaderModule, SetupError> {
    let module_ci = vk::ShaderModuleCreateInfo::default().code(code);
    gpu.create_shader_module(&module_ci).at(Stage::Shaders)
}

/// Modules are released before returning, whether or not the pipeline was built.
fn build_pipeline(
    gpu: &mut impl Gpu,
    render_pass: vk::RenderPass,
    layout: vk::PipelineLayout,
    extent: vk::Extent2D,
    shaders: &ShaderBlobs,
) -> Result<vk::Pipeline, SetupError> {
    let vert_code = spirv_words("vertex", &shaders.vertex).at(Stage::Shaders)?;
    let frag_code = spirv_words("fragment", &shaders.fragment).at(Stage::Shaders)?;

    let vert_module = create_module(gpu, &vert_code)?;
    let frag_module = match create_module(gpu, &frag_code) {
        Ok(module) => module,
        Err(e) => {
            gpu.destroy_shader_module(vert_module);
            return Err(e);
        }
    };

    let shader_stages = [
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::VERTEX)
            .module(vert_module)
            .name(c"main"),
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::FRAGMENT)
            .module(frag_module)
            .name(c"main"),
    ];

    // Vertices are generated in the vertex shader.
    let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();
    let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
        .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
        .primitive_restart_enable(false);

    let viewports = [viewport(extent)];
    let scissors = [scissor(extent)];
    let viewport_state = vk::PipelineViewportStateCreateInfo::default()
        .viewports(&viewports)
        .scissors(&scissors);

    let rasterization = rasterization_state();
    let multisample = multisample_state();
    let blend_attachments = [blend_attachment()];
    let color_blend = vk::PipelineColorBlendStateCreateInfo::default()
        .logic_op_enable(false)
        .logic_op(vk::LogicOp::COPY)
        .attachments(&blend_attachments);

    let pipeline_ci = vk::GraphicsPipelineCreateInfo::default()
        .stages(&shader_stages)
        .vertex_input_state(&vertex_input)
        .input_assembly_state(&input_assembly)
        .viewport_state(&viewport_state)
        .rasterization_state(&rasterization)
        .multisample_state(&multisample)
        .color_blend_state(&color_blend)
        .layout(layout)
        .render_pass(render_pass)
        .subpass(0);

    let pipeline = gpu.create_graphics_pipeline(&pipeline_ci);

    gpu.destroy_shader_module(frag_module);
    gpu.destroy_shader_module(vert_module);

    pipeline.at(Stage::Pipeline)
}

#[cfg(test)]
pub(crate) fn spirv_stub() -> Vec<u8> {
    [SPIRV_MAGIC, 0x0001_0000, 0, 1, 0]
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .collect()
}
