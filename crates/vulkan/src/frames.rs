// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Frames
//!
//! One framebuffer and one pre-recorded command buffer per swapchain image.  Recording happens
//! once; nothing here submits or presents.

use ash::vk;
use tracing::{debug, info};

use crate::gpu::Gpu;
use crate::lifecycle::{Ledger, Owned};
use crate::pipeline::RenderPipelineState;
use crate::prelude::*;
use crate::swapchain::PresentationChain;

/// Opaque black.
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[derive(Debug, Clone)]
pub struct FrameResources {
    pub framebuffers: Vec<vk::Framebuffer>,
    pub command_pool: vk::CommandPool,
    /// Freed with the pool.
    pub command_buffers: Vec<vk::CommandBuffer>,
}

impl FrameResources {
    pub fn new(
        gpu: &mut impl Gpu,
        ledger: &mut Ledger,
        chain: &PresentationChain,
        pipeline: &RenderPipelineState,
        graphics_family: u32,
    ) -> Result<Self, SetupError> {
        let mut framebuffers = Vec::with_capacity(chain.views.len());
        for view in &chain.views {
            let attachments = [*view];
            let framebuffer_ci = vk::FramebufferCreateInfo::default()
                .render_pass(pipeline.render_pass)
                .attachments(&attachments)
                .width(chain.extent.width)
                .height(chain.extent.height)
                .layers(1);
            let framebuffer = gpu
                .create_framebuffer(&framebuffer_ci)
                .at(Stage::Framebuffers)?;
            ledger.push(Owned::Framebuffer(framebuffer));
            framebuffers.push(framebuffer);
        }

        let pool_ci = vk::CommandPoolCreateInfo::default().queue_family_index(graphics_family);
        let command_pool = gpu
            .create_command_pool(&pool_ci)
            .at(Stage::CommandPool)?;
        ledger.push(Owned::CommandPool(command_pool));

        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(framebuffers.len() as u32);
        let command_buffers = gpu
            .allocate_command_buffers(&allocate_info)
            .at(Stage::CommandBuffers)?;

        for (&command_buffer, &framebuffer) in command_buffers.iter().zip(&framebuffers) {
            record_draw(gpu, command_buffer, framebuffer, chain.extent, pipeline)?;
        }
        debug!("recorded {} command buffers", command_buffers.len());
        info!("frame resources ready");

        Ok(Self {
            framebuffers,
            command_pool,
            command_buffers,
        })
    }
}

/// Clear, then draw three generated vertices once.
fn record_draw(
    gpu: &mut impl Gpu,
    command_buffer: vk::CommandBuffer,
    framebuffer: vk::Framebuffer,
    extent: vk::Extent2D,
    pipeline: &RenderPipelineState,
) -> Result<(), SetupError> {
    let begin_info = vk::CommandBufferBeginInfo::default();
    gpu.begin_command_buffer(command_buffer, &begin_info)
        .at(Stage::CommandBuffers)?;

    let clear_values = [vk::ClearValue {
        color: vk::ClearColorValue {
            float32: CLEAR_COLOR,
        },
    }];
    let render_pass_begin = vk::RenderPassBeginInfo::default()
        .render_pass(pipeline.render_pass)
        .framebuffer(framebuffer)
        .render_area(vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        })
        .clear_values(&clear_values);

    gpu.cmd_begin_render_pass(command_buffer, &render_pass_begin);
    gpu.cmd_bind_pipeline(command_buffer, pipeline.pipeline);
    gpu.cmd_draw(command_buffer, 3, 1, 0, 0);
    gpu.cmd_end_render_pass(command_buffer);

    gpu.end_command_buffer(command_buffer)
        .at(Stage::CommandBuffers)
}
