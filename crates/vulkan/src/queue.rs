// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Queue
//!
//! Queue family roles.  A device needs one family that can draw and one that can present to the
//! target surface.  They are frequently the same family, and when they are not, the swapchain has
//! to be shared between them.

use std::collections::BTreeSet;

use ash::vk;

/// Partial result of scanning a queue family table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyRequirement {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilyRequirement {
    /// Scan `families` in index order, keeping the first graphics family and, independently, the
    /// first family for which `presents` returns true.  Stops once both are assigned, so
    /// `presents` is not called for later families.
    pub fn resolve(
        families: &[vk::QueueFamilyProperties],
        mut presents: impl FnMut(u32) -> bool,
    ) -> Self {
        let mut found = Self::default();
        for (i, family) in families.iter().enumerate() {
            let index = i as u32;
            if found.graphics.is_none() && family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
                found.graphics = Some(index);
            }
            if found.present.is_none() && presents(index) {
                found.present = Some(index);
            }
            if found.is_complete() {
                break;
            }
        }
        found
    }

    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }

    /// The resolved pair, once both roles are assigned.
    pub fn indices(&self) -> Option<QueueFamilyIndices> {
        Some(QueueFamilyIndices {
            graphics: self.graphics?,
            present: self.present?,
        })
    }
}

/// Both roles assigned.  Fixed after device selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilyIndices {
    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }

    /// Each distinct family once, ascending.
    pub fn unique(&self) -> Vec<u32> {
        BTreeSet::from([self.graphics, self.present])
            .into_iter()
            .collect()
    }

    /// One queue per unique family.  `priorities` must outlive the returned infos.
    pub fn queue_cis<'a>(&self, priorities: &'a [f32]) -> Vec<vk::DeviceQueueCreateInfo<'a>> {
        self.unique()
            .into_iter()
            .map(|index| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(index)
                    .queue_priorities(priorities)
            })
            .collect()
    }
}

/// Queues fetched from the logical device.  The device owns them; there is nothing to destroy.
#[derive(Debug, Clone, Copy)]
pub struct Queues {
    pub graphics: vk::Queue,
    pub present: vk::Queue,
}
