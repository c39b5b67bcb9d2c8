//! The compiled form of target passes. Operations are recorded in the same tagged-union
//! way draw commands are, and executed later by the chain against a `RenderVisitor`.

use std::sync::Arc;

use super::instance::InstanceId;
use super::pass::ClearPass;
use crate::math::prelude::Vector2;
use crate::video::assets::material::DEFAULT_SCHEME;
use crate::video::assets::quad::FullscreenQuad;
use crate::video::assets::render_state::{queues, RenderQueueId, StencilState};
use crate::video::backends::RenderTarget;

/// A set of render queue ids in `0..=queues::MAX`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct RenderQueueSet(u128);

impl RenderQueueSet {
    pub fn new() -> Self {
        RenderQueueSet(0)
    }

    #[inline]
    pub fn insert(&mut self, queue: RenderQueueId) {
        if queue <= queues::MAX {
            self.0 |= 1u128 << queue;
        }
    }

    /// Inserts every queue in `first..=last`.
    pub fn insert_range(&mut self, first: RenderQueueId, last: RenderQueueId) {
        for queue in first..=last.min(queues::MAX) {
            self.insert(queue);
        }
    }

    #[inline]
    pub fn contains(&self, queue: RenderQueueId) -> bool {
        queue <= queues::MAX && (self.0 & (1u128 << queue)) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Iterates the queues in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = RenderQueueId> {
        let bits = self.0;
        (0..=queues::MAX).filter(move |&v| (bits & (1u128 << v)) != 0)
    }
}

/// Draws the full-screen quad with a private material of an instance.
#[derive(Debug, Clone)]
pub struct QuadOperation {
    pub pass_id: u32,
    /// The instance that owns the private material.
    pub instance: InstanceId,
    /// Index of the private material in the owning instance.
    pub material: usize,
    pub quad: Arc<FullscreenQuad>,
}

#[derive(Debug, Clone)]
pub enum Operation {
    Clear(ClearPass),
    Stencil(StencilState),
    Quad(QuadOperation),
}

/// The operation batch compiled for one target.
#[derive(Debug, Clone)]
pub struct TargetOperation {
    pub target: RenderTarget,
    pub dimensions: Vector2<u32>,
    /// The render queue that operations appended now will run before.
    pub current_queue: RenderQueueId,
    pub visibility_mask: u32,
    pub lod_bias: f32,
    /// The render queues of scene drawn into this target.
    pub render_queues: RenderQueueSet,
    /// Operations tagged with the queue they must run before.
    pub operations: Vec<(RenderQueueId, Operation)>,
    pub find_visible_objects: bool,
    pub material_scheme: String,
    pub only_initial: bool,
    pub has_been_rendered: bool,
}

impl TargetOperation {
    pub fn new(target: RenderTarget, dimensions: Vector2<u32>) -> Self {
        TargetOperation {
            target,
            dimensions,
            current_queue: 0,
            visibility_mask: 0xFFFF_FFFF,
            lod_bias: 1.0,
            render_queues: RenderQueueSet::new(),
            operations: Vec::new(),
            find_visible_objects: false,
            material_scheme: DEFAULT_SCHEME.into(),
            only_initial: false,
            has_been_rendered: false,
        }
    }

    /// Appends an operation tagged with the current queue.
    #[inline]
    pub fn push(&mut self, operation: Operation) {
        self.operations.push((self.current_queue, operation));
    }
}
