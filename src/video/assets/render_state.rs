use serde::{Deserialize, Serialize};

/// Identifier of a render queue. Queues are drained by the renderer once per target, in
/// increasing order.
pub type RenderQueueId = u8;

/// Well-known render queues.
pub mod queues {
    use super::RenderQueueId;

    pub const BACKGROUND: RenderQueueId = 0;
    pub const SKIES_EARLY: RenderQueueId = 5;
    pub const MAIN: RenderQueueId = 50;
    pub const SKIES_LATE: RenderQueueId = 95;
    pub const OVERLAY: RenderQueueId = 100;
    /// The largest queue id a render queue set could hold.
    pub const MAX: RenderQueueId = 127;
}

/// The buffers of a framebuffer that a clear touches.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameBuffers {
    pub color: bool,
    pub depth: bool,
    pub stencil: bool,
}

impl FrameBuffers {
    pub fn none() -> Self {
        FrameBuffers {
            color: false,
            depth: false,
            stencil: false,
        }
    }

    pub fn all() -> Self {
        FrameBuffers {
            color: true,
            depth: true,
            stencil: true,
        }
    }

    pub fn color_depth() -> Self {
        FrameBuffers {
            color: true,
            depth: true,
            stencil: false,
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        !(self.color || self.depth || self.stencil)
    }
}

impl Default for FrameBuffers {
    fn default() -> Self {
        FrameBuffers::color_depth()
    }
}

/// A pixel-wise comparison function.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Comparison {
    Never,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    Always,
}

/// Specifies what happens to the stencil buffer value when a test is resolved.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum StencilOperation {
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    IncrementWrap,
    DecrementWrap,
    Invert,
}

/// The complete stencil state of renderer.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StencilState {
    pub enabled: bool,
    pub comparison: Comparison,
    pub reference: u32,
    pub mask: u32,
    pub fail: StencilOperation,
    pub depth_fail: StencilOperation,
    pub pass: StencilOperation,
    /// Mirrors the operations for back faces, with increments and decrements swapped.
    pub two_sided: bool,
}

impl Default for StencilState {
    fn default() -> Self {
        StencilState {
            enabled: false,
            comparison: Comparison::Always,
            reference: 0,
            mask: 0xFFFF_FFFF,
            fail: StencilOperation::Keep,
            depth_fail: StencilOperation::Keep,
            pass: StencilOperation::Keep,
            two_sided: false,
        }
    }
}
