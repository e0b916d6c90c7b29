//! Markdown serialization of the page tree.
//!
//! - [`escape`]: pure string helpers (line-start escaping, fence lengths)
//! - [`render`]: page tree → Markdown
//!
//! Rendering is recursive and refuses trees nested deeper than
//! [`MAX_DEPTH`]; callers decide how to degrade when it does.

mod escape;
mod render;

pub use escape::{calculate_fence_length, calculate_inline_code_ticks, escape_line_start};
pub use render::{MAX_DEPTH, RenderContext, RenderError, render_markdown};
