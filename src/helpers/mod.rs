//! Helper functions shared by the renderers
//!
//! Base-path resolution, date formatting and small HTML builders used by the
//! Markdown pipeline, page templates and the generator.

mod assets;
mod date;
mod html;

pub use assets::*;
pub use date::*;
pub use html::*;
