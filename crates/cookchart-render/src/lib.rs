//! CookChart Render Library
//!
//! Projects an editor session into a display list ([`Scene`]), keeps stored
//! heights in sync with measured content, and writes SVG.

pub mod bounds;
pub mod measure;
mod renderer;
pub mod scene;
pub mod svg;

pub use bounds::{EXPORT_PADDING, content_bounds, export_bounds};
pub use measure::{EstimatedMeasure, Measure, sync_editor_heights, sync_heights};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use scene::Scene;
pub use svg::SvgRenderer;
