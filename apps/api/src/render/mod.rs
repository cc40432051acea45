// Template Renderer: pure (document, template) → layout description, plus an HTML projection.
// Filtering and fallbacks are shared; only the descriptor table differs per template.

pub mod html;
pub mod layout;
pub mod renderer;

pub use html::{to_html, Theme};
pub use renderer::{render_document, render_with_selector, RenderedResume};
