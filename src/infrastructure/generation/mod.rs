//! Generation infrastructure implementations

pub mod template_renderer;

pub use template_renderer::TeraClassRenderer;
