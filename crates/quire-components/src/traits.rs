//! Trait definitions for component rendering.

use serde_json::Value;

/// Errors that can occur while rendering a component.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("Component not found: {0}")]
    NotFound(String),

    #[error("Failed to render component {name}: {message}")]
    Render { name: String, message: String },
}

/// Renders a named component template against a view context.
pub trait ComponentRenderer {
    /// Render `name` (for example `components/callout`) with `ctx`.
    fn render_component(&self, name: &str, ctx: &Value) -> Result<String, ComponentError>;
}

impl<F> ComponentRenderer for F
where
    F: Fn(&str, &Value) -> Result<String, ComponentError>,
{
    fn render_component(&self, name: &str, ctx: &Value) -> Result<String, ComponentError> {
        self(name, ctx)
    }
}
