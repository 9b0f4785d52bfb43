//! Component slots for markdown content.
//!
//! Markdown bodies may embed components with a `{{> components/<name> }}` directive.
//! Rendering happens in two phases: [`render_components`] renders each component and
//! leaves an HTML comment marker in the markdown, then, once the markdown has been turned
//! into HTML, [`inject_components`] swaps every marker for its rendered fragment.

pub mod directive;
pub mod slots;
pub mod traits;

pub use directive::{parse_directives, ComponentDirective};
pub use slots::{inject_components, render_components, Placeholder, SlotDocument, Substitutions};
pub use traits::{ComponentError, ComponentRenderer};
