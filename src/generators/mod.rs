pub mod base;
pub mod model_export;
pub mod renderer;
pub mod template_set;

pub use base::file_writer::{FileWriter, WriteOptions, WriteOutcome};
pub use base::templates::GlobalContext;
pub use model_export::export_model;
pub use renderer::{GeneratedFile, RenderOutcome, Renderer};
pub use template_set::{TemplateBinding, TemplateSet, TemplateSource};
