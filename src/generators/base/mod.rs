pub mod file_writer;
pub mod template_context;
pub mod templates;
pub mod type_visitor;
