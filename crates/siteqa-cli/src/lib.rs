//! Terminal front end for siteqa

mod commands;
mod export;
mod shell;
mod ui;


pub use commands::Command;
pub use export::{ExportFormat, export_docx, export_lines, export_pdf, read_docx_paragraphs};
pub use shell::{Reply, Shell, StatusReport};
pub use ui::{display_banner, display_error, display_reply, handle_input_with_history, print_help};

// Re-export core types
pub use siteqa_core::{Error, Result};
