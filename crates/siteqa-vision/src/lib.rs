//! Image question answering for siteqa
//!
//! Images are sent inline as `data:` URIs alongside a question, using the
//! same provider trait as the web answering path.

mod describer;
mod image;


pub use describer::{DEFAULT_PROMPT, ImageDescriber, PREAMBLE};
pub use image::{IMAGE_EXTENSIONS, ImageInput, list_images};

pub use siteqa_core::{Error, ImagePrompt, Result};
