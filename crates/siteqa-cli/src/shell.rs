//! Interactive session state and command dispatch

use std::path::PathBuf;
use tracing::debug;

use siteqa_core::{Error, LLMProvider, Result, WebResponse};
use siteqa_rag::{LoadSummary, SessionContext};
use siteqa_vision::{ImageDescriber, list_images};

use crate::Command;

/// Snapshot of the shell for the `status` command
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub url: Option<String>,
    pub records: usize,
    pub loaded_at: Option<String>,
    pub images: usize,
    pub has_response: bool,
}

/// What a command produced
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Loaded(LoadSummary),
    Answer(WebResponse),
    Description(String),
    Images(Vec<PathBuf>),
    Exported(PathBuf),
    Reset,
    Status(StatusReport),
    Help,
    Exit,
    Nothing,
}

/// Interactive shell over one session.
///
/// A failed command leaves everything here as it was.
pub struct Shell<L: LLMProvider> {
    session: SessionContext,
    describer: ImageDescriber<L>,
    last_response: Option<WebResponse>,
    gallery: Vec<PathBuf>,
}

impl<L: LLMProvider> Shell<L> {
    pub fn new(session: SessionContext, describer: ImageDescriber<L>) -> Self {
        Self {
            session,
            describer,
            last_response: None,
            gallery: Vec::new(),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn last_response(&self) -> Option<&WebResponse> {
        self.last_response.as_ref()
    }

    /// Parse and run one line of input
    pub async fn run_line(&mut self, line: &str) -> Result<Reply> {
        let command: Command = line.parse()?;
        self.run(command).await
    }

    pub async fn run(&mut self, command: Command) -> Result<Reply> {
        debug!(?command, "running command");

        match command {
            Command::Empty => Ok(Reply::Nothing),
            Command::Help => Ok(Reply::Help),
            Command::Exit => Ok(Reply::Exit),
            Command::Load(url) => {
                let summary = self.session.load_url(&url).await?;
                self.last_response = None;
                Ok(Reply::Loaded(summary))
            }
            Command::Ask(question) => {
                let response = self.session.ask(&question).await?;
                self.last_response = Some(response.clone());
                Ok(Reply::Answer(response))
            }
            Command::Image { path, question } => {
                let description = self.describer.describe_path(&path, question.as_deref()).await?;
                Ok(Reply::Description(description))
            }
            Command::Images(folder) => {
                let images = list_images(&folder)?;
                self.gallery = images.clone();
                Ok(Reply::Images(images))
            }
            Command::Pick { index, question } => {
                let path = self
                    .gallery
                    .get(index.wrapping_sub(1))
                    .cloned()
                    .ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "No image {index}; {} listed. Use 'images <folder>' first.",
                            self.gallery.len()
                        ))
                    })?;
                let description = self.describer.describe_path(&path, question.as_deref()).await?;
                Ok(Reply::Description(description))
            }
            Command::Export { format, path } => {
                let response = self.last_response.as_ref().ok_or_else(|| {
                    Error::InvalidInput("Nothing to export yet. Ask a question first.".to_string())
                })?;
                let bytes = format.render(&response.answer, &response.related)?;
                tokio::fs::write(&path, bytes)
                    .await
                    .map_err(|e| Error::Export(format!("{}: {e}", path.display())))?;
                Ok(Reply::Exported(path))
            }
            Command::Reset => {
                self.session.reset().await;
                self.last_response = None;
                Ok(Reply::Reset)
            }
            Command::Status => Ok(Reply::Status(self.status().await)),
        }
    }

    pub async fn status(&self) -> StatusReport {
        let site = self.session.current().await;
        StatusReport {
            url: site.as_ref().map(|s| s.url.clone()),
            records: site.as_ref().map(|s| s.index.records().len()).unwrap_or(0),
            loaded_at: site.as_ref().map(|s| s.loaded_at.to_rfc3339()),
            images: self.gallery.len(),
            has_response: self.last_response.is_some(),
        }
    }
}
