//! Image payloads and folder browsing

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};

use siteqa_core::{Error, Result};

/// File extensions offered when browsing a folder
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Raw image bytes plus their mime type
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub name: String,
}

impl ImageInput {
    /// Wrap in-memory bytes; rejects empty payloads and non-image types
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let mime = mime.into();
        let name = name.into();

        if bytes.is_empty() {
            return Err(Error::Image(format!("{name} is empty")));
        }
        if !mime.starts_with("image/") {
            return Err(Error::Image(format!("{name} is not an image ({mime})")));
        }

        Ok(Self { bytes, mime, name })
    }

    /// Read an image file, guessing its type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mime = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .ok_or_else(|| Error::Image(format!("cannot tell the type of {name}")))?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Image(format!("{}: {e}", path.display())))?;

        Self::new(bytes, mime, name)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Image files directly inside `folder`, sorted by path
pub fn list_images(folder: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let folder = folder.as_ref();
    if !folder.is_dir() {
        return Err(Error::Image(format!(
            "The specified folder does not exist: {}",
            folder.display()
        )));
    }

    let entries = std::fs::read_dir(folder)
        .map_err(|e| Error::Image(format!("{}: {e}", folder.display())))?;

    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_image_extension(path))
        .collect();
    images.sort();

    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        let image = ImageInput::new(b"abc".to_vec(), "image/png", "a.png").unwrap();
        assert_eq!(image.to_data_uri(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_rejects_empty_and_non_image() {
        let err = ImageInput::new(Vec::new(), "image/png", "a.png").unwrap_err();
        assert!(matches!(err, Error::Image(_)));

        let err = ImageInput::new(b"text".to_vec(), "text/plain", "a.txt").unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }

    #[test]
    fn test_extension_filter() {
        assert!(has_image_extension(Path::new("photo.JPG")));
        assert!(has_image_extension(Path::new("dir/scan.jpeg")));
        assert!(!has_image_extension(Path::new("notes.txt")));
        assert!(!has_image_extension(Path::new("README")));
    }
}
