use crate::defaults::CV_MIME_TYPE;
use crate::error::{MockviewError, Result};
use std::path::Path;

/// A CV document ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl CvFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: CV_MIME_TYPE.to_string(),
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Read a document from disk.
    ///
    /// # Errors
    /// `NoFileSelected` for an empty path, `Io` if the file can't be read.
    pub async fn load(path: &Path) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(MockviewError::NoFileSelected);
        }

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cv.pdf".to_string());
        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(document_mime_type)
            .unwrap_or(CV_MIME_TYPE);

        Ok(Self::new(file_name, bytes).with_mime_type(mime_type))
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn document_mime_type(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        "txt" => Some("text/plain"),
        _ => None,
    }
}
