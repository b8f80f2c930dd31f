//! User submissions: free text and/or one uploaded file.

use std::path::Path;

use crate::error::{GenzError, GenzResult};

/// File extensions the upload control accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "doc", "txt", "png", "jpg", "jpeg", "mp3", "wav"];

/// Fallback MIME type when nothing better is known.
const OCTET_STREAM: &str = "application/octet-stream";

/// An uploaded document, image or audio clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Create an upload, resolving the MIME type from the file name when the
    /// declared one is missing or generic.
    pub fn new(file_name: impl Into<String>, declared_mime: Option<&str>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = resolve_mime_type(&file_name, declared_mime);
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    /// Read an upload from disk.
    pub async fn from_path(path: &Path) -> GenzResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, None, bytes))
    }

    /// Lowercased extension of the original file name.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One analysis request as submitted by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub text: Option<String>,
    pub upload: Option<Upload>,
}

impl Query {
    /// Build a query, treating blank text as absent.
    pub fn new(text: Option<String>, upload: Option<Upload>) -> Self {
        let text = text.filter(|t| !t.trim().is_empty());
        Self { text, upload }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(Some(text.into()), None)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.upload.is_none()
    }

    /// Check the submission before anything is sent to the model.
    ///
    /// `max_upload_bytes` bounds the size of the uploaded file.
    pub fn validate(&self, max_upload_bytes: usize) -> GenzResult<()> {
        if self.is_empty() {
            return Err(GenzError::EmptySubmission);
        }

        if let Some(upload) = &self.upload {
            let ext = upload.extension().unwrap_or_default();
            if !ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
                return Err(GenzError::UnsupportedFileType(upload.file_name.clone()));
            }
            if upload.len() > max_upload_bytes {
                return Err(GenzError::UploadTooLarge {
                    size: upload.len(),
                    limit: max_upload_bytes,
                });
            }
        }

        Ok(())
    }
}

/// Pick the MIME type for an upload.
fn resolve_mime_type(file_name: &str, declared: Option<&str>) -> String {
    let declared = declared
        .map(|m| m.split(';').next().unwrap_or(m).trim())
        .filter(|m| !m.is_empty() && *m != OCTET_STREAM);

    match declared {
        Some(mime) => mime.to_string(),
        None => mime_from_file_name(file_name).to_string(),
    }
}

/// Detect MIME type from the file extension.
pub fn mime_from_file_name(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        _ => OCTET_STREAM,
    }
}
