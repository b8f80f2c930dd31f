//! Request parts sent to the model.

use std::fmt;

use crate::query::Query;

/// One unit of a multi-modal model request.
#[derive(Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Binary { bytes: Vec<u8>, mime_type: String },
}

impl Part {
    pub fn kind(&self) -> &'static str {
        match self {
            Part::Text(_) => "text",
            Part::Binary { .. } => "binary",
        }
    }
}

// Uploaded payloads can be megabytes; print their size instead.
impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Part::Binary { bytes, mime_type } => f
                .debug_struct("Binary")
                .field("len", &bytes.len())
                .field("mime_type", mime_type)
                .finish(),
        }
    }
}

/// Turn a query into its ordered part sequence: file first, then text.
pub fn build_parts(query: &Query) -> Vec<Part> {
    let mut parts = Vec::with_capacity(2);

    if let Some(upload) = &query.upload {
        parts.push(Part::Binary {
            bytes: upload.bytes.clone(),
            mime_type: upload.mime_type.clone(),
        });
    }

    if let Some(text) = &query.text {
        parts.push(Part::Text(text.clone()));
    }

    parts
}
