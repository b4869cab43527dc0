//! Request shaping: turn decoded content plus task fields into the JSON
//! payload the engine receives.
//!
//! Exactly one content carrier is ever populated. "No document at all" is a
//! legal shape ([`PayloadContent::Absent`]) — flows that allow it get an
//! explicit `"no content provided"` marker in the wire payload so the prompt
//! can answer informatively instead of the client hard-failing when, say,
//! only a filename is available.

use crate::pipeline::decode::DocumentContent;
use serde_json::{json, Map, Value};

/// The single content carrier of a shaped request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadContent {
    /// Binary media forwarded as its original data-URI.
    Media { mime: String, data_uri: String },
    /// Decoded text.
    Text(String),
    /// No document content; made explicit on the wire.
    Absent,
}

impl From<DocumentContent> for PayloadContent {
    fn from(content: DocumentContent) -> Self {
        match content {
            DocumentContent::Media { mime, data_uri } => PayloadContent::Media { mime, data_uri },
            DocumentContent::Text(text) => PayloadContent::Text(text),
        }
    }
}

/// A fully shaped engine request: one content carrier, optional filename,
/// and the flow's task-specific fields.
#[derive(Debug, Clone)]
pub struct ShapedRequest {
    pub content: PayloadContent,
    pub file_name: Option<String>,
    /// Task-specific fields merged into the top-level wire object.
    pub fields: Map<String, Value>,
}

impl ShapedRequest {
    /// Shape a request around decoded document content.
    pub fn from_content(content: DocumentContent) -> Self {
        Self {
            content: content.into(),
            file_name: None,
            fields: Map::new(),
        }
    }

    /// Shape a request with no document at all.
    pub fn without_document() -> Self {
        Self {
            content: PayloadContent::Absent,
            file_name: None,
            fields: Map::new(),
        }
    }

    pub fn with_file_name(mut self, name: Option<String>) -> Self {
        self.file_name = name;
        self
    }

    /// Attach a task-specific field to the wire payload.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Serialize to the engine wire payload.
    ///
    /// The `document` key is always present; its variant is tagged so the
    /// prompt-construction stage can branch exhaustively, and the absent
    /// case carries a human-readable note rather than a null the template
    /// could gloss over.
    pub fn to_payload(&self) -> Value {
        let document = match &self.content {
            PayloadContent::Media { mime, data_uri } => json!({
                "kind": "media",
                "mime": mime,
                "dataUri": data_uri,
            }),
            PayloadContent::Text(text) => json!({
                "kind": "text",
                "text": text,
            }),
            PayloadContent::Absent => json!({
                "kind": "absent",
                "note": "no content provided",
            }),
        };

        let mut object = Map::new();
        object.insert("document".into(), document);
        if let Some(ref name) = self.file_name {
            object.insert("fileName".into(), Value::String(name.clone()));
        }
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}
