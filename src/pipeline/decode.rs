//! Document decoding: normalise an encoded document reference into content
//! the engine accepts.
//!
//! ## Why a sum type instead of a flag?
//!
//! The content class is resolved exactly once, here, into
//! [`DocumentContent`]. Downstream stages match on the variant exhaustively,
//! so "media flag set but payload absent" cannot be represented. Media
//! payloads pass through bit-identical (the engine consumes data-URIs
//! directly); text payloads are base64-decoded once and carried as UTF-8.

use crate::error::ExtractError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// `data:<content-type>;base64,<payload>` — the only accepted reference form.
static DATA_URI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:([^;,]+);base64,(.*)$").expect("valid regex"));

/// Content types the engine ingests as raw media, unmodified.
const BINARY_MEDIA_TYPES: [&str; 6] = [
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
    "image/heif",
    "application/pdf",
];

/// Content types decoded to text before the engine sees them.
const DECODABLE_TEXT_TYPES: [&str; 1] = ["text/plain"];

/// A user-supplied document: an encoded payload, raw text, or both absent
/// (rejected by [`decode_document`] for document-bearing flows).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct DocumentReference {
    /// Self-describing `data:<content-type>;base64,<payload>` string.
    pub encoded_payload: Option<String>,
    /// Already-decoded plain text, used when no encoded payload is given.
    pub raw_text: Option<String>,
    /// Original filename, forwarded to the engine as context only.
    pub file_name: Option<String>,
}

impl DocumentReference {
    /// Reference carrying an encoded data-URI payload.
    pub fn encoded(payload: impl Into<String>) -> Self {
        Self {
            encoded_payload: Some(payload.into()),
            ..Self::default()
        }
    }

    /// Reference carrying plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            raw_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

/// The normalized category a document lands in before engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    /// Passed to the engine as-is (images, PDF).
    BinaryMedia,
    /// Base64-decoded to UTF-8 text first.
    DecodableText,
    /// Rejected before any engine call.
    Unsupported,
}

/// Classify a declared content type against the fixed membership tables.
///
/// Matching is on the literal `<content-type>` token — `text/plain;charset=…`
/// deviates from the reference format and never reaches this function.
pub fn classify(mime: &str) -> ContentClass {
    if BINARY_MEDIA_TYPES.contains(&mime) {
        ContentClass::BinaryMedia
    } else if DECODABLE_TEXT_TYPES.contains(&mime) {
        ContentClass::DecodableText
    } else {
        ContentClass::Unsupported
    }
}

/// Normalized document content, resolved once by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
    /// Binary media forwarded as the original data-URI, unchanged.
    Media { mime: String, data_uri: String },
    /// Decoded UTF-8 text.
    Text(String),
}

/// Decode a [`DocumentReference`] into normalised [`DocumentContent`].
///
/// Pure function of its input: no I/O, no engine call. All input errors are
/// raised here, before any retry budget is spent.
///
/// # Errors
/// - [`ExtractError::MalformedInput`] — payload does not match the data-URI form
/// - [`ExtractError::UnsupportedFormat`] — content type outside the supported sets
/// - [`ExtractError::UndecodableText`] — text/plain payload is not valid base64/UTF-8
/// - [`ExtractError::MissingDocument`] — neither payload nor raw text present
pub fn decode_document(reference: &DocumentReference) -> Result<DocumentContent, ExtractError> {
    if let Some(ref payload) = reference.encoded_payload {
        return decode_encoded(payload);
    }

    if let Some(ref text) = reference.raw_text {
        // Raw text skips classification entirely.
        return Ok(DocumentContent::Text(text.clone()));
    }

    Err(ExtractError::MissingDocument)
}

fn decode_encoded(payload: &str) -> Result<DocumentContent, ExtractError> {
    let captures = DATA_URI_RE
        .captures(payload)
        .ok_or_else(|| ExtractError::MalformedInput {
            detail: describe_malformed(payload),
        })?;

    let mime = &captures[1];
    let body = &captures[2];

    match classify(mime) {
        ContentClass::BinaryMedia => {
            debug!("Classified '{}' as binary media ({} bytes)", mime, payload.len());
            Ok(DocumentContent::Media {
                mime: mime.to_string(),
                data_uri: payload.to_string(),
            })
        }
        ContentClass::DecodableText => {
            let bytes = STANDARD
                .decode(body)
                .map_err(|e| ExtractError::UndecodableText {
                    detail: format!("invalid base64: {e}"),
                })?;
            let text = String::from_utf8(bytes).map_err(|e| ExtractError::UndecodableText {
                detail: e.to_string(),
            })?;
            debug!("Decoded '{}' payload to {} chars of text", mime, text.len());
            Ok(DocumentContent::Text(text))
        }
        ContentClass::Unsupported => Err(ExtractError::unsupported(mime)),
    }
}

/// Keep the malformed-input diagnostic short; payloads can be megabytes.
fn describe_malformed(payload: &str) -> String {
    let head: String = payload.chars().take(32).collect();
    if payload.len() > 32 {
        format!("reference starts with '{head}…'")
    } else {
        format!("reference is '{head}'")
    }
}
