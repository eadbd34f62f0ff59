use base64::{engine::general_purpose, Engine};

use crate::models::{ImageMime, ImagePayload};

/// A file offered for analysis, before any validation.
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub declared_type: String,
    pub bytes: Vec<u8>,
}

impl ImageCandidate {
    pub fn new(declared_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            declared_type: declared_type.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("unsupported image type '{0}', expected image/jpeg or image/png")]
    UnsupportedType(String),
    #[error("image file is empty")]
    Empty,
    #[error("malformed image payload: {0}")]
    Malformed(&'static str),
}

/// Accept a candidate file and embed it as a data URI.
pub fn accept(candidate: ImageCandidate) -> Result<ImagePayload, IntakeError> {
    let mime = ImageMime::from_declared(&candidate.declared_type).ok_or_else(|| {
        log::warn!("🚫 Rejected image with declared type '{}'", candidate.declared_type);
        IntakeError::UnsupportedType(candidate.declared_type.clone())
    })?;

    if candidate.bytes.is_empty() {
        return Err(IntakeError::Empty);
    }

    let encoded = general_purpose::STANDARD.encode(&candidate.bytes);
    let data_uri = format!("data:{};base64,{}", mime, encoded);

    log::debug!("📊 Image file size: {} bytes", candidate.bytes.len());
    log::debug!("🔄 Base64 encoded size: {} bytes", encoded.len());

    Ok(ImagePayload::new(mime, data_uri, candidate.bytes.len()))
}

/// Validate an already embedded payload (`data:<mime>;base64,<body>`).
pub fn parse_payload(data_uri: &str) -> Result<ImagePayload, IntakeError> {
    let data_uri = data_uri.trim();
    let rest = data_uri
        .strip_prefix("data:")
        .ok_or(IntakeError::Malformed("missing 'data:' prefix"))?;
    let (declared, body) = rest
        .split_once(',')
        .ok_or(IntakeError::Malformed("missing ',' before image body"))?;
    let declared = declared
        .strip_suffix(";base64")
        .ok_or(IntakeError::Malformed("body must be base64 encoded"))?;

    let mime = ImageMime::from_declared(declared)
        .ok_or_else(|| IntakeError::UnsupportedType(declared.to_string()))?;

    let bytes = general_purpose::STANDARD
        .decode(body)
        .map_err(|_| IntakeError::Malformed("body is not valid base64"))?;
    if bytes.is_empty() {
        return Err(IntakeError::Empty);
    }

    // Re-embed so the payload always carries the canonical MIME spelling.
    let canonical = format!("data:{};base64,{}", mime, body);
    Ok(ImagePayload::new(mime, canonical, bytes.len()))
}
