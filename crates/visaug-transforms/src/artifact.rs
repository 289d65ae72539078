//! Self-contained pipeline artifacts.
//!
//! Layout:
//!
//! ```text
//! bytes 0..4   magic "VAUG"
//! bytes 4..6   format version, u16 little endian
//! bytes 6..    UTF-8 JSON: {"transform": <tagged transform tree>}
//! ```
//!
//! Loading checks the magic and version, deserializes, then validates the
//! tree, so a loaded artifact is always ready to apply.
//!
//! ```rust
//! use visaug_transforms::{artifact, Transform, RandomHorizontalFlip};
//!
//! let t = Transform::compose(vec![RandomHorizontalFlip::default().into()]);
//! let bytes = artifact::to_bytes(&t).unwrap();
//! assert_eq!(&bytes[..4], b"VAUG");
//! assert_eq!(artifact::from_bytes(&bytes).unwrap(), t);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TransformError, TransformResult};
use crate::transform::Transform;

/// File magic.
pub const MAGIC: [u8; 4] = *b"VAUG";

/// Current format version.
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = 6;

#[derive(Serialize)]
struct BodyRef<'a> {
    transform: &'a Transform,
}

#[derive(Deserialize)]
struct Body {
    transform: Transform,
}

/// Parsed fixed-size header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactHeader {
    /// Format version.
    pub version: u16,
    /// Length of the JSON body in bytes.
    pub body_len: usize,
}

/// Serializes `transform` into an artifact.
pub fn to_bytes(transform: &Transform) -> TransformResult<Vec<u8>> {
    let body = serde_json::to_vec(&BodyRef { transform })?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Reads and checks the header.
///
/// # Errors
///
/// [`TransformError::Artifact`] for short input, wrong magic or an
/// unsupported version.
pub fn read_header(bytes: &[u8]) -> TransformResult<ArtifactHeader> {
    if bytes.len() < HEADER_LEN {
        return Err(TransformError::Artifact(format!(
            "need at least {HEADER_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    if bytes[..4] != MAGIC {
        return Err(TransformError::Artifact(format!("bad magic {:?}", &bytes[..4])));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != FORMAT_VERSION {
        return Err(TransformError::Artifact(format!(
            "unsupported format version {version}, expected {FORMAT_VERSION}"
        )));
    }
    Ok(ArtifactHeader { version, body_len: bytes.len() - HEADER_LEN })
}

/// Loads and validates a transform from artifact bytes.
pub fn from_bytes(bytes: &[u8]) -> TransformResult<Transform> {
    let header = read_header(bytes)?;
    let body: Body = serde_json::from_slice(&bytes[HEADER_LEN..])?;
    body.transform.validate()?;
    debug!(version = header.version, body_len = header.body_len, "loaded artifact");
    Ok(body.transform)
}

/// Writes an artifact file.
pub fn save(transform: &Transform, path: impl AsRef<Path>) -> TransformResult<()> {
    let path = path.as_ref();
    fs::write(path, to_bytes(transform)?)?;
    debug!(path = %path.display(), "wrote artifact");
    Ok(())
}

/// Reads an artifact file.
///
/// # Errors
///
/// [`TransformError::NotFound`] if `path` does not exist, plus everything
/// [`from_bytes`] reports.
pub fn load(path: impl AsRef<Path>) -> TransformResult<Transform> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TransformError::NotFound { path: path.to_path_buf() });
    }
    from_bytes(&fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometric::{RandomRotation, Resize};
    use crate::params::Size;

    fn pipeline() -> Transform {
        Transform::compose(vec![Resize::new(Size::Single(16)).into(), RandomRotation::new(15.0).into()])
    }

    #[test]
    fn test_layout() {
        let bytes = to_bytes(&pipeline()).unwrap();
        assert_eq!(&bytes[..4], b"VAUG");
        assert_eq!(&bytes[4..6], &[1, 0]);
        let json: serde_json::Value = serde_json::from_slice(&bytes[6..]).unwrap();
        assert_eq!(json["transform"]["type"], "compose");
        assert_eq!(read_header(&bytes).unwrap().body_len, bytes.len() - 6);
    }

    #[test]
    fn test_roundtrip() {
        let bytes = to_bytes(&pipeline()).unwrap();
        assert_eq!(from_bytes(&bytes).unwrap(), pipeline());
    }

    #[test]
    fn test_rejects_bad_header() {
        let mut bytes = to_bytes(&pipeline()).unwrap();
        assert!(matches!(read_header(&bytes[..3]), Err(TransformError::Artifact(_))));
        bytes[4] = 9;
        assert!(matches!(from_bytes(&bytes), Err(TransformError::Artifact(_))));
        bytes[0] = b'X';
        assert!(matches!(from_bytes(&bytes), Err(TransformError::Artifact(_))));
    }

    #[test]
    fn test_validates_on_load() {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(br#"{"transform": {"type": "random_horizontal_flip", "p": 3.0}}"#);
        let err = from_bytes(&bytes).unwrap_err();
        assert!(matches!(err.kind(), Some(visaug_core::Error::InvalidArgument(_))));
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.vaug");
        save(&pipeline(), &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), to_bytes(&pipeline()).unwrap());
        assert_eq!(load(&path).unwrap(), pipeline());
    }

    #[test]
    fn test_missing_file() {
        let err = load("/definitely/not/here.vaug").unwrap_err();
        assert!(matches!(err, TransformError::NotFound { .. }));
    }
}
