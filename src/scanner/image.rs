use std::io::ErrorKind;
use std::path::Path;

use base64::Engine;

use crate::error::{Result, TallyError};

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub mime: &'static str,
    pub base64: String,
}

impl EncodedImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

pub fn mime_for(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        "gif" => Ok("image/gif"),
        "heic" => Ok("image/heic"),
        _ => Err(TallyError::UnsupportedImage(path.display().to_string())),
    }
}

pub fn encode_bytes(mime: &'static str, bytes: &[u8]) -> EncodedImage {
    EncodedImage {
        mime,
        base64: base64::engine::general_purpose::STANDARD.encode(bytes),
    }
}

pub fn encode_image(path: &Path) -> Result<EncodedImage> {
    let mime = mime_for(path)?;
    let bytes = std::fs::read(path).map_err(|e| TallyError::ImageAccess {
        path: path.display().to_string(),
        reason: match e.kind() {
            ErrorKind::PermissionDenied => "permission denied".to_string(),
            ErrorKind::NotFound => "file not found".to_string(),
            _ => e.to_string(),
        },
    })?;
    if bytes.is_empty() {
        return Err(TallyError::ImageAccess {
            path: path.display().to_string(),
            reason: "file is empty".to_string(),
        });
    }
    tracing::debug!(path = %path.display(), bytes = bytes.len(), mime, "encoded image");
    Ok(encode_bytes(mime, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_for(Path::new("r.JPG")).unwrap(), "image/jpeg");
        assert_eq!(mime_for(Path::new("r.png")).unwrap(), "image/png");
        assert!(matches!(
            mime_for(Path::new("notes.txt")),
            Err(TallyError::UnsupportedImage(_))
        ));
        assert!(mime_for(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_data_url() {
        let img = encode_bytes("image/png", b"abc");
        assert_eq!(img.base64, "YWJj");
        assert_eq!(img.data_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_encode_image_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.jpeg");
        std::fs::write(&path, [0xff, 0xd8, 0xff]).unwrap();
        let img = encode_image(&path).unwrap();
        assert_eq!(img.mime, "image/jpeg");
        assert_eq!(img.base64, "/9j/");
    }

    #[test]
    fn test_missing_file_is_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = encode_image(&dir.path().join("gone.png")).unwrap_err();
        assert!(matches!(
            err,
            TallyError::ImageAccess { ref reason, .. } if reason == "file not found"
        ));
    }

    #[test]
    fn test_empty_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, []).unwrap();
        assert!(matches!(encode_image(&path), Err(TallyError::ImageAccess { .. })));
    }
}
