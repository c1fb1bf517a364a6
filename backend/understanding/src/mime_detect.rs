//! MIME type detection for page images.
//!
//! The model needs a MIME type for the inline image part. Magic bytes win over
//! the file extension; PNG is assumed when neither is conclusive.

use std::path::Path;

const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Detect an image MIME type from its leading bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some("image/tiff"),
        _ => None,
    }
}

/// Detect an image MIME type by file extension.
pub fn mime_from_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png"          => Some("image/png"),
        "gif"          => Some("image/gif"),
        "webp"         => Some("image/webp"),
        "bmp"          => Some("image/bmp"),
        "tiff" | "tif" => Some("image/tiff"),
        _              => None,
    }
}

/// Best-effort MIME type for an image payload.
pub fn detect_image_mime(bytes: &[u8], path: Option<&Path>) -> &'static str {
    sniff_image_mime(bytes)
        .or_else(|| path.and_then(mime_from_path))
        .unwrap_or(DEFAULT_IMAGE_MIME)
}
