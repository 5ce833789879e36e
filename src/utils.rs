// src/utils.rs

/// Maps a file's extension to its image MIME type. Returns `None` for
/// anything outside the set the upload endpoint accepts.
pub fn image_mime_type(file_path: &str) -> Option<&'static str> {
    let extension = std::path::Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())?;

    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
