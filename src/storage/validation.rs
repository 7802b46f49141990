//! Upload validation
//!
//! Decides whether a declared filename is acceptable, purely by name. There
//! is no content sniffing: a file named `pixels.png` is accepted no matter
//! what its bytes are, and a PNG named `pixels.exe` is rejected.

use crate::error::StorageError;

/// Extensions accepted for upload, lower-case.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Extract and whitelist the extension of a client-declared filename.
///
/// The declared name is reduced to its leaf (path separators stripped) and
/// cleared of control characters before the suffix after the last `.` is
/// lower-cased and checked against [`ALLOWED_EXTENSIONS`]. Empty names,
/// missing extensions, and non-member extensions are all rejected.
pub fn pick_extension(declared_filename: &str) -> Result<String, StorageError> {
    let name = sanitize_filename(declared_filename);
    if name.is_empty() {
        return Err(StorageError::InvalidFileType(declared_filename.to_string()));
    }

    let Some((_, suffix)) = name.rsplit_once('.') else {
        return Err(StorageError::InvalidFileType(declared_filename.to_string()));
    };

    let extension = suffix.to_ascii_lowercase();
    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(StorageError::InvalidFileType(declared_filename.to_string()))
    }
}

/// Content type for a whitelisted extension, for serving stored files.
pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Reduce a client-supplied name to a leaf with no control characters.
fn sanitize_filename(declared: &str) -> String {
    let leaf = declared.rsplit(['/', '\\']).next().unwrap_or("");
    leaf.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions_any_case() {
        for name in [
            "photo.jpg",
            "photo.JPG",
            "photo.jpeg",
            "photo.PnG",
            "photo.png",
            "photo.WEBP",
        ] {
            let extension = pick_extension(name).expect(name);
            assert_eq!(extension, extension.to_ascii_lowercase());
            assert!(ALLOWED_EXTENSIONS.contains(&extension.as_str()));
        }
    }

    #[test]
    fn test_disallowed_extensions_rejected() {
        for name in ["malware.exe", "notes.txt", "archive.tar.gz", "page.html"] {
            assert!(
                matches!(pick_extension(name), Err(StorageError::InvalidFileType(_))),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_missing_extension_rejected() {
        assert!(pick_extension("").is_err());
        assert!(pick_extension("noextension").is_err());
        assert!(pick_extension("trailingdot.").is_err());
    }

    #[test]
    fn test_path_components_stripped() {
        // Only the leaf decides; traversal prefixes don't smuggle a name in
        assert_eq!(pick_extension("../../etc/evil.png").expect("leaf"), "png");
        assert!(pick_extension("../../etc/passwd").is_err());
        assert!(pick_extension("dir/").is_err());
    }

    #[test]
    fn test_control_characters_removed() {
        assert_eq!(pick_extension("pho\u{0}to.p\u{1}ng").expect("sanitized"), "png");
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("jpg"), "image/jpeg");
        assert_eq!(content_type_for("jpeg"), "image/jpeg");
        assert_eq!(content_type_for("png"), "image/png");
        assert_eq!(content_type_for("webp"), "image/webp");
    }
}
