// Local avatar image selection.
//
// The user names an image file on disk; a successful pick yields the
// `file://` URI stored as the player's avatar override.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// File extensions accepted as avatar images (compared case-insensitively).
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "heic"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PickError {
    #[error("image selection cancelled")]
    Cancelled,

    #[error("permission denied reading {path}")]
    PermissionDenied { path: PathBuf },

    #[error("image not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a file: {path}")]
    NotAFile { path: PathBuf },

    #[error("unsupported image format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },
}

/// Validate a user-supplied image path and return its `file://` URI.
///
/// A blank path is a cancelled pick. The file must exist, be readable by
/// this process, and carry a known image extension.
pub fn pick_image(input: &str) -> Result<String, PickError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PickError::Cancelled);
    }

    let path = expand_home(trimmed);

    let metadata = std::fs::metadata(&path).map_err(|e| io_error(&path, e))?;
    if !metadata.is_file() {
        return Err(PickError::NotAFile { path });
    }
    if !has_image_extension(&path) {
        return Err(PickError::UnsupportedFormat { path });
    }

    // Metadata can be readable while the contents are not.
    File::open(&path).map_err(|e| io_error(&path, e))?;

    let absolute = path.canonicalize().map_err(|e| io_error(&path, e))?;
    Ok(format!("file://{}", absolute.display()))
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

fn expand_home(input: &str) -> PathBuf {
    if let Some(rest) = input.strip_prefix("~/") {
        if let Some(base) = directories::BaseDirs::new() {
            return base.home_dir().join(rest);
        }
    }
    PathBuf::from(input)
}

fn io_error(path: &Path, e: io::Error) -> PickError {
    let path = path.to_path_buf();
    match e.kind() {
        io::ErrorKind::NotFound => PickError::NotFound { path },
        io::ErrorKind::PermissionDenied => PickError::PermissionDenied { path },
        _ => PickError::Io {
            path,
            message: e.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn blank_input_is_cancelled() {
        assert_eq!(pick_image("   "), Err(PickError::Cancelled));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = pick_image("/no/such/avatar.png").unwrap_err();
        assert!(matches!(err, PickError::NotFound { .. }));
    }

    #[test]
    fn directory_is_rejected() {
        let dir = scratch("pitchside_avatar_dir.png");
        let err = pick_image(dir.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, PickError::NotAFile { .. }));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn non_image_extension_is_rejected() {
        let dir = scratch("pitchside_avatar_txt");
        let path = dir.join("notes.txt");
        fs::write(&path, "hello").unwrap();
        let err = pick_image(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, PickError::UnsupportedFormat { .. }));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn readable_image_yields_file_uri() {
        let dir = scratch("pitchside_avatar_ok");
        let path = dir.join("Face.PNG");
        fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
        let uri = pick_image(path.to_str().unwrap()).unwrap();
        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with("Face.PNG"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_image_is_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = scratch("pitchside_avatar_denied");
        let path = dir.join("locked.jpg");
        fs::write(&path, [0xff, 0xd8]).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores file modes; only assert when the open really fails.
        if File::open(&path).is_err() {
            let err = pick_image(path.to_str().unwrap()).unwrap_err();
            assert!(matches!(err, PickError::PermissionDenied { .. }));
        }

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        let _ = fs::remove_dir_all(&dir);
    }
}
