//! Filename canonicalization.
//!
//! Every name coming from a client passes through [`canonical_filename`]
//! before it touches the filesystem, so a name can never leave its category
//! directory.

use thiserror::Error;

/// Longest filename accepted, in bytes (common filesystem limit).
pub const MAX_FILENAME_BYTES: usize = 255;

/// Why a filename was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameError {
    /// Empty or whitespace-only.
    #[error("filename cannot be empty")]
    Empty,
    /// Contains `/` or `\`.
    #[error("path separators are not allowed")]
    ContainsPathSeparator,
    /// Starts with a dot, which includes `.` and `..`.
    #[error("names starting with '.' are not allowed")]
    Hidden,
    /// Contains a NUL byte.
    #[error("null bytes are not allowed")]
    NullByte,
    /// Contains control characters such as CR or LF.
    #[error("control characters are not allowed")]
    ControlCharacter,
    /// Longer than [`MAX_FILENAME_BYTES`].
    #[error("filename is longer than {MAX_FILENAME_BYTES} bytes")]
    TooLong,
}

/// Check that `name` is a bare filename and return it unchanged.
///
/// The stored name of a blob is exactly the client's name, so nothing is
/// rewritten here; unsafe names are refused instead.
pub fn canonical_filename(name: &str) -> Result<&str, FilenameError> {
    if name.trim().is_empty() {
        return Err(FilenameError::Empty);
    }

    if name.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if name.contains('/') || name.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if name.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    if name.len() > MAX_FILENAME_BYTES {
        return Err(FilenameError::TooLong);
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass_unchanged() {
        assert_eq!(canonical_filename("calc.pdf"), Ok("calc.pdf"));
        assert_eq!(canonical_filename("Unit 2 notes.docx"), Ok("Unit 2 notes.docx"));
        assert_eq!(canonical_filename("微積分.pdf"), Ok("微積分.pdf"));
        assert_eq!(canonical_filename("a..b.txt"), Ok("a..b.txt"));
    }

    #[test]
    fn test_traversal_rejected() {
        assert_eq!(canonical_filename(".."), Err(FilenameError::Hidden));
        assert_eq!(canonical_filename("."), Err(FilenameError::Hidden));
        assert_eq!(
            canonical_filename("../etc/passwd"),
            Err(FilenameError::ContainsPathSeparator)
        );
        assert_eq!(
            canonical_filename("..\\boot.ini"),
            Err(FilenameError::ContainsPathSeparator)
        );
        assert_eq!(
            canonical_filename("notes/calc.pdf"),
            Err(FilenameError::ContainsPathSeparator)
        );
        assert_eq!(
            canonical_filename("/abs.pdf"),
            Err(FilenameError::ContainsPathSeparator)
        );
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(canonical_filename(""), Err(FilenameError::Empty));
        assert_eq!(canonical_filename("   "), Err(FilenameError::Empty));
    }

    #[test]
    fn test_control_characters_rejected() {
        assert_eq!(canonical_filename("a\0b"), Err(FilenameError::NullByte));
        assert_eq!(
            canonical_filename("a\r\nb.pdf"),
            Err(FilenameError::ControlCharacter)
        );
    }

    #[test]
    fn test_hidden_rejected() {
        assert_eq!(canonical_filename(".env"), Err(FilenameError::Hidden));
    }

    #[test]
    fn test_length_limit() {
        let ok = "a".repeat(MAX_FILENAME_BYTES);
        assert!(canonical_filename(&ok).is_ok());
        let long = "a".repeat(MAX_FILENAME_BYTES + 1);
        assert_eq!(canonical_filename(&long), Err(FilenameError::TooLong));
    }
}
