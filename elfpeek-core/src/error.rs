use std::io;
use std::path::PathBuf;

/// Errors produced while opening and resolving an ELF file.
///
/// Everything is validated at open time, so once an [`ElfFile`](crate::ElfFile)
/// exists none of its accessors can fail.
#[derive(thiserror::Error, Debug)]
pub enum ElfError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not an ELF file: {}", path.display())]
    NotAnElfFile { path: PathBuf },

    #[error("unsupported ELF class {class:#x}")]
    UnsupportedClass { class: u8 },

    #[error("malformed ELF: {0}")]
    FormatViolation(String),
}

/// Coarse classification of an [`ElfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The file could not be opened, read or mapped.
    IoFailure,
    /// The bytes are not a well-formed ELF object.
    FormatViolation,
}

impl ElfError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ElfError::NotFound { .. } | ElfError::Io { .. } => ErrorCategory::IoFailure,
            ElfError::NotAnElfFile { .. }
            | ElfError::UnsupportedClass { .. }
            | ElfError::FormatViolation(_) => ErrorCategory::FormatViolation,
        }
    }

    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            ElfError::NotFound { path }
        } else {
            ElfError::Io { path, source }
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        ElfError::FormatViolation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ElfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_maps_to_not_found() {
        let err = ElfError::from_io("/nope", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, ElfError::NotFound { .. }));
        assert_eq!(err.category(), ErrorCategory::IoFailure);
    }

    #[test]
    fn permission_denied_stays_io() {
        let err = ElfError::from_io("/root", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, ElfError::Io { .. }));
    }

    #[test]
    fn format_errors_share_a_category() {
        assert_eq!(
            ElfError::UnsupportedClass { class: 0 }.category(),
            ErrorCategory::FormatViolation
        );
        assert_eq!(
            ElfError::malformed("bad").category(),
            ErrorCategory::FormatViolation
        );
        assert_eq!(ElfError::malformed("bad").to_string(), "malformed ELF: bad");
    }
}
