use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Invalid page number: {0}")]
    InvalidPageNumber(usize),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Unsupported image encoding: {0}")]
    UnsupportedImage(String),

    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),
}

pub type Result<T> = std::result::Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_folio_error_display() {
        let error = FolioError::InvalidStructure("missing page tree".to_string());
        assert_eq!(error.to_string(), "Invalid PDF structure: missing page tree");

        let error = FolioError::InvalidPageNumber(12);
        assert_eq!(error.to_string(), "Invalid page number: 12");
    }

    #[test]
    fn test_folio_error_from_io_error() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let error = FolioError::from(io_error);

        match error {
            FolioError::Io(ref err) => assert_eq!(err.kind(), ErrorKind::NotFound),
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_open_error_names_the_path() {
        let error = FolioError::Open {
            path: PathBuf::from("/tmp/missing.pdf"),
            source: lopdf::Error::IO(IoError::new(ErrorKind::NotFound, "gone")),
        };
        assert!(error.to_string().contains("/tmp/missing.pdf"));
    }
}
