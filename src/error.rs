use std::path::PathBuf;
use thiserror::Error;

/// Every failure is fatal: the run stops at the first error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Missing annotation file {}: {source}", .path.display())]
    MissingAnnotation {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse annotation file {}: {source}", .path.display())]
    AnnotationParse {
        path: PathBuf,
        source: serde_xml_rs::Error,
    },
    #[error("Failed to decode image {}: {source}", .path.display())]
    ImageDecode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to write image {}: {source}", .path.display())]
    ImageWrite {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }
}
