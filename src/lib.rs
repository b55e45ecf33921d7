//! Pascal VOC to COCO converter
//!
//! This library resizes an image set annotated with Pascal VOC XML files so that
//! every image fits within a maximum height and width, rescales the bounding boxes
//! accordingly and exports all annotations as a single COCO-style JSON file.

pub mod coco;
pub mod config;
pub mod conversion;
pub mod dataloader;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod resize;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{Args, CategoryMode, ResizeConfig, ResizeFilter};
pub use dataloader::{LoadImages, LoadedImage};
pub use error::{Error, Result};
pub use io::{setup_output_directories, write_coco_json, OutputDirs};
pub use pipeline::{process_dataset, process_image, Resizer};
pub use types::{Annotation, BoundingBox, CocoLabel, ImageRecord};

// COCO-specific exports
pub use coco::{Categories, Category, CocoWriter, Dataset};
