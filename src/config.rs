use clap::{Parser, ValueEnum};
use image::imageops::FilterType;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MAX_HEIGHT: u32 = 450;
pub const DEFAULT_MAX_WIDTH: u32 = 800;

/// Command-line arguments for resizing a Pascal VOC dataset and exporting it as COCO JSON.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Image source: a directory, a single file or a glob pattern
    #[arg(long = "imagedir")]
    pub imagedir: String,

    /// Directory name substituted for the `images` segment to locate the XML labels
    #[arg(long = "xmldir")]
    pub xmldir: String,

    /// Output directory; resized images go to `<outputdir>/images`
    #[arg(long = "outputdir")]
    pub outputdir: PathBuf,

    /// Images taller than this are clamped to it
    #[arg(long = "max_height", default_value_t = DEFAULT_MAX_HEIGHT, value_parser = validate_dimension)]
    pub max_height: u32,

    /// Images wider than this are clamped to it
    #[arg(long = "max_width", default_value_t = DEFAULT_MAX_WIDTH, value_parser = validate_dimension)]
    pub max_width: u32,

    /// Resampling filter used when downscaling
    #[arg(long = "filter", value_enum, default_value = "lanczos3")]
    pub filter: ResizeFilter,

    /// Number of worker threads; 1 processes images sequentially
    #[arg(long = "workers", default_value_t = 1, value_parser = validate_workers)]
    pub workers: usize,

    /// How the `categories` field of coco.json is filled
    #[arg(long = "categories", value_enum, default_value = "placeholder")]
    pub categories: CategoryMode,

    /// Create `<outputdir>/images` when it does not exist
    #[arg(long = "create_dirs")]
    pub create_dirs: bool,
}

impl Args {
    /// Build the pipeline configuration from the parsed arguments
    pub fn to_resize_config(&self) -> ResizeConfig {
        ResizeConfig {
            max_height: self.max_height,
            max_width: self.max_width,
            filter: self.filter,
            categories: self.categories,
            workers: self.workers,
        }
    }
}

// Resampling filters exposed on the command line
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Content of the `categories` array in the exported document.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CategoryMode {
    /// The fixed `["COCO_CATEGORIES"]` stub
    Placeholder,
    /// Distinct labels in first-seen order with 1-based ids
    Derived,
}

/// Settings of the resize-and-export pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeConfig {
    pub max_height: u32,
    pub max_width: u32,
    pub filter: ResizeFilter,
    pub categories: CategoryMode,
    pub workers: usize,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            max_height: DEFAULT_MAX_HEIGHT,
            max_width: DEFAULT_MAX_WIDTH,
            filter: ResizeFilter::Lanczos3,
            categories: CategoryMode::Placeholder,
            workers: 1,
        }
    }
}

// Validate that a maximum dimension is a positive integer
pub fn validate_dimension(s: &str) -> Result<u32, String> {
    match u32::from_str(s) {
        Ok(val) if val > 0 => Ok(val),
        _ => Err("dimension must be a positive integer".to_string()),
    }
}

// Validate that at least one worker is requested
pub fn validate_workers(s: &str) -> Result<usize, String> {
    match usize::from_str(s) {
        Ok(val) if val >= 1 => Ok(val),
        _ => Err("workers must be at least 1".to_string()),
    }
}
