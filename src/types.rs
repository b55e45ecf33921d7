use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

// Supported image formats
pub const IMG_FORMATS: &[&str] = &[
    "bmp", "dng", "jpeg", "jpg", "mpo", "png", "tif", "tiff", "webp",
];

// Precomputed HashSet of image extensions for fast lookup
pub static IMAGE_EXTENSIONS_SET: OnceLock<HashSet<String>> = OnceLock::new();

/// Get the image extensions set
pub fn get_image_extensions_set() -> &'static HashSet<String> {
    IMAGE_EXTENSIONS_SET.get_or_init(|| IMG_FORMATS.iter().map(|ext| ext.to_lowercase()).collect())
}

/// Bounding box in pixels.
///
/// `x`/`y` hold the box center, not its top-left corner. Downstream consumers of
/// `coco.json` rely on this layout.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

// One labelled box belonging to an image
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub id: usize,
    pub image_id: String,
    pub category_id: String,
    pub bbox: BoundingBox,
}

// Image metadata as written to the `images` array
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub id: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// Per-image record produced by the loader from one Pascal VOC document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CocoLabel {
    pub image: ImageRecord,
    pub annotations: Vec<Annotation>,
}

// Pascal VOC `<annotation>` document
#[derive(Debug, Deserialize, Clone)]
pub struct VocAnnotation {
    pub filename: String,
    pub size: VocSize,
    #[serde(rename = "object", default)]
    pub objects: Vec<VocObject>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VocSize {
    #[serde(deserialize_with = "deserialize_dimension")]
    pub width: u32,
    /// Declared height. Never consulted when building the image record.
    #[serde(default)]
    pub height: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VocObject {
    pub name: String,
    pub bndbox: VocBndBox,
}

// Corner-form box as stored in Pascal VOC
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct VocBndBox {
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub xmin: i64,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub ymin: i64,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub xmax: i64,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub ymax: i64,
}

/// Parse a numeric XML text node. Decimal values are truncated toward zero.
///
/// Values outside the `i32` range are rejected, which keeps all later box
/// arithmetic within `i64`.
pub fn parse_coordinate(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let value = match raw.parse::<i64>() {
        Ok(value) => value,
        Err(_) => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value.abs() < 1e18 => value.trunc() as i64,
            _ => return None,
        },
    };
    i32::try_from(value).ok().map(i64::from)
}

fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_coordinate(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid coordinate `{}`", raw)))
}

fn deserialize_dimension<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_coordinate(&raw)
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| de::Error::custom(format!("invalid image dimension `{}`", raw)))
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone)]
pub struct ResizeStats {
    pub total_images: usize,
    pub resized_images: usize,
    pub total_annotations: usize,
}

impl ResizeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, resized: bool, annotations: usize) {
        self.total_images += 1;
        if resized {
            self.resized_images += 1;
        }
        self.total_annotations += annotations;
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Total images processed: {}", self.total_images);
        log::info!("Images resized: {}", self.resized_images);
        log::info!(
            "Images kept at original size: {}",
            self.total_images - self.resized_images
        );
        log::info!("Total annotations: {}", self.total_annotations);
    }
}
