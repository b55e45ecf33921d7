use image::DynamicImage;

use crate::config::ResizeConfig;
use crate::types::{Annotation, BoundingBox};

/// Image dimensions as `(width, height)`
pub type Dimensions = (u32, u32);

pub fn needs_resize(dimensions: Dimensions, config: &ResizeConfig) -> bool {
    let (width, height) = dimensions;
    height > config.max_height || width > config.max_width
}

/// Clamp each dimension independently. Aspect ratio is not preserved.
pub fn target_dimensions(dimensions: Dimensions, config: &ResizeConfig) -> Dimensions {
    let (width, height) = dimensions;
    (width.min(config.max_width), height.min(config.max_height))
}

// value * new / old, truncated toward zero and saturated to the i64 range
fn scale(value: i64, new: u32, old: u32) -> i64 {
    if old == 0 {
        return value;
    }
    let scaled = i128::from(value) * i128::from(new) / i128::from(old);
    i64::try_from(scaled).unwrap_or(if scaled < 0 { i64::MIN } else { i64::MAX })
}

/// Rescale a box from `from` to `to` dimensions.
///
/// `x` and `width` follow the width ratio, `y` and `height` the height ratio. The
/// stored numbers are scaled as-is, whichever anchor they describe.
pub fn rescale_bbox(bbox: &BoundingBox, from: Dimensions, to: Dimensions) -> BoundingBox {
    let (old_width, old_height) = from;
    let (new_width, new_height) = to;
    BoundingBox {
        x: scale(bbox.x, new_width, old_width),
        y: scale(bbox.y, new_height, old_height),
        width: scale(bbox.width, new_width, old_width),
        height: scale(bbox.height, new_height, old_height),
    }
}

pub fn rescale_annotation(annotation: &Annotation, from: Dimensions, to: Dimensions) -> Annotation {
    Annotation {
        bbox: rescale_bbox(&annotation.bbox, from, to),
        ..annotation.clone()
    }
}

pub fn rescale_annotations(
    annotations: &[Annotation],
    from: Dimensions,
    to: Dimensions,
) -> Vec<Annotation> {
    annotations
        .iter()
        .map(|annotation| rescale_annotation(annotation, from, to))
        .collect()
}

/// Resize to exactly `to` with the configured filter
pub fn resize_image(image: &DynamicImage, to: Dimensions, config: &ResizeConfig) -> DynamicImage {
    let (width, height) = to;
    image.resize_exact(width, height, config.filter.into())
}
