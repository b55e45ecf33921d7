use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Annotation, BoundingBox, CocoLabel, ImageRecord, VocAnnotation, VocBndBox};

/// Convert a corner-form box to center form `(cx, cy, w, h)`.
///
/// Integer division truncates toward zero.
pub fn xyxy_to_xywh(bndbox: &VocBndBox) -> BoundingBox {
    BoundingBox {
        x: (bndbox.xmin + bndbox.xmax) / 2,
        y: (bndbox.ymin + bndbox.ymax) / 2,
        width: bndbox.xmax - bndbox.xmin,
        height: bndbox.ymax - bndbox.ymin,
    }
}

/// Convert a parsed Pascal VOC document into the per-image COCO record.
///
/// The image id is the `filename` declared in the document. Both `width` and
/// `height` of the record come from `size.width`; the declared height is not read.
pub fn pascal_to_coco(voc: &VocAnnotation) -> CocoLabel {
    let image_id = voc.filename.clone();

    let annotations = voc
        .objects
        .iter()
        .enumerate()
        .map(|(id, object)| {
            let bbox = xyxy_to_xywh(&object.bndbox);
            debug!("{}: object {} `{}` -> {:?}", image_id, id, object.name, bbox);
            Annotation {
                id,
                image_id: image_id.clone(),
                category_id: object.name.clone(),
                bbox,
            }
        })
        .collect();

    CocoLabel {
        image: ImageRecord {
            id: image_id,
            filename: voc.filename.clone(),
            width: voc.size.width,
            height: voc.size.width,
        },
        annotations,
    }
}

/// Parse a Pascal VOC document from a string
pub fn parse_pascal_xml(content: &str) -> std::result::Result<VocAnnotation, serde_xml_rs::Error> {
    serde_xml_rs::from_str(content)
}

/// Open, parse and convert the Pascal VOC file at `path`
pub fn read_pascal_annotation(path: &Path) -> Result<CocoLabel> {
    let file = File::open(path).map_err(|source| Error::MissingAnnotation {
        path: path.to_path_buf(),
        source,
    })?;

    let voc: VocAnnotation =
        serde_xml_rs::from_reader(BufReader::new(file)).map_err(|source| Error::AnnotationParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(pascal_to_coco(&voc))
}
