//! Resize-and-export pipeline
//!
//! Consumes the loader's items, downscales oversized images together with their
//! boxes, writes every image to `<outputdir>/images/<image_id>` and finally
//! writes the aggregated `coco.json`.

use image::DynamicImage;
use indicatif::ProgressBar;
use log::info;
use rayon::prelude::*;
use std::path::Path;

use crate::coco::{CocoWriter, Dataset};
use crate::config::{Args, ResizeConfig};
use crate::dataloader::{LoadImages, LoadedImage};
use crate::error::{Error, Result};
use crate::io::{setup_output_directories, write_coco_json, OutputDirs};
use crate::resize::{needs_resize, rescale_annotations, resize_image, target_dimensions, Dimensions};
use crate::types::{Annotation, CocoLabel, ImageRecord, ResizeStats};
use crate::utils::{create_io_thread_pool, create_progress_bar};

/// Result of processing one image, without its pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    pub image: ImageRecord,
    pub annotations: Vec<Annotation>,
    pub resized: bool,
}

/// Apply the resize decision to a label.
///
/// `actual` are the decoded image dimensions. Returns the updated label and the
/// target dimensions when a resize is needed; otherwise the label is returned
/// unchanged together with `None`.
pub fn transform_label(
    label: &CocoLabel,
    actual: Dimensions,
    config: &ResizeConfig,
) -> (CocoLabel, Option<Dimensions>) {
    if !needs_resize(actual, config) {
        return (label.clone(), None);
    }

    let target = target_dimensions(actual, config);
    let (new_width, new_height) = target;
    let transformed = CocoLabel {
        image: ImageRecord {
            width: new_width,
            height: new_height,
            ..label.image.clone()
        },
        annotations: rescale_annotations(&label.annotations, actual, target),
    };
    (transformed, Some(target))
}

fn shape_of(image: &DynamicImage) -> (u32, u32, u8) {
    (image.height(), image.width(), image.color().channel_count())
}

/// Transform one loaded image and write it to `images_dir`
pub fn process_image(
    item: LoadedImage,
    images_dir: &Path,
    config: &ResizeConfig,
) -> Result<ProcessedImage> {
    let LoadedImage { image, path, label } = item;
    info!(
        "Current image {} {:?} with {} annotations",
        path.display(),
        shape_of(&image),
        label.annotations.len()
    );

    let actual = (image.width(), image.height());
    let (label, target) = transform_label(&label, actual, config);

    let image = match target {
        Some(target) => {
            let resized = resize_image(&image, target, config);
            info!("Need resize, new shape {:?}", shape_of(&resized));
            resized
        }
        None => image,
    };

    let output_path = images_dir.join(&label.image.id);
    image.save(&output_path).map_err(|source| Error::ImageWrite {
        path: output_path.clone(),
        source,
    })?;

    Ok(ProcessedImage {
        image: label.image,
        annotations: label.annotations,
        resized: target.is_some(),
    })
}

/// Drives the loader through the pipeline and writes the final document
pub struct Resizer {
    loader: LoadImages,
    output_dirs: OutputDirs,
    config: ResizeConfig,
}

impl Resizer {
    pub fn new(loader: LoadImages, output_dirs: OutputDirs, config: ResizeConfig) -> Self {
        Self {
            loader,
            output_dirs,
            config,
        }
    }

    /// Process every image, write `coco.json` and return the written document
    pub fn resize(&self) -> Result<Dataset> {
        let pb = create_progress_bar(self.loader.len() as u64, "Resize");
        let mut writer = CocoWriter::new(self.config.categories);
        let mut stats = ResizeStats::new();

        if self.config.workers > 1 {
            for processed in self.process_parallel(&pb)? {
                stats.record(processed.resized, processed.annotations.len());
                writer.add_image(processed.image, processed.annotations);
            }
        } else {
            for item in self.loader.iter() {
                let processed = process_image(item?, &self.output_dirs.images_dir, &self.config)?;
                stats.record(processed.resized, processed.annotations.len());
                writer.add_image(processed.image, processed.annotations);
                pb.inc(1);
            }
        }
        pb.finish_with_message("Resize complete");

        info!(
            "Writing {} images and {} annotations to {}",
            writer.image_count(),
            writer.annotation_count(),
            self.output_dirs.coco_file.display()
        );
        let dataset = writer.build();
        write_coco_json(&self.output_dirs.coco_file, &dataset)?;
        stats.print_summary();

        Ok(dataset)
    }

    // Results come back in loader order; the first error aborts the run.
    fn process_parallel(&self, pb: &ProgressBar) -> Result<Vec<ProcessedImage>> {
        let thread_pool = create_io_thread_pool(self.config.workers)?;
        let images_dir = &self.output_dirs.images_dir;

        thread_pool.install(|| {
            (0..self.loader.len())
                .into_par_iter()
                .map(|index| {
                    let processed = self
                        .loader
                        .load(index)
                        .and_then(|item| process_image(item, images_dir, &self.config));
                    pb.inc(1);
                    processed
                })
                .collect()
        })
    }
}

/// Main processing pipeline driven by the command-line arguments
pub fn process_dataset(args: &Args) -> Result<Dataset> {
    let loader = LoadImages::new(&args.imagedir, &args.xmldir)?;
    info!(
        "Found {} images in {}",
        loader.len(),
        loader.source().display()
    );

    let output_dirs = setup_output_directories(&args.outputdir, args.create_dirs)?;
    let resizer = Resizer::new(loader, output_dirs, args.to_resize_config());
    resizer.resize()
}
