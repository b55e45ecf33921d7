//! Image and annotation discovery
//!
//! Resolves an image source (file, directory or glob pattern) into a sorted list
//! of image files, pairs each one with its Pascal VOC sidecar and yields decoded
//! images together with their converted annotations, one at a time.

use glob::{glob_with, MatchOptions, Pattern};
use image::{DynamicImage, ImageReader};
use log::debug;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::conversion::read_pascal_annotation;
use crate::error::{Error, Result};
use crate::types::{get_image_extensions_set, CocoLabel, IMG_FORMATS};

/// One decoded image together with its source path and converted annotations.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub image: DynamicImage,
    pub path: PathBuf,
    pub label: CocoLabel,
}

/// Ordered, restartable source of [`LoadedImage`] items.
///
/// Only paths are held in memory; every image is decoded on demand.
#[derive(Debug, Clone)]
pub struct LoadImages {
    source: PathBuf,
    files: Vec<PathBuf>,
    label_files: Vec<PathBuf>,
}

impl LoadImages {
    /// Resolve `path` into image files and derive a label path for each of them
    pub fn new(path: &str, labels_path: &str) -> Result<Self> {
        let source = std::path::absolute(path)?;
        let files = resolve_files(&source)?;

        let images: Vec<PathBuf> = files.into_iter().filter(|file| is_image_file(file)).collect();
        if images.is_empty() {
            return Err(Error::configuration(format!(
                "No images found in {}. Supported formats are: {}",
                source.display(),
                IMG_FORMATS.join(", ")
            )));
        }

        let label_files = images
            .iter()
            .map(|image| img2label_path(image, labels_path))
            .collect();

        Ok(Self {
            source,
            files: images,
            label_files,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Load the image at `index` and its annotations
    pub fn load(&self, index: usize) -> Result<LoadedImage> {
        let (path, label_path) = self
            .files
            .get(index)
            .zip(self.label_files.get(index))
            .ok_or_else(|| {
                Error::configuration(format!(
                    "Image index {} out of range for {} images",
                    index,
                    self.files.len()
                ))
            })?;
        debug!("Loading {} with labels {}", path.display(), label_path.display());

        let label = read_pascal_annotation(label_path)?;
        let image = decode_image(path)?;

        Ok(LoadedImage {
            image,
            path: path.clone(),
            label,
        })
    }

    /// Iterate from the first image; every call starts over.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            loader: self,
            index: 0,
        }
    }
}

impl<'a> IntoIterator for &'a LoadImages {
    type Item = Result<LoadedImage>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a> {
    loader: &'a LoadImages,
    index: usize,
}

impl Iterator for Iter<'_> {
    type Item = Result<LoadedImage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.loader.len() {
            return None;
        }
        let item = self.loader.load(self.index);
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.loader.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Derive the annotation path of an image.
///
/// The last `/images/` segment of the path is replaced with `/<labels_path>/` and
/// the extension becomes `.xml`. Paths without an `images` segment only get the
/// new extension.
pub fn img2label_path(image_path: &Path, labels_path: &str) -> PathBuf {
    let image_segment = format!("{sep}images{sep}", sep = MAIN_SEPARATOR);
    let label_segment = format!(
        "{sep}{}{sep}",
        labels_path.trim_matches(|c: char| c == '/' || c == MAIN_SEPARATOR),
        sep = MAIN_SEPARATOR
    );

    let path = image_path.to_string_lossy();
    let substituted = match path.rfind(&image_segment) {
        Some(pos) => format!(
            "{}{}{}",
            &path[..pos],
            label_segment,
            &path[pos + image_segment.len()..]
        ),
        None => path.into_owned(),
    };

    PathBuf::from(substituted).with_extension("xml")
}

/// Case-insensitive match of the file extension against the supported formats
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| get_image_extensions_set().contains(&ext.to_lowercase()))
}

fn resolve_files(source: &Path) -> Result<Vec<PathBuf>> {
    let source_str = source.to_string_lossy();

    let mut files = if source_str.contains('*') {
        expand_glob(&source_str)?
    } else if source.is_dir() {
        let pattern = format!(
            "{}{}*.*",
            Pattern::escape(&source_str),
            MAIN_SEPARATOR
        );
        expand_glob(&pattern)?
    } else if source.is_file() {
        vec![source.to_path_buf()]
    } else {
        return Err(Error::configuration(format!(
            "{} does not exist",
            source.display()
        )));
    };

    // Plain string order, so `a-b/` sorts before `a/`
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(files)
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let entries = glob_with(pattern, options)
        .map_err(|e| Error::configuration(format!("Invalid glob pattern {}: {}", pattern, e)))?;

    Ok(entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect())
}

fn decode_image(path: &Path) -> Result<DynamicImage> {
    let decode_error = |source: image::ImageError| Error::ImageDecode {
        path: path.to_path_buf(),
        source,
    };

    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| decode_error(image::ImageError::IoError(e)))?
        .decode()
        .map_err(decode_error)
}
