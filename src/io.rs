use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::coco::Dataset;
use crate::error::Result;
use crate::utils::ensure_output_directory;

pub const IMAGES_DIR_NAME: &str = "images";
pub const COCO_FILE_NAME: &str = "coco.json";

/// Paths of the produced outputs
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub output_dir: PathBuf,
    pub images_dir: PathBuf,
    pub coco_file: PathBuf,
}

impl OutputDirs {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            images_dir: output_dir.join(IMAGES_DIR_NAME),
            coco_file: output_dir.join(COCO_FILE_NAME),
        }
    }
}

/// Resolve the output layout and check that the images directory is usable
pub fn setup_output_directories(output_dir: &Path, create_dirs: bool) -> Result<OutputDirs> {
    let output_dirs = OutputDirs::new(output_dir);
    ensure_output_directory(&output_dirs.images_dir, create_dirs)?;
    Ok(output_dirs)
}

/// Write the dataset as JSON indented with four spaces
pub fn write_coco_json(path: &Path, dataset: &Dataset) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    dataset.serialize(&mut serializer)?;
    writer.flush()?;
    Ok(())
}

/// Read back a dataset written by [`write_coco_json`]
pub fn read_coco_json(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}
