use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use rayon::ThreadPool;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::with_template(&format!(
        "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
        label
    ))
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Make sure an output directory exists.
///
/// An existing directory is left untouched; a missing one is created only when
/// `create` is set, otherwise this fails.
pub fn ensure_output_directory(path: &Path, create: bool) -> Result<PathBuf> {
    if path.is_dir() {
        return Ok(path.to_path_buf());
    }
    if !create {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("output directory {} does not exist", path.display()),
        )));
    }
    warn!("Directory {} does not exist. Creating it.", path.display());
    fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}

/// Build a thread pool for per-image work
pub fn create_io_thread_pool(workers: usize) -> Result<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|index| format!("pascal2coco-worker-{}", index))
        .build()
        .map_err(|e| Error::configuration(format!("Failed to build thread pool: {}", e)))
}
