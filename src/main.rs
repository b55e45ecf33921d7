use clap::Parser;
use log::{error, info};

use pascal2coco::{process_dataset, Args};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Starting the Pascal VOC to COCO conversion process...");

    match process_dataset(&args) {
        Ok(dataset) => info!(
            "Conversion completed: {} images, {} annotations.",
            dataset.images.len(),
            dataset.annotations.len()
        ),
        Err(e) => {
            error!("Failed to process dataset: {}", e);
            std::process::exit(1);
        }
    }
}
