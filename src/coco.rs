//! COCO output document
//!
//! The exported document has three arrays: `categories`, `images` and
//! `annotations`. Images and annotations are appended in processing order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::CategoryMode;
use crate::types::{Annotation, ImageRecord};

/// Single entry of the fixed `categories` stub
pub const PLACEHOLDER_CATEGORY: &str = "COCO_CATEGORIES";

/// COCO category information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub supercategory: String,
}

/// The `categories` array: either the fixed stub or categories derived from the labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Categories {
    Placeholder(Vec<String>),
    Derived(Vec<Category>),
}

impl Default for Categories {
    fn default() -> Self {
        Categories::Placeholder(vec![PLACEHOLDER_CATEGORY.to_string()])
    }
}

/// Complete output document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dataset {
    pub categories: Categories,
    pub images: Vec<ImageRecord>,
    pub annotations: Vec<Annotation>,
}

/// Accumulates images and annotations across the run
pub struct CocoWriter {
    mode: CategoryMode,
    images: Vec<ImageRecord>,
    annotations: Vec<Annotation>,
    category_names: Vec<String>,
    seen_categories: HashSet<String>,
}

impl CocoWriter {
    pub fn new(mode: CategoryMode) -> Self {
        Self {
            mode,
            images: Vec::new(),
            annotations: Vec::new(),
            category_names: Vec::new(),
            seen_categories: HashSet::new(),
        }
    }

    /// Append one processed image and its annotations
    pub fn add_image(&mut self, image: ImageRecord, annotations: Vec<Annotation>) {
        for annotation in &annotations {
            if self.seen_categories.insert(annotation.category_id.clone()) {
                self.category_names.push(annotation.category_id.clone());
            }
        }
        self.images.push(image);
        self.annotations.extend(annotations);
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    /// Build the complete document
    pub fn build(self) -> Dataset {
        let categories = match self.mode {
            CategoryMode::Placeholder => Categories::default(),
            // COCO uses 1-based indexing
            CategoryMode::Derived => Categories::Derived(
                self.category_names
                    .into_iter()
                    .enumerate()
                    .map(|(index, name)| Category {
                        id: (index + 1) as u32,
                        name,
                        supercategory: "none".to_string(),
                    })
                    .collect(),
            ),
        };

        Dataset {
            categories,
            images: self.images,
            annotations: self.annotations,
        }
    }
}
