#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use pascal2coco::dataloader::img2label_path;
    use pascal2coco::io::read_coco_json;
    use pascal2coco::{
        process_dataset, setup_output_directories, Args, BoundingBox, Categories, CategoryMode, Error,
        LoadImages, ResizeConfig, ResizeFilter, Resizer,
    };
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    // (name, xmin, ymin, xmax, ymax)
    type Object<'a> = (&'a str, i64, i64, i64, i64);

    struct Fixture {
        _temp_dir: TempDir,
        root: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let root = temp_dir.path().to_path_buf();
            fs::create_dir_all(root.join("images")).unwrap();
            fs::create_dir_all(root.join("labels")).unwrap();
            fs::create_dir_all(root.join("out/images")).unwrap();
            Self {
                _temp_dir: temp_dir,
                root,
            }
        }

        fn images_dir(&self) -> PathBuf {
            self.root.join("images")
        }

        fn output_dir(&self) -> PathBuf {
            self.root.join("out")
        }

        fn add_image(&self, file_name: &str, width: u32, height: u32, objects: &[Object]) {
            RgbImage::from_pixel(width, height, Rgb([40, 80, 120]))
                .save(self.images_dir().join(file_name))
                .unwrap();
            let stem = Path::new(file_name).file_stem().unwrap().to_str().unwrap();
            write_xml(
                &self.root.join("labels").join(format!("{}.xml", stem)),
                file_name,
                width,
                height,
                objects,
            );
        }

        fn args(&self) -> Args {
            Args {
                imagedir: self.images_dir().to_string_lossy().into_owned(),
                xmldir: "labels".to_string(),
                outputdir: self.output_dir(),
                max_height: 450,
                max_width: 800,
                filter: ResizeFilter::Lanczos3,
                workers: 1,
                categories: CategoryMode::Placeholder,
                create_dirs: false,
            }
        }
    }

    fn write_xml(path: &Path, file_name: &str, width: u32, height: u32, objects: &[Object]) {
        let mut xml = format!(
            "<annotation>\n    <folder>images</folder>\n    <filename>{}</filename>\n    <size>\n        <width>{}</width>\n        <height>{}</height>\n        <depth>3</depth>\n    </size>\n",
            file_name, width, height
        );
        for (name, xmin, ymin, xmax, ymax) in objects {
            xml.push_str(&format!(
                "    <object>\n        <name>{}</name>\n        <bndbox>\n            <xmin>{}</xmin>\n            <ymin>{}</ymin>\n            <xmax>{}</xmax>\n            <ymax>{}</ymax>\n        </bndbox>\n    </object>\n",
                name, xmin, ymin, xmax, ymax
            ));
        }
        xml.push_str("</annotation>\n");
        fs::write(path, xml).unwrap();
    }

    #[test]
    fn test_clamped_resize_end_to_end() {
        let fixture = Fixture::new();
        fixture.add_image("big.png", 1000, 900, &[("car", 450, 405, 550, 495)]);

        let dataset = process_dataset(&fixture.args()).unwrap();

        assert_eq!(dataset.images.len(), 1);
        assert_eq!(dataset.images[0].width, 800);
        assert_eq!(dataset.images[0].height, 450);
        assert_eq!(
            dataset.annotations[0].bbox,
            BoundingBox {
                x: 400,
                y: 225,
                width: 80,
                height: 45,
            }
        );

        let written = fixture.output_dir().join("images/big.png");
        assert_eq!(image::image_dimensions(&written).unwrap(), (800, 450));

        let from_disk = read_coco_json(&fixture.output_dir().join("coco.json")).unwrap();
        assert_eq!(from_disk, dataset);
    }

    #[test]
    fn test_small_image_is_copied_unchanged() {
        let fixture = Fixture::new();
        fixture.add_image("small.png", 640, 400, &[("dog", 10, 20, 30, 60)]);

        let dataset = process_dataset(&fixture.args()).unwrap();

        // Both dimensions of the record come from the declared width
        assert_eq!(dataset.images[0].width, 640);
        assert_eq!(dataset.images[0].height, 640);
        assert_eq!(
            dataset.annotations[0].bbox,
            BoundingBox {
                x: 20,
                y: 40,
                width: 20,
                height: 40,
            }
        );

        let written = fixture.output_dir().join("images/small.png");
        assert_eq!(image::image_dimensions(&written).unwrap(), (640, 400));
    }

    #[test]
    fn test_output_preserves_sorted_path_order() {
        let fixture = Fixture::new();
        for name in ["c.png", "a.png", "b.png"] {
            fixture.add_image(
                name,
                32,
                24,
                &[("car", 0, 0, 10, 10), ("person", 5, 5, 15, 20)],
            );
        }

        let dataset = process_dataset(&fixture.args()).unwrap();

        let image_ids: Vec<&str> = dataset.images.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(image_ids, vec!["a.png", "b.png", "c.png"]);

        let annotation_keys: Vec<(&str, usize)> = dataset
            .annotations
            .iter()
            .map(|a| (a.image_id.as_str(), a.id))
            .collect();
        assert_eq!(
            annotation_keys,
            vec![
                ("a.png", 0),
                ("a.png", 1),
                ("b.png", 0),
                ("b.png", 1),
                ("c.png", 0),
                ("c.png", 1),
            ]
        );
    }

    #[test]
    fn test_parallel_workers_match_sequential_output() {
        let fixture = Fixture::new();
        for (index, name) in ["e.png", "d.png", "c.png", "b.png", "a.png"].iter().enumerate() {
            let width = 700 + index as u32 * 100;
            fixture.add_image(name, width, 500, &[("car", 100, 100, 300, 200)]);
        }

        let sequential = process_dataset(&fixture.args()).unwrap();

        let mut args = fixture.args();
        args.workers = 3;
        let parallel = process_dataset(&args).unwrap();

        assert_eq!(parallel, sequential);
        let image_ids: Vec<&str> = parallel.images.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(image_ids, vec!["a.png", "b.png", "c.png", "d.png", "e.png"]);
    }

    #[test]
    fn test_no_images_is_configuration_error() {
        let fixture = Fixture::new();
        fs::write(fixture.images_dir().join("notes.txt"), "not an image").unwrap();

        let result = LoadImages::new(&fixture.images_dir().to_string_lossy(), "labels");
        assert!(matches!(result, Err(Error::Configuration(_))));

        let result = process_dataset(&fixture.args());
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert!(!fixture.output_dir().join("coco.json").exists());
    }

    #[test]
    fn test_nonexistent_source_is_configuration_error() {
        let fixture = Fixture::new();
        let missing = fixture.root.join("nowhere");

        let result = LoadImages::new(&missing.to_string_lossy(), "labels");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_missing_annotation_aborts() {
        let fixture = Fixture::new();
        fixture.add_image("a.png", 20, 20, &[("car", 0, 0, 5, 5)]);
        RgbImage::new(20, 20)
            .save(fixture.images_dir().join("b.png"))
            .unwrap();

        let result = process_dataset(&fixture.args());

        assert!(matches!(result, Err(Error::MissingAnnotation { .. })));
        // Images written before the failure stay on disk
        assert!(fixture.output_dir().join("images/a.png").exists());
        assert!(!fixture.output_dir().join("coco.json").exists());
    }

    #[test]
    fn test_unparsable_annotation_aborts() {
        let fixture = Fixture::new();
        fixture.add_image("a.png", 20, 20, &[("car", 0, 0, 5, 5)]);
        fs::write(fixture.root.join("labels/a.xml"), "<annotation><filename>").unwrap();

        let result = process_dataset(&fixture.args());
        assert!(matches!(result, Err(Error::AnnotationParse { .. })));
    }

    #[test]
    fn test_corrupt_image_aborts() {
        let fixture = Fixture::new();
        fs::write(fixture.images_dir().join("broken.png"), b"definitely not a png").unwrap();
        write_xml(
            &fixture.root.join("labels/broken.xml"),
            "broken.png",
            20,
            20,
            &[("car", 0, 0, 5, 5)],
        );

        let result = process_dataset(&fixture.args());
        assert!(matches!(result, Err(Error::ImageDecode { .. })));
    }

    #[test]
    fn test_missing_output_images_dir() {
        let fixture = Fixture::new();
        fixture.add_image("a.png", 20, 20, &[("car", 0, 0, 5, 5)]);
        let mut args = fixture.args();
        args.outputdir = fixture.root.join("fresh");

        let result = process_dataset(&args);
        assert!(matches!(result, Err(Error::Io(_))));

        args.create_dirs = true;
        let dataset = process_dataset(&args).unwrap();
        assert_eq!(dataset.images.len(), 1);
        assert!(fixture.root.join("fresh/images/a.png").exists());
        assert!(fixture.root.join("fresh/coco.json").exists());
    }

    #[test]
    fn test_coco_json_layout() {
        let fixture = Fixture::new();
        fixture.add_image("a.png", 20, 20, &[("car", 2, 2, 6, 8)]);

        process_dataset(&fixture.args()).unwrap();

        let content = fs::read_to_string(fixture.output_dir().join("coco.json")).unwrap();
        assert!(content.starts_with("{\n    \"categories\": [\n        \"COCO_CATEGORIES\"\n    ],"));

        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            value["images"][0],
            serde_json::json!({"id": "a.png", "filename": "a.png", "width": 20, "height": 20})
        );
        assert_eq!(
            value["annotations"][0],
            serde_json::json!({
                "id": 0,
                "image_id": "a.png",
                "category_id": "car",
                "bbox": {"x": 4, "y": 5, "width": 4, "height": 6}
            })
        );
    }

    #[test]
    fn test_derived_categories_file() {
        let fixture = Fixture::new();
        fixture.add_image("a.png", 20, 20, &[("car", 0, 0, 5, 5), ("bus", 1, 1, 4, 4)]);
        fixture.add_image("b.png", 20, 20, &[("car", 0, 0, 5, 5)]);
        let mut args = fixture.args();
        args.categories = CategoryMode::Derived;

        process_dataset(&args).unwrap();

        let from_disk = read_coco_json(&fixture.output_dir().join("coco.json")).unwrap();
        match from_disk.categories {
            Categories::Derived(categories) => {
                let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
                assert_eq!(names, vec!["car", "bus"]);
                assert_eq!(categories[0].id, 1);
            }
            Categories::Placeholder(_) => panic!("expected derived categories"),
        }
    }

    #[test]
    fn test_glob_source_and_restartable_iteration() {
        let fixture = Fixture::new();
        fixture.add_image("a.png", 20, 20, &[("car", 0, 0, 5, 5)]);
        fixture.add_image("b.bmp", 20, 20, &[("car", 0, 0, 5, 5)]);
        fixture.add_image("c.PNG", 20, 20, &[("car", 0, 0, 5, 5)]);

        let pattern = fixture.images_dir().join("*.png");
        let loader = LoadImages::new(&pattern.to_string_lossy(), "labels").unwrap();
        assert_eq!(loader.len(), 1);

        let loader = LoadImages::new(&fixture.images_dir().to_string_lossy(), "labels").unwrap();
        assert_eq!(loader.len(), 3);

        let first: Vec<PathBuf> = loader.iter().map(|item| item.unwrap().path).collect();
        let second: Vec<PathBuf> = loader.iter().map(|item| item.unwrap().path).collect();
        assert_eq!(first, second);
        assert_eq!(first, loader.files().to_vec());
    }

    #[test]
    fn test_resizer_with_injected_limits() {
        let fixture = Fixture::new();
        fixture.add_image("a.png", 200, 100, &[("car", 40, 20, 80, 60)]);

        let loader = LoadImages::new(&fixture.images_dir().to_string_lossy(), "labels").unwrap();
        let output_dirs = setup_output_directories(&fixture.output_dir(), false).unwrap();
        let config = ResizeConfig {
            max_height: 50,
            max_width: 100,
            filter: ResizeFilter::Triangle,
            ..ResizeConfig::default()
        };

        let dataset = Resizer::new(loader, output_dirs, config).resize().unwrap();

        assert_eq!(dataset.images[0].width, 100);
        assert_eq!(dataset.images[0].height, 50);
        assert_eq!(
            dataset.annotations[0].bbox,
            BoundingBox {
                x: 30,
                y: 20,
                width: 20,
                height: 20,
            }
        );
    }

    #[test]
    fn test_recursive_glob_uses_string_order() {
        let fixture = Fixture::new();
        for dir in ["a", "a-b"] {
            let nested = fixture.images_dir().join(dir);
            fs::create_dir_all(&nested).unwrap();
            RgbImage::new(8, 8).save(nested.join("x.png")).unwrap();
        }

        let pattern = fixture.images_dir().join("**").join("*.png");
        let loader = LoadImages::new(&pattern.to_string_lossy(), "labels").unwrap();

        assert_eq!(
            loader.files().to_vec(),
            vec![
                fixture.images_dir().join("a-b/x.png"),
                fixture.images_dir().join("a/x.png"),
            ]
        );
        assert_eq!(
            img2label_path(&loader.files()[1], "labels"),
            fixture.root.join("labels/a/x.xml")
        );
    }

    #[test]
    fn test_load_out_of_range_index() {
        let fixture = Fixture::new();
        fixture.add_image("a.png", 20, 20, &[("car", 0, 0, 5, 5)]);

        let loader = LoadImages::new(&fixture.images_dir().to_string_lossy(), "labels").unwrap();

        assert!(loader.load(0).is_ok());
        assert!(matches!(loader.load(1), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_out_of_range_coordinate_aborts() {
        let fixture = Fixture::new();
        fixture.add_image("a.png", 20, 20, &[("car", 0, 0, 5, 5)]);
        let xml = "<annotation>\n    <filename>a.png</filename>\n    <size><width>20</width><height>20</height></size>\n    <object>\n        <name>car</name>\n        <bndbox><xmin>9223372036854775807</xmin><ymin>0</ymin><xmax>1</xmax><ymax>5</ymax></bndbox>\n    </object>\n</annotation>\n";
        fs::write(fixture.root.join("labels/a.xml"), xml).unwrap();

        let result = process_dataset(&fixture.args());
        assert!(matches!(result, Err(Error::AnnotationParse { .. })));
    }
}
