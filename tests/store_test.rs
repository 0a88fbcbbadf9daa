use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};
use tempfile::TempDir;

use click_sam::app::annotate::BoundingBox;
use click_sam::app::store::{
    next_file_number, AnnotationStore, BBOX_PREFIX, BOXED_PREFIX, CLICK_PREFIX, MASK_PREFIX,
};
use click_sam::error::ClickSamError;

fn store() -> (TempDir, AnnotationStore) {
    let dir = TempDir::new().unwrap();
    let store = AnnotationStore::new(dir.path());
    store.ensure_layout().unwrap();
    (dir, store)
}

fn sample_mask() -> RgbImage {
    let mut mask = RgbImage::new(16, 16);
    for y in 2..7 {
        for x in 3..9 {
            mask.put_pixel(x, y, Rgb([255, 255, 255]));
        }
    }
    mask
}

fn touch(path: &Path) {
    fs::write(path, "").unwrap();
}

#[test]
fn layout_is_created_eagerly() {
    let (dir, _store) = store();

    for category in ["training", "testing", "evaluation"] {
        for sub in [
            "annotations_boundingbox_coords",
            "annotations_boundingbox",
            "annotations_masks",
            "click_coords",
        ] {
            assert!(dir.path().join(category).join(sub).is_dir());
        }
    }
}

#[test]
fn numbering_starts_at_one_in_an_empty_directory() {
    let dir = TempDir::new().unwrap();
    assert_eq!(next_file_number(dir.path(), CLICK_PREFIX, ".txt").unwrap(), 1);
}

#[test]
fn numbering_is_max_based_and_keeps_gaps() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("click_coords_001.txt"));
    touch(&dir.path().join("click_coords_005.txt"));

    assert_eq!(next_file_number(dir.path(), CLICK_PREFIX, ".txt").unwrap(), 6);
}

#[test]
fn numbering_ignores_other_prefixes_and_extensions() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("click_coords_004.txt"));
    touch(&dir.path().join("bbox_coords_009.txt"));
    touch(&dir.path().join("click_coords_008.png"));

    assert_eq!(next_file_number(dir.path(), CLICK_PREFIX, ".txt").unwrap(), 5);
}

#[test]
fn digit_free_matching_name_is_an_error() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("click_coords_first.txt"));

    let err = next_file_number(dir.path(), CLICK_PREFIX, ".txt").unwrap_err();
    assert!(matches!(err, ClickSamError::Persist { .. }));
}

#[test]
fn save_results_writes_all_four_artifacts_under_one_number() {
    let (dir, store) = store();
    let mask = sample_mask();
    let boxes = vec![BoundingBox {
        x_min: 3,
        x_max: 9,
        y_min: 2,
        y_max: 7,
    }];

    let number = store
        .save_results([40, 25], &boxes, &mask, &mask)
        .unwrap();
    assert_eq!(number, 1);

    let training = dir.path().join("training");
    let click = training
        .join("click_coords")
        .join(format!("{CLICK_PREFIX}001.txt"));
    let bbox = training
        .join("annotations_boundingbox_coords")
        .join(format!("{BBOX_PREFIX}001.txt"));
    let mask_png = training
        .join("annotations_masks")
        .join(format!("{MASK_PREFIX}001.png"));
    let boxed_png = training
        .join("annotations_boundingbox")
        .join(format!("{BOXED_PREFIX}001.png"));

    assert_eq!(
        fs::read_to_string(click).unwrap(),
        "Clicked coordinates: 40, 25\n"
    );
    assert_eq!(
        fs::read_to_string(bbox).unwrap(),
        "[x_min: 3, x_max: 9], [y_min: 2, y_max: 7]\n"
    );
    assert!(mask_png.is_file());
    assert!(boxed_png.is_file());
}

#[test]
fn persisted_bbox_lines_parse_back_to_the_same_boxes() {
    let (dir, store) = store();
    let boxes = vec![
        BoundingBox {
            x_min: 3,
            x_max: 9,
            y_min: 2,
            y_max: 7,
        },
        BoundingBox {
            x_min: 0,
            x_max: 1,
            y_min: 15,
            y_max: 16,
        },
    ];

    store
        .save_results([0, 0], &boxes, &sample_mask(), &sample_mask())
        .unwrap();

    let bbox = dir
        .path()
        .join("training/annotations_boundingbox_coords")
        .join(format!("{BBOX_PREFIX}001.txt"));
    let parsed: Vec<BoundingBox> = fs::read_to_string(bbox)
        .unwrap()
        .lines()
        .map(|line| line.parse().unwrap())
        .collect();

    assert_eq!(parsed, boxes);
}

#[test]
fn empty_box_list_still_writes_an_empty_bbox_file() {
    let (dir, store) = store();
    let mask = RgbImage::new(8, 8);

    store.save_results([1, 1], &[], &mask, &mask).unwrap();

    let bbox = dir
        .path()
        .join("training/annotations_boundingbox_coords")
        .join(format!("{BBOX_PREFIX}001.txt"));
    assert_eq!(fs::read_to_string(bbox).unwrap(), "");
}

#[test]
fn click_series_and_result_series_number_independently() {
    let (dir, store) = store();
    let mask = sample_mask();

    // pre-existing training records push that series ahead
    touch(
        &dir.path()
            .join("training/click_coords")
            .join(format!("{CLICK_PREFIX}007.txt")),
    );

    let standalone = store.save_click_coordinates([10, 20]).unwrap();
    let record = store.save_results([10, 20], &[], &mask, &mask).unwrap();

    assert_eq!(standalone, 1);
    assert_eq!(record, 8);

    let testing_click = dir
        .path()
        .join("testing/click_coords")
        .join(format!("{CLICK_PREFIX}001.txt"));
    assert_eq!(
        fs::read_to_string(testing_click).unwrap(),
        "Clicked coordinates: 10, 20\n"
    );
}

#[test]
fn repeated_saves_increment_the_sequence() {
    let (_dir, store) = store();
    let mask = sample_mask();

    assert_eq!(store.save_results([0, 0], &[], &mask, &mask).unwrap(), 1);
    assert_eq!(store.save_results([1, 1], &[], &mask, &mask).unwrap(), 2);
    assert_eq!(store.save_results([2, 2], &[], &mask, &mask).unwrap(), 3);
}
