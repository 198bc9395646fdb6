
use std::time::Instant;
use image::{Rgb, RgbImage};
use mock_models::BrightSpotModel;
use split_detect::data::DetectorConfig;
use split_detect::Detector;

#[test]
fn no_detections() {
    let loop_count: u32 = 3;
    let image = RgbImage::from_pixel(320, 240, Rgb([40, 40, 40]));

    let detector = Detector::new(BrightSpotModel::new((64, 64), 80, 0), DetectorConfig::default()).unwrap();

    for (split_width, split_height) in [(1, 1), (2, 1), (3, 2), (4, 4)] {
        for _ in 0..loop_count {
            let now = Instant::now();
            let output = detector.detect(&image, split_width, split_height).unwrap();
            println!(
                "{}x{} split: {} detections in {:?}",
                split_width,
                split_height,
                output.len(),
                now.elapsed()
            );

            assert!(output.is_empty());
            assert_eq!(output.boxes.len(), output.scores.len());
            assert_eq!(output.boxes.len(), output.class_ids.len());
        }
    }
}
