
use std::time::Duration;
use image::RgbImage;
use mock_models::{assert_box_close, one_hot, row, scene, BrightSpotModel, ScriptedModel};
use split_detect::data::DetectorConfig;
use split_detect::send_channels::spawn_detector;
use split_detect::{DetectError, Detector};

#[test]
fn worker_answers_requests_in_turn() {
    let config = DetectorConfig::default().with_xcycwh(false).with_split(2, 1);
    let detector = Detector::new(BrightSpotModel::new((64, 64), 3, 1), config).unwrap();
    let (mut sender, handle) = spawn_detector(detector).unwrap();

    let output = sender.detect(scene(128, 64, 10, 20, 20, 10)).unwrap();
    assert_eq!(output.len(), 1);
    assert_box_close(output.boxes[0], [10., 20., 30., 30.], 1.0);

    let output = sender.detect(scene(128, 64, 90, 20, 20, 10)).unwrap();
    assert_eq!(output.len(), 1);
    assert_box_close(output.boxes[0], [90., 20., 110., 30.], 1.0);

    let output = sender.detect(RgbImage::new(128, 64)).unwrap();
    assert!(output.is_empty());

    drop(sender);
    handle.join().unwrap();
}

#[test]
fn errors_are_sent_back_to_the_caller() {
    let detector = Detector::new(ScriptedModel::new((32, 32), 3, vec![]), DetectorConfig::default()).unwrap();
    let (mut sender, handle) = spawn_detector(detector).unwrap();

    let result = sender.detect(RgbImage::new(0, 0));
    assert!(matches!(result, Err(DetectError::InvalidImage(_))));

    // the worker keeps serving after a failed request
    assert!(sender.detect(RgbImage::new(32, 32)).unwrap().is_empty());

    drop(sender);
    handle.join().unwrap();
}

#[test]
fn timed_out_replies_are_not_mixed_up() {
    let rows = vec![row(16., 16., 8., 8., 0.9, &one_hot(3, 0, 1.0))];
    let model = ScriptedModel::new((32, 32), 3, rows).with_delay(Duration::from_millis(300));
    let detector = Detector::new(model, DetectorConfig::default().with_xcycwh(false)).unwrap();
    let (mut sender, handle) = spawn_detector(detector).unwrap();

    let result = sender.detect_timeout(RgbImage::new(32, 32), Duration::from_millis(10));
    assert!(matches!(result, Err(DetectError::Timeout(_))));

    // 64x64 halves the scale, so this reply is distinguishable from the stale one
    let output = sender.detect(RgbImage::new(64, 64)).unwrap();
    assert_eq!(output.boxes, vec![[24., 24., 40., 40.]]);

    drop(sender);
    handle.join().unwrap();
}

#[test]
fn unbounded_timeout_waits_for_the_reply() {
    let rows = vec![row(16., 16., 8., 8., 0.9, &one_hot(3, 0, 1.0))];
    let detector = Detector::new(ScriptedModel::new((32, 32), 3, rows), DetectorConfig::default()).unwrap();
    let (mut sender, handle) = spawn_detector(detector).unwrap();

    let output = sender.detect_timeout(RgbImage::new(32, 32), Duration::MAX).unwrap();
    assert_eq!(output.len(), 1);
    assert_eq!(output.class_ids, vec![0]);

    let output = sender.detect_timeout(RgbImage::new(32, 32), Duration::from_secs(u64::MAX)).unwrap();
    assert_eq!(output.len(), 1);

    drop(sender);
    handle.join().unwrap();
}
