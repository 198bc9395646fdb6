use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use split_detect::common::{BBox, Detection};
use split_detect::detection_runners::{non_max_suppression, NmsParams};

fn det(class_id: usize, x1: f32, y1: f32, x2: f32, y2: f32, conf: f32) -> Detection {
    Detection::new(class_id, BBox::new(x1, y1, x2, y2), conf)
}

fn random_detections(rng: &mut StdRng, n: usize, nc: usize) -> Vec<Detection> {
    (0..n)
        .map(|_| {
            let x: f32 = rng.gen_range(0.0..200.0);
            let y: f32 = rng.gen_range(0.0..200.0);
            let w: f32 = rng.gen_range(5.0..60.0);
            let h: f32 = rng.gen_range(5.0..60.0);
            det(rng.gen_range(0..nc), x, y, x + w, y + h, rng.gen_range(0.0..1.0))
        })
        .collect()
}

#[test]
fn iou_of_offset_squares() {
    let a = BBox::new(0., 0., 10., 10.);
    let b = BBox::new(5., 5., 15., 15.);
    assert_eq!(a.intersect(&b), 25.);
    assert_eq!(a.union(&b), 175.);
    assert!((a.iou(&b) - 25. / 175.).abs() < 1e-6);
    assert!((b.iou(&a) - a.iou(&b)).abs() < 1e-9);
}

#[test]
fn iou_of_disjoint_and_degenerate_boxes_is_zero() {
    let a = BBox::new(0., 0., 10., 10.);
    assert_eq!(a.iou(&BBox::new(20., 20., 30., 30.)), 0.);

    let line = BBox::new(5., 0., 5., 10.);
    assert_eq!(line.area(), 0.);
    assert_eq!(line.iou(&line), 0.);
    assert_eq!(line.iou(&a), 0.);
}

#[test]
fn identical_boxes_keep_exactly_one() {
    let boxes = vec![det(0, 0., 0., 10., 10., 0.6), det(0, 0., 0., 10., 10., 0.9)];
    let kept = non_max_suppression(boxes, &NmsParams::new(0.5, false));
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].confidence, 0.9);
}

#[test]
fn equal_scores_keep_the_earlier_box() {
    let mut first = det(0, 0., 0., 10., 10., 0.8);
    first.label = Some("first".to_string());
    let mut second = det(0, 0., 0., 10., 10., 0.8);
    second.label = Some("second".to_string());

    let kept = non_max_suppression(vec![first, second], &NmsParams::new(0.5, false));
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].label.as_deref(), Some("first"));
}

#[test]
fn iou_equal_to_threshold_is_suppressed() {
    let a = det(0, 0., 0., 10., 10., 0.9);
    let b = det(0, 5., 0., 15., 10., 0.8);
    let iou = a.iou(&b);
    assert!((iou - 1. / 3.).abs() < 1e-6);

    let kept = non_max_suppression(vec![a.clone(), b.clone()], &NmsParams::new(iou, false));
    assert_eq!(kept.len(), 1);

    let kept = non_max_suppression(vec![a, b], &NmsParams::new(iou + 0.01, false));
    assert_eq!(kept.len(), 2);
}

#[test]
fn classes_are_suppressed_independently_unless_agnostic() {
    let boxes = vec![
        det(0, 0., 0., 10., 10., 0.9),
        det(1, 0., 0., 10., 10., 0.8),
        det(0, 1., 1., 10., 10., 0.7),
    ];

    let kept = non_max_suppression(boxes.clone(), &NmsParams::new(0.5, false));
    assert_eq!(kept.iter().map(|d| d.class_id).collect::<Vec<_>>(), vec![0, 1]);

    let kept = non_max_suppression(boxes, &NmsParams::new(0.5, true));
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].class_id, 0);
}

#[test]
fn output_is_sorted_by_score() {
    let boxes = vec![
        det(0, 0., 0., 10., 10., 0.5),
        det(0, 50., 50., 60., 60., 0.9),
        det(1, 100., 100., 110., 110., 0.7),
    ];
    let kept = non_max_suppression(boxes, &NmsParams::default());
    let scores: Vec<f32> = kept.iter().map(|d| d.confidence).collect();
    assert_eq!(scores, vec![0.9, 0.7, 0.5]);
}

#[test]
fn empty_input_gives_empty_output() {
    let kept = non_max_suppression(Vec::<Detection>::new(), &NmsParams::default());
    assert!(kept.is_empty());
}

#[test]
fn max_det_caps_the_output() {
    let boxes: Vec<Detection> = (0..10)
        .map(|i| det(0, i as f32 * 20., 0., i as f32 * 20. + 10., 10., 0.5 + i as f32 * 0.01))
        .collect();
    let params = NmsParams {
        max_det: 3,
        ..NmsParams::new(0.5, false)
    };
    let kept = non_max_suppression(boxes, &params);
    assert_eq!(kept.len(), 3);
    assert!((kept[0].confidence - 0.59).abs() < 1e-6);
}

#[test]
fn max_nms_keeps_only_the_top_candidates() {
    let boxes = vec![
        det(0, 0., 0., 10., 10., 0.3),
        det(0, 100., 0., 110., 10., 0.9),
        det(0, 200., 0., 210., 10., 0.6),
    ];
    let params = NmsParams {
        max_nms: 2,
        ..NmsParams::new(0.5, false)
    };
    let kept = non_max_suppression(boxes, &params);
    let scores: Vec<f32> = kept.iter().map(|d| d.confidence).collect();
    assert_eq!(scores, vec![0.9, 0.6]);
}

#[test]
fn survivors_never_overlap_at_or_above_threshold() {
    let mut rng = StdRng::seed_from_u64(7);
    for agnostic in [false, true] {
        let boxes = random_detections(&mut rng, 400, 3);
        let params = NmsParams::new(0.3, agnostic);
        let kept = non_max_suppression(boxes, &params);
        for (i, a) in kept.iter().enumerate() {
            for b in kept.iter().skip(i + 1) {
                if agnostic || a.class_id == b.class_id {
                    assert!(a.iou(b) < params.iou_thres, "{:?} and {:?} overlap", a, b);
                }
            }
        }
    }
}

#[test]
fn suppression_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..5 {
        let boxes = random_detections(&mut rng, 300, 4);
        let params = NmsParams::new(0.45, false);
        let once = non_max_suppression(boxes, &params);
        let twice = non_max_suppression(once.clone(), &params);
        assert_eq!(once, twice);
    }
}

#[test]
fn class_aware_matches_per_class_runs() {
    let mut rng = StdRng::seed_from_u64(3);
    let boxes = random_detections(&mut rng, 300, 3);
    let params = NmsParams::new(0.4, false);

    let joint = non_max_suppression(boxes.clone(), &params);
    for class_id in 0..3 {
        let own: Vec<Detection> = boxes.iter().filter(|d| d.class_id == class_id).cloned().collect();
        let separate = non_max_suppression(own, &params);
        let from_joint: Vec<Detection> = joint.iter().filter(|d| d.class_id == class_id).cloned().collect();
        assert_eq!(separate, from_joint);
    }
}
