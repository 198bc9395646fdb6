use image::{Rgb, RgbImage};
use split_detect::common::BBox;
use split_detect::data::LetterboxOptions;
use split_detect::detection_runners::letterbox::{letterbox, to_nchw_tensor};
use split_detect::DetectError;

fn solid(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

#[test]
fn landscape_image_is_padded_top_and_bottom() {
    let image = solid(640, 480, 200);
    let (out, t) = letterbox(&image, 416, 416, &LetterboxOptions::default()).unwrap();

    assert_eq!(out.dimensions(), (416, 416));
    assert!((t.scale - 0.65).abs() < 1e-6);
    assert_eq!(t.unpadded, (416, 312));
    assert_eq!(t.pad_x, 0.);
    assert_eq!(t.pad_y, 52.);
    assert_eq!(t.original, (640, 480));

    // padding above, image content inside, padding below
    assert_eq!(out.get_pixel(200, 10), &Rgb([114, 114, 114]));
    assert_eq!(out.get_pixel(200, 208), &Rgb([200, 200, 200]));
    assert_eq!(out.get_pixel(200, 405), &Rgb([114, 114, 114]));
}

#[test]
fn odd_padding_puts_the_extra_pixel_last() {
    let image = solid(100, 99, 0);
    let (out, t) = letterbox(&image, 100, 100, &LetterboxOptions::default()).unwrap();
    assert_eq!(t.pad_y, 0.);
    assert_eq!(out.get_pixel(50, 0), &Rgb([0, 0, 0]));
    assert_eq!(out.get_pixel(50, 99), &Rgb([114, 114, 114]));
}

#[test]
fn custom_fill_colour() {
    let options = LetterboxOptions {
        fill: 0,
        ..Default::default()
    };
    let (out, _) = letterbox(&solid(200, 100, 255), 100, 100, &options).unwrap();
    assert_eq!(out.get_pixel(50, 0), &Rgb([0, 0, 0]));
}

#[test]
fn stride_mode_pads_to_the_next_multiple() {
    let options = LetterboxOptions {
        stride: Some(32),
        ..Default::default()
    };
    let (out, t) = letterbox(&solid(640, 480, 10), 416, 416, &options).unwrap();
    assert_eq!(out.dimensions(), (416, 320));
    assert_eq!(t.pad_x, 0.);
    assert_eq!(t.pad_y, 4.);
}

#[test]
fn without_scale_up_small_images_are_centred() {
    let options = LetterboxOptions {
        scale_up: false,
        ..Default::default()
    };
    let (out, t) = letterbox(&solid(100, 50, 10), 416, 416, &options).unwrap();
    assert_eq!(out.dimensions(), (416, 416));
    assert_eq!(t.scale, 1.0);
    assert_eq!(t.unpadded, (100, 50));
    assert_eq!(t.pad_x, 158.);
    assert_eq!(t.pad_y, 183.);
}

#[test]
fn small_images_are_scaled_up_by_default() {
    let (_, t) = letterbox(&solid(100, 50, 10), 416, 416, &LetterboxOptions::default()).unwrap();
    assert!((t.scale - 4.16).abs() < 1e-5);
    assert_eq!(t.unpadded, (416, 208));
    assert_eq!(t.pad_y, 104.);
}

#[test]
fn boxes_survive_a_round_trip() {
    let image = solid(640, 480, 0);
    let (_, t) = letterbox(&image, 416, 416, &LetterboxOptions::default()).unwrap();

    let original = BBox::new(100., 120., 300., 200.);
    let forward = t.forward_box(&original);
    assert!((forward.x1 - 65.).abs() < 1e-3);
    assert!((forward.y1 - (120. * 0.65 + 52.)).abs() < 1e-3);

    let back = t.inverse_box(&forward);
    for (a, b) in [back.x1, back.y1, back.x2, back.y2]
        .iter()
        .zip([original.x1, original.y1, original.x2, original.y2].iter())
    {
        assert!((a - b).abs() < 1e-3, "{:?} != {:?}", back, original);
    }
}

#[test]
fn inverse_clips_to_the_image() {
    let (_, t) = letterbox(&solid(640, 480, 0), 416, 416, &LetterboxOptions::default()).unwrap();
    // box reaching into the padding on every side
    let back = t.inverse_box(&BBox::new(-10., 20., 430., 400.));
    assert_eq!(back.x1, 0.);
    assert_eq!(back.y1, 0.);
    assert_eq!(back.x2, 640.);
    assert_eq!(back.y2, 480.);
}

#[test]
fn zero_area_image_is_rejected() {
    let result = letterbox(&RgbImage::new(0, 10), 416, 416, &LetterboxOptions::default());
    assert!(matches!(result, Err(DetectError::InvalidImage(_))));
}

#[test]
fn zero_area_target_is_rejected() {
    let result = letterbox(&solid(10, 10, 0), 0, 416, &LetterboxOptions::default());
    assert!(matches!(result, Err(DetectError::InvalidConfig(_))));
}

#[test]
fn nchw_tensor_is_planar_and_normalized() {
    let mut image = RgbImage::new(2, 1);
    image.put_pixel(0, 0, Rgb([255, 0, 0]));
    image.put_pixel(1, 0, Rgb([0, 255, 51]));

    let tensor = to_nchw_tensor(&image).unwrap();
    assert_eq!(tensor.shape(), &[1, 3, 1, 2]);
    assert_eq!(tensor[[0, 0, 0, 0]], 1.0);
    assert_eq!(tensor[[0, 1, 0, 0]], 0.0);
    assert_eq!(tensor[[0, 0, 0, 1]], 0.0);
    assert_eq!(tensor[[0, 1, 0, 1]], 1.0);
    assert!((tensor[[0, 2, 0, 1]] - 0.2).abs() < 1e-6);
}
