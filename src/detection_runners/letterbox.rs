//! Aspect-preserving resize with constant padding, and the NCHW tensor conversion
//! that follows it.

use fast_image_resize::{
    images::{CroppedImageMut, Image as FirImage},
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
};
use image::RgbImage;
use ndarray::Array4;
use crate::common::BBox;
use crate::data::LetterboxOptions;
use crate::errors::DetectError;
use crate::Result;

/// Everything needed to map a box from letterboxed space back to the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxTransform {
    pub scale: f32,
    /// Left padding in pixels.
    pub pad_x: f32,
    /// Top padding in pixels.
    pub pad_y: f32,
    /// Size of the resized image before padding, `(w, h)`.
    pub unpadded: (u32, u32),
    /// Size of the source image, `(w, h)`.
    pub original: (u32, u32),
}

impl LetterboxTransform {
    /// Maps a box from source image space into letterboxed space.
    pub fn forward_box(&self, bbox: &BBox) -> BBox {
        BBox::new(
            bbox.x1 * self.scale + self.pad_x,
            bbox.y1 * self.scale + self.pad_y,
            bbox.x2 * self.scale + self.pad_x,
            bbox.y2 * self.scale + self.pad_y,
        )
    }

    /// Maps a box from letterboxed space back into source image space, clipped to the image.
    pub fn inverse_box(&self, bbox: &BBox) -> BBox {
        let (w, h) = self.original;
        BBox::new(
            (bbox.x1 - self.pad_x) / self.scale,
            (bbox.y1 - self.pad_y) / self.scale,
            (bbox.x2 - self.pad_x) / self.scale,
            (bbox.y2 - self.pad_y) / self.scale,
        )
        .clip(w as f32, h as f32)
    }
}

/// Byte length of a packed RGB buffer.
fn rgb_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

fn resize_err(err: impl std::fmt::Display) -> DetectError {
    DetectError::Resize(err.to_string())
}

/// Resizes `image` to fit `target_w x target_h` while keeping its aspect ratio, then
/// pads the remainder symmetrically with `options.fill`.
///
/// With `options.stride` set, padding stops at the next multiple of the stride, so
/// the output can be smaller than the target.
pub fn letterbox(
    image: &RgbImage,
    target_w: u32,
    target_h: u32,
    options: &LetterboxOptions,
) -> Result<(RgbImage, LetterboxTransform)> {
    let (w0, h0) = image.dimensions();
    if w0 == 0 || h0 == 0 {
        return Err(DetectError::InvalidImage(format!("image has zero area ({}x{})", w0, h0)));
    }
    if target_w == 0 || target_h == 0 {
        return Err(DetectError::InvalidConfig(format!("letterbox target has zero area ({}x{})", target_w, target_h)));
    }

    let mut scale = (target_w as f32 / w0 as f32).min(target_h as f32 / h0 as f32);
    if !options.scale_up {
        scale = scale.min(1.0);
    }
    let new_w = ((w0 as f32 * scale).round() as u32).clamp(1, target_w);
    let new_h = ((h0 as f32 * scale).round() as u32).clamp(1, target_h);

    let (mut dw, mut dh) = (target_w - new_w, target_h - new_h);
    if let Some(stride) = options.stride {
        dw %= stride;
        dh %= stride;
    }
    let left = (dw as f32 / 2. - 0.1).round() as u32;
    let top = (dh as f32 / 2. - 0.1).round() as u32;
    let (out_w, out_h) = (new_w + dw, new_h + dh);

    let src = FirImage::from_vec_u8(w0, h0, image.as_raw().clone(), PixelType::U8x3).map_err(resize_err)?;
    let mut padded = FirImage::from_vec_u8(
        out_w,
        out_h,
        vec![options.fill; rgb_len(out_w, out_h)],
        PixelType::U8x3,
    )
    .map_err(resize_err)?;

    {
        let mut cropped = CroppedImageMut::new(&mut padded, left, top, new_w, new_h).map_err(resize_err)?;
        let resize_options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
        let mut resizer = Resizer::new();
        resizer.resize(&src, &mut cropped, &resize_options).map_err(resize_err)?;
    }

    let letterboxed = RgbImage::from_raw(out_w, out_h, padded.into_vec())
        .ok_or_else(|| DetectError::Resize("letterboxed buffer does not match its dimensions".to_string()))?;

    let transform = LetterboxTransform {
        scale,
        pad_x: left as f32,
        pad_y: top as f32,
        unpadded: (new_w, new_h),
        original: (w0, h0),
    };

    Ok((letterboxed, transform))
}

/// HWC u8 image to a `(1, 3, h, w)` tensor with values in `[0, 1]`.
pub fn to_nchw_tensor(image: &RgbImage) -> Result<Array4<f32>> {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let buf = image.as_raw();
    let hw = w * h;

    let mut out = vec![0.0f32; buf.len()];
    for (i, px) in buf.chunks_exact(3).enumerate() {
        out[i] = px[0] as f32 / 255.0;
        out[i + hw] = px[1] as f32 / 255.0;
        out[i + 2 * hw] = px[2] as f32 / 255.0;
    }

    Array4::from_shape_vec((1, 3, h, w), out)
        .map_err(|e| DetectError::InvalidImage(format!("cannot build input tensor: {}", e)))
}
