//! Sticker extraction: crop one detected region, strip the surrounding
//! background, and synthesize a uniform white outline.
//!
//! Background removal is exterior-only: the fill is seeded from the crop's
//! border, so near-white pixels *enclosed* by the artwork (an eye highlight,
//! the inside of a speech bubble) are preserved. The outline is built by
//! stamping a white silhouette of the cutout at evenly spaced angular
//! offsets around a circle of the stroke radius, then compositing the
//! original colors back on top.

use image::{imageops, Rgba, RgbaImage};

use crate::background::BackgroundThresholds;
use crate::detect::{mask_index, neighbors};
use crate::rect::Rect;

/// Tunables for cropping and outline synthesis.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Padding in pixels added around the rectangle before cropping.
    pub padding: u32,
    /// Outline thickness in pixels.
    pub stroke_width: u32,
    /// Number of angular offsets used to stamp the outline. 24 is a
    /// visually-smooth/cost tradeoff.
    pub stamp_steps: u32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            padding: 2,
            stroke_width: 6,
            stamp_steps: 24,
        }
    }
}

/// One extracted, outlined sticker image plus its origin in the source sheet.
#[derive(Debug, Clone)]
pub struct Cutout {
    /// The finished RGBA image: transparent exterior, white outline,
    /// original colors inside.
    pub image: RgbaImage,
    /// X of the (padded, clamped) crop origin in source coordinates.
    pub source_x: u32,
    /// Y of the (padded, clamped) crop origin in source coordinates.
    pub source_y: u32,
}

/// Extract one sticker from `source` at `rect`.
///
/// Returns `None` when the padded, clamped crop region is empty (a manual
/// rectangle drawn entirely outside the image, or an empty source). This is
/// a skip, not an error.
#[must_use]
pub fn extract_sticker(
    source: &RgbaImage,
    rect: Rect,
    background: &BackgroundThresholds,
    opts: &ExtractOptions,
) -> Option<Cutout> {
    let width = source.width();
    let height = source.height();
    if width == 0 || height == 0 {
        return None;
    }

    // Pad and clamp to the source bounds.
    let x0 = rect.min_x.saturating_sub(opts.padding);
    let y0 = rect.min_y.saturating_sub(opts.padding);
    if x0 >= width || y0 >= height {
        return None;
    }
    let x1 = rect.max_x.saturating_add(opts.padding).min(width - 1);
    let y1 = rect.max_y.saturating_add(opts.padding).min(height - 1);

    let crop_w = x1 - x0 + 1;
    let crop_h = y1 - y0 + 1;
    let mut cutout = imageops::crop_imm(source, x0, y0, crop_w, crop_h).to_image();

    remove_exterior_background(&mut cutout, background);

    let stroke = opts.stroke_width;
    let sil = silhouette(&cutout);
    let mut canvas = RgbaImage::new(crop_w + 2 * stroke, crop_h + 2 * stroke);

    // Union of offset silhouette copies forms the outline ring.
    let radius = f64::from(stroke);
    for step in 0..opts.stamp_steps {
        let theta = f64::from(step) * std::f64::consts::TAU / f64::from(opts.stamp_steps);
        let dx = radius + theta.cos() * radius;
        let dy = radius + theta.sin() * radius;
        stamp(&mut canvas, &sil, dx, dy);
    }
    // Centered stamp fills the interior and closes outline/body gaps.
    stamp(&mut canvas, &sil, radius, radius);

    // Original colors on top, source-over.
    stamp(&mut canvas, &cutout, radius, radius);

    Some(Cutout {
        image: canvas,
        source_x: x0,
        source_y: y0,
    })
}

/// Zero the alpha of every background pixel reachable from the crop border
/// through other background pixels.
///
/// Stack-based flood fill seeded from all four border edges, 4-connectivity,
/// with a fresh visited mask indexed `y*width+x`. Background-colored pixels
/// enclosed by the artwork are never reached and stay untouched.
pub fn remove_exterior_background(image: &mut RgbaImage, background: &BackgroundThresholds) {
    let width = image.width();
    let height = image.height();
    if width == 0 || height == 0 {
        return;
    }

    let mut exterior = vec![false; width as usize * height as usize];
    let mut stack: Vec<(u32, u32)> = Vec::new();

    {
        let mut seed = |x: u32, y: u32| {
            let idx = mask_index(x, y, width);
            if !exterior[idx] && background.is_background(*image.get_pixel(x, y)) {
                exterior[idx] = true;
                stack.push((x, y));
            }
        };
        for x in 0..width {
            seed(x, 0);
            seed(x, height - 1);
        }
        for y in 0..height {
            seed(0, y);
            seed(width - 1, y);
        }
    }

    while let Some((x, y)) = stack.pop() {
        for (nx, ny) in neighbors(x, y, width, height) {
            let idx = mask_index(nx, ny, width);
            if !exterior[idx] && background.is_background(*image.get_pixel(nx, ny)) {
                exterior[idx] = true;
                stack.push((nx, ny));
            }
        }
    }

    for y in 0..height {
        for x in 0..width {
            if exterior[mask_index(x, y, width)] {
                image.get_pixel_mut(x, y)[3] = 0;
            }
        }
    }
}

/// Solid-white copy of the cutout's alpha shape: every non-transparent pixel
/// becomes white, keeping the alpha channel exactly.
#[must_use]
pub fn silhouette(image: &RgbaImage) -> RgbaImage {
    let mut out = RgbaImage::new(image.width(), image.height());
    for (src, dst) in image.pixels().zip(out.pixels_mut()) {
        if src[3] > 0 {
            *dst = Rgba([255, 255, 255, src[3]]);
        }
    }
    out
}

/// Draw `src` onto `dest` at a (possibly fractional) offset with source-over
/// compositing.
///
/// Fractional offsets are resampled bilinearly, the software equivalent of a
/// renderer's high-quality smoothing. Integer offsets degenerate to an exact
/// pixel copy.
fn stamp(dest: &mut RgbaImage, src: &RgbaImage, off_x: f64, off_y: f64) {
    let dest_w = i64::from(dest.width());
    let dest_h = i64::from(dest.height());

    #[allow(clippy::cast_possible_truncation)]
    let x_lo = (off_x.floor() as i64).max(0);
    #[allow(clippy::cast_possible_truncation)]
    let y_lo = (off_y.floor() as i64).max(0);
    #[allow(clippy::cast_possible_truncation)]
    let x_hi = ((off_x + f64::from(src.width())).ceil() as i64).min(dest_w);
    #[allow(clippy::cast_possible_truncation)]
    let y_hi = ((off_y + f64::from(src.height())).ceil() as i64).min(dest_h);

    for ty in y_lo..y_hi {
        for tx in x_lo..x_hi {
            #[allow(clippy::cast_precision_loss)]
            let u = tx as f64 - off_x;
            #[allow(clippy::cast_precision_loss)]
            let v = ty as f64 - off_y;
            let sampled = sample_bilinear(src, u, v);
            if sampled[3] == 0 {
                continue;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let px = dest.get_pixel_mut(tx as u32, ty as u32);
            composite_over(px, sampled);
        }
    }
}

/// Bilinear RGBA sample at fractional coordinates, alpha-weighted so that
/// transparent neighbors do not bleed their (undefined) colors in.
/// Out-of-bounds taps are transparent.
fn sample_bilinear(src: &RgbaImage, u: f64, v: f64) -> Rgba<u8> {
    #[allow(clippy::cast_possible_truncation)]
    let u0 = u.floor() as i64;
    #[allow(clippy::cast_possible_truncation)]
    let v0 = v.floor() as i64;
    #[allow(clippy::cast_precision_loss)]
    let fu = u - u0 as f64;
    #[allow(clippy::cast_precision_loss)]
    let fv = v - v0 as f64;

    let w = i64::from(src.width());
    let h = i64::from(src.height());

    let mut acc = [0.0_f64; 3];
    let mut acc_a = 0.0_f64;

    for (dv, wv) in [(0, 1.0 - fv), (1, fv)] {
        for (du, wu) in [(0, 1.0 - fu), (1, fu)] {
            let weight = wu * wv;
            if weight <= 0.0 {
                continue;
            }
            let sx = u0 + du;
            let sy = v0 + dv;
            if sx < 0 || sy < 0 || sx >= w || sy >= h {
                continue;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let p = src.get_pixel(sx as u32, sy as u32);
            let a = f64::from(p[3]) / 255.0;
            if a <= 0.0 {
                continue;
            }
            for ch in 0..3 {
                acc[ch] += weight * a * f64::from(p[ch]);
            }
            acc_a += weight * a;
        }
    }

    if acc_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let to_u8 = |value: f64| value.round().clamp(0.0, 255.0) as u8;
    Rgba([
        to_u8(acc[0] / acc_a),
        to_u8(acc[1] / acc_a),
        to_u8(acc[2] / acc_a),
        to_u8(acc_a * 255.0),
    ])
}

/// Source-over alpha compositing on straight (non-premultiplied) RGBA.
fn composite_over(dest: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = f64::from(src[3]) / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = f64::from(dest[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dest = Rgba([0, 0, 0, 0]);
        return;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let to_u8 = |value: f64| value.round().clamp(0.0, 255.0) as u8;
    for ch in 0..3 {
        let blended = (f64::from(src[ch]) * sa + f64::from(dest[ch]) * da * (1.0 - sa)) / out_a;
        dest[ch] = to_u8(blended);
    }
    dest[3] = to_u8(out_a * 255.0);
}
