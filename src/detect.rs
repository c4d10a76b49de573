//! Connected-component detection over a sticker sheet.
//!
//! A single row-major scan labels every maximal 4-connected region of
//! non-background pixels and reports its bounding rectangle. Regions too
//! small to be a sticker (anti-aliasing specks, dust) are discarded.

use image::RgbaImage;

use crate::background::BackgroundThresholds;
use crate::rect::Rect;

/// Size thresholds below which a connected region is discarded as noise.
#[derive(Debug, Clone, Copy)]
pub struct DetectOptions {
    /// A region must contain strictly more pixels than this.
    pub min_pixels: u32,
    /// Both the width and height of a region must strictly exceed this.
    pub min_extent: u32,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            min_pixels: 50,
            min_extent: 5,
        }
    }
}

/// Find the bounding rectangles of all connected non-background regions.
///
/// Scans pixels in row-major order; each unvisited non-background pixel
/// seeds a stack-based flood fill (4-connectivity) that records the region's
/// bounds and pixel count. Every pixel is visited at most once, so the whole
/// scan is linear in the pixel count. An all-background image yields an
/// empty list.
#[must_use]
pub fn find_components(
    image: &RgbaImage,
    background: &BackgroundThresholds,
    opts: &DetectOptions,
) -> Vec<Rect> {
    let width = image.width();
    let height = image.height();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut visited = vec![false; width as usize * height as usize];
    let mut rects = Vec::new();
    let mut stack: Vec<(u32, u32)> = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let idx = mask_index(x, y, width);
            if visited[idx] || background.is_background(*image.get_pixel(x, y)) {
                continue;
            }

            // Flood fill one component, tracking bounds and size.
            let mut bounds = Rect::at(x, y);
            let mut count: u32 = 0;
            visited[idx] = true;
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                count += 1;
                bounds.include(cx, cy);

                for (nx, ny) in neighbors(cx, cy, width, height) {
                    let nidx = mask_index(nx, ny, width);
                    if !visited[nidx] && !background.is_background(*image.get_pixel(nx, ny)) {
                        visited[nidx] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            if count > opts.min_pixels
                && bounds.width() > opts.min_extent
                && bounds.height() > opts.min_extent
            {
                rects.push(bounds);
            }
        }
    }

    rects
}

/// The in-bounds 4-neighbors of a pixel.
pub(crate) fn neighbors(
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> impl Iterator<Item = (u32, u32)> {
    let left = x.checked_sub(1).map(|nx| (nx, y));
    let up = y.checked_sub(1).map(|ny| (x, ny));
    let right = (x + 1 < width).then_some((x + 1, y));
    let down = (y + 1 < height).then_some((x, y + 1));
    [left, right, up, down].into_iter().flatten()
}

/// Flat index into a `y*width+x` scratch mask.
pub(crate) fn mask_index(x: u32, y: u32, width: u32) -> usize {
    y as usize * width as usize + x as usize
}
