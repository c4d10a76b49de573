//! Full-sheet pipeline: detect components, merge fragments, extract and
//! outline each sticker, and export the results.

use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{ImageFormat, RgbaImage};

use crate::background::BackgroundThresholds;
use crate::collab::{name_or_default, StickerNamer, FALLBACK_NAME};
use crate::detect::{find_components, DetectOptions};
use crate::error::{Error, Result};
use crate::extract::{extract_sticker, Cutout, ExtractOptions};
use crate::id::{default_id_source, IdSource};
use crate::merge::{merge_rects, DEFAULT_MERGE_GAP};
use crate::rect::Rect;

/// Observer for human-readable pipeline status text.
///
/// Implemented for any `FnMut(&str)` closure, so callers can pass
/// `&mut |status: &str| eprintln!("{status}")` or a silent `&mut |_: &str| {}`.
pub trait Progress {
    /// Called with a status line at each phase boundary.
    fn report(&mut self, status: &str);
}

impl<F: FnMut(&str)> Progress for F {
    fn report(&mut self, status: &str) {
        self(status);
    }
}

/// All pipeline tunables, with the defaults the tool ships with.
#[derive(Debug, Clone, Copy)]
pub struct SheetOptions {
    /// Background pixel classification thresholds.
    pub background: BackgroundThresholds,
    /// Noise thresholds for component detection.
    pub detect: DetectOptions,
    /// Rectangles closer than this (both axes) are merged into one sticker.
    pub merge_gap: u32,
    /// Padding, stroke width and stamp count for extraction.
    pub extract: ExtractOptions,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetOptions {
    /// Options with every default value.
    #[must_use]
    pub fn new() -> Self {
        Self {
            background: BackgroundThresholds::default(),
            detect: DetectOptions::default(),
            merge_gap: DEFAULT_MERGE_GAP,
            extract: ExtractOptions::default(),
        }
    }
}

/// One finished sticker.
#[derive(Debug, Clone)]
pub struct Sticker {
    /// Unique identifier, fresh per extraction.
    pub id: String,
    /// The outlined, transparent-background sticker image.
    pub image: RgbaImage,
    /// X of the crop origin in source-sheet coordinates.
    pub source_x: u32,
    /// Y of the crop origin in source-sheet coordinates.
    pub source_y: u32,
    /// Display name; defaulted at extraction, later replaced by the naming
    /// collaborator.
    pub name: String,
    /// Whether a naming request is currently in flight for this sticker.
    pub naming_in_progress: bool,
}

impl Sticker {
    /// Sticker image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Sticker image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encode the sticker image as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Encode the sticker image as a `data:image/png;base64,...` URL.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_data_url(&self) -> Result<String> {
        let png = self.to_png_bytes()?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
    }
}

/// Result of processing a single sheet file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Whether the file was skipped (no stickers detected).
    pub skipped: bool,
    /// Number of stickers cut from the sheet.
    pub sticker_count: usize,
    /// Human-readable status message.
    pub message: String,
}

/// The sticker-cutting engine.
///
/// Create once with [`StickerEngine::new()`] (or [`with_options`]) and reuse
/// across sheets. Holds the pipeline tunables and the id source; the
/// per-sheet pipeline itself is synchronous and single-threaded.
///
/// [`with_options`]: StickerEngine::with_options
pub struct StickerEngine {
    options: SheetOptions,
    ids: Box<dyn IdSource>,
}

impl Default for StickerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StickerEngine {
    /// Engine with default options and the platform id source.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(SheetOptions::new())
    }

    /// Engine with custom options.
    #[must_use]
    pub fn with_options(options: SheetOptions) -> Self {
        Self {
            options,
            ids: default_id_source(),
        }
    }

    /// Replace the id source (e.g. the pseudo-random fallback on targets
    /// without an OS RNG).
    #[must_use]
    pub fn with_id_source(mut self, ids: Box<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// The engine's current options.
    #[must_use]
    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    /// Cut every sticker out of a full sheet.
    ///
    /// Detection runs once over the whole image, fragments within the merge
    /// gap are grouped, and each final rectangle is extracted in scan order.
    /// Stickers are named `sticker_1`, `sticker_2`, ... in that order.
    /// An all-background sheet yields an empty list, which callers should
    /// present as "nothing found", not as an error.
    pub fn cut_sheet(&self, sheet: &RgbaImage, progress: &mut dyn Progress) -> Vec<Sticker> {
        progress.report("scanning sheet for regions");
        let raw = find_components(sheet, &self.options.background, &self.options.detect);
        progress.report(&format!("found {} regions", raw.len()));

        let rects = merge_rects(raw, self.options.merge_gap);
        progress.report(&format!("grouped into {} stickers", rects.len()));

        let mut stickers = Vec::with_capacity(rects.len());
        for (index, rect) in rects.iter().enumerate() {
            progress.report(&format!("extracting sticker {}/{}", index + 1, rects.len()));
            if let Some(cutout) = extract_sticker(
                sheet,
                *rect,
                &self.options.background,
                &self.options.extract,
            ) {
                let name = format!("{FALLBACK_NAME}_{}", stickers.len() + 1);
                stickers.push(self.finish(cutout, name));
            }
        }
        stickers
    }

    /// Extract a single sticker from a user-drawn rectangle, bypassing
    /// detection and merging.
    ///
    /// Returns `None` when the padded crop falls entirely outside the sheet.
    #[must_use]
    pub fn cut_manual(&self, sheet: &RgbaImage, rect: Rect) -> Option<Sticker> {
        let cutout = extract_sticker(sheet, rect, &self.options.background, &self.options.extract)?;
        Some(self.finish(cutout, FALLBACK_NAME.to_string()))
    }

    fn finish(&self, cutout: Cutout, name: String) -> Sticker {
        Sticker {
            id: self.ids.next_id(),
            image: cutout.image,
            source_x: cutout.source_x,
            source_y: cutout.source_y,
            name,
            naming_in_progress: false,
        }
    }

    /// Process one sheet file: load, cut, export all stickers as PNGs.
    ///
    /// Returns a [`ProcessResult`] rather than an error so batch runs can
    /// report per-file outcomes.
    #[must_use]
    pub fn process_file(
        &self,
        input: &Path,
        output_dir: &Path,
        progress: &mut dyn Progress,
    ) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            success: false,
            skipped: false,
            sticker_count: 0,
            message: String::new(),
        };

        if !is_supported_image(input) {
            let ext = input
                .extension()
                .map_or_else(|| "none".to_string(), |e| e.to_string_lossy().to_string());
            result.message = Error::UnsupportedFormat(ext).to_string();
            return result;
        }

        let sheet = match image::open(input) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                result.message = format!("Failed to load: {e}");
                return result;
            }
        };

        let stickers = self.cut_sheet(&sheet, progress);
        result.sticker_count = stickers.len();

        if stickers.is_empty() {
            result.success = true;
            result.skipped = true;
            result.message = "No stickers found (check that the background is near-white)".into();
            return result;
        }

        match export_stickers(&stickers, output_dir) {
            Ok(paths) => {
                result.success = true;
                result.message = format!("Cut {} stickers", paths.len());
            }
            Err(e) => {
                result.message = format!("Failed to export: {e}");
            }
        }

        result
    }

    /// Process all supported sheet images in a directory.
    ///
    /// Each sheet's stickers land in a subdirectory of `output_dir` named
    /// after the sheet file. Uses parallel iteration when the `cli` feature
    /// is enabled (via rayon).
    #[must_use]
    pub fn process_directory(&self, input_dir: &Path, output_dir: &Path) -> Vec<ProcessResult> {
        let entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => {
                return vec![ProcessResult {
                    path: input_dir.to_path_buf(),
                    success: false,
                    skipped: false,
                    sticker_count: 0,
                    message: format!("Failed to read directory: {e}"),
                }];
            }
        };

        let sheet_output = |input: &Path| {
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            output_dir.join(stem.as_ref())
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            entries
                .par_iter()
                .map(|input| self.process_file(input, &sheet_output(input), &mut |_: &str| {}))
                .collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            entries
                .iter()
                .map(|input| self.process_file(input, &sheet_output(input), &mut |_: &str| {}))
                .collect()
        }
    }
}

/// Auto-name a batch of stickers via the naming collaborator.
///
/// Failures are fully absorbed: a sticker whose naming call fails (or whose
/// PNG encoding fails) keeps the fixed fallback name. Never returns an error.
pub fn name_stickers(stickers: &mut [Sticker], namer: &dyn StickerNamer) {
    for sticker in stickers {
        sticker.naming_in_progress = true;
        sticker.name = match sticker.to_png_bytes() {
            Ok(png) => name_or_default(namer, &png),
            Err(_) => FALLBACK_NAME.to_string(),
        };
        sticker.naming_in_progress = false;
    }
}

/// Write each sticker as a PNG file into `dir`, de-duplicating filenames
/// with an incrementing counter suffix (`cat.png`, `cat_1.png`, ...).
///
/// Creates `dir` if needed. Returns the written paths in sticker order.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file cannot be
/// written.
pub fn export_stickers(stickers: &[Sticker], dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }

    let mut taken: HashSet<String> = HashSet::new();
    let mut paths = Vec::with_capacity(stickers.len());

    for sticker in stickers {
        let base = sanitize_filename(&sticker.name);
        let mut filename = format!("{base}.png");
        let mut counter = 0u32;
        while !taken.insert(filename.clone()) {
            counter += 1;
            filename = format!("{base}_{counter}.png");
        }

        let path = dir.join(filename);
        sticker.image.save(&path)?;
        paths.push(path);
    }

    Ok(paths)
}

/// Reduce a sticker name to a safe filename stem: alphanumerics, `-` and `_`
/// pass through, everything else becomes `_`. Empty names fall back to
/// the default sticker name.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::StickerNamer;
    use crate::error::Error;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([200, 30, 30, 255]);

    fn white_sheet(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    fn paint_square(img: &mut RgbaImage, x: u32, y: u32, size: u32) {
        for dy in 0..size {
            for dx in 0..size {
                img.put_pixel(x + dx, y + dy, RED);
            }
        }
    }

    fn silent() -> impl FnMut(&str) {
        |_: &str| {}
    }

    #[test]
    fn empty_sheet_yields_no_stickers() {
        let engine = StickerEngine::new();
        let stickers = engine.cut_sheet(&white_sheet(100, 100), &mut silent());
        assert!(stickers.is_empty());
    }

    #[test]
    fn stickers_are_named_in_scan_order_with_distinct_ids() {
        let mut sheet = white_sheet(200, 80);
        paint_square(&mut sheet, 10, 10, 30);
        paint_square(&mut sheet, 80, 10, 30);
        paint_square(&mut sheet, 150, 10, 30);

        let engine = StickerEngine::new();
        let stickers = engine.cut_sheet(&sheet, &mut silent());

        assert_eq!(stickers.len(), 3);
        assert_eq!(stickers[0].name, "sticker_1");
        assert_eq!(stickers[1].name, "sticker_2");
        assert_eq!(stickers[2].name, "sticker_3");
        assert!(stickers.iter().all(|s| !s.naming_in_progress));

        let ids: HashSet<&str> = stickers.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), 3);

        // scan order: left to right
        assert!(stickers[0].source_x < stickers[1].source_x);
        assert!(stickers[1].source_x < stickers[2].source_x);
    }

    #[test]
    fn progress_reports_each_phase() {
        let mut sheet = white_sheet(60, 60);
        paint_square(&mut sheet, 20, 20, 20);

        let mut lines: Vec<String> = Vec::new();
        let engine = StickerEngine::new();
        let _ = engine.cut_sheet(&sheet, &mut |status: &str| lines.push(status.to_string()));

        assert!(lines.iter().any(|l| l.contains("scanning")));
        assert!(lines.iter().any(|l| l.contains("grouped into 1")));
        assert!(lines.iter().any(|l| l.contains("extracting sticker 1/1")));
    }

    #[test]
    fn split_fragments_become_one_sticker() {
        // two blobs 8px apart: one sticker under the default 15px gap
        let mut sheet = white_sheet(100, 100);
        paint_square(&mut sheet, 20, 20, 20);
        paint_square(&mut sheet, 20, 48, 20);

        let engine = StickerEngine::new();
        let stickers = engine.cut_sheet(&sheet, &mut silent());
        assert_eq!(stickers.len(), 1);
    }

    #[test]
    fn cut_manual_uses_default_name() {
        let mut sheet = white_sheet(60, 60);
        paint_square(&mut sheet, 20, 20, 20);

        let engine = StickerEngine::new();
        let sticker = engine
            .cut_manual(
                &sheet,
                Rect {
                    min_x: 15,
                    max_x: 45,
                    min_y: 15,
                    max_y: 45,
                },
            )
            .unwrap();
        assert_eq!(sticker.name, FALLBACK_NAME);
        assert!(!sticker.id.is_empty());
    }

    #[test]
    fn cut_manual_outside_sheet_is_skipped() {
        let engine = StickerEngine::new();
        let sticker = engine.cut_manual(
            &white_sheet(50, 50),
            Rect {
                min_x: 200,
                max_x: 220,
                min_y: 200,
                max_y: 220,
            },
        );
        assert!(sticker.is_none());
    }

    #[test]
    fn data_url_has_png_prefix() {
        let mut sheet = white_sheet(60, 60);
        paint_square(&mut sheet, 20, 20, 20);
        let engine = StickerEngine::new();
        let stickers = engine.cut_sheet(&sheet, &mut silent());

        let url = stickers[0].to_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > 30);
    }

    struct FailingNamer;

    impl StickerNamer for FailingNamer {
        fn name_sticker(&self, _sticker: &[u8]) -> crate::Result<String> {
            Err(Error::Generation("boom".into()))
        }
    }

    struct CatNamer;

    impl StickerNamer for CatNamer {
        fn name_sticker(&self, _sticker: &[u8]) -> crate::Result<String> {
            Ok("cat".to_string())
        }
    }

    #[test]
    fn naming_failure_keeps_fallback_name() {
        let mut sheet = white_sheet(60, 60);
        paint_square(&mut sheet, 20, 20, 20);
        let engine = StickerEngine::new();
        let mut stickers = engine.cut_sheet(&sheet, &mut silent());

        name_stickers(&mut stickers, &FailingNamer);
        assert_eq!(stickers[0].name, FALLBACK_NAME);
        assert!(!stickers[0].naming_in_progress);
    }

    #[test]
    fn export_dedups_colliding_names() {
        let mut sheet = white_sheet(150, 60);
        paint_square(&mut sheet, 10, 10, 30);
        paint_square(&mut sheet, 80, 10, 30);

        let engine = StickerEngine::new();
        let mut stickers = engine.cut_sheet(&sheet, &mut silent());
        assert_eq!(stickers.len(), 2);
        name_stickers(&mut stickers, &CatNamer);

        let dir = tempfile::tempdir().unwrap();
        let paths = export_stickers(&stickers, dir.path()).unwrap();

        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["cat.png", "cat_1.png"]);
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[test]
    fn sanitize_filename_replaces_hostile_characters() {
        assert_eq!(sanitize_filename("cat"), "cat");
        assert_eq!(sanitize_filename("a cat/dog"), "a_cat_dog");
        assert_eq!(sanitize_filename("  spaced  "), "spaced");
        assert_eq!(sanitize_filename("../../etc"), "______etc");
        assert_eq!(sanitize_filename(""), FALLBACK_NAME);
    }

    #[test]
    fn is_supported_image_accepts_common_formats() {
        assert!(is_supported_image(Path::new("sheet.png")));
        assert!(is_supported_image(Path::new("sheet.JPEG")));
        assert!(is_supported_image(Path::new("sheet.webp")));
        assert!(!is_supported_image(Path::new("sheet.gif")));
        assert!(!is_supported_image(Path::new("sheet")));
    }

    #[test]
    fn process_file_rejects_unsupported_format_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sheet.gif");
        std::fs::write(&input, b"GIF89a").unwrap();

        let engine = StickerEngine::new();
        let result = engine.process_file(&input, dir.path(), &mut silent());

        assert!(!result.success);
        assert!(!result.skipped);
        assert!(
            result.message.contains("unsupported image format"),
            "{}",
            result.message
        );
        assert!(result.message.contains("gif"));
    }

    #[test]
    fn process_file_marks_blank_sheet_as_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let sheet_path = dir.path().join("blank.png");
        white_sheet(80, 80).save(&sheet_path).unwrap();

        let engine = StickerEngine::new();
        let result = engine.process_file(&sheet_path, dir.path(), &mut silent());

        assert!(result.success);
        assert!(result.skipped);
        assert_eq!(result.sticker_count, 0);
        assert!(result.message.contains("No stickers found"));
    }

    #[test]
    fn process_file_reports_missing_input() {
        let engine = StickerEngine::new();
        let out = tempfile::tempdir().unwrap();
        let result = engine.process_file(
            Path::new("/nonexistent/sheet.png"),
            out.path(),
            &mut silent(),
        );
        assert!(!result.success);
        assert!(result.message.contains("Failed to load"));
    }

    #[test]
    fn process_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let sheet_path = dir.path().join("sheet.png");
        let mut sheet = white_sheet(120, 60);
        paint_square(&mut sheet, 10, 10, 30);
        paint_square(&mut sheet, 70, 10, 30);
        sheet.save(&sheet_path).unwrap();

        let engine = StickerEngine::new();
        let out = dir.path().join("stickers");
        let result = engine.process_file(&sheet_path, &out, &mut silent());

        assert!(result.success, "{}", result.message);
        assert!(!result.skipped);
        assert_eq!(result.sticker_count, 2);
        assert!(out.join("sticker_1.png").exists());
        assert!(out.join("sticker_2.png").exists());
    }
}
