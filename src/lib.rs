//! Cut a sheet of small drawn icons on a white background into individually
//! cropped, outlined, transparent-background stickers.
//!
//! The pipeline finds every connected region of non-background pixels with a
//! flood-fill scan, merges fragments that belong to the same sticker (a
//! speech bubble hovering above its character), then crops each region,
//! strips the background reachable from the crop border, and stamps a
//! uniform white outline around the artwork.
//!
//! # Quick Start
//!
//! ```no_run
//! use sticker_cutout::StickerEngine;
//!
//! let engine = StickerEngine::new();
//! let sheet = image::open("sheet.png").unwrap().to_rgba8();
//! let stickers = engine.cut_sheet(&sheet, &mut |status: &str| eprintln!("{status}"));
//! for sticker in &stickers {
//!     println!("{}: {}x{}", sticker.name, sticker.width(), sticker.height());
//! }
//! ```
//!
//! # Manual selection
//!
//! A user-drawn rectangle can bypass detection entirely:
//!
//! ```no_run
//! use sticker_cutout::{Rect, StickerEngine};
//!
//! let engine = StickerEngine::new();
//! let sheet = image::open("sheet.png").unwrap().to_rgba8();
//! let rect = Rect { min_x: 40, max_x: 120, min_y: 40, max_y: 120 };
//! if let Some(sticker) = engine.cut_manual(&sheet, rect) {
//!     sticker.image.save("manual.png").unwrap();
//! }
//! ```

#![deny(missing_docs)]

pub mod background;
pub mod collab;
pub mod detect;
mod engine;
pub mod error;
pub mod extract;
pub mod id;
pub mod merge;
pub mod rect;

pub use background::BackgroundThresholds;
pub use collab::{SheetGenerator, StickerNamer, FALLBACK_NAME};
pub use detect::DetectOptions;
pub use engine::{
    export_stickers, is_supported_image, name_stickers, sanitize_filename, ProcessResult,
    Progress, SheetOptions, Sticker, StickerEngine,
};
pub use error::{Error, Result};
pub use extract::ExtractOptions;
pub use rect::Rect;
