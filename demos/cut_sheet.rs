//! Cut a single sticker sheet into outlined stickers.
//!
//! Usage:
//! ```sh
//! cargo run --example cut_sheet -- sheet.png stickers/
//! ```

use std::env;
use std::path::Path;
use std::process;

use sticker_cutout::{export_stickers, StickerEngine};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <sheet> <output_dir>", args[0]);
        process::exit(1);
    }

    let sheet = image::open(&args[1])
        .expect("failed to load sheet")
        .to_rgba8();

    let engine = StickerEngine::new();
    let stickers = engine.cut_sheet(&sheet, &mut |status: &str| eprintln!("{status}"));

    if stickers.is_empty() {
        println!("No stickers found (check that the background is near-white).");
        return;
    }

    let paths = export_stickers(&stickers, Path::new(&args[2])).expect("failed to export");
    for path in paths {
        println!("wrote {}", path.display());
    }
}
