//! Check external tools and configuration.

use std::path::Path;

use scrubline_common::config::{config_file_path, ScrublineConfig};
use scrubline_extract::command_exists;

pub fn run(config: &ScrublineConfig, config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("Scrubline System Check");
    println!("{}", "=".repeat(50));

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    if path.exists() {
        println!("[OK] Config file: {}", path.display());
    } else {
        println!("[--] Config file: {} (using defaults)", path.display());
    }

    let layout_ok = match config.layout.validate() {
        Ok(()) => {
            println!(
                "[OK] Layout: {}px tiles, {} fps, {}s window, pop line at {}",
                config.layout.tile_width,
                config.layout.frames_per_second,
                config.layout.window_duration_secs,
                config.layout.window_anchor_fraction
            );
            true
        }
        Err(e) => {
            println!("[FAIL] Layout: {e}");
            false
        }
    };

    let mut tools_ok = true;
    for binary in [
        &config.extraction.ffmpeg_binary,
        &config.extraction.ffprobe_binary,
    ] {
        if command_exists(binary) {
            println!("[OK] Found {binary}");
        } else {
            println!("[FAIL] {binary} not found on PATH");
            tools_ok = false;
        }
    }
    println!("[OK] Frame cache: {}", config.cache_dir.display());

    println!();
    if layout_ok && tools_ok {
        println!("Scrubline is ready.");
    } else {
        println!("Some checks failed. See above for details.");
    }

    Ok(())
}
