//! Show the selection window for a scroll offset.

use scrubline_common::config::ScrublineConfig;
use scrubline_engine::{clamp_seek_target, CoordinateMapper};
use scrubline_model::frame::expected_frame_count;

pub fn run(
    config: &ScrublineConfig,
    offset: f64,
    duration: Option<f64>,
    at: Option<f64>,
) -> anyhow::Result<()> {
    config
        .layout
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid layout: {e}"))?;
    let mapper = CoordinateMapper::new(config.layout);
    let window = mapper.window(offset);

    println!("Offset: {offset}px");
    println!("  Window width: {}px", mapper.window_width_px());
    println!("  Left edge:    {:.3}s", window.left_secs);
    println!("  Pop line:     {:.3}s", window.pop_line_secs);
    println!("  Right edge:   {:.3}s", window.right_secs);

    if let Some(duration) = duration {
        let frames = expected_frame_count(duration, config.layout.frames_per_second);
        println!();
        println!("Duration: {duration}s ({frames} frames)");
        println!(
            "  Scrub seek:   {:.3}s",
            clamp_seek_target(window.pop_line_secs, duration)
        );
        println!(
            "  Loop target:  {:.3}s",
            clamp_seek_target(window.left_secs, duration)
        );
        match mapper.frame_index_at(window.pop_line_secs, frames) {
            Some(index) => println!("  Pop frame:    #{}", index + 1),
            None => println!("  Pop frame:    (outside filmstrip)"),
        }
    }

    if let Some(time) = at {
        println!();
        println!(
            "Pop line at {time}s: offset {:.1}px",
            mapper.offset_for_pop_line_time(time)
        );
    }

    Ok(())
}
