//! Show or write the configuration.

use std::path::PathBuf;

use scrubline_common::config::ScrublineConfig;

pub fn run(config: &ScrublineConfig, path: Option<PathBuf>, write: bool) -> anyhow::Result<()> {
    if !write {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    let written = match path {
        Some(path) => {
            config.save_to(&path)?;
            path
        }
        None => config.save()?,
    };
    println!("Wrote config to {}", written.display());
    Ok(())
}
