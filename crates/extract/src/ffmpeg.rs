//! `ffmpeg`/`ffprobe` command-line backend.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;

use scrubline_common::config::{ExtractionConfig, ScrublineConfig};
use scrubline_common::error::{ScrublineError, ScrublineResult};

use crate::template::FramePathTemplate;
use crate::{ExtractionJob, FrameExtractor};

/// Lines of stderr kept as the diagnostic trace of a failed run.
const STDERR_TAIL_LINES: usize = 20;

/// Extracts one scaled PNG per second of video with the `ffmpeg` CLI.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    binary: String,
    cache_dir: PathBuf,
    frames_per_second: f64,
    thumbnail_width: u32,
}

impl FfmpegExtractor {
    pub fn new(config: &ScrublineConfig) -> Self {
        Self::with_settings(
            &config.extraction,
            config.cache_dir.clone(),
            config.layout.frames_per_second,
        )
    }

    pub fn with_settings(
        extraction: &ExtractionConfig,
        cache_dir: PathBuf,
        frames_per_second: f64,
    ) -> Self {
        Self {
            binary: extraction.ffmpeg_binary.clone(),
            cache_dir,
            frames_per_second,
            thumbnail_width: extraction.thumbnail_width,
        }
    }

    /// Directory the frames are written to.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Output template for a job: `<cache_dir>/<stem>_<selection>_%4d.png`.
    ///
    /// A superseded run keeps writing after it is discarded, so every
    /// selection gets its own file names even when stems collide.
    pub fn output_template(&self, job: &ExtractionJob) -> ScrublineResult<FramePathTemplate> {
        let path = self
            .cache_dir
            .join(format!("{}_{}_%4d.png", job.output_stem, job.selection.0));
        FramePathTemplate::parse(path.to_string_lossy().into_owned())
    }

    /// Arguments for one extraction run.
    pub fn build_args(&self, job: &ExtractionJob, template: &FramePathTemplate) -> Vec<String> {
        vec![
            "-nostdin".to_string(),
            "-y".to_string(),
            "-ss".to_string(),
            "0".to_string(),
            "-i".to_string(),
            job.source_uri.clone(),
            "-vf".to_string(),
            format!(
                "fps={}/1:round=up,scale={}:-2",
                self.frames_per_second, self.thumbnail_width
            ),
            "-vframes".to_string(),
            job.frame_count.to_string(),
            template.as_str().to_string(),
        ]
    }
}

#[async_trait]
impl FrameExtractor for FfmpegExtractor {
    async fn extract(&self, job: &ExtractionJob) -> ScrublineResult<FramePathTemplate> {
        let template = self.output_template(job)?;
        tokio::fs::create_dir_all(&self.cache_dir).await?;

        let args = self.build_args(job, &template);
        tracing::debug!(binary = %self.binary, ?args, "Running frame extraction");

        let started = std::time::Instant::now();
        let output = tokio::process::Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                ScrublineError::extraction(None, format!("Failed to start {}: {e}", self.binary))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScrublineError::extraction(
                output.status.code(),
                stderr_tail(&stderr, STDERR_TAIL_LINES),
            ));
        }

        tracing::info!(
            frames = job.frame_count,
            elapsed_ms = started.elapsed().as_millis(),
            template = %template,
            "Frame extraction completed"
        );
        Ok(template)
    }

    fn is_available(&self) -> bool {
        command_exists(&self.binary)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Read a video duration with `ffprobe`.
///
/// Stands in for the player's load event when no player is attached.
pub async fn probe_duration(ffprobe_binary: &str, path: &Path) -> ScrublineResult<f64> {
    let output = tokio::process::Command::new(ffprobe_binary)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ScrublineError::metadata(format!("Failed to start {ffprobe_binary}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScrublineError::metadata(format!(
            "{ffprobe_binary} failed (status {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
}

fn parse_probe_duration(raw: &str) -> ScrublineResult<f64> {
    let line = raw.lines().next().unwrap_or_default().trim();
    match line.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs),
        _ => Err(ScrublineError::metadata(format!(
            "unreadable duration: {line:?}"
        ))),
    }
}

fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let skip = lines.len().saturating_sub(max_lines);
    lines[skip..].join("\n")
}

/// Whether `binary` names an executable, either as a path or on `PATH`.
///
/// The name is never handed to a shell.
pub fn command_exists(binary: &str) -> bool {
    if binary.is_empty() {
        return false;
    }
    let candidate = Path::new(binary);
    if candidate.components().count() > 1 {
        return is_executable(candidate);
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(binary))))
        .unwrap_or(false)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
