use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{error, info, warn};

use video_captioner::config::Config;
use video_captioner::pipeline::VideoCaptioner;

/// Tracing filter for the chosen verbosity.
fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "video_captioner=debug,info"
    } else {
        "video_captioner=info,warn"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Video Captioner")
        .version("0.1.0")
        .about("Generates subtitles and burns them into videos")
        .arg(
            Arg::new("video")
                .value_name("FILE")
                .help("Video file to caption")
                .required(true),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Output directory for results")
                .default_value("./output"),
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("SECONDS")
                .help("Keyframe interval for silent videos")
                .default_value("3"),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_name("NUM")
                .help("Number of parallel overlay workers"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let video_path = PathBuf::from(matches.get_one::<String>("video").unwrap());
    let output_dir = PathBuf::from(matches.get_one::<String>("output-dir").unwrap());
    let interval: u32 = matches.get_one::<String>("interval").unwrap().parse()?;
    let verbose = matches.get_flag("verbose");

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .init();

    if verbose {
        info!("Verbose logging enabled");
    }

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    config.output.base_dir = output_dir;
    config.vision.keyframe_interval_seconds = interval;
    if let Some(workers) = matches.get_one::<String>("workers") {
        config.performance.max_workers = workers.parse()?;
    }

    info!("🚀 Video Captioner starting...");
    info!("📹 Input video: {}", video_path.display());
    info!("{}", config.summary());

    if !video_path.exists() {
        error!("Video file does not exist: {}", video_path.display());
        return Err(anyhow::anyhow!("Video file not found"));
    }

    tokio::fs::create_dir_all(&config.output.base_dir).await?;

    let captioner = VideoCaptioner::new(config)?;
    let result = captioner.run(&video_path).await?;

    info!(
        "🎉 Captioning completed in {:.2}s",
        result.processing_time.as_secs_f64()
    );
    info!("🧾 Caption source: {:?}", result.caption_source);
    info!(
        "📊 {} caption lines across {} captioned frames",
        result.caption_lines, result.frames_captioned
    );
    info!("📂 Output video: {}", result.output_video.display());
    if let Some(srt) = &result.srt_path {
        info!("📝 SRT sidecar: {}", srt.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flag_selects_debug_filter() {
        assert_eq!(log_filter(true), "video_captioner=debug,info");
        assert_eq!(log_filter(false), "video_captioner=info,warn");
    }
}
