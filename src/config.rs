use std::path::PathBuf;

use clap::Parser;

use crate::downloader::ExternalTool;

/// Download audio from YouTube videos and playlists as mp3 through yt-dlp.
#[derive(Debug, Parser)]
#[command(name = "safe-yt-downloader", version)]
pub struct Config {
    /// Start with debug output and pass --verbose to yt-dlp
    #[arg(long, env = "SAFEYT_DEBUG")]
    pub debug: bool,

    /// yt-dlp executable to run
    #[arg(long = "yt-dlp", env = "YT_DLP_PATH", default_value = "yt-dlp")]
    pub yt_dlp: PathBuf,

    /// Extra argument passed to every yt-dlp call (repeatable)
    #[arg(long = "yt-dlp-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub yt_dlp_args: Vec<String>,

    /// Save here instead of asking for a folder
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl Config {
    pub fn tool(&self) -> ExternalTool {
        ExternalTool::new(self.yt_dlp.clone(), self.yt_dlp_args.clone())
    }
}

/// `~/Documents/Music`, or `./Music` when no home directory is known.
pub fn default_music_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Documents").join("Music"))
        .unwrap_or_else(|| PathBuf::from("Music"))
}

/// The desktop folder, if this machine has one.
pub fn desktop_dir() -> Option<PathBuf> {
    dirs::desktop_dir().filter(|dir| dir.is_dir())
}
