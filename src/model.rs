use std::path::PathBuf;

/// What the user asked to download
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadMode {
    /// One video, one audio file
    Single,
    /// Every entry of a playlist
    Playlist,
}

/// Everything a run needs, gathered once from the prompt and CLI flags
#[derive(Clone, Debug)]
pub struct DownloadRequest {
    /// Video or playlist URL as typed by the user
    pub url: String,
    /// Single video or playlist
    pub mode: DownloadMode,
    /// Folder the audio files are written to
    pub output_dir: PathBuf,
    /// Adds `--verbose` to yt-dlp and echoes its output
    pub debug: bool,
}

/// Completed/total pair driving the progress bar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressState {
    /// Items seen so far, never above `total`
    pub completed: u32,
    /// Items expected, at least 1
    pub total: u32,
}

impl ProgressState {
    pub fn new(total: u32) -> Self {
        Self {
            completed: 0,
            total: total.max(1),
        }
    }

    /// Records a completion signal; stale or oversized values cannot move the
    /// counter backwards or past `total`.
    pub fn observe(&mut self, signal: u32) {
        self.completed = self.completed.max(signal.min(self.total));
    }

    /// Whole percentage, rounded down
    pub fn percent(&self) -> u32 {
        (u64::from(self.completed) * 100 / u64::from(self.total)) as u32
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }

    pub fn finish(&mut self) {
        self.completed = self.total;
    }
}
