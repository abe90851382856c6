use std::{ffi::OsStr, path::PathBuf, process::Stdio};

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    process::Command,
    sync::mpsc::UnboundedSender,
};
use tracing::debug;

use crate::{error::AppError, model::DownloadRequest, progress::is_destination_line};

/// The yt-dlp executable plus arguments passed ahead of every invocation.
#[derive(Clone, Debug)]
pub struct ExternalTool {
    program: PathBuf,
    extra_args: Vec<String>,
}

impl ExternalTool {
    pub fn new(program: impl Into<PathBuf>, extra_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            extra_args,
        }
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.extra_args).args(args).kill_on_drop(true);
        cmd
    }

    fn describe(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.extra_args.iter().map(OsStr::new))
            .chain(args.iter().map(OsStr::new))
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn spawn_error(&self, source: std::io::Error) -> AppError {
        AppError::Spawn {
            program: self.program.display().to_string(),
            source,
        }
    }
}

/// Audio-only, best quality, transcoded to mp3 into `<dir>/<title>.<ext>`.
pub fn download_args(request: &DownloadRequest) -> Vec<String> {
    let template = request.output_dir.join("%(title)s.%(ext)s");
    let mut args = Vec::with_capacity(11);
    if request.debug {
        args.push("--verbose".to_owned());
    }
    args.extend(
        [
            "--format",
            "bestaudio/best",
            "--extract-audio",
            "--audio-format",
            "mp3",
            "--audio-quality",
            "0",
            "--output",
        ]
        .map(str::to_owned),
    );
    args.push(template.to_string_lossy().into_owned());
    args.push(request.url.clone());
    args
}

/// Lists playlist entry ids, one per line, without downloading anything.
pub fn playlist_probe_args(url: &str) -> Vec<String> {
    vec![
        "--flat-playlist".to_owned(),
        "--print".to_owned(),
        "%(id)s".to_owned(),
        url.to_owned(),
    ]
}

/// Number of non-blank lines; an empty listing still counts as one item.
pub fn count_playlist_items(listing: &str) -> u32 {
    let count = listing.lines().filter(|l| !l.trim().is_empty()).count();
    u32::try_from(count).unwrap_or(u32::MAX).max(1)
}

/// Asks yt-dlp how many entries the playlist has.
pub async fn fetch_playlist_length(tool: &ExternalTool, url: &str) -> Result<u32, AppError> {
    debug!("Fetching playlist length...");
    let output = tool
        .command(&playlist_probe_args(url))
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| tool.spawn_error(e))?;

    if !output.status.success() {
        debug!("yt-dlp stderr: {}", String::from_utf8_lossy(&output.stderr).trim());
        return Err(AppError::PlaylistProbe(output.status));
    }

    let length = count_playlist_items(&String::from_utf8_lossy(&output.stdout));
    debug!("Playlist contains {length} videos.");
    Ok(length)
}

/// Runs the download, pushing 1, 2, 3, … into `progress_tx` as items start.
/// Returns how many items were seen once yt-dlp exits successfully.
pub async fn spawn_download(
    tool: &ExternalTool,
    request: &DownloadRequest,
    progress_tx: UnboundedSender<u32>,
) -> Result<u32, AppError> {
    let args = download_args(request);
    debug!("Executing command: {}", tool.describe(&args));

    // Only stdout is scraped; yt-dlp's own errors go straight to the terminal
    let mut child = tool
        .command(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| tool.spawn_error(e))?;

    let out = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("yt-dlp stdout was not captured"))?;
    let completed = forward_completions(BufReader::new(out), &progress_tx).await?;
    drop(progress_tx);

    // Output is exhausted; the exit status decides success
    let status = child.wait().await?;
    if !status.success() {
        return Err(AppError::DownloadFailed(status));
    }
    Ok(completed)
}

/// Scans yt-dlp output line by line. Lines are decoded lossily because titles
/// arrive in the locale encoding, which need not be UTF-8.
async fn forward_completions<R>(
    mut reader: R,
    progress_tx: &UnboundedSender<u32>,
) -> std::io::Result<u32>
where
    R: AsyncBufRead + Unpin,
{
    let mut completed = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        debug!("yt-dlp output: {}", line.trim());
        if is_destination_line(&line) {
            completed += 1;
            // The monitor may already be done; extra signals are not an error.
            let _ = progress_tx.send(completed);
        }
    }
    Ok(completed)
}
