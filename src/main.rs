//! Terminal front-end that downloads YouTube audio as mp3 through yt-dlp

// Command line flags and default folders
mod config;
// External downloader spawning logic (yt-dlp)
mod downloader;
// Fatal error kinds
mod error;
// [LEVEL]-prefixed console logging
mod logging;
// Data models for the request and progress state
mod model;
// Output scraping and the progress bar task
mod progress;
// Interactive menu and questions
mod prompt;
#[cfg(test)]
mod test_support;

use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
};

use clap::Parser;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, error, info};

use config::{Config, default_music_dir, desktop_dir};
use downloader::{ExternalTool, fetch_playlist_length, spawn_download};
use error::AppError;
use logging::LogHandle;
use model::{DownloadMode, DownloadRequest, ProgressState};
use progress::ProgressMonitor;
use prompt::Prompt;

/// Program entry point: parses flags, sets up logging and runs one session
#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    let log = logging::init_tracing(config.debug);

    println!("=== SafeYtDownloader ===");
    let mut prompt = Prompt::new(io::stdin().lock(), io::stdout());

    match run(&config, &mut prompt, &log, io::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// One full session: menu, URL, folder, optional playlist probe, download.
async fn run<R, W, P>(
    config: &Config,
    prompt: &mut Prompt<R, W>,
    log: &LogHandle,
    progress_out: P,
) -> Result<(), AppError>
where
    R: BufRead,
    W: Write,
    P: Write + Send + 'static,
{
    // Mode menu; option 4 may switch debug on along the way
    let mut debug = config.debug;
    let Some(mode) = prompt.select_mode(&mut debug)? else {
        info!("Exiting SafeYtDownloader...");
        return Ok(());
    };
    if debug {
        log.enable_debug();
    }

    // URL and destination folder
    let url = prompt.ask_url()?;
    let output_dir = match &config.output_dir {
        Some(dir) => dir.clone(),
        None => prompt.choose_output_dir(&default_music_dir(), desktop_dir().as_deref())?,
    };
    std::fs::create_dir_all(&output_dir)?;
    debug!("Save path: {}", output_dir.display());

    let request = DownloadRequest {
        url,
        mode,
        output_dir,
        debug,
    };
    let tool = config.tool();

    // Playlists need a separate yt-dlp call to learn the item count
    let total = match request.mode {
        DownloadMode::Single => 1,
        DownloadMode::Playlist => fetch_playlist_length(&tool, &request.url).await?,
    };

    // Run the download with the progress bar alongside
    download(&tool, &request, total, progress_out).await?;
    info!(
        "Download completed! MP3 files saved in: {}",
        request.output_dir.display()
    );
    Ok(())
}

/// Starts the progress bar task, runs yt-dlp, then waits for the bar to finish.
async fn download<P>(
    tool: &ExternalTool,
    request: &DownloadRequest,
    total: u32,
    progress_out: P,
) -> Result<ProgressState, AppError>
where
    P: Write + Send + 'static,
{
    debug!("Starting download for URL: {}", request.url);
    // Start the progress bar before yt-dlp so no signal is missed
    let (tx, rx) = unbounded_channel();
    let monitor = tokio::spawn(ProgressMonitor::new(total, progress_out).run(rx));

    // The runner owns the sender; the bar task ends once it returns
    let outcome = spawn_download(tool, request, tx).await;

    match outcome {
        Ok(seen) => {
            debug!("yt-dlp finished after {seen} of {total} items");
            // Force the bar to total/total even if some signals never came
            let mut monitor = monitor.await??;
            monitor.finish()?;
            Ok(monitor.state())
        }
        Err(e) => {
            // Close a half-drawn bar so the error gets its own line
            if let Ok(Ok(mut monitor)) = monitor.await {
                let _ = monitor.interrupt();
            }
            Err(e)
        }
    }
}
