use std::{io, process::ExitStatus};

use thiserror::Error;

/// Fatal conditions; every one of them ends the program with a non-zero status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No URL provided.")]
    EmptyUrl,

    #[error("Input closed before a choice was made.")]
    InputClosed,

    #[error("Failed to retrieve playlist length ({0}).")]
    PlaylistProbe(ExitStatus),

    #[error("Download process failed ({0}).")]
    DownloadFailed(ExitStatus),

    #[error("Unexpected error: could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Unexpected error: {0}")]
    Io(#[from] io::Error),

    #[error("Unexpected error: progress monitor stopped: {0}")]
    Monitor(#[from] tokio::task::JoinError),
}
