use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use tracing::{error, info};

use crate::{error::AppError, model::DownloadMode};

/// Entries of the start menu
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Single,
    Playlist,
    Exit,
    EnableDebug,
}

impl FromStr for MenuChoice {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::Single),
            "2" => Ok(Self::Playlist),
            "3" => Ok(Self::Exit),
            "4" => Ok(Self::EnableDebug),
            _ => Err(()),
        }
    }
}

/// Line-based questions on any reader/writer pair (stdin/stdout in the binary).
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String, AppError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::InputClosed);
        }
        Ok(line.trim().to_owned())
    }

    /// Shows the menu until a download mode is picked. `None` means the user
    /// chose to exit. Option 4 turns on `debug` and shows the menu again.
    pub fn select_mode(&mut self, debug: &mut bool) -> Result<Option<DownloadMode>, AppError> {
        loop {
            let answer = self.ask(
                "Select mode: (1) Single Video (2) Playlist (3) Exit (4) Enable Debugging: ",
            )?;
            match answer.parse::<MenuChoice>() {
                Ok(MenuChoice::Single) => return Ok(Some(DownloadMode::Single)),
                Ok(MenuChoice::Playlist) => return Ok(Some(DownloadMode::Playlist)),
                Ok(MenuChoice::Exit) => return Ok(None),
                Ok(MenuChoice::EnableDebug) => {
                    *debug = true;
                    info!("Debug mode enabled.");
                }
                Err(()) => error!("Invalid input. Please enter 1, 2, 3, or 4."),
            }
        }
    }

    pub fn ask_url(&mut self) -> Result<String, AppError> {
        let url = self.ask("Enter YouTube URL: ")?;
        if url.is_empty() {
            return Err(AppError::EmptyUrl);
        }
        Ok(url)
    }

    /// Picks between the default folder and the desktop (only offered when it exists).
    pub fn choose_output_dir(
        &mut self,
        default: &Path,
        desktop: Option<&Path>,
    ) -> Result<PathBuf, AppError> {
        writeln!(self.output, "\nSelect output path:")?;
        writeln!(self.output, "(1) Default → {}", default.display())?;
        if let Some(desktop) = desktop {
            writeln!(self.output, "(2) Desktop → {}", desktop.display())?;
        }

        let choice = self.ask("Choice (1 or 2): ")?;
        Ok(match desktop {
            Some(desktop) if choice == "2" => desktop.to_path_buf(),
            _ => default.to_path_buf(),
        })
    }
}
