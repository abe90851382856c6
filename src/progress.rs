use std::io::{self, Write};

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::model::ProgressState;

/// Number of cells in the rendered bar
pub const BAR_WIDTH: usize = 50;

// yt-dlp prints this once per item when it opens the output file.
static DESTINATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[download\] Destination: .+").expect("valid destination pattern"));

/// True when a line of yt-dlp output announces a new item being written.
pub fn is_destination_line(line: &str) -> bool {
    DESTINATION.is_match(line)
}

/// Single in-place line for the current state (no newline).
pub fn render_bar(state: &ProgressState) -> String {
    let percent = state.percent();
    let filled = BAR_WIDTH * percent as usize / 100;
    format!(
        "\r[INFO] Downloading... [{}{}] {}% ({}/{}) ",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        percent,
        state.completed,
        state.total
    )
}

/// Full bar that closes the line.
pub fn render_final(total: u32) -> String {
    format!(
        "\r[INFO] Downloading... [{}] 100% ({total}/{total}) \n",
        "#".repeat(BAR_WIDTH)
    )
}

/// Consumes completion signals and redraws the bar after each one.
pub struct ProgressMonitor<W> {
    state: ProgressState,
    out: W,
    // A `\r` frame is on screen without its newline.
    line_open: bool,
    finished: bool,
}

impl<W: Write> ProgressMonitor<W> {
    pub fn new(total: u32, out: W) -> Self {
        Self {
            state: ProgressState::new(total),
            out,
            line_open: false,
            finished: false,
        }
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    /// Runs until every item is counted or the sender side is dropped. Reaching
    /// the total draws the completed bar right away; a closed channel leaves the
    /// outcome to [`finish`](Self::finish) or [`interrupt`](Self::interrupt).
    pub async fn run(mut self, mut rx: UnboundedReceiver<u32>) -> io::Result<Self> {
        while !self.state.is_complete() {
            let Some(signal) = rx.recv().await else {
                debug!(
                    "Progress channel closed at {}/{}",
                    self.state.completed, self.state.total
                );
                return Ok(self);
            };
            self.state.observe(signal);
            self.draw(&render_bar(&self.state))?;
            self.line_open = true;
        }
        rx.close();

        self.finish()?;
        Ok(self)
    }

    /// Draws the full bar once, whatever the last signal was.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        self.state.finish();
        self.draw(&render_final(self.state.total))?;
        self.line_open = false;
        self.finished = true;
        Ok(())
    }

    /// Ends a partially drawn bar so the next message starts on its own line.
    pub fn interrupt(&mut self) -> io::Result<()> {
        if self.line_open {
            self.draw("\n")?;
            self.line_open = false;
        }
        Ok(())
    }

    fn draw(&mut self, frame: &str) -> io::Result<()> {
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SharedBuf;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn matches_destination_lines() {
        assert!(is_destination_line("[download] Destination: /music/Song.webm"));
        assert!(is_destination_line(
            "[download] Destination: C:\\Users\\me\\Music\\a b.m4a\n"
        ));
    }

    #[test]
    fn ignores_other_lines() {
        assert!(!is_destination_line("[download] Destination: "));
        assert!(!is_destination_line("[download]  42.0% of 3.10MiB at 1.2MiB/s"));
        assert!(!is_destination_line("[ExtractAudio] Destination: /music/Song.mp3"));
        assert!(!is_destination_line("[youtube] abc123: Downloading webpage"));
        assert!(!is_destination_line(""));
    }

    #[test]
    fn bar_fills_by_percentage() {
        let mut state = ProgressState::new(3);
        assert_eq!(
            render_bar(&state),
            format!("\r[INFO] Downloading... [{}] 0% (0/3) ", ".".repeat(50))
        );
        state.observe(1);
        assert_eq!(
            render_bar(&state),
            format!(
                "\r[INFO] Downloading... [{}{}] 33% (1/3) ",
                "#".repeat(16),
                ".".repeat(34)
            )
        );
    }

    #[test]
    fn final_bar_is_full() {
        assert_eq!(
            render_final(4),
            format!("\r[INFO] Downloading... [{}] 100% (4/4) \n", "#".repeat(50))
        );
    }

    #[tokio::test]
    async fn single_item_ends_at_one_of_one() {
        let buf = SharedBuf::default();
        let (tx, rx) = unbounded_channel();
        let monitor = tokio::spawn(ProgressMonitor::new(1, buf.clone()).run(rx));

        tx.send(1).unwrap();
        let state = monitor.await.unwrap().unwrap().state();

        assert_eq!(state, ProgressState { completed: 1, total: 1 });
        assert!(buf.contents().ends_with(&render_final(1)));
    }

    #[tokio::test]
    async fn playlist_signals_are_drawn_in_order() {
        let buf = SharedBuf::default();
        let (tx, rx) = unbounded_channel();
        let monitor = tokio::spawn(ProgressMonitor::new(3, buf.clone()).run(rx));

        for n in 1..=3 {
            tx.send(n).unwrap();
        }
        let state = monitor.await.unwrap().unwrap().state();
        let out = buf.contents();

        assert_eq!(state.completed, 3);
        let first = out.find("(1/3)").unwrap();
        let second = out.find("(2/3)").unwrap();
        let third = out.find("100% (3/3)").unwrap();
        assert!(first < second && second < third);
        assert!(out.ends_with(&render_final(3)));
    }

    #[tokio::test]
    async fn closed_channel_then_finish_draws_complete_bar() {
        let buf = SharedBuf::default();
        let (tx, rx) = unbounded_channel();
        let monitor = tokio::spawn(ProgressMonitor::new(5, buf.clone()).run(rx));

        tx.send(2).unwrap();
        drop(tx);
        let mut monitor = monitor.await.unwrap().unwrap();
        assert_eq!(monitor.state().completed, 2);
        assert!(!buf.contents().contains("100%"));

        monitor.finish().unwrap();
        monitor.finish().unwrap();

        assert_eq!(monitor.state(), ProgressState { completed: 5, total: 5 });
        assert!(buf.contents().contains("(2/5)"));
        assert!(buf.contents().ends_with(&render_final(5)));
        assert_eq!(buf.contents().matches("100%").count(), 1);
    }

    #[tokio::test]
    async fn interrupt_closes_a_partial_frame() {
        let buf = SharedBuf::default();
        let (tx, rx) = unbounded_channel();
        let monitor = tokio::spawn(ProgressMonitor::new(3, buf.clone()).run(rx));

        tx.send(1).unwrap();
        drop(tx);
        let mut monitor = monitor.await.unwrap().unwrap();
        monitor.interrupt().unwrap();
        monitor.interrupt().unwrap();

        let out = buf.contents();
        assert!(out.ends_with("33% (1/3) \n"));
        assert_eq!(out.matches('\n').count(), 1);
        assert!(!out.contains("100%"));
    }

    #[tokio::test]
    async fn interrupt_without_frames_writes_nothing() {
        let buf = SharedBuf::default();
        let (tx, rx) = unbounded_channel::<u32>();
        drop(tx);

        let mut monitor = ProgressMonitor::new(2, buf.clone()).run(rx).await.unwrap();
        monitor.interrupt().unwrap();

        assert!(buf.contents().is_empty());
    }

    #[tokio::test]
    async fn interrupt_after_completion_keeps_the_full_bar() {
        let buf = SharedBuf::default();
        let (tx, rx) = unbounded_channel();
        tx.send(1).unwrap();

        let mut monitor = ProgressMonitor::new(1, buf.clone()).run(rx).await.unwrap();
        monitor.interrupt().unwrap();

        assert!(buf.contents().ends_with(&render_final(1)));
    }

    #[tokio::test]
    async fn skipped_and_stale_signals_keep_the_count_sane() {
        let buf = SharedBuf::default();
        let (tx, rx) = unbounded_channel();
        let monitor = tokio::spawn(ProgressMonitor::new(4, buf.clone()).run(rx));

        tx.send(3).unwrap();
        tx.send(2).unwrap();
        tx.send(9).unwrap();
        let state = monitor.await.unwrap().unwrap().state();
        let out = buf.contents();

        assert_eq!(state.completed, 4);
        assert!(!out.contains("(2/4)"));
        assert!(!out.contains("(9/4)"));
        assert!(out.ends_with(&render_final(4)));
    }
}
