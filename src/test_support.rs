//! Helpers shared by the unit tests.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use tracing_subscriber::fmt::MakeWriter;

/// In-memory sink that can be handed to a spawned task and inspected afterwards.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuf {
    type Writer = SharedBuf;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// A yt-dlp stand-in: `sh -c <script>`, with the real arguments landing in `$@`.
#[cfg(unix)]
pub fn fake_tool(script: &str) -> crate::downloader::ExternalTool {
    crate::downloader::ExternalTool::new(
        "sh",
        vec!["-c".to_owned(), script.to_owned(), "yt-dlp".to_owned()],
    )
}
