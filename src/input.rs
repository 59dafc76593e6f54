//! Interactive input fed from a background reader thread.
//!
//! Tokio serves `tokio::io::stdin` from its blocking pool, and a pending read
//! there keeps the runtime from shutting down until the presenter presses
//! enter. [`LineReader`] reads on a detached thread instead and hands lines
//! over through a channel, so dropping the runtime never waits on the terminal.

use std::io::{self, BufRead};
use std::pin::Pin;
use std::sync::{Arc, Mutex, OnceLock};
use std::task::{Context, Poll, ready};
use std::thread;
use tokio::io::{AsyncBufRead, AsyncRead, ReadBuf};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

type Lines = Arc<Mutex<UnboundedReceiver<io::Result<Vec<u8>>>>>;

/// Process-wide stdin reader, started on first use and shared by every run.
static STDIN: OnceLock<Lines> = OnceLock::new();

fn stdin_lines() -> Lines {
    STDIN
        .get_or_init(|| spawn_reader(io::BufReader::new(io::stdin())))
        .clone()
}

fn spawn_reader<R: BufRead + Send + 'static>(mut reader: R) -> Lines {
    let (tx, rx) = unbounded_channel();

    thread::spawn(move || {
        loop {
            let mut line = Vec::new();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break, // EOF
                Ok(_) => {
                    if tx.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx.send(Err(err));
                    break;
                }
            }
        }
    });

    Arc::new(Mutex::new(rx))
}

/// Line-oriented [`AsyncBufRead`] over a blocking source.
///
/// End of the source reads as zero bytes, like any other async reader.
pub struct LineReader {
    /// `None` until first polled when reading the process stdin.
    lines: Option<Lines>,
    buf: Vec<u8>,
    pos: usize,
}

impl LineReader {
    /// Read from the process stdin. The reader thread starts on first poll.
    pub fn stdin() -> Self {
        LineReader {
            lines: None,
            buf: Vec::new(),
            pos: 0,
        }
    }

    /// Read from `source` on a dedicated thread.
    pub fn spawn<R: BufRead + Send + 'static>(source: R) -> Self {
        LineReader {
            lines: Some(spawn_reader(source)),
            buf: Vec::new(),
            pos: 0,
        }
    }
}

impl AsyncBufRead for LineReader {
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        let this = self.get_mut();
        while this.pos >= this.buf.len() {
            let lines = this.lines.get_or_insert_with(stdin_lines);
            let next = {
                let mut rx = lines
                    .lock()
                    .map_err(|_| io::Error::other("input reader poisoned"))?;
                ready!(rx.poll_recv(cx))
            };
            match next {
                Some(Ok(line)) => {
                    this.buf = line;
                    this.pos = 0;
                }
                Some(Err(err)) => return Poll::Ready(Err(err)),
                None => return Poll::Ready(Ok(&[])),
            }
        }
        Poll::Ready(Ok(&this.buf[this.pos..]))
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        let this = self.get_mut();
        this.pos = (this.pos + amt).min(this.buf.len());
    }
}

impl AsyncRead for LineReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        out: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let available = ready!(self.as_mut().poll_fill_buf(cx))?;
        let n = available.len().min(out.remaining());
        out.put_slice(&available[..n]);
        self.consume(n);
        Poll::Ready(Ok(()))
    }
}
