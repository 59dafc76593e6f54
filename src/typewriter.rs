//! Writing lines character by character with random delays.

use crate::config::Options;
use rand::Rng;
use std::io::{self, Write};
use std::time::Duration;
use tokio::time::sleep;

/// Renders text either instantly or with a simulated typing effect.
///
/// In delayed mode every character waits an independent, uniformly random
/// duration in `[0, max_delay)` and is flushed as soon as it is written, so
/// the viewer sees it appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Typewriter {
    max_delay: Option<Duration>,
}

impl Typewriter {
    /// Render without any delay.
    pub fn instant() -> Self {
        Self { max_delay: None }
    }

    /// Render with a random per-character delay bounded by `max_delay`.
    ///
    /// A ceiling below one millisecond renders instantly.
    pub fn with_max_delay(max_delay: Duration) -> Self {
        if max_delay.as_millis() == 0 {
            Self::instant()
        } else {
            Self {
                max_delay: Some(max_delay),
            }
        }
    }

    pub fn from_options(options: &Options) -> Self {
        if options.immediate {
            Self::instant()
        } else {
            Self::with_max_delay(Duration::from_millis(options.typewriter_speed))
        }
    }

    pub fn is_instant(&self) -> bool {
        self.max_delay.is_none()
    }

    /// Write every line followed by a newline.
    ///
    /// The first write error aborts the remaining output.
    pub async fn render<S: AsRef<str>>(
        &self,
        out: &mut (dyn Write + Send),
        lines: &[S],
    ) -> io::Result<()> {
        for line in lines {
            let line = line.as_ref();
            match self.max_delay {
                None => out.write_all(line.as_bytes())?,
                Some(max_delay) => {
                    let mut buf = [0u8; 4];
                    for ch in line.chars() {
                        // Drop rng before the await so it does not cross the yield point.
                        let delay_ms = {
                            let mut rng = rand::thread_rng();
                            rng.gen_range(0..max_delay.as_millis() as u64)
                        };
                        sleep(Duration::from_millis(delay_ms)).await;
                        out.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
                        out.flush()?;
                    }
                }
            }
            out.write_all(b"\n")?;
            out.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("write error"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_instant_render() {
        let mut out = Vec::new();
        Typewriter::instant()
            .render(&mut out, &["hello", "world"])
            .await
            .unwrap();
        assert_eq!(out, b"hello\nworld\n");
    }

    #[tokio::test]
    async fn test_delayed_render_writes_same_text() {
        let mut out = Vec::new();
        Typewriter::with_max_delay(Duration::from_millis(2))
            .render(&mut out, &["héllo"])
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "héllo\n");
    }

    #[tokio::test]
    async fn test_delay_is_bounded() {
        let mut out = Vec::new();
        let start = Instant::now();
        Typewriter::with_max_delay(Duration::from_millis(1))
            .render(&mut out, &["abcdefghij"])
            .await
            .unwrap();
        // gen_range(0..1) always yields zero.
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_empty_line_is_newline() {
        let mut out = Vec::new();
        Typewriter::instant().render(&mut out, &[""]).await.unwrap();
        assert_eq!(out, b"\n");
    }

    #[tokio::test]
    async fn test_write_error_propagates() {
        let err = Typewriter::with_max_delay(Duration::from_millis(1))
            .render(&mut FailingWriter, &["text"])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "write error");
    }

    #[test]
    fn test_from_options() {
        let options = Options {
            immediate: true,
            ..Options::default()
        };
        assert!(Typewriter::from_options(&options).is_instant());
        assert!(!Typewriter::from_options(&Options::default()).is_instant());
        assert!(Typewriter::with_max_delay(Duration::ZERO).is_instant());
        assert!(Typewriter::with_max_delay(Duration::from_micros(500)).is_instant());
    }
}
