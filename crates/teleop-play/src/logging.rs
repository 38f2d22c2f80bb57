//! Log output that stays readable while the terminal is in raw mode.
//!
//! Raw mode turns off output post-processing, so a bare `\n` moves down a
//! line without returning the cursor and log lines staircase across the
//! screen. [`CrlfWriter`] puts the `\r` back while raw mode is on.

use std::io::{self, Write};

use tracing_subscriber::EnvFilter;

/// Writer that turns `\n` into `\r\n` when `raw` is set
#[derive(Debug)]
pub struct CrlfWriter<W> {
    inner: W,
    raw: bool,
    after_cr: bool,
}

impl<W: Write> CrlfWriter<W> {
    /// Wrap `inner`; `raw` selects line ending translation
    pub fn new(inner: W, raw: bool) -> Self {
        Self {
            inner,
            raw,
            after_cr: false,
        }
    }

    /// The wrapped writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl CrlfWriter<io::Stderr> {
    /// Stderr, translated if the terminal is currently raw
    #[must_use]
    pub fn stderr() -> Self {
        let raw = crossterm::terminal::is_raw_mode_enabled().unwrap_or(false);
        Self::new(io::stderr(), raw)
    }
}

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.raw {
            return self.inner.write(buf);
        }

        let mut out = Vec::with_capacity(buf.len() + 8);
        for &byte in buf {
            if byte == b'\n' && !self.after_cr {
                out.push(b'\r');
            }
            out.push(byte);
            self.after_cr = byte == b'\r';
        }
        self.inner.write_all(&out)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the `info` default
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(CrlfWriter::stderr)
        .init();
}
