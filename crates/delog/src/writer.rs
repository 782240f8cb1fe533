use std::fmt;
use std::io;
use std::io::Stderr;
use std::io::Write;
use std::time::Instant;

use chrono::Local;
use chrono::Timelike;
use parking_lot::Mutex;

use crate::BANNER;
use crate::BufferPool;
use crate::Caller;
use crate::Config;
use crate::ElapsedFormatter;
use crate::HELP;
use crate::itoa;
use crate::write_stack;

/// Formats log lines and writes them to a sink, by default standard error.
///
/// Every line has the form `HH:MM:SS [elapsed] file:line: message`, followed
/// by a stack trace when the configuration asks for one.
pub struct Writer<W = Stderr> {
    config: Config,

    /// The moment logging started, used for the elapsed time of every line.
    start: Instant,

    pool: BufferPool,
    sink: Mutex<W>,
}

impl Writer<Stderr> {
    /// Creates a writer for standard error.
    pub fn stderr(config: Config) -> Self {
        Writer::new(config, io::stderr())
    }
}

impl<W: Write + Send> Writer<W> {
    /// Creates a writer that measures elapsed time from now.
    pub fn new(config: Config, sink: W) -> Self {
        Writer::with_start(config, sink, Instant::now())
    }

    /// Creates a writer that measures elapsed time from the given start.
    pub fn with_start(config: Config, sink: W, start: Instant) -> Self {
        Self {
            pool: BufferPool::new(config.buffer_size()),
            config,
            start,
            sink: Mutex::new(sink),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Writes the debug build banner and the usage hint.
    pub fn print_banner(&self) {
        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "{BANNER}{HELP}");
    }

    /// Formats a single line and writes it to the sink. Failures to write are ignored.
    pub fn write(&self, caller: Caller, has_error: bool, args: fmt::Arguments<'_>) {
        let mut buffer = self.pool.checkout();

        self.write_header(&mut buffer, caller);

        // A failing Display implementation only truncates the message.
        let _ = fmt::write(&mut LineWriter(&mut *buffer), args);
        buffer.push(b'\n');

        if self.config.stack_flags().should_print(has_error) {
            write_stack(&mut buffer, self.config.stack_buffer_size());
        }

        let _ = self.emit(&buffer);
    }

    /// Appends `HH:MM:SS [elapsed] file:line: ` to the buffer.
    fn write_header(&self, buffer: &mut Vec<u8>, caller: Caller) {
        let now = Local::now();
        let elapsed = self.start.elapsed();

        itoa(buffer, now.hour().into(), 2);
        buffer.push(b':');
        itoa(buffer, now.minute().into(), 2);
        buffer.push(b':');
        itoa(buffer, now.second().into(), 2);

        let _ = fmt::write(
            &mut LineWriter(&mut *buffer),
            format_args!(" [{}] ", ElapsedFormatter(elapsed)),
        );

        buffer.extend_from_slice(caller.file().as_bytes());
        buffer.push(b':');
        itoa(buffer, caller.line().into(), -1);
        buffer.extend_from_slice(b": ");
    }

    /// Writes a complete line while holding the sink lock, so that lines of
    /// concurrent callers never interleave.
    fn emit(&self, line: &[u8]) -> io::Result<()> {
        let mut sink = self.sink.lock();
        sink.write_all(line)?;
        sink.flush()
    }
}

/// Formats directly into a line buffer. Unlike [io::Write::write_fmt] an
/// error returned by a formatting implementation is passed on instead of
/// causing a panic.
struct LineWriter<'a>(&'a mut Vec<u8>);

impl fmt::Write for LineWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}
