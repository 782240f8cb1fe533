use std::fmt;
use std::fmt::Write;
use std::ops::BitOr;
use std::ops::BitOrAssign;
use std::str::FromStr;

use backtrace::Backtrace;
use log::trace;
use thiserror::Error;

/// Decides whether a stack trace is appended to a log line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StackFlags(u8);

impl StackFlags {
    /// Stack traces are enabled.
    pub const PRINT_STACK: StackFlags = StackFlags(1);

    /// Only print a stack trace when one of the arguments is an error.
    pub const ON_ERROR: StackFlags = StackFlags(1 << 1);

    /// Print a stack trace on every call.
    pub const ALL: StackFlags = StackFlags(1 << 2);

    /// No stack traces at all.
    pub const fn empty() -> Self {
        StackFlags(0)
    }

    pub const fn contains(self, other: StackFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true iff a stack trace must be appended to a line, where
    /// `has_error` indicates that the arguments contained an error.
    pub const fn should_print(self, has_error: bool) -> bool {
        if !self.contains(StackFlags::PRINT_STACK) {
            return false;
        }

        if self.contains(StackFlags::ON_ERROR) {
            has_error
        } else {
            true
        }
    }
}

impl BitOr for StackFlags {
    type Output = StackFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        StackFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for StackFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StackModeError {
    #[error("The stack trace setting is empty")]
    Empty,
}

/// The stack trace setting, as given by the `DELOG_STACKTRACE` environment variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackMode {
    /// `error`: only when an argument is an error.
    Error,

    /// `all`: on every call.
    All,

    /// Any other value, which behaves the same as [StackMode::Error].
    Other,
}

impl StackMode {
    /// Returns the flags corresponding to this mode.
    pub fn flags(self) -> StackFlags {
        match self {
            StackMode::All => StackFlags::PRINT_STACK | StackFlags::ALL,
            StackMode::Error | StackMode::Other => StackFlags::PRINT_STACK | StackFlags::ON_ERROR,
        }
    }
}

impl FromStr for StackMode {
    type Err = StackModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(StackModeError::Empty);
        }

        if s.eq_ignore_ascii_case("error") {
            Ok(StackMode::Error)
        } else if s.eq_ignore_ascii_case("all") {
            Ok(StackMode::All)
        } else {
            Ok(StackMode::Other)
        }
    }
}

/// Captures the stack trace of the current thread and appends it, followed by
/// a newline, to the buffer.
pub fn write_stack(buffer: &mut Vec<u8>, scratch_size: usize) {
    let trace = Backtrace::new();
    buffer.extend_from_slice(render_bounded(&trace, scratch_size).as_bytes());
    buffer.push(b'\n');
}

/// Renders the value into a scratch buffer of `scratch_size` bytes. Whenever
/// the rendering fills the buffer it is considered truncated, the size is
/// doubled and the rendering is retried until it fits.
fn render_bounded<T: fmt::Debug + ?Sized>(value: &T, scratch_size: usize) -> String {
    let mut limit = scratch_size.max(1);
    let mut scratch = String::with_capacity(limit);

    loop {
        scratch.clear();

        let mut writer = BoundedWriter {
            text: &mut scratch,
            limit,
        };

        if write!(writer, "{value:?}").is_ok() {
            return scratch;
        }

        limit *= 2;
        trace!("Stack trace did not fit, retrying with {limit} bytes");
        scratch.reserve(limit);
    }
}

/// A writer that refuses to fill its text up to the limit.
struct BoundedWriter<'a> {
    text: &'a mut String,
    limit: usize,
}

impl Write for BoundedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.text.len() + s.len() >= self.limit {
            return Err(fmt::Error);
        }

        self.text.push_str(s);
        Ok(())
    }
}
