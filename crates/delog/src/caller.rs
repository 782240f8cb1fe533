use std::panic::Location;

/// The file name used when the call site could not be resolved.
pub const UNKNOWN_FILE: &str = "no_file";

/// The call site of a logging call, shown as `file:line` on the log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller {
    file: &'static str,
    line: u32,
}

impl Caller {
    /// Creates a caller from a source path and a line number. Only the last
    /// path segment is kept. An empty path is treated as unresolved.
    pub fn new(path: &'static str, line: u32) -> Self {
        let file = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();

        if file.is_empty() {
            Self::unknown()
        } else {
            Self { file, line }
        }
    }

    /// The placeholder for a call site that could not be resolved.
    pub const fn unknown() -> Self {
        Self {
            file: UNKNOWN_FILE,
            line: 0,
        }
    }

    /// Returns the file name of the call site.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Returns the line number of the call site.
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl From<&'static Location<'static>> for Caller {
    fn from(location: &'static Location<'static>) -> Self {
        Caller::new(location.file(), location.line())
    }
}
