use std::ffi::OsStr;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use log::debug;

use crate::StackFlags;
use crate::StackMode;

/// The environment variable that controls stack traces.
pub const STACKTRACE_ENV: &str = "DELOG_STACKTRACE";

/// The default capacity of the pooled line buffers.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// The initial size of the scratch buffer used to capture stack traces.
pub const DEFAULT_STACK_BUFFER_SIZE: usize = 1024;

/// Suppresses the debug build banner when set before the first logging call.
pub static DISABLE_DEBUG_WARNING: AtomicBool = AtomicBool::new(false);

/// The banner shown once when a debug build starts logging.
pub const BANNER: &str = "\
* * * * * * * * * * * * * * * * * * * *
* * * * * * * DEBUG BUILD * * * * * * *
* * * * * * * * * * * * * * * * * * * *
";

/// Explains how to enable stack traces, printed after the banner.
pub const HELP: &str = "\
- Set DELOG_STACKTRACE=ERROR to see stack traces when delog::printf!() encounters an error.
- Set DELOG_STACKTRACE=ALL to see stack traces on every call to delog::printf!().
";

/// The configuration of an active logger. It is constructed once and never
/// changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    stack_flags: StackFlags,
    buffer_size: usize,
    stack_buffer_size: usize,
    show_banner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stack_flags: StackFlags::empty(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            stack_buffer_size: DEFAULT_STACK_BUFFER_SIZE,
            show_banner: true,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        let config = Self::from_setting(std::env::var_os(STACKTRACE_ENV).as_deref())
            .with_banner(banner_enabled());

        debug!("Configured delog with {config:?}");
        config
    }

    /// Constructs the configuration for the given value of the stack trace
    /// setting, where `None` means that it is not set at all.
    pub fn from_setting(setting: Option<&OsStr>) -> Self {
        let mode = setting.and_then(|value| value.to_string_lossy().parse::<StackMode>().ok());
        Self::default().with_stack_mode(mode)
    }

    /// Enables stack traces for the given mode, or disables them for `None`.
    /// Enabling stack traces grows the default buffer capacity by the stack
    /// buffer size.
    pub fn with_stack_mode(mut self, mode: Option<StackMode>) -> Self {
        match mode {
            Some(mode) => {
                if self.stack_flags.is_empty() {
                    self.buffer_size += self.stack_buffer_size;
                }
                self.stack_flags = mode.flags();
            }
            None => {
                if !self.stack_flags.is_empty() {
                    self.buffer_size -= self.stack_buffer_size;
                }
                self.stack_flags = StackFlags::empty();
            }
        }

        self
    }

    /// Enables or disables the start-up banner.
    pub fn with_banner(mut self, show_banner: bool) -> Self {
        self.show_banner = show_banner;
        self
    }

    pub fn stack_flags(&self) -> StackFlags {
        self.stack_flags
    }

    /// The initial capacity of a newly allocated line buffer.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// The initial size of the stack trace scratch buffer.
    pub fn stack_buffer_size(&self) -> usize {
        self.stack_buffer_size
    }

    pub fn show_banner(&self) -> bool {
        self.show_banner
    }
}

/// The banner is shown unless it was disabled at run time through
/// [DISABLE_DEBUG_WARNING], or at compile time by setting
/// `DELOG_DISABLE_DEBUG_WARNING` to anything but `0`.
fn banner_enabled() -> bool {
    let disabled_at_compile_time = option_env!("DELOG_DISABLE_DEBUG_WARNING").is_some_and(|value| value != "0");
    !disabled_at_compile_time && !DISABLE_DEBUG_WARNING.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_case::test_case;

    #[test_case(Some("error"), StackFlags::PRINT_STACK | StackFlags::ON_ERROR ; "error")]
    #[test_case(Some("ERROR"), StackFlags::PRINT_STACK | StackFlags::ON_ERROR ; "error uppercase")]
    #[test_case(Some("all"), StackFlags::PRINT_STACK | StackFlags::ALL ; "all")]
    #[test_case(Some("ALL"), StackFlags::PRINT_STACK | StackFlags::ALL ; "all uppercase")]
    #[test_case(Some("true"), StackFlags::PRINT_STACK | StackFlags::ON_ERROR ; "fallback")]
    #[test_case(Some(""), StackFlags::empty() ; "empty")]
    #[test_case(None, StackFlags::empty() ; "unset")]
    fn test_config_from_setting(setting: Option<&str>, expected: StackFlags) {
        let config = Config::from_setting(setting.map(OsStr::new));
        assert_eq!(config.stack_flags(), expected);
    }

    #[test]
    fn test_stack_traces_grow_buffer() {
        let disabled = Config::from_setting(None);
        assert_eq!(disabled.buffer_size(), DEFAULT_BUFFER_SIZE);

        let enabled = Config::from_setting(Some(OsStr::new("all")));
        assert_eq!(enabled.buffer_size(), DEFAULT_BUFFER_SIZE + DEFAULT_STACK_BUFFER_SIZE);

        // Changing the mode does not grow the buffer twice, disabling shrinks it again.
        let changed = enabled.with_stack_mode(Some(StackMode::Error));
        assert_eq!(changed.buffer_size(), DEFAULT_BUFFER_SIZE + DEFAULT_STACK_BUFFER_SIZE);
        assert_eq!(changed.with_stack_mode(None).buffer_size(), DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_banner_toggle() {
        assert!(Config::default().show_banner());
        assert!(!Config::default().with_banner(false).show_banner());
    }

    #[test]
    fn test_banner_text() {
        assert_eq!(BANNER.lines().count(), 3);
        assert!(BANNER.contains("DEBUG BUILD"));
        assert!(HELP.contains(STACKTRACE_ENV));
    }
}
