use std::fmt;
use std::io;
use std::io::Write;
#[cfg(feature = "delog")]
use std::panic::Location;
use std::sync::LazyLock;

use crate::Caller;
use crate::Config;
use crate::Writer;

/// The destination of a logging call.
pub trait Logger: Send + Sync {
    /// Logs one line for the given call site, where `has_error` indicates
    /// that one of the formatted arguments is an error.
    fn log(&self, caller: Caller, has_error: bool, args: fmt::Arguments<'_>);

    /// Returns true iff this logger produces any output.
    fn is_enabled(&self) -> bool;
}

/// A logger that does nothing at all.
pub struct NoopLogger;

impl Logger for NoopLogger {
    #[inline(always)]
    fn log(&self, _caller: Caller, _has_error: bool, _args: fmt::Arguments<'_>) {}

    fn is_enabled(&self) -> bool {
        false
    }
}

impl<W: Write + Send> Logger for Writer<W> {
    fn log(&self, caller: Caller, has_error: bool, args: fmt::Arguments<'_>) {
        self.write(caller, has_error, args);
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

/// A handle to either a [NoopLogger] or an active [Writer].
///
/// # Details
///
/// The logger is chosen when the dispatcher is constructed and cannot be
/// replaced afterwards, so a logging call never checks which mode it is in.
/// Use [crate::printf!] with `logger: &dispatcher` to log through a handle.
pub struct Dispatcher {
    logger: Box<dyn Logger>,
}

impl Dispatcher {
    /// A dispatcher that discards every call.
    pub fn noop() -> Self {
        Self {
            logger: Box::new(NoopLogger),
        }
    }

    /// A dispatcher that writes every call with the given writer.
    pub fn active<W: Write + Send + 'static>(writer: Writer<W>) -> Self {
        Self {
            logger: Box::new(writer),
        }
    }

    /// Starts logging for the given configuration and sink.
    ///
    /// With the `delog` feature this captures the start time, prints the
    /// banner unless the configuration disables it, and returns an active
    /// dispatcher. Without the feature it returns a no-op dispatcher and the
    /// sink is never touched.
    pub fn startup<W: Write + Send + 'static>(config: Config, sink: W) -> Self {
        #[cfg(feature = "delog")]
        {
            let writer = Writer::new(config, sink);
            if writer.config().show_banner() {
                writer.print_banner();
            }

            Self::active(writer)
        }

        #[cfg(not(feature = "delog"))]
        {
            let _ = (config, sink);
            Self::noop()
        }
    }

    /// Logs a single line, usually called through [crate::printf!].
    #[inline]
    pub fn printf(&self, caller: Caller, has_error: bool, args: fmt::Arguments<'_>) {
        self.logger.log(caller, has_error, args);
    }

    /// Returns true iff this dispatcher writes anything.
    pub fn is_active(&self) -> bool {
        self.logger.is_enabled()
    }
}

/// The process-wide dispatcher, writing to standard error.
static GLOBAL: LazyLock<Dispatcher> = LazyLock::new(|| Dispatcher::startup(Config::from_env(), io::stderr()));

/// Returns the process-wide dispatcher, performing the start-up on first use.
///
/// Calling this early in `main` makes sure that the banner is printed and the
/// elapsed time is measured from the start of the program.
pub fn init() -> &'static Dispatcher {
    &GLOBAL
}

/// Logs the formatted arguments through the process-wide dispatcher, see
/// [crate::printf!] for the variant that also detects error arguments.
#[cfg(feature = "delog")]
#[track_caller]
pub fn printf(args: fmt::Arguments<'_>) {
    init().printf(Caller::from(Location::caller()), false, args);
}

/// Logs the formatted arguments through the process-wide dispatcher, which
/// does nothing since this is not a debug build.
#[cfg(not(feature = "delog"))]
#[inline(always)]
pub fn printf(_args: fmt::Arguments<'_>) {}
