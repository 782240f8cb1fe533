//! The `printf!` macro. Without the `delog` feature the process-wide variant
//! expands to nothing but the evaluation of its arguments.

/// Formats the arguments like [std::format_args!] and logs them, together with
/// the time, the elapsed time since start-up and the call site.
///
/// Without the `delog` feature this only evaluates the arguments and checks
/// them against the format string: nothing is formatted, allocated or written.
/// Every argument is evaluated exactly once. Positional, named (`name = value`)
/// and inline (`{name}`) arguments are supported. When one of the positional
/// or named arguments is an error, see [crate::contains_error!], the line
/// counts as an error, which triggers a stack trace for `DELOG_STACKTRACE=error`.
///
/// A logger handle can be given explicitly, in which case the handle decides
/// whether anything is written.
///
/// # Examples
///
/// ```
/// let err = std::io::Error::other("some error");
/// delog::printf!("an error occurred: {}", err);
///
/// let dispatcher = delog::Dispatcher::noop();
/// delog::printf!(logger: &dispatcher, "{} + {} = {sum}", 1, 2, sum = 1 + 2);
/// ```
#[macro_export]
#[cfg(feature = "delog")]
macro_rules! printf {
    (logger: $logger:expr, $fmt:literal $($rest:tt)*) => {
        $crate::__printf!(@bind ($logger), $fmt, [], [] $($rest)*)
    };
    ($fmt:literal $($rest:tt)*) => {
        $crate::__printf!(@bind ($crate::init()), $fmt, [], [] $($rest)*)
    };
}

#[macro_export]
#[cfg(not(feature = "delog"))]
macro_rules! printf {
    (logger: $logger:expr, $fmt:literal $($rest:tt)*) => {
        $crate::__printf!(@bind ($logger), $fmt, [], [] $($rest)*)
    };
    ($fmt:literal $($rest:tt)*) => {{
        // Only checks the format string, `Arguments` neither formats nor allocates.
        let _ = ::core::format_args!($fmt $($rest)*);
    }};
}

/// Evaluates to true iff at least one of the given values is an error: its
/// type implements [std::error::Error], or it is a boxed `dyn Error`. This is
/// decided from the types of the values.
///
/// # Examples
///
/// ```
/// let err = std::fmt::Error;
/// let boxed: Box<dyn std::error::Error + Send + Sync> = "boom".into();
/// assert!(delog::contains_error!(1, "text", err));
/// assert!(delog::contains_error!(boxed));
/// assert!(!delog::contains_error!(1, "text"));
/// ```
#[macro_export]
macro_rules! contains_error {
    ($($value:expr),* $(,)?) => {
        false $(|| $crate::__is_error!(&$value))*
    };
}

/// Binds every argument to a fresh variable, such that it is evaluated once
/// for both the error check and the formatting. The first list holds the
/// positional arguments, the second one the named arguments.
#[doc(hidden)]
#[macro_export]
macro_rules! __printf {
    (@bind ($logger:expr), $fmt:literal, [$($bound:ident)*], [$($name:ident = $named:ident)*] $(,)?) => {{
        let has_error = false $(|| $crate::__is_error!($bound))* $(|| $crate::__is_error!($named))*;
        $logger.printf(
            $crate::Caller::new(::core::file!(), ::core::line!()),
            has_error,
            ::core::format_args!($fmt $(, $bound)* $(, $name = $named)*),
        )
    }};
    (@bind ($logger:expr), $fmt:literal, [$($bound:ident)*], [$($name:ident = $named:ident)*], $key:ident = $value:expr $(, $($rest:tt)*)?) => {
        match &$value {
            arg => $crate::__printf!(@bind ($logger), $fmt, [$($bound)*], [$($name = $named)* $key = arg] $(, $($rest)*)?),
        }
    };
    (@bind ($logger:expr), $fmt:literal, [$($bound:ident)*], [$($name:ident = $named:ident)*], $head:expr $(, $($rest:tt)*)?) => {
        match &$head {
            arg => $crate::__printf!(@bind ($logger), $fmt, [$($bound)* arg], [$($name = $named)*] $(, $($rest)*)?),
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __is_error {
    ($value:expr) => {{
        #[allow(unused_imports)]
        use $crate::__private::IsBoxedError as _;
        #[allow(unused_imports)]
        use $crate::__private::IsError as _;
        #[allow(unused_imports)]
        use $crate::__private::NotError as _;

        (&&&$crate::__private::ErrorProbe($value)).is_error()
    }};
}

#[doc(hidden)]
pub mod __private {
    use std::error::Error;

    /// Wraps a reference to a value to find out whether it is an error.
    ///
    /// The method lookup of `(&&&ErrorProbe(value)).is_error()` dereferences
    /// one level at a time, so it prefers [IsError], then [IsBoxedError], and
    /// only falls back to [NotError] when neither applies.
    pub struct ErrorProbe<'a, T: ?Sized>(pub &'a T);

    pub trait IsError {
        fn is_error(&self) -> bool {
            true
        }
    }

    impl<T: Error + ?Sized> IsError for &&ErrorProbe<'_, T> {}

    /// Boxed trait objects do not implement [Error] themselves.
    pub trait IsBoxedError {
        fn is_error(&self) -> bool {
            true
        }
    }

    impl<'a> IsBoxedError for &ErrorProbe<'_, Box<dyn Error + 'a>> {}
    impl<'a> IsBoxedError for &ErrorProbe<'_, Box<dyn Error + Send + 'a>> {}
    impl<'a> IsBoxedError for &ErrorProbe<'_, Box<dyn Error + Send + Sync + 'a>> {}

    pub trait NotError {
        fn is_error(&self) -> bool {
            false
        }
    }

    impl<T: ?Sized> NotError for ErrorProbe<'_, T> {}
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::fmt;
    use std::io;

    use delog_utilities::MemorySink;

    use crate::Config;
    use crate::Dispatcher;
    use crate::StackMode;
    use crate::Writer;

    #[test]
    fn test_contains_error() {
        let io_error = io::Error::other("disk full");
        let dyn_error: &dyn std::error::Error = &fmt::Error;

        assert!(!crate::contains_error!());
        assert!(!crate::contains_error!(1, "text", 2.5, vec![1, 2]));
        assert!(crate::contains_error!(1, io_error));
        assert!(crate::contains_error!(&io_error));
        assert!(crate::contains_error!(dyn_error, 3));
        assert!(crate::contains_error!(fmt::Error));
    }

    #[test]
    fn test_contains_boxed_error() {
        let boxed: Box<dyn Error> = "boom".into();
        let boxed_send: Box<dyn Error + Send> = Box::new(fmt::Error);
        let boxed_sync: Box<dyn Error + Send + Sync> = "boom".into();
        let boxed_value = Box::new(5);

        assert!(crate::contains_error!(boxed));
        assert!(crate::contains_error!(1, boxed_send));
        assert!(crate::contains_error!(boxed_sync, "text"));
        assert!(!crate::contains_error!(boxed_value));
    }

    #[test]
    fn test_arguments_are_evaluated_once() {
        let dispatcher = Dispatcher::active(Writer::new(Config::default(), MemorySink::new()));

        let mut count = 0;
        let mut next = || {
            count += 1;
            count
        };

        crate::printf!(logger: &dispatcher, "{} {}", next(), next());
        assert_eq!(count, 2);
    }

    #[test]
    fn test_printf_with_logger() {
        let sink = MemorySink::new();
        let dispatcher = Dispatcher::active(Writer::new(Config::default(), sink.clone()));

        let name = "world";
        let first = line!() + 1;
        crate::printf!(logger: &dispatcher, "hello {name}");
        crate::printf!(logger: &dispatcher, "{} + {} = {}", 1, 2, 1 + 2,);

        let output = sink.contents();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(
            lines[0].ends_with(&format!("] macros.rs:{first}: hello world")),
            "Unexpected line {:?}",
            lines[0]
        );
        assert!(
            lines[1].ends_with(&format!("] macros.rs:{}: 1 + 2 = 3", first + 1)),
            "Unexpected line {:?}",
            lines[1]
        );
    }

    #[test]
    fn test_error_argument_triggers_stack_trace() {
        let sink = MemorySink::new();
        let config = Config::default().with_stack_mode(Some(StackMode::Error));
        let dispatcher = Dispatcher::active(Writer::new(config, sink.clone()));

        crate::printf!(logger: &dispatcher, "no error {}", 1);
        assert_eq!(sink.contents().lines().count(), 1);

        let err = io::Error::other("some error");
        crate::printf!(logger: &dispatcher, "an error occurred: {}", err);

        let output = sink.contents();
        assert!(output.contains(": an error occurred: some error\n"));
        assert!(output.lines().count() > 2, "Expected a stack trace for the error argument");
    }

    #[test]
    fn test_boxed_error_triggers_stack_trace() {
        let sink = MemorySink::new();
        let config = Config::default().with_stack_mode(Some(StackMode::Error));
        let dispatcher = Dispatcher::active(Writer::new(config, sink.clone()));

        let err: Box<dyn Error + Send + Sync> = "boom".into();
        crate::printf!(logger: &dispatcher, "failed: {}", err);

        let output = sink.contents();
        assert!(output.contains(": failed: boom\n"));
        assert!(output.lines().count() > 1, "Expected a stack trace for the boxed error");
    }

    #[test]
    fn test_named_arguments() {
        let sink = MemorySink::new();
        let dispatcher = Dispatcher::active(Writer::new(Config::default(), sink.clone()));

        let mut count = 0;
        let mut next = || {
            count += 1;
            count
        };

        let inline = "inline";
        crate::printf!(logger: &dispatcher, "{} {x} {y:?} {inline} {0}", next(), x = next(), y = "quoted",);
        assert_eq!(count, 2);

        let output = sink.contents();
        assert!(output.ends_with(": 1 2 \"quoted\" inline 1\n"), "Unexpected output {output:?}");
    }

    #[test]
    fn test_named_error_argument_triggers_stack_trace() {
        let sink = MemorySink::new();
        let config = Config::default().with_stack_mode(Some(StackMode::Error));
        let dispatcher = Dispatcher::active(Writer::new(config, sink.clone()));

        crate::printf!(logger: &dispatcher, "failed: {err}", err = io::Error::other("some error"));

        let output = sink.contents();
        assert!(output.contains(": failed: some error\n"));
        assert!(output.lines().count() > 1, "Expected a stack trace for the named error argument");
    }

    #[test]
    fn test_noop_logger_writes_nothing() {
        let dispatcher = Dispatcher::noop();
        crate::printf!(logger: &dispatcher, "discarded {}", io::Error::other("some error"));
    }

    #[test]
    #[cfg(not(feature = "delog"))]
    fn test_global_printf_is_noop() {
        let mut evaluated = false;
        crate::printf!("only evaluated {}", {
            evaluated = true;
            1
        });
        assert!(evaluated);

        let name = "delog";
        crate::printf!("{name} {} {0} {value:>4}", 1, value = 2);
    }
}
