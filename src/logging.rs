//! Crate-internal logging macros.
//!
//! With the `tracing` feature enabled every macro forwards to the matching `tracing` macro under
//! the `event_bindings` target. Without it the arguments are only borrowed, so call sites compile
//! to nothing and do not trigger unused-variable warnings.

#[cfg(feature = "tracing")]
macro_rules! emit {
    ($level:ident, $($arg:tt)*) => {
        tracing::$level!(target: "event_bindings", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! emit {
    ($level:ident, $($arg:tt)*) => {
        $crate::__discard_log_args!($($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! error {
    ($($arg:tt)*) => { emit!(error, $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! warn {
    ($($arg:tt)*) => { emit!(warn, $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! info {
    ($($arg:tt)*) => { emit!(info, $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => { emit!(debug, $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => { emit!(trace, $($arg)*) };
}

#[doc(hidden)]
#[macro_export]
#[cfg(not(feature = "tracing"))]
macro_rules! __discard_log_args {
    () => {};
    ($field:ident = % $value:expr $(, $($rest:tt)*)?) => {{
        let _ = &$value;
        $($crate::__discard_log_args!($($rest)*);)?
    }};
    ($field:ident = ? $value:expr $(, $($rest:tt)*)?) => {{
        let _ = &$value;
        $($crate::__discard_log_args!($($rest)*);)?
    }};
    ($field:ident = $value:expr $(, $($rest:tt)*)?) => {{
        let _ = &$value;
        $($crate::__discard_log_args!($($rest)*);)?
    }};
    ($message:literal $(, $($rest:tt)*)?) => {{
        $($crate::__discard_log_args!($($rest)*);)?
    }};
    ($value:expr $(, $($rest:tt)*)?) => {{
        let _ = &$value;
        $($crate::__discard_log_args!($($rest)*);)?
    }};
}
