//! Last-resort debugging aid.
//!
//! A breadcrumb trail names the templates an error passed through but
//! not the code path that produced it. The `xerr!()` macro wraps the
//! expression at an error's point of origin; with the `extra-debug`
//! feature enabled it prints a backtrace before evaluating the
//! expression, and without it it disappears entirely:
//!
//! ```rust,ignore
//! if octet > 7 {
//!     xerr!(return Err(DecodeError::value("invalid unused bit count")));
//! }
//! ```

#[cfg(feature = "extra-debug")]
pub use backtrace::Backtrace;

#[cfg(feature = "extra-debug")]
#[macro_export]
macro_rules! xerr {
    ($expr:expr) => {{
        eprintln!(
            "=== ERROR ORIGIN ===\n{:?}\n=== ERROR ORIGIN ===",
            $crate::debug::Backtrace::new()
        );
        $expr
    }}
}

#[cfg(not(feature = "extra-debug"))]
#[macro_export]
macro_rules! xerr {
    ($expr:expr) => { $expr };
}
