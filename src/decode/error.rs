//! Error handling during decoding.
//!
//! This is a private module. Its public items are re-exported by the
//! parent module.

use std::{error, fmt, io};
use std::borrow::Cow;


//------------ ErrorKind -----------------------------------------------------

/// The category of a decode error.
///
/// The distinction matters to callers: a truncated stream at a top-level
/// value boundary is often normal end of input, while a framing or value
/// error is always fatal to the structure being decoded.
#[derive(Debug)]
pub enum ErrorKind {
    /// The stream ended in the middle of an encoded value.
    Truncated,

    /// The tag, form, or length octets did not form a valid encoding or
    /// did not match what the active template expected.
    Framing,

    /// The content octets could not be interpreted as a value of the
    /// expected type.
    Value,

    /// The underlying stream failed.
    Io(io::Error),
}


//------------ DecodeError ---------------------------------------------------

/// An error happened while decoding data.
///
/// Apart from the error kind and message, the error carries a breadcrumb
/// trail of the logical type names of all the templates the error passed
/// through on its way up. Every template pushes its own name before
/// rethrowing, so the rendered error reads like
///
/// ```text
/// SEQUENCE > AlgorithmIdentifier > OBJECT IDENTIFIER: end-of-file reached
/// ```
///
/// with the outermost structure first.
#[derive(Debug)]
pub struct DecodeError {
    /// The category of the error.
    kind: ErrorKind,

    /// A human readable description of what went wrong.
    message: Cow<'static, str>,

    /// The type names of the templates the error passed through,
    /// innermost first.
    trail: Vec<&'static str>,
}

impl DecodeError {
    /// Creates a new error of the given kind.
    fn new(
        kind: ErrorKind,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        DecodeError { kind, message: message.into(), trail: Vec::new() }
    }

    /// Creates an error for a stream that ended mid-value.
    pub fn truncated() -> Self {
        Self::new(ErrorKind::Truncated, "end-of-file reached")
    }

    /// Creates an error for malformed framing octets or a tag mismatch.
    pub fn framing(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Framing, message)
    }

    /// Creates an error for content octets that don't form a valid value.
    pub fn value(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Value, message)
    }

    /// Appends the given type name to the breadcrumb trail.
    ///
    /// Every template wraps the errors of its children through this
    /// method, producing the outermost-first trail in the rendered error.
    pub fn nested(mut self, type_name: &'static str) -> Self {
        self.trail.push(type_name);
        self
    }

    /// Returns whether the error was caused by the stream ending early.
    pub fn is_truncated(&self) -> bool {
        matches!(self.kind, ErrorKind::Truncated)
    }

    /// Returns the category of the error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the breadcrumb trail, outermost template first.
    pub fn trail(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.trail.iter().rev().copied()
    }
}


//--- From

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::truncated()
        }
        else {
            Self::new(ErrorKind::Io(err), "read error")
        }
    }
}


//--- Display and Error

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for name in self.trail() {
            if !first {
                f.write_str(" > ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        if !first {
            f.write_str(": ")?;
        }
        match &self.kind {
            ErrorKind::Io(err) => write!(f, "{}: {}", self.message, err),
            _ => f.write_str(&self.message),
        }
    }
}

impl error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn breadcrumb_trail() {
        let err = DecodeError::truncated()
            .nested("OBJECT IDENTIFIER")
            .nested("AlgorithmIdentifier")
            .nested("SEQUENCE");
        assert_eq!(
            err.to_string(),
            "SEQUENCE > AlgorithmIdentifier > OBJECT IDENTIFIER: \
             end-of-file reached"
        );
        assert!(err.is_truncated());
    }

    #[test]
    fn eof_io_error_is_truncated() {
        let err: DecodeError = io::Error::new(
            io::ErrorKind::UnexpectedEof, "eof"
        ).into();
        assert!(err.is_truncated());
    }
}
