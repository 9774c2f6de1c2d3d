//! The identifier and length octets framing an encoded value.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{fmt, io};
use crate::decode::{DecodeError, Source};
use crate::length::Length;
use crate::tag::Tag;


//------------ Form ----------------------------------------------------------

/// The encoding form of a value.
///
/// Every value is encoded either _primitive,_ with the content octets
/// giving the value directly, or _constructed,_ with the content octets
/// being a series of further encoded values. Which form a value uses is
/// announced by a bit in the first identifier octet.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Form {
    /// The content octets give the value directly.
    Primitive,

    /// The content octets are a series of encoded values.
    Constructed,
}

impl Form {
    /// Returns whether the form is the constructed form.
    pub fn is_constructed(self) -> bool {
        self == Form::Constructed
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Form::Primitive => f.write_str("primitive"),
            Form::Constructed => f.write_str("constructed"),
        }
    }
}


//------------ Header --------------------------------------------------------

/// The header of an encoded value: tag, form, and length.
///
/// A header is produced either by parsing the identifier and length octets
/// at the start of an encoded value or by assembling one for encoding. A
/// parsed header additionally remembers how many octets it occupied on the
/// wire, which may exceed the minimal re-encoded size for tolerated
/// non-minimal BER input. That count is what the byte-counting machinery
/// of [`Source`] uses for definite-length validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Header {
    /// The tag of the value.
    tag: Tag,

    /// The encoding form of the value.
    form: Form,

    /// The length of the content octets.
    length: Length,

    /// The number of octets this header occupied on the wire.
    raw_len: usize,
}

impl Header {
    /// Creates a new header for encoding.
    pub fn new(tag: Tag, form: Form, length: Length) -> Self {
        let raw_len = tag.encoded_len() + length.encoded_len();
        Header { tag, form, length, raw_len }
    }

    /// Returns the tag of the header.
    pub fn tag(self) -> Tag {
        self.tag
    }

    /// Returns the encoding form of the header.
    pub fn form(self) -> Form {
        self.form
    }

    /// Returns the length of the content octets.
    pub fn length(self) -> Length {
        self.length
    }

    /// Returns the number of octets the header occupied on the wire.
    pub(crate) fn raw_len(self) -> usize {
        self.raw_len
    }

    /// Returns whether this header marks the end of an indefinite value.
    pub fn is_end_of_contents(self) -> bool {
        self.tag.is_end_of_contents()
            && self.form == Form::Primitive
            && self.length.is_zero()
    }

    /// Takes a header from the beginning of a source.
    ///
    /// Fails on truncated input, on a reserved or malformed length
    /// encoding, and on an end-of-contents marker carrying the constructed
    /// bit or a non-zero length.
    pub fn take_from(source: &mut Source) -> Result<Self, DecodeError> {
        let (tag, constructed) = Tag::take_from(source)?;
        let form = if constructed { Form::Constructed }
                   else { Form::Primitive };
        let (length, length_len) = Length::take_from(source)?;
        let header = Header {
            tag, form, length,
            raw_len: tag.encoded_len() + length_len,
        };
        if tag.is_end_of_contents() && !header.is_end_of_contents() {
            xerr!(return Err(DecodeError::framing(
                "malformed end-of-contents marker"
            )));
        }
        Ok(header)
    }

    /// Checks that the header matches what a template expected.
    ///
    /// Fails with a framing error naming the offending part if the tag or
    /// the form differs from the expectation.
    pub fn validate(
        self,
        tag: Tag,
        form: Form,
    ) -> Result<(), DecodeError> {
        if self.tag != tag {
            xerr!(return Err(DecodeError::framing(format!(
                "expected tag {}, found {}", tag, self.tag
            ))));
        }
        if self.form != form {
            xerr!(return Err(DecodeError::framing(format!(
                "expected {} encoding", form
            ))));
        }
        Ok(())
    }

    /// Requires the length to be definite, returning it.
    ///
    /// Primitive values and the single-pass decode paths of this crate
    /// cannot work with the indefinite form.
    pub fn definite_length(self) -> Result<usize, DecodeError> {
        match self.length {
            Length::Definite(len) => Ok(len),
            Length::Indefinite => {
                xerr!(Err(DecodeError::framing(
                    "indefinite length not allowed here"
                )))
            }
        }
    }

    /// Returns the number of octets of the re-encoded header.
    pub fn encoded_len(self) -> usize {
        self.tag.encoded_len() + self.length.encoded_len()
    }

    /// Writes the header in its canonical encoding to the given target.
    pub fn write_encoded<W: io::Write + ?Sized>(
        self,
        target: &mut W,
    ) -> Result<(), io::Error> {
        self.tag.write_encoded(self.form.is_constructed(), target)?;
        self.length.write_encoded(target)
    }
}


//============ Tests =========================================================
