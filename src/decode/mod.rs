//! Parsing BER encoded data.
//!
//! This module provides the machinery shared by all decoding: the
//! byte-counting [`Source`], the [`DecodeError`] type with its breadcrumb
//! trail of type names, and the [`Template`] trait that every stateless
//! decoding recipe implements.
//!
//! Decoding is top-down: a caller holds a template describing the
//! expected outer structure and feeds it a source via [`decode_value`].
//! The template reads and validates its own header and recursively
//! invokes the templates of its children. No lookahead beyond a single
//! header is ever needed.

pub use self::error::{DecodeError, ErrorKind};
pub use self::source::Source;

use std::io;
use crate::value::Value;
use crate::tag::Tag;

mod error;
mod source;


//------------ Template ------------------------------------------------------

/// A stateless recipe for decoding a value.
///
/// A template describes the grammar of an expected value independently of
/// any bytes: a tag-matching predicate used for OPTIONAL lookahead and
/// CHOICE branch selection, and a decode function producing a [`Value`]
/// from a source. Templates carry no per-call state and can be shared
/// freely; composed templates (SEQUENCE, CHOICE, SET OF) are built once
/// and reused for every decode.
pub trait Template {
    /// Returns the logical type name used in error messages.
    ///
    /// Every template wraps the errors of its children with this name,
    /// producing the breadcrumb trail of [`DecodeError`].
    fn type_name(&self) -> &'static str;

    /// Returns whether a value with the given tag can satisfy this
    /// template.
    fn tag_match(&self, tag: Tag) -> bool;

    /// Decodes a value expecting the template's own tag.
    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError>;

    /// Decodes a value whose tag has been replaced by `implicit`.
    ///
    /// # Panics
    ///
    /// Templates for CHOICE and ANY panic: substituting their tag is
    /// meaningless and always a bug in the calling code.
    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError>;
}

impl<'a, T: Template + ?Sized> Template for &'a T {
    fn type_name(&self) -> &'static str {
        (*self).type_name()
    }

    fn tag_match(&self, tag: Tag) -> bool {
        (*self).tag_match(tag)
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        (*self).decode(source)
    }

    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError> {
        (*self).decode_implicit(implicit, source)
    }
}


//------------ Entry points --------------------------------------------------

/// Decodes one value from the given stream.
///
/// Returns the decoded value and the number of octets consumed. A stream
/// that ends before the first identifier octet yields a truncated error;
/// use [`decode_value_opt`] if end of stream is a legitimate outcome.
pub fn decode_value<T: Template + ?Sized>(
    template: &T,
    reader: &mut dyn io::Read,
) -> Result<(Value, u64), DecodeError> {
    let mut source = Source::new(reader);
    let value = template.decode(&mut source)?;
    Ok((value, source.consumed()))
}

/// Decodes one value, accepting a clean end of stream.
///
/// Returns `None` if the stream ends exactly where the next top-level
/// value would have begun. A stream ending anywhere later inside the
/// value is still a truncated error.
pub fn decode_value_opt<T: Template + ?Sized>(
    template: &T,
    reader: &mut dyn io::Read,
) -> Result<Option<(Value, u64)>, DecodeError> {
    let mut source = Source::new(reader);
    if source.peek_header_opt()?.is_none() {
        return Ok(None)
    }
    let value = template.decode(&mut source)?;
    Ok(Some((value, source.consumed())))
}

/// Decodes one value from a byte slice.
///
/// Fails if the slice contains anything beyond the single encoded value.
pub fn decode_slice<T: Template + ?Sized>(
    template: &T,
    mut data: &[u8],
) -> Result<Value, DecodeError> {
    let len = data.len() as u64;
    let (value, consumed) = decode_value(template, &mut data)?;
    if consumed != len {
        xerr!(return Err(DecodeError::framing("trailing data").nested(
            template.type_name()
        )));
    }
    Ok(value)
}
