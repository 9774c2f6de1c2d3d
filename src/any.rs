//! Capturing values of unknown type.
//!
//! The [`Any`] type holds a single encoded value of whatever tag came
//! down the wire without interpreting its content. It can be stored,
//! re-encoded, or decoded later with a concrete template once the
//! caller knows what to expect.

use std::io;
use bytes::Bytes;
use crate::decode::{decode_slice, DecodeError, Source, Template};
use crate::encode::Encode;
use crate::header::{Form, Header};
use crate::length::Length;
use crate::tag::Tag;
use crate::value::Value;


//------------ Any -----------------------------------------------------------

/// A captured value of any type.
///
/// The content octets are kept verbatim for values with a definite
/// length. Values in the indefinite form are captured by recursing
/// through their components, so re-encoding always produces the
/// definite form.
///
/// Since the tag is all the receiver has, an `Any` can never be
/// implicitly tagged. The implicit encoding methods panic.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Any {
    /// The tag found on the wire.
    tag: Tag,

    /// Whether the value was primitive or constructed.
    form: Form,

    /// The content octets.
    content: Bytes,
}

impl Any {
    /// Returns the tag of the captured value.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns whether the captured value was constructed.
    pub fn is_constructed(&self) -> bool {
        self.form.is_constructed()
    }

    /// Returns the content octets of the captured value.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Decodes the captured value with a concrete template.
    pub fn decode_as<T: Template + ?Sized>(
        &self,
        template: &T,
    ) -> Result<Value, DecodeError> {
        decode_slice(template, &self.to_vec())
    }

    /// Captures the next value from the source.
    fn capture(source: &mut Source) -> Result<Self, DecodeError> {
        let header = source.take_header()?;
        if header.is_end_of_contents() {
            xerr!(return Err(DecodeError::framing(
                "unexpected end-of-contents"
            )));
        }
        let content = match header.length() {
            Length::Definite(len) => source.take_bytes(len)?,
            Length::Indefinite => {
                if !header.form().is_constructed() {
                    xerr!(return Err(DecodeError::framing(
                        "indefinite length on primitive value"
                    )));
                }
                let mut buf = Vec::new();
                loop {
                    if source.peek_header()?.is_end_of_contents() {
                        source.take_header()?;
                        break
                    }
                    Self::capture(source)?.write_encoded(&mut buf)?;
                }
                buf.into()
            }
        };
        Ok(Any { tag: header.tag(), form: header.form(), content })
    }
}

impl Encode for Any {
    fn tag(&self) -> Tag {
        self.tag
    }

    fn form(&self) -> Form {
        self.form
    }

    fn content_len(&self) -> usize {
        self.content.len()
    }

    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        target.write_all(&self.content)
    }

    // The default whole-TLV methods route through the implicit-tag
    // variants, which have to stay reachable for encoding under the
    // value's own tag. Spell them out here so only a genuine
    // substitute tag panics.

    fn encoded_len(&self) -> usize {
        Header::new(
            self.tag, self.form, Length::Definite(self.content.len())
        ).encoded_len() + self.content.len()
    }

    fn write_encoded(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        Header::new(
            self.tag, self.form, Length::Definite(self.content.len())
        ).write_encoded(target)?;
        self.write_content(target)
    }

    fn encoded_len_as(&self, _implicit: Tag) -> usize {
        panic!("implicit tagging of an ANY value");
    }

    fn write_encoded_as(
        &self,
        _implicit: Tag,
        _target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        panic!("implicit tagging of an ANY value");
    }
}


//------------ AnyTemplate ---------------------------------------------------

/// The template for capturing a value of any type.
///
/// Matches every tag. Attempting to decode with an implicit tag panics,
/// as that would discard the only type information the value has.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyTemplate;

impl Template for AnyTemplate {
    fn type_name(&self) -> &'static str {
        "ANY"
    }

    fn tag_match(&self, _tag: Tag) -> bool {
        true
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        Any::capture(source)
            .map(Value::Any)
            .map_err(|err| err.nested(self.type_name()))
    }

    fn decode_implicit(
        &self,
        _implicit: Tag,
        _source: &mut Source,
    ) -> Result<Value, DecodeError> {
        panic!("implicit tagging of an ANY value");
    }
}


//============ Tests =========================================================
