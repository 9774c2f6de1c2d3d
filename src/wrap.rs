//! Tagged wrappers: EXPLICIT tagging and CHOICE.
//!
//! An [`Explicit`] wraps a complete inner encoding in an outer
//! constructed value with its own tag. A [`Choice`] records which of
//! several alternatives was found, keeping the wire tag so the value
//! re-encodes the way it arrived.

use std::io;
use crate::construct::Content;
use crate::decode::{DecodeError, Source, Template};
use crate::encode::Encode;
use crate::header::{Form, Header};
use crate::length::Length;
use crate::tag::Tag;
use crate::value::Value;


//------------ Explicit ------------------------------------------------------

/// An explicitly tagged value.
///
/// The outer value is always constructed and its content is the
/// complete encoding of the inner value, tag and all.
#[derive(Clone, Debug, PartialEq)]
pub struct Explicit {
    /// The outer tag.
    tag: Tag,

    /// The wrapped value.
    inner: Box<Value>,
}

impl Explicit {
    /// Creates an explicitly tagged value.
    pub fn new(tag: Tag, inner: impl Into<Value>) -> Self {
        Explicit { tag, inner: Box::new(inner.into()) }
    }

    /// Returns the outer tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the wrapped value.
    pub fn inner(&self) -> &Value {
        &self.inner
    }

    /// Converts the wrapper into the wrapped value.
    pub fn into_inner(self) -> Value {
        *self.inner
    }
}

impl Encode for Explicit {
    fn tag(&self) -> Tag {
        self.tag
    }

    fn form(&self) -> Form {
        Form::Constructed
    }

    fn content_len(&self) -> usize {
        self.inner.encoded_len()
    }

    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        self.inner.write_encoded(target)
    }
}


//------------ ExplicitTemplate ----------------------------------------------

/// The template for decoding an explicitly tagged value.
pub struct ExplicitTemplate {
    /// The expected outer tag.
    tag: Tag,

    /// The template for the wrapped value.
    inner: Box<dyn Template>,
}

impl ExplicitTemplate {
    /// Creates a template expecting the given outer tag.
    pub fn new(tag: Tag, inner: impl Template + 'static) -> Self {
        ExplicitTemplate { tag, inner: Box::new(inner) }
    }
}

impl Template for ExplicitTemplate {
    fn type_name(&self) -> &'static str {
        "EXPLICIT"
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == self.tag
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(self.tag, source)
    }

    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError> {
        let res = (|| {
            let header = source.take_header()?;
            header.validate(implicit, Form::Constructed)?;
            let content = Content::new(header, source);
            if content.at_end(source)? {
                xerr!(return Err(DecodeError::framing(
                    "empty explicitly tagged value"
                )));
            }
            let inner = self.inner.decode(source)?;
            content.finish(source)?;
            Ok(Explicit { tag: self.tag, inner: Box::new(inner) })
        })();
        res.map(Value::Explicit)
            .map_err(|err| err.nested(self.type_name()))
    }
}


//------------ Choice --------------------------------------------------------

/// The decoded alternative of a CHOICE.
///
/// Keeps the tag found on the wire together with the decoded value, so
/// an implicitly tagged alternative re-encodes under the same tag it
/// arrived with.
///
/// A CHOICE has no tag of its own; it borrows whichever its chosen
/// alternative carries. It therefore can never be implicitly tagged and
/// the implicit encoding methods panic.
#[derive(Clone, Debug, PartialEq)]
pub struct Choice {
    /// The wire tag of the chosen alternative.
    tag: Tag,

    /// The decoded alternative.
    value: Box<Value>,
}

impl Choice {
    /// Creates a choice from the chosen alternative.
    pub fn new(value: impl Into<Value>) -> Self {
        let value = value.into();
        Choice { tag: value.tag(), value: Box::new(value) }
    }

    /// Creates a choice whose alternative is implicitly tagged.
    pub fn new_implicit(implicit: Tag, value: impl Into<Value>) -> Self {
        Choice { tag: implicit, value: Box::new(value.into()) }
    }

    /// Returns the wire tag of the chosen alternative.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the chosen alternative.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Converts the choice into the chosen alternative.
    pub fn into_value(self) -> Value {
        *self.value
    }
}

impl Encode for Choice {
    fn tag(&self) -> Tag {
        self.tag
    }

    fn form(&self) -> Form {
        self.value.form()
    }

    fn content_len(&self) -> usize {
        self.value.content_len()
    }

    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        self.value.write_content(target)
    }

    // Like Any, encoding under the value's own tag must not take the
    // implicit-tag route. Only a genuine substitute tag panics.

    fn encoded_len(&self) -> usize {
        let content_len = self.content_len();
        Header::new(
            self.tag, self.form(), Length::Definite(content_len)
        ).encoded_len() + content_len
    }

    fn write_encoded(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        Header::new(
            self.tag, self.form(), Length::Definite(self.content_len())
        ).write_encoded(target)?;
        self.write_content(target)
    }

    fn encoded_len_as(&self, _implicit: Tag) -> usize {
        panic!("implicit tagging of a CHOICE value");
    }

    fn write_encoded_as(
        &self,
        _implicit: Tag,
        _target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        panic!("implicit tagging of a CHOICE value");
    }
}


//------------ ChoiceTemplate ------------------------------------------------

/// The template for decoding a CHOICE between several alternatives.
///
/// The incoming tag alone decides which alternative applies, so the
/// alternatives must have distinct tags. Attempting to decode a CHOICE
/// with an implicit tag panics since the tag is the only way to tell
/// the alternatives apart.
pub struct ChoiceTemplate {
    name: &'static str,
    alternatives: Vec<Alternative>,
}

struct Alternative {
    implicit: Option<Tag>,
    template: Box<dyn Template>,
}

impl Alternative {
    fn matches(&self, tag: Tag) -> bool {
        match self.implicit {
            Some(implicit) => tag == implicit,
            None => self.template.tag_match(tag),
        }
    }
}

impl ChoiceTemplate {
    /// Creates a template with no alternatives.
    pub fn new() -> Self {
        ChoiceTemplate { name: "CHOICE", alternatives: Vec::new() }
    }

    /// Sets the name used in error messages.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Adds an alternative.
    pub fn add(mut self, template: impl Template + 'static) -> Self {
        self.alternatives.push(Alternative {
            implicit: None, template: Box::new(template)
        });
        self
    }

    /// Adds an implicitly tagged alternative.
    pub fn add_implicit(
        mut self,
        implicit: Tag,
        template: impl Template + 'static,
    ) -> Self {
        self.alternatives.push(Alternative {
            implicit: Some(implicit), template: Box::new(template)
        });
        self
    }
}

impl Template for ChoiceTemplate {
    fn type_name(&self) -> &'static str {
        self.name
    }

    fn tag_match(&self, tag: Tag) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(tag))
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        let res = (|| {
            let tag = source.peek_header()?.tag();
            let alt = match self.alternatives.iter().find(|alt| {
                alt.matches(tag)
            }) {
                Some(alt) => alt,
                None => {
                    xerr!(return Err(DecodeError::framing(
                        format!("unexpected tag {}", tag)
                    )));
                }
            };
            let value = match alt.implicit {
                Some(implicit) => {
                    alt.template.decode_implicit(implicit, source)?
                }
                None => alt.template.decode(source)?,
            };
            Ok(Choice { tag, value: Box::new(value) })
        })();
        res.map(Value::Choice).map_err(|err| err.nested(self.type_name()))
    }

    fn decode_implicit(
        &self,
        _implicit: Tag,
        _source: &mut Source,
    ) -> Result<Value, DecodeError> {
        panic!("implicit tagging of a CHOICE value");
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::decode_slice;
    use crate::primitive::{
        Boolean, BooleanTemplate, Integer, IntegerTemplate, NullTemplate,
    };

    #[test]
    fn explicit_roundtrip() {
        let value = Explicit::new(Tag::CTX_0, Integer::from(5i64));
        assert_eq!(value.to_vec(), b"\xa0\x03\x02\x01\x05");

        let tmpl = ExplicitTemplate::new(Tag::CTX_0, IntegerTemplate);
        let decoded = decode_slice(&tmpl, &value.to_vec()).unwrap();
        let explicit = decoded.as_explicit().unwrap();
        assert_eq!(explicit.inner().to_i64(), Some(5));
        assert_eq!(explicit, &value);
    }

    #[test]
    fn explicit_rejects_primitive_form() {
        let tmpl = ExplicitTemplate::new(Tag::CTX_0, IntegerTemplate);
        let err = decode_slice(
            &tmpl, b"\x80\x03\x02\x01\x05"
        ).unwrap_err();
        assert_eq!(
            err.to_string(),
            "EXPLICIT: expected constructed encoding"
        );
    }

    #[test]
    fn explicit_empty_content() {
        let tmpl = ExplicitTemplate::new(Tag::CTX_0, IntegerTemplate);
        assert!(decode_slice(&tmpl, b"\xa0\x00").is_err());
    }

    #[test]
    fn explicit_trailing_content() {
        let tmpl = ExplicitTemplate::new(Tag::CTX_0, IntegerTemplate);
        let err = decode_slice(
            &tmpl, b"\xa0\x06\x02\x01\x05\x02\x01\x06"
        ).unwrap_err();
        assert_eq!(err.to_string(), "EXPLICIT: trailing components");
    }

    #[test]
    fn explicit_indefinite() {
        let tmpl = ExplicitTemplate::new(Tag::CTX_0, IntegerTemplate);
        let decoded = decode_slice(
            &tmpl, b"\xa0\x80\x02\x01\x05\x00\x00"
        ).unwrap();
        assert_eq!(
            decoded.as_explicit().unwrap().inner().to_i64(), Some(5)
        );
    }

    #[test]
    fn choice_by_tag() {
        let tmpl = ChoiceTemplate::new()
            .add(BooleanTemplate)
            .add(IntegerTemplate);

        let value = decode_slice(&tmpl, b"\x01\x01\xff").unwrap();
        let choice = value.as_choice().unwrap();
        assert_eq!(choice.tag(), Tag::BOOLEAN);
        assert_eq!(choice.value().to_bool(), Some(true));

        let value = decode_slice(&tmpl, b"\x02\x01\x05").unwrap();
        assert_eq!(value.as_choice().unwrap().value().to_i64(), Some(5));
    }

    #[test]
    fn choice_no_match() {
        let tmpl = ChoiceTemplate::new()
            .named("Time")
            .add(BooleanTemplate);
        let err = decode_slice(&tmpl, b"\x05\x00").unwrap_err();
        assert_eq!(err.to_string(), "Time: unexpected tag NULL");
    }

    #[test]
    fn choice_implicit_alternative() {
        // Two INTEGER alternatives told apart by implicit tags.
        let tmpl = ChoiceTemplate::new()
            .add_implicit(Tag::CTX_0, IntegerTemplate)
            .add_implicit(Tag::CTX_1, IntegerTemplate);

        let value = decode_slice(&tmpl, b"\x81\x01\x07").unwrap();
        let choice = value.as_choice().unwrap();
        assert_eq!(choice.tag(), Tag::CTX_1);
        assert_eq!(choice.value().to_i64(), Some(7));

        // The wire tag survives re-encoding.
        assert_eq!(choice.to_vec(), b"\x81\x01\x07");
    }

    #[test]
    fn choice_encode_plain() {
        let choice = Choice::new(Boolean::new(true));
        assert_eq!(choice.encoded_len(), 3);
        assert_eq!(choice.to_vec(), b"\x01\x01\xff");

        // And inside a container, under its own tag.
        let mut seq = crate::construct::Sequence::new();
        seq.append(choice);
        assert_eq!(seq.to_vec(), b"\x30\x03\x01\x01\xff");
    }

    #[test]
    #[should_panic(expected = "implicit tagging of a CHOICE")]
    fn choice_implicit_decode_panics() {
        let tmpl = ChoiceTemplate::new().add(NullTemplate);
        let mut data = &b"\x85\x00"[..];
        let mut source = Source::new(&mut data);
        let _ = tmpl.decode_implicit(Tag::ctx(5), &mut source);
    }
}
