//! The constructed types: SEQUENCE, SET, and their OF variants.
//!
//! The value types [`Sequence`] and [`Set`] keep an ordered list of
//! components, each optionally carrying an implicit tag that replaces
//! the component's own tag on the wire. The templates decode a fixed
//! field list ([`SequenceTemplate`], [`SetTemplate`]) or a homogeneous
//! repetition ([`OfTemplate`]).

use std::io;
use crate::decode::{DecodeError, Source, Template};
use crate::encode::Encode;
use crate::header::{Form, Header};
use crate::length::Length;
use crate::tag::Tag;
use crate::value::Value;


//------------ Element -------------------------------------------------------

/// A single component of a constructed value.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// The implicit tag replacing the value's own tag, if any.
    implicit: Option<Tag>,

    /// The component value.
    value: Value,
}

impl Element {
    /// Returns the implicit tag of the component, if it has one.
    pub fn implicit(&self) -> Option<Tag> {
        self.implicit
    }

    /// Returns the component value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    fn encoded_len(&self) -> usize {
        match self.implicit {
            Some(tag) => self.value.encoded_len_as(tag),
            None => self.value.encoded_len(),
        }
    }

    fn write_encoded(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        match self.implicit {
            Some(tag) => self.value.write_encoded_as(tag, target),
            None => self.value.write_encoded(target),
        }
    }
}


//------------ Sequence, Set -------------------------------------------------

macro_rules! construct_type {
    ( $(#[$attr:meta])* $name:ident, $tag:expr ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $name {
            /// The components in order. Absent optional fields of a
            /// decoded value appear as `None` so that indexes line up
            /// with the template's field positions.
            components: Vec<Option<Element>>,
        }

        impl $name {
            /// Creates an empty value.
            pub fn new() -> Self {
                Self { components: Vec::new() }
            }

            /// Appends a component.
            pub fn append(&mut self, value: impl Into<Value>) {
                self.components.push(
                    Some(Element { implicit: None, value: value.into() })
                );
            }

            /// Appends a component with an implicit tag.
            pub fn append_implicit(
                &mut self,
                implicit: Tag,
                value: impl Into<Value>,
            ) {
                self.components.push(Some(Element {
                    implicit: Some(implicit), value: value.into()
                }));
            }

            /// Returns the number of component positions.
            pub fn len(&self) -> usize {
                self.components.len()
            }

            /// Returns whether there are no components.
            pub fn is_empty(&self) -> bool {
                self.components.is_empty()
            }

            /// Returns the value at the given position.
            ///
            /// Returns `None` both for positions past the end and for
            /// absent optional components.
            pub fn get(&self, index: usize) -> Option<&Value> {
                self.components.get(index)?.as_ref().map(Element::value)
            }

            /// Returns an iterator over the component positions.
            pub fn iter(
                &self,
            ) -> impl Iterator<Item = Option<&Value>> + '_ {
                self.components.iter().map(|component| {
                    component.as_ref().map(Element::value)
                })
            }

            fn from_components(components: Vec<Option<Element>>) -> Self {
                Self { components }
            }
        }

        impl Encode for $name {
            fn tag(&self) -> Tag {
                $tag
            }

            fn form(&self) -> Form {
                Form::Constructed
            }

            fn content_len(&self) -> usize {
                self.components.iter().flatten()
                    .map(Element::encoded_len).sum()
            }

            fn write_content(
                &self,
                target: &mut dyn io::Write,
            ) -> Result<(), io::Error> {
                for component in self.components.iter().flatten() {
                    component.write_encoded(target)?;
                }
                Ok(())
            }
        }
    }
}

construct_type!(
    /// A SEQUENCE or SEQUENCE OF: an ordered list of components.
    Sequence, Tag::SEQUENCE
);
construct_type!(
    /// A SET or SET OF: a collection of components.
    ///
    /// Component order is preserved as appended and encoding writes the
    /// components in that order. No canonical reordering takes place.
    Set, Tag::SET
);


//------------ Content -------------------------------------------------------

/// Tracks progress through the content octets of a constructed value.
pub(crate) struct Content {
    length: Length,
    start: u64,
}

impl Content {
    pub(crate) fn new(header: Header, source: &Source) -> Self {
        Content { length: header.length(), start: source.consumed() }
    }

    /// Returns whether the end of the content has been reached.
    ///
    /// For the indefinite form this peeks for the end-of-contents
    /// marker. For the definite form no look-ahead past the end of the
    /// content ever happens.
    pub(crate) fn at_end(
        &self,
        source: &mut Source,
    ) -> Result<bool, DecodeError> {
        match self.length {
            Length::Definite(len) => {
                let pos = source.consumed() - self.start;
                if pos > len as u64 {
                    xerr!(return Err(DecodeError::framing(
                        "component extends past end of content"
                    )));
                }
                Ok(pos == len as u64)
            }
            Length::Indefinite => {
                Ok(source.peek_header()?.is_end_of_contents())
            }
        }
    }

    /// Checks that the content has been consumed completely.
    ///
    /// For the indefinite form this takes the end-of-contents marker.
    pub(crate) fn finish(
        &self,
        source: &mut Source,
    ) -> Result<(), DecodeError> {
        match self.length {
            Length::Definite(_) => {
                if !self.at_end(source)? {
                    xerr!(return Err(DecodeError::framing(
                        "trailing components"
                    )));
                }
                Ok(())
            }
            Length::Indefinite => {
                if !source.take_header()?.is_end_of_contents() {
                    xerr!(return Err(DecodeError::framing(
                        "trailing components"
                    )));
                }
                Ok(())
            }
        }
    }
}


//------------ Field ---------------------------------------------------------

/// A field of a SEQUENCE or SET template.
struct Field {
    implicit: Option<Tag>,
    optional: bool,
    template: Box<dyn Template>,
}

impl Field {
    /// Returns whether a component with the given tag belongs to this
    /// field.
    fn matches(&self, tag: Tag) -> bool {
        match self.implicit {
            Some(implicit) => tag == implicit,
            None => self.template.tag_match(tag),
        }
    }

    fn decode(&self, source: &mut Source) -> Result<Element, DecodeError> {
        let value = match self.implicit {
            Some(implicit) => {
                self.template.decode_implicit(implicit, source)?
            }
            None => self.template.decode(source)?,
        };
        Ok(Element { implicit: self.implicit, value })
    }
}

/// The builder methods shared by the SEQUENCE and SET templates.
macro_rules! field_builder {
    () => {
        /// Sets the name used in error messages.
        pub fn named(mut self, name: &'static str) -> Self {
            self.name = name;
            self
        }

        /// Adds a mandatory field.
        pub fn add(self, template: impl Template + 'static) -> Self {
            self.push(None, false, template)
        }

        /// Adds a mandatory field with an implicit tag.
        pub fn add_implicit(
            self,
            implicit: Tag,
            template: impl Template + 'static,
        ) -> Self {
            self.push(Some(implicit), false, template)
        }

        /// Adds an optional field.
        pub fn add_optional(
            self,
            template: impl Template + 'static,
        ) -> Self {
            self.push(None, true, template)
        }

        /// Adds an optional field with an implicit tag.
        pub fn add_optional_implicit(
            self,
            implicit: Tag,
            template: impl Template + 'static,
        ) -> Self {
            self.push(Some(implicit), true, template)
        }

        fn push(
            mut self,
            implicit: Option<Tag>,
            optional: bool,
            template: impl Template + 'static,
        ) -> Self {
            self.fields.push(Field {
                implicit, optional, template: Box::new(template)
            });
            self
        }
    }
}


//------------ SequenceTemplate ----------------------------------------------

/// The template for decoding a SEQUENCE with a fixed field list.
///
/// Fields are added in order via the builder methods. Optional fields
/// are skipped when the tag of the next component doesn't match them,
/// decided on the tag alone without consuming anything.
pub struct SequenceTemplate {
    name: &'static str,
    fields: Vec<Field>,
}

impl SequenceTemplate {
    /// Creates a template with no fields.
    pub fn new() -> Self {
        SequenceTemplate { name: "SEQUENCE", fields: Vec::new() }
    }

    field_builder!();

    fn decode_fields(
        &self,
        content: Content,
        source: &mut Source,
    ) -> Result<Sequence, DecodeError> {
        let mut components = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if content.at_end(source)? {
                if field.optional {
                    components.push(None);
                    continue
                }
                xerr!(return Err(DecodeError::framing(
                    "missing component"
                )));
            }
            let tag = source.peek_header()?.tag();
            if field.matches(tag) {
                components.push(Some(field.decode(source)?));
            } else if field.optional {
                components.push(None);
            } else {
                xerr!(return Err(DecodeError::framing(
                    format!("unexpected tag {}", tag)
                )));
            }
        }
        content.finish(source)?;
        Ok(Sequence::from_components(components))
    }
}

impl Template for SequenceTemplate {
    fn type_name(&self) -> &'static str {
        self.name
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == Tag::SEQUENCE
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(Tag::SEQUENCE, source)
    }

    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError> {
        let res = (|| {
            let header = source.take_header()?;
            header.validate(implicit, Form::Constructed)?;
            self.decode_fields(Content::new(header, source), source)
        })();
        res.map(Value::Sequence)
            .map_err(|err| err.nested(self.type_name()))
    }
}


//------------ SetTemplate ---------------------------------------------------

/// The template for decoding a SET with a fixed member list.
///
/// Unlike a SEQUENCE, the members of a SET may arrive in any order.
/// Each incoming component is matched against the first member it fits
/// that hasn't been filled yet; the decoded value keeps the members in
/// template order.
pub struct SetTemplate {
    name: &'static str,
    fields: Vec<Field>,
}

impl SetTemplate {
    /// Creates a template with no members.
    pub fn new() -> Self {
        SetTemplate { name: "SET", fields: Vec::new() }
    }

    field_builder!();

    fn decode_fields(
        &self,
        content: Content,
        source: &mut Source,
    ) -> Result<Set, DecodeError> {
        let mut components: Vec<Option<Element>> =
            self.fields.iter().map(|_| None).collect();
        while !content.at_end(source)? {
            let tag = source.peek_header()?.tag();
            let index = self.fields.iter().enumerate().position(
                |(index, field)| {
                    components[index].is_none() && field.matches(tag)
                }
            );
            match index {
                Some(index) => {
                    components[index] = Some(
                        self.fields[index].decode(source)?
                    );
                }
                None => {
                    xerr!(return Err(DecodeError::framing(
                        format!("unexpected tag {}", tag)
                    )));
                }
            }
        }
        content.finish(source)?;
        for (field, component) in self.fields.iter().zip(&components) {
            if component.is_none() && !field.optional {
                xerr!(return Err(DecodeError::framing(
                    "missing component"
                )));
            }
        }
        Ok(Set::from_components(components))
    }
}

impl Template for SetTemplate {
    fn type_name(&self) -> &'static str {
        self.name
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == Tag::SET
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(Tag::SET, source)
    }

    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError> {
        let res = (|| {
            let header = source.take_header()?;
            header.validate(implicit, Form::Constructed)?;
            self.decode_fields(Content::new(header, source), source)
        })();
        res.map(Value::Set).map_err(|err| err.nested(self.type_name()))
    }
}


//------------ OfTemplate ----------------------------------------------------

/// The template for decoding a SEQUENCE OF or SET OF.
///
/// All components are decoded with the same item template, as many as
/// the content holds.
pub struct OfTemplate {
    name: &'static str,
    set: bool,
    item: Box<dyn Template>,
}

impl OfTemplate {
    /// Creates a template for a SEQUENCE OF the given item type.
    pub fn sequence_of(item: impl Template + 'static) -> Self {
        OfTemplate {
            name: "SEQUENCE OF", set: false, item: Box::new(item)
        }
    }

    /// Creates a template for a SET OF the given item type.
    pub fn set_of(item: impl Template + 'static) -> Self {
        OfTemplate { name: "SET OF", set: true, item: Box::new(item) }
    }

    /// Sets the name used in error messages.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    fn decode_items(
        &self,
        content: Content,
        source: &mut Source,
    ) -> Result<Vec<Option<Element>>, DecodeError> {
        let mut components = Vec::new();
        while !content.at_end(source)? {
            components.push(Some(Element {
                implicit: None,
                value: self.item.decode(source)?,
            }));
        }
        content.finish(source)?;
        Ok(components)
    }
}

impl Template for OfTemplate {
    fn type_name(&self) -> &'static str {
        self.name
    }

    fn tag_match(&self, tag: Tag) -> bool {
        if self.set {
            tag == Tag::SET
        } else {
            tag == Tag::SEQUENCE
        }
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        let tag = if self.set { Tag::SET } else { Tag::SEQUENCE };
        self.decode_implicit(tag, source)
    }

    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError> {
        let res = (|| {
            let header = source.take_header()?;
            header.validate(implicit, Form::Constructed)?;
            self.decode_items(Content::new(header, source), source)
        })();
        match res {
            Ok(components) => {
                if self.set {
                    Ok(Value::Set(Set::from_components(components)))
                } else {
                    Ok(Value::Sequence(
                        Sequence::from_components(components)
                    ))
                }
            }
            Err(err) => Err(err.nested(self.type_name())),
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::decode_slice;
    use crate::primitive::{
        BooleanTemplate, Integer, IntegerTemplate, Null, NullTemplate,
    };
    use crate::primitive::Boolean;

    fn flag_and_int() -> SequenceTemplate {
        SequenceTemplate::new()
            .add(BooleanTemplate)
            .add(IntegerTemplate)
    }

    #[test]
    fn sequence_roundtrip() {
        let mut seq = Sequence::new();
        seq.append(Boolean::new(true));
        seq.append(Integer::from(5i64));
        let data = seq.to_vec();
        assert_eq!(data, b"\x30\x06\x01\x01\xff\x02\x01\x05");

        let value = decode_slice(&flag_and_int(), &data).unwrap();
        let decoded = value.as_sequence().unwrap();
        assert_eq!(decoded.get(0).unwrap().to_bool(), Some(true));
        assert_eq!(decoded.get(1).unwrap().to_i64(), Some(5));
        assert_eq!(decoded, &seq);
    }

    #[test]
    fn sequence_truncated_inside() {
        let err = decode_slice(
            &flag_and_int(), b"\x30\x06\x01\x01\xff\x02\x01"
        ).unwrap_err();
        assert!(err.is_truncated());
        assert_eq!(
            err.to_string(),
            "SEQUENCE > INTEGER: end-of-file reached"
        );
    }

    #[test]
    fn sequence_named_trail() {
        let tmpl = SequenceTemplate::new()
            .named("AlgorithmIdentifier")
            .add(crate::oid::OidTemplate);
        let err = decode_slice(&tmpl, b"\x30\x02\x06\x01").unwrap_err();
        assert_eq!(
            err.to_string(),
            "AlgorithmIdentifier > OBJECT IDENTIFIER: \
             end-of-file reached"
        );
    }

    #[test]
    fn sequence_missing_component() {
        let err = decode_slice(
            &flag_and_int(), b"\x30\x03\x01\x01\xff"
        ).unwrap_err();
        assert_eq!(err.to_string(), "SEQUENCE: missing component");
    }

    #[test]
    fn optional_middle_field() {
        let tmpl = SequenceTemplate::new()
            .add(BooleanTemplate)
            .add_optional(NullTemplate)
            .add(IntegerTemplate);

        // With the NULL present.
        let value = decode_slice(
            &tmpl, b"\x30\x08\x01\x01\xff\x05\x00\x02\x01\x07"
        ).unwrap();
        let seq = value.as_sequence().unwrap();
        assert!(seq.get(1).unwrap().is_null());
        assert_eq!(seq.get(2).unwrap().to_i64(), Some(7));

        // Without it, the INTEGER still lands at index 2.
        let value = decode_slice(
            &tmpl, b"\x30\x06\x01\x01\xff\x02\x01\x07"
        ).unwrap();
        let seq = value.as_sequence().unwrap();
        assert_eq!(seq.len(), 3);
        assert!(seq.get(1).is_none());
        assert_eq!(seq.get(2).unwrap().to_i64(), Some(7));
    }

    #[test]
    fn optional_tail_not_peeked_past_end() {
        let tmpl = SequenceTemplate::new()
            .add(BooleanTemplate)
            .add_optional(IntegerTemplate);
        // Content ends right after the BOOLEAN; the optional tail must
        // not look at the INTEGER that follows the SEQUENCE.
        let mut data = Vec::from(&b"\x30\x03\x01\x01\xff"[..]);
        data.extend_from_slice(b"\x02\x01\x2a");
        let mut reader = &data[..];
        let (value, consumed) = crate::decode::decode_value(
            &tmpl, &mut reader
        ).unwrap();
        assert_eq!(consumed, 5);
        assert!(value.as_sequence().unwrap().get(1).is_none());
    }

    #[test]
    fn trailing_component_rejected() {
        let tmpl = SequenceTemplate::new().add(BooleanTemplate);
        let err = decode_slice(
            &tmpl, b"\x30\x06\x01\x01\xff\x02\x01\x05"
        ).unwrap_err();
        assert_eq!(err.to_string(), "SEQUENCE: trailing components");
    }

    #[test]
    fn indefinite_length_sequence() {
        let value = decode_slice(
            &flag_and_int(),
            b"\x30\x80\x01\x01\xff\x02\x01\x05\x00\x00"
        ).unwrap();
        let seq = value.as_sequence().unwrap();
        assert_eq!(seq.get(1).unwrap().to_i64(), Some(5));
        // Re-encoding uses the definite form.
        assert_eq!(
            seq.to_vec(), b"\x30\x06\x01\x01\xff\x02\x01\x05"
        );
    }

    #[test]
    fn indefinite_missing_eoc() {
        let err = decode_slice(
            &flag_and_int(), b"\x30\x80\x01\x01\xff\x02\x01\x05"
        ).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn implicit_fields() {
        // [0] IMPLICIT BOOLEAN followed by a plain INTEGER.
        let tmpl = SequenceTemplate::new()
            .add_implicit(Tag::CTX_0, BooleanTemplate)
            .add(IntegerTemplate);
        let value = decode_slice(
            &tmpl, b"\x30\x06\x80\x01\xff\x02\x01\x05"
        ).unwrap();
        let seq = value.as_sequence().unwrap();
        assert_eq!(seq.get(0).unwrap().to_bool(), Some(true));

        // Re-encoding keeps the implicit tag.
        assert_eq!(seq.to_vec(), b"\x30\x06\x80\x01\xff\x02\x01\x05");
    }

    #[test]
    fn set_any_order() {
        let tmpl = SetTemplate::new()
            .add(BooleanTemplate)
            .add(IntegerTemplate);
        for data in [
            &b"\x31\x06\x01\x01\xff\x02\x01\x05"[..],
            &b"\x31\x06\x02\x01\x05\x01\x01\xff"[..],
        ] {
            let value = decode_slice(&tmpl, data).unwrap();
            let set = value.as_set().unwrap();
            // Members land in template order either way.
            assert_eq!(set.get(0).unwrap().to_bool(), Some(true));
            assert_eq!(set.get(1).unwrap().to_i64(), Some(5));
        }
    }

    #[test]
    fn set_missing_member() {
        let tmpl = SetTemplate::new()
            .add(BooleanTemplate)
            .add(IntegerTemplate);
        let err = decode_slice(
            &tmpl, b"\x31\x03\x01\x01\xff"
        ).unwrap_err();
        assert_eq!(err.to_string(), "SET: missing component");
    }

    #[test]
    fn sequence_of() {
        let tmpl = OfTemplate::sequence_of(IntegerTemplate);
        let value = decode_slice(
            &tmpl, b"\x30\x09\x02\x01\x01\x02\x01\x02\x02\x01\x03"
        ).unwrap();
        let seq = value.as_sequence().unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.get(2).unwrap().to_i64(), Some(3));

        // Empty repetition is fine.
        let value = decode_slice(&tmpl, b"\x30\x00").unwrap();
        assert!(value.as_sequence().unwrap().is_empty());
    }

    #[test]
    fn set_of() {
        let tmpl = OfTemplate::set_of(NullTemplate);
        let value = decode_slice(&tmpl, b"\x31\x04\x05\x00\x05\x00")
            .unwrap();
        assert_eq!(value.as_set().unwrap().len(), 2);
    }

    #[test]
    fn nested_sequences() {
        let inner = Sequence::new();
        let mut outer = Sequence::new();
        outer.append(inner.clone());
        outer.append(Null);
        assert_eq!(outer.to_vec(), b"\x30\x04\x30\x00\x05\x00");

        let tmpl = SequenceTemplate::new()
            .add(SequenceTemplate::new())
            .add(NullTemplate);
        let value = decode_slice(&tmpl, &outer.to_vec()).unwrap();
        assert_eq!(value.as_sequence(), Some(&outer));
    }
}
