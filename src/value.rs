//! The decoded value tree.
//!
//! Decoding with a [`Template`][crate::decode::Template] produces a
//! [`Value`], an enum over every concrete value type of the crate.
//! Constructed values hold their components as nested `Value`s, so a
//! whole decoded message is one tree that can be walked with the
//! accessor methods or matched on directly.

use std::io;
use crate::any::Any;
use crate::construct::{Sequence, Set};
use crate::encode::Encode;
use crate::header::Form;
use crate::oid::Oid;
use crate::primitive::{Boolean, Enumerated, Integer, Null};
use crate::string::{BitString, CharacterString, OctetString};
use crate::tag::Tag;
use crate::time::{GeneralizedTime, UtcTime};
use crate::wrap::{Choice, Explicit};


//------------ Value ---------------------------------------------------------

/// A decoded ASN.1 value of any supported type.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Boolean(Boolean),
    Integer(Integer),
    Enumerated(Enumerated),
    BitString(BitString),
    OctetString(OctetString),
    Null(Null),
    Oid(Oid),
    String(CharacterString),
    UtcTime(UtcTime),
    GeneralizedTime(GeneralizedTime),
    Sequence(Sequence),
    Set(Set),
    Explicit(Explicit),
    Choice(Choice),
    Any(Any),
}

/// Applies an expression to whatever concrete value `$self` holds.
macro_rules! for_each {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Value::Boolean($inner) => $body,
            Value::Integer($inner) => $body,
            Value::Enumerated($inner) => $body,
            Value::BitString($inner) => $body,
            Value::OctetString($inner) => $body,
            Value::Null($inner) => $body,
            Value::Oid($inner) => $body,
            Value::String($inner) => $body,
            Value::UtcTime($inner) => $body,
            Value::GeneralizedTime($inner) => $body,
            Value::Sequence($inner) => $body,
            Value::Set($inner) => $body,
            Value::Explicit($inner) => $body,
            Value::Choice($inner) => $body,
            Value::Any($inner) => $body,
        }
    }
}

impl Value {
    /// Returns the boolean if this is a BOOLEAN value.
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(inner) => Some(inner.to_bool()),
            _ => None,
        }
    }

    /// Returns the integer if this is an INTEGER value.
    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Value::Integer(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns an INTEGER value converted to an `i64`.
    ///
    /// Returns `None` both for other value types and for integers that
    /// don't fit.
    pub fn to_i64(&self) -> Option<i64> {
        self.as_integer().and_then(Integer::to_i64)
    }

    /// Returns an INTEGER value converted to a `u64`.
    pub fn to_u64(&self) -> Option<u64> {
        self.as_integer().and_then(Integer::to_u64)
    }

    /// Returns the enumerated if this is an ENUMERATED value.
    pub fn as_enumerated(&self) -> Option<&Enumerated> {
        match self {
            Value::Enumerated(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the bit string if this is a BIT STRING value.
    pub fn as_bit_string(&self) -> Option<&BitString> {
        match self {
            Value::BitString(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the octet string if this is an OCTET STRING value.
    pub fn as_octet_string(&self) -> Option<&OctetString> {
        match self {
            Value::OctetString(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns whether this is the NULL value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Returns the object identifier if this is an OID value.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::Oid(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the string if this is a restricted character string.
    pub fn as_string(&self) -> Option<&CharacterString> {
        match self {
            Value::String(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the sequence if this is a SEQUENCE value.
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the set if this is a SET value.
    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Value::Set(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the wrapper if this is an explicitly tagged value.
    pub fn as_explicit(&self) -> Option<&Explicit> {
        match self {
            Value::Explicit(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the chosen alternative if this is a CHOICE value.
    pub fn as_choice(&self) -> Option<&Choice> {
        match self {
            Value::Choice(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the captured value if this is an ANY value.
    pub fn as_any(&self) -> Option<&Any> {
        match self {
            Value::Any(inner) => Some(inner),
            _ => None,
        }
    }
}


//--- From

macro_rules! impl_from {
    ($variant:ident, $type:ty) => {
        impl From<$type> for Value {
            fn from(inner: $type) -> Self {
                Value::$variant(inner)
            }
        }
    }
}

impl_from!(Boolean, Boolean);
impl_from!(Integer, Integer);
impl_from!(Enumerated, Enumerated);
impl_from!(BitString, BitString);
impl_from!(OctetString, OctetString);
impl_from!(Null, Null);
impl_from!(Oid, Oid);
impl_from!(String, CharacterString);
impl_from!(UtcTime, UtcTime);
impl_from!(GeneralizedTime, GeneralizedTime);
impl_from!(Sequence, Sequence);
impl_from!(Set, Set);
impl_from!(Explicit, Explicit);
impl_from!(Choice, Choice);
impl_from!(Any, Any);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(Boolean::new(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(Integer::from(value))
    }
}


//--- Encode

impl Encode for Value {
    fn tag(&self) -> Tag {
        for_each!(self, inner => inner.tag())
    }

    fn form(&self) -> Form {
        for_each!(self, inner => inner.form())
    }

    fn content_len(&self) -> usize {
        for_each!(self, inner => inner.content_len())
    }

    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        for_each!(self, inner => inner.write_content(target))
    }

    fn encoded_len(&self) -> usize {
        for_each!(self, inner => inner.encoded_len())
    }

    fn encoded_len_as(&self, implicit: Tag) -> usize {
        for_each!(self, inner => inner.encoded_len_as(implicit))
    }

    fn write_encoded(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        for_each!(self, inner => inner.write_encoded(target))
    }

    fn write_encoded_as(
        &self,
        implicit: Tag,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        for_each!(self, inner => inner.write_encoded_as(implicit, target))
    }
}


//============ Tests =========================================================
