//! The simple primitive types: BOOLEAN, INTEGER, ENUMERATED, and NULL.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{fmt, io};
use bytes::Bytes;
use crate::decode::{DecodeError, Source, Template};
use crate::encode::Encode;
use crate::header::Form;
use crate::tag::Tag;
use crate::value::Value;


//------------ Boolean -------------------------------------------------------

/// A BER encoded BOOLEAN.
///
/// The content is a single octet. BER considers any non-zero octet to be
/// true when decoding; encoding always normalizes true to `0xFF` as DER
/// demands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Boolean(bool);

impl Boolean {
    /// Creates a new BOOLEAN value.
    pub fn new(value: bool) -> Self {
        Boolean(value)
    }

    /// Returns the boolean value.
    pub fn to_bool(self) -> bool {
        self.0
    }
}

impl From<bool> for Boolean {
    fn from(value: bool) -> Self {
        Boolean(value)
    }
}

impl Encode for Boolean {
    fn tag(&self) -> Tag {
        Tag::BOOLEAN
    }

    fn content_len(&self) -> usize {
        1
    }

    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        target.write_all(&[if self.0 { 0xff } else { 0x00 }])
    }
}


//------------ BooleanTemplate -----------------------------------------------

/// The template for decoding a BOOLEAN.
#[derive(Clone, Copy, Debug, Default)]
pub struct BooleanTemplate;

impl Template for BooleanTemplate {
    fn type_name(&self) -> &'static str {
        "BOOLEAN"
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == Tag::BOOLEAN
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(Tag::BOOLEAN, source)
    }

    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError> {
        let res = (|| {
            let header = source.take_header()?;
            header.validate(implicit, Form::Primitive)?;
            if header.definite_length()? != 1 {
                xerr!(return Err(DecodeError::value(
                    "invalid length for BOOLEAN"
                )));
            }
            Ok(Boolean::new(source.take_u8()? != 0))
        })();
        res.map(Value::Boolean).map_err(|err| err.nested(self.type_name()))
    }
}


//------------ Integer -------------------------------------------------------

/// A BER encoded INTEGER.
///
/// As integers are variable length in BER, this type wraps the raw
/// content octets: a big-endian two's complement byte sequence of at
/// least one octet. Values constructed from native integers always use
/// the minimal number of octets; values produced by decoding keep
/// whatever the sender used, so structural equality follows the octets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Integer(Bytes);

impl Integer {
    /// Creates an integer from its raw content octets.
    ///
    /// Returns `None` for an empty slice, which is not a valid encoding.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.is_empty() {
            return None
        }
        Some(Integer(Bytes::copy_from_slice(slice)))
    }

    /// Creates an integer from a native value.
    pub fn from_i128(value: i128) -> Self {
        let bytes = value.to_be_bytes();
        let mut skip = 0;
        while skip < bytes.len() - 1 {
            let redundant = match bytes[skip] {
                0x00 => bytes[skip + 1] & 0x80 == 0,
                0xff => bytes[skip + 1] & 0x80 != 0,
                _ => false,
            };
            if !redundant {
                break
            }
            skip += 1;
        }
        Integer(Bytes::copy_from_slice(&bytes[skip..]))
    }

    /// Returns the raw content octets.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Converts the value into an `i128` if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        if self.0.len() > 16 {
            // Redundant leading octets may still leave it in range.
            let sign = if self.0[0] & 0x80 != 0 { 0xff } else { 0x00 };
            let extra = self.0.len() - 16;
            if self.0[..extra].iter().any(|&b| b != sign) {
                return None
            }
            if (self.0[extra] & 0x80 != 0) != (sign == 0xff) {
                return None
            }
        }
        let mut res: i128 = if self.0[0] & 0x80 != 0 { -1 } else { 0 };
        for &octet in self.0.iter() {
            res = (res << 8) | i128::from(octet);
        }
        Some(res)
    }

    /// Converts the value into an `i64` if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        let res = self.to_i128()?;
        if res < i128::from(i64::MIN) || res > i128::from(i64::MAX) {
            return None
        }
        Some(res as i64)
    }

    /// Converts the value into a `u64` if it is in range.
    pub fn to_u64(&self) -> Option<u64> {
        let res = self.to_i128()?;
        if res < 0 || res > i128::from(u64::MAX) {
            return None
        }
        Some(res as u64)
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer::from_i128(value.into())
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Integer::from_i128(value.into())
    }
}

impl From<i32> for Integer {
    fn from(value: i32) -> Self {
        Integer::from_i128(value.into())
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_i128() {
            Some(value) => write!(f, "{}", value),
            None => {
                f.write_str("0x")?;
                for octet in self.0.iter() {
                    write!(f, "{:02x}", octet)?;
                }
                Ok(())
            }
        }
    }
}

impl Encode for Integer {
    fn tag(&self) -> Tag {
        Tag::INTEGER
    }

    fn content_len(&self) -> usize {
        self.0.len()
    }

    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        target.write_all(&self.0)
    }
}

/// Parses the content octets of an INTEGER or ENUMERATED.
fn take_int_content(
    implicit: Tag,
    source: &mut Source,
) -> Result<Bytes, DecodeError> {
    let header = source.take_header()?;
    header.validate(implicit, Form::Primitive)?;
    let len = header.definite_length()?;
    if len == 0 {
        xerr!(return Err(DecodeError::value("zero-length content")));
    }
    source.take_bytes(len)
}


//------------ IntegerTemplate -----------------------------------------------

/// The template for decoding an INTEGER.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntegerTemplate;

impl Template for IntegerTemplate {
    fn type_name(&self) -> &'static str {
        "INTEGER"
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == Tag::INTEGER
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(Tag::INTEGER, source)
    }

    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError> {
        take_int_content(implicit, source)
            .map(|bytes| Value::Integer(Integer(bytes)))
            .map_err(|err| err.nested(self.type_name()))
    }
}


//------------ Enumerated ----------------------------------------------------

/// A BER encoded ENUMERATED.
///
/// The content octets are exactly those of an INTEGER; only the tag
/// differs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Enumerated(Integer);

impl Enumerated {
    /// Creates an enumerated value from a native value.
    pub fn new(value: i64) -> Self {
        Enumerated(value.into())
    }

    /// Returns the underlying integer.
    pub fn as_integer(&self) -> &Integer {
        &self.0
    }

    /// Converts the value into an `i64` if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }
}

impl Encode for Enumerated {
    fn tag(&self) -> Tag {
        Tag::ENUMERATED
    }

    fn content_len(&self) -> usize {
        self.0.content_len()
    }

    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        self.0.write_content(target)
    }
}


//------------ EnumeratedTemplate --------------------------------------------

/// The template for decoding an ENUMERATED.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnumeratedTemplate;

impl Template for EnumeratedTemplate {
    fn type_name(&self) -> &'static str {
        "ENUMERATED"
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == Tag::ENUMERATED
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(Tag::ENUMERATED, source)
    }

    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError> {
        take_int_content(implicit, source)
            .map(|bytes| Value::Enumerated(Enumerated(Integer(bytes))))
            .map_err(|err| err.nested(self.type_name()))
    }
}


//------------ Null ----------------------------------------------------------

/// A BER encoded NULL.
///
/// The NULL type carries no information; its content is empty.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Null;

impl Encode for Null {
    fn tag(&self) -> Tag {
        Tag::NULL
    }

    fn content_len(&self) -> usize {
        0
    }

    fn write_content(
        &self,
        _target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        Ok(())
    }
}


//------------ NullTemplate --------------------------------------------------

/// The template for decoding a NULL.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTemplate;

impl Template for NullTemplate {
    fn type_name(&self) -> &'static str {
        "NULL"
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == Tag::NULL
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(Tag::NULL, source)
    }

    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError> {
        let res = (|| {
            let header = source.take_header()?;
            header.validate(implicit, Form::Primitive)?;
            if header.definite_length()? != 0 {
                xerr!(return Err(DecodeError::value(
                    "NULL with non-empty content"
                )));
            }
            Ok(Value::Null(Null))
        })();
        res.map_err(|err| err.nested(self.type_name()))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::decode_slice;

    #[test]
    fn boolean_encoding() {
        assert_eq!(Boolean::new(true).to_vec(), b"\x01\x01\xff");
        assert_eq!(Boolean::new(false).to_vec(), b"\x01\x01\x00");
    }

    #[test]
    fn boolean_decoding() {
        let value = decode_slice(&BooleanTemplate, b"\x01\x01\x00").unwrap();
        assert_eq!(value.to_bool(), Some(false));

        // Any non-zero content octet is true in BER.
        let value = decode_slice(&BooleanTemplate, b"\x01\x01\x01").unwrap();
        assert_eq!(value.to_bool(), Some(true));

        // A zero-length BOOLEAN is malformed.
        assert!(decode_slice(&BooleanTemplate, b"\x01\x00").is_err());
    }

    #[test]
    fn boolean_tag_mismatch() {
        // An INTEGER-tagged TLV must not silently coerce.
        let err = decode_slice(
            &BooleanTemplate, b"\x02\x01\x05"
        ).unwrap_err();
        assert_eq!(
            err.to_string(),
            "BOOLEAN: expected tag BOOLEAN, found INTEGER"
        );
    }

    #[test]
    fn integer_minimal_encoding() {
        assert_eq!(Integer::from(0i64).to_vec(), b"\x02\x01\x00");
        assert_eq!(Integer::from(5i64).to_vec(), b"\x02\x01\x05");
        assert_eq!(Integer::from(127i64).to_vec(), b"\x02\x01\x7f");
        assert_eq!(Integer::from(128i64).to_vec(), b"\x02\x02\x00\x80");
        assert_eq!(Integer::from(256i64).to_vec(), b"\x02\x02\x01\x00");
        assert_eq!(Integer::from(-1i64).to_vec(), b"\x02\x01\xff");
        assert_eq!(Integer::from(-128i64).to_vec(), b"\x02\x01\x80");
        assert_eq!(Integer::from(-129i64).to_vec(), b"\x02\x02\xff\x7f");
        assert_eq!(
            Integer::from(u64::MAX).to_vec(),
            b"\x02\x09\x00\xff\xff\xff\xff\xff\xff\xff\xff"
        );
    }

    #[test]
    fn integer_roundtrip() {
        for value in [
            0i64, 1, -1, 127, 128, -128, -129, 0x7fff, i64::MIN, i64::MAX,
        ] {
            let data = Integer::from(value).to_vec();
            let decoded = decode_slice(&IntegerTemplate, &data).unwrap();
            assert_eq!(decoded.to_i64(), Some(value));
        }
    }

    #[test]
    fn integer_decoding() {
        let value = decode_slice(
            &IntegerTemplate, b"\x02\x02\xff\x7f"
        ).unwrap();
        assert_eq!(value.to_i64(), Some(-129));

        // Zero-length content is malformed.
        assert!(decode_slice(&IntegerTemplate, b"\x02\x00").is_err());

        // Non-minimal content octets are tolerated in BER.
        let value = decode_slice(
            &IntegerTemplate, b"\x02\x02\x00\x05"
        ).unwrap();
        assert_eq!(value.to_i64(), Some(5));
    }

    #[test]
    fn integer_out_of_range() {
        let value = Integer::from_i128(i128::from(i64::MAX) + 1);
        assert_eq!(value.to_i64(), None);
        assert_eq!(value.to_u64(), Some(i64::MAX as u64 + 1));
    }

    #[test]
    fn enumerated() {
        assert_eq!(Enumerated::new(3).to_vec(), b"\x0a\x01\x03");
        let value = decode_slice(&EnumeratedTemplate, b"\x0a\x01\x03")
            .unwrap();
        assert_eq!(
            value.as_enumerated().and_then(Enumerated::to_i64), Some(3)
        );
    }

    #[test]
    fn null() {
        assert_eq!(Null.to_vec(), b"\x05\x00");
        assert!(decode_slice(&NullTemplate, b"\x05\x00").is_ok());
        assert!(decode_slice(&NullTemplate, b"\x05\x01\x00").is_err());
    }
}
