//! BER encoded octet strings.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::io;
use bytes::Bytes;
use crate::decode::{DecodeError, Source, Template};
use crate::encode::Encode;
use crate::header::Form;
use crate::tag::Tag;
use crate::value::Value;


//------------ OctetString ---------------------------------------------------

/// An OCTET STRING: an arbitrary sequence of octets.
///
/// Only the primitive encoding is supported; the constructed, segmented
/// encoding of octet strings is out of scope for this crate.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OctetString(Bytes);

impl OctetString {
    /// Creates an octet string from the given data.
    pub fn new(data: Bytes) -> Self {
        OctetString(data)
    }

    /// Creates an octet string by copying a slice.
    pub fn from_slice(data: &[u8]) -> Self {
        OctetString(Bytes::copy_from_slice(data))
    }

    /// Returns the octets as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the number of octets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the string is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts the value into its underlying bytes.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for OctetString {
    fn from(data: Bytes) -> Self {
        OctetString(data)
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(data: Vec<u8>) -> Self {
        OctetString(data.into())
    }
}

impl Encode for OctetString {
    fn tag(&self) -> Tag {
        Tag::OCTET_STRING
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


//------------ OctetStringTemplate -------------------------------------------

/// The template for decoding an OCTET STRING.
#[derive(Clone, Copy, Debug, Default)]
pub struct OctetStringTemplate;

impl Template for OctetStringTemplate {
    fn type_name(&self) -> &'static str {
        "OCTET STRING"
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == Tag::OCTET_STRING
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(Tag::OCTET_STRING, source)
    }

    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError> {
        let res = (|| -> Result<OctetString, DecodeError> {
            let header = source.take_header()?;
            header.validate(implicit, Form::Primitive)?;
            let len = header.definite_length()?;
            Ok(OctetString(source.take_bytes(len)?))
        })();
        res.map(Value::OctetString)
            .map_err(|err| err.nested(self.type_name()))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::decode_slice;

    #[test]
    fn roundtrip() {
        let os = OctetString::from_slice(b"\x01\x02\x03");
        assert_eq!(os.to_vec(), b"\x04\x03\x01\x02\x03");
        let value = decode_slice(&OctetStringTemplate, &os.to_vec())
            .unwrap();
        assert_eq!(value.as_octet_string(), Some(&os));
    }

    #[test]
    fn empty() {
        let os = OctetString::default();
        assert_eq!(os.to_vec(), b"\x04\x00");
        assert!(decode_slice(&OctetStringTemplate, b"\x04\x00").is_ok());
    }

    #[test]
    fn truncated_content() {
        let err = decode_slice(
            &OctetStringTemplate, b"\x04\x03\x01\x02"
        ).unwrap_err();
        assert!(err.is_truncated());
    }
}
