//! BER encoded bit strings.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::io;
use bytes::Bytes;
use crate::decode::{DecodeError, Source, Template};
use crate::encode::Encode;
use crate::header::Form;
use crate::tag::Tag;
use crate::value::Value;


//------------ BitString -----------------------------------------------------

/// A BIT STRING: a sequence of bits that need not fill whole octets.
///
/// The first content octet gives the number of unused bits in the last
/// octet, 0 to 7; the remaining content octets carry the bits with the
/// first bit in the most significant position. Only the primitive
/// encoding is supported.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitString {
    /// The number of unused bits in the last octet.
    unused: u8,

    /// The octets carrying the bits.
    bits: Bytes,
}

impl BitString {
    /// Creates a new bit string.
    ///
    /// # Panics
    ///
    /// Panics if `unused` is larger than 7 or if it is non-zero for an
    /// empty bit string.
    pub fn new(unused: u8, bits: Bytes) -> Self {
        assert!(unused < 8);
        assert!(unused == 0 || !bits.is_empty());
        BitString { unused, bits }
    }

    /// Returns the number of unused bits in the last octet.
    pub fn unused(&self) -> u8 {
        self.unused
    }

    /// Returns the number of bits in the bit string.
    pub fn bit_len(&self) -> usize {
        self.bits.len() * 8 - self.unused as usize
    }

    /// Returns the value of the given bit.
    ///
    /// Bits past the end of the string are false.
    pub fn bit(&self, bit: usize) -> bool {
        if bit >= self.bit_len() {
            return false
        }
        self.bits[bit >> 3] & (0x80 >> (bit & 7)) != 0
    }

    /// Returns the octets carrying the bits.
    pub fn octets(&self) -> &[u8] {
        &self.bits
    }
}

impl Encode for BitString {
    fn tag(&self) -> Tag {
        Tag::BIT_STRING
    }

    fn content_len(&self) -> usize {
        self.bits.len() + 1
    }

    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        target.write_all(&[self.unused])?;
        target.write_all(&self.bits)
    }
}


//------------ BitStringTemplate ---------------------------------------------

/// The template for decoding a BIT STRING.
#[derive(Clone, Copy, Debug, Default)]
pub struct BitStringTemplate;

impl Template for BitStringTemplate {
    fn type_name(&self) -> &'static str {
        "BIT STRING"
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == Tag::BIT_STRING
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(Tag::BIT_STRING, source)
    }

    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError> {
        let res = (|| {
            let header = source.take_header()?;
            header.validate(implicit, Form::Primitive)?;
            let len = header.definite_length()?;
            if len == 0 {
                xerr!(return Err(DecodeError::value(
                    "missing unused bit count"
                )));
            }
            let unused = source.take_u8()?;
            if unused > 7 {
                xerr!(return Err(DecodeError::value(
                    "invalid unused bit count"
                )));
            }
            let bits = source.take_bytes(len - 1)?;
            if bits.is_empty() && unused != 0 {
                xerr!(return Err(DecodeError::value(
                    "unused bits in empty BIT STRING"
                )));
            }
            Ok(BitString { unused, bits })
        })();
        res.map(Value::BitString)
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
        let bs = BitString::new(4, Bytes::from_static(b"\x6e\x5d\xc0"));
        assert_eq!(bs.to_vec(), b"\x03\x04\x04\x6e\x5d\xc0");
        assert_eq!(bs.bit_len(), 20);
        let value = decode_slice(&BitStringTemplate, &bs.to_vec()).unwrap();
        assert_eq!(value.as_bit_string(), Some(&bs));
    }

    #[test]
    fn bit_access() {
        let bs = BitString::new(4, Bytes::from_static(b"\x6e\x5d\xc0"));
        assert!(!bs.bit(0));
        assert!(bs.bit(1));
        assert!(bs.bit(17));
        assert!(!bs.bit(19));
        assert!(!bs.bit(20));
        assert!(!bs.bit(1000));
    }

    #[test]
    fn empty() {
        let bs = BitString::new(0, Bytes::new());
        assert_eq!(bs.to_vec(), b"\x03\x01\x00");
        assert!(decode_slice(&BitStringTemplate, b"\x03\x01\x00").is_ok());
    }

    #[test]
    fn malformed() {
        // Missing the unused bit count octet.
        assert!(decode_slice(&BitStringTemplate, b"\x03\x00").is_err());
        // Unused bit count out of range.
        assert!(
            decode_slice(&BitStringTemplate, b"\x03\x02\x08\xff").is_err()
        );
        // Unused bits without any content octets.
        assert!(decode_slice(&BitStringTemplate, b"\x03\x01\x04").is_err());
    }
}
