//! ASN.1 Object Identifiers.
//!
//! This module contains the [`Oid`] type that implements object
//! identifiers, a construct used by ASN.1 to uniquely identify all sorts
//! of things. The type is also re-exported at the top level.

use std::{fmt, io, str};
use smallvec::SmallVec;
use crate::decode::{DecodeError, Source, Template};
use crate::encode::Encode;
use crate::header::Form;
use crate::tag::Tag;
use crate::value::Value;


//------------ Oid -----------------------------------------------------------

/// An object identifier.
///
/// Object identifiers are globally unique, hierarchical values presented
/// as a sequence of integers separated by dots such as `1.2.840.113549`.
/// This type keeps the sequence of component arcs directly.
///
/// # BER Encoding
///
/// The content octets are a series of sub-identifiers in base 128, most
/// significant digit first, with the top bit of every octet but the last
/// of a sub-identifier set. The first two arcs share a single
/// sub-identifier computed as `arc1 * 40 + arc2`, which is why the first
/// arc is limited to 0, 1, or 2 and, for the first two of those, the
/// second arc to at most 39.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Oid {
    /// The component arcs.
    arcs: SmallVec<[u64; 12]>,
}

impl Oid {
    /// Creates an object identifier from its component arcs.
    ///
    /// Returns `None` if the arcs don't form a valid object identifier:
    /// fewer than two arcs, a first arc other than 0, 1, or 2, a
    /// second arc of 40 or more under a first arc of 0 or 1, or a
    /// second arc under a first arc of 2 so large that the combined
    /// first sub-identifier doesn't fit a `u64`.
    pub fn new(arcs: &[u64]) -> Option<Self> {
        if arcs.len() < 2 || arcs[0] > 2 {
            return None
        }
        if arcs[0] < 2 && arcs[1] >= 40 {
            return None
        }
        if arcs[0] == 2 && arcs[1] > u64::MAX - 80 {
            return None
        }
        Some(Oid { arcs: SmallVec::from_slice(arcs) })
    }

    /// Returns the component arcs.
    pub fn arcs(&self) -> &[u64] {
        &self.arcs
    }

    /// Writes a single sub-identifier in base 128.
    fn write_subident<W: io::Write + ?Sized>(
        mut value: u64,
        target: &mut W,
    ) -> Result<(), io::Error> {
        let mut buf = SmallVec::<[u8; 10]>::new();
        loop {
            buf.push((value & 0x7f) as u8);
            value >>= 7;
            if value == 0 {
                break
            }
        }
        for (i, &octet) in buf.iter().enumerate().rev() {
            target.write_all(
                &[if i == 0 { octet } else { octet | 0x80 }]
            )?;
        }
        Ok(())
    }

    /// Returns the encoded length of a single sub-identifier.
    fn subident_len(value: u64) -> usize {
        let bits = 64 - value.leading_zeros() as usize;
        if bits == 0 { 1 } else { (bits + 6) / 7 }
    }

    /// Returns the first sub-identifier combining the first two arcs.
    fn first_subident(&self) -> u64 {
        self.arcs[0] * 40 + self.arcs[1]
    }
}


//--- FromStr and Display

impl str::FromStr for Oid {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut arcs = SmallVec::<[u64; 12]>::new();
        for part in s.split('.') {
            arcs.push(
                part.parse::<u64>().map_err(|_| "invalid arc")?
            );
        }
        Oid::new(&arcs).ok_or("invalid object identifier")
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for arc in self.arcs.iter() {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}


//--- Encode

impl Encode for Oid {
    fn tag(&self) -> Tag {
        Tag::OID
    }

    fn content_len(&self) -> usize {
        Self::subident_len(self.first_subident())
            + self.arcs[2..].iter().copied()
                  .map(Self::subident_len).sum::<usize>()
    }

    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        Self::write_subident(self.first_subident(), target)?;
        for &arc in &self.arcs[2..] {
            Self::write_subident(arc, target)?;
        }
        Ok(())
    }
}


//------------ OidTemplate ---------------------------------------------------

/// The template for decoding an OBJECT IDENTIFIER.
#[derive(Clone, Copy, Debug, Default)]
pub struct OidTemplate;

impl OidTemplate {
    /// Parses the content octets into component arcs.
    fn parse_content(data: &[u8]) -> Result<Oid, DecodeError> {
        let mut arcs = SmallVec::<[u64; 12]>::new();
        let mut iter = data.iter().copied();
        let mut first = true;
        loop {
            let mut value = 0u64;
            let mut done = false;
            let mut any = false;
            while let Some(octet) = iter.next() {
                if value > (u64::MAX >> 7) {
                    xerr!(return Err(DecodeError::value(
                        "arc value too large"
                    )));
                }
                value = (value << 7) | u64::from(octet & 0x7f);
                any = true;
                if octet & 0x80 == 0 {
                    done = true;
                    break
                }
            }
            if !any {
                break
            }
            if !done {
                // Continuation bit still set at end of content.
                xerr!(return Err(DecodeError::value(
                    "unterminated arc"
                )));
            }
            if first {
                let (arc1, arc2) = if value < 40 {
                    (0, value)
                } else if value < 80 {
                    (1, value - 40)
                } else {
                    (2, value - 80)
                };
                arcs.push(arc1);
                arcs.push(arc2);
                first = false;
            } else {
                arcs.push(value);
            }
        }
        if arcs.is_empty() {
            xerr!(return Err(DecodeError::value(
                "empty OBJECT IDENTIFIER"
            )));
        }
        Ok(Oid { arcs })
    }
}

impl Template for OidTemplate {
    fn type_name(&self) -> &'static str {
        "OBJECT IDENTIFIER"
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == Tag::OID
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(Tag::OID, source)
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
            let data = source.take_bytes(len)?;
            Self::parse_content(&data)
        })();
        res.map(Value::Oid).map_err(|err| err.nested(self.type_name()))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::decode_slice;

    const RSA_ENCRYPTION: &[u64] = &[1, 2, 840, 113549, 1, 1, 1];
    const RSA_DER: &[u8] =
        b"\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01";

    #[test]
    fn encode_rsa_oid() {
        let oid = Oid::new(RSA_ENCRYPTION).unwrap();
        assert_eq!(oid.to_vec(), RSA_DER);
    }

    #[test]
    fn decode_rsa_oid() {
        let value = decode_slice(&OidTemplate, RSA_DER).unwrap();
        assert_eq!(value.as_oid().unwrap().arcs(), RSA_ENCRYPTION);
    }

    #[test]
    fn first_arc_packing() {
        // 2.999 packs to a multi-octet first sub-identifier of 1079.
        let oid = Oid::new(&[2, 999, 3]).unwrap();
        let data = oid.to_vec();
        assert_eq!(data, b"\x06\x03\x88\x37\x03");
        let value = decode_slice(&OidTemplate, &data).unwrap();
        assert_eq!(value.as_oid().unwrap().arcs(), &[2, 999, 3]);
    }

    #[test]
    fn small_oids() {
        for arcs in [&[0u64, 0][..], &[1, 39], &[2, 5], &[0, 39, 1]] {
            let oid = Oid::new(arcs).unwrap();
            let value = decode_slice(&OidTemplate, &oid.to_vec()).unwrap();
            assert_eq!(value.as_oid().unwrap().arcs(), arcs);
        }
    }

    #[test]
    fn invalid_arcs() {
        assert!(Oid::new(&[]).is_none());
        assert!(Oid::new(&[1]).is_none());
        assert!(Oid::new(&[3, 1]).is_none());
        assert!(Oid::new(&[1, 40]).is_none());
        assert!(Oid::new(&[2, 40]).is_some());
    }

    #[test]
    fn second_arc_limit() {
        // The first sub-identifier is arc1 * 40 + arc2 and must fit
        // a u64.
        assert!(Oid::new(&[2, u64::MAX - 10]).is_none());
        let oid = Oid::new(&[2, u64::MAX - 80]).unwrap();
        let value = decode_slice(&OidTemplate, &oid.to_vec()).unwrap();
        assert_eq!(value.as_oid().unwrap().arcs(), &[2, u64::MAX - 80]);
    }

    #[test]
    fn dotted_notation() {
        let oid: Oid = "1.2.840.113549.1.1.1".parse().unwrap();
        assert_eq!(oid.arcs(), RSA_ENCRYPTION);
        assert_eq!(oid.to_string(), "1.2.840.113549.1.1.1");
        assert!("".parse::<Oid>().is_err());
        assert!("1".parse::<Oid>().is_err());
        assert!("1.x".parse::<Oid>().is_err());
    }

    #[test]
    fn unterminated_arc() {
        assert!(decode_slice(&OidTemplate, b"\x06\x02\x2a\x86").is_err());
        assert!(decode_slice(&OidTemplate, b"\x06\x00").is_err());
    }
}
