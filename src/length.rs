//! The length octets of a BER encoded value.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{fmt, io};
use crate::decode::{DecodeError, Source};


//------------ Length -------------------------------------------------------

/// The length octets of an encoded value.
///
/// A length is either _definite,_ giving the actual number of content
/// octets of the value, or _indefinite,_ in which case the content is
/// delimited by a special end-of-contents marker.
///
/// # BER Encoding
///
/// If the most significant bit of the first length octet is clear, the
/// remaining bits of that octet are the definite length already. Otherwise
/// the remaining bits give the number of octets that follow with the
/// big-endian encoding of the definite length, except that a value of zero
/// means the length is indefinite.
///
/// DER requires the minimal encoding: no long form where the short form
/// would do and no superfluous leading zero octets. Decoding is tolerant
/// of non-minimal BER input; encoding always produces the minimal form.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Length {
    /// A length giving the number of content octets.
    Definite(usize),

    /// A length delimited by an end-of-contents marker.
    Indefinite,
}

impl Length {
    /// The maximum number of octets making up a definite length.
    ///
    /// Anything longer is considered malformed rather than merely huge.
    const MAX_LIMBS: usize = 4;

    /// Returns the definite length or `None` if the length is indefinite.
    pub fn definite(self) -> Option<usize> {
        match self {
            Length::Definite(len) => Some(len),
            Length::Indefinite => None,
        }
    }

    /// Returns whether the length is definite and zero.
    pub fn is_zero(self) -> bool {
        self == Length::Definite(0)
    }

    /// Parses a length from the beginning of a source.
    ///
    /// Returns the length and the number of octets it occupied on the
    /// wire, which for tolerated non-minimal input may exceed the length
    /// of the re-encoded form.
    pub fn take_from(
        source: &mut Source,
    ) -> Result<(Self, usize), DecodeError> {
        let first = source.take_u8()?;
        if first & 0x80 == 0 {
            return Ok((Length::Definite(first as usize), 1))
        }
        let count = (first & 0x7f) as usize;
        if count == 0 {
            return Ok((Length::Indefinite, 1))
        }
        if count == 0x7f {
            // Reserved by X.690 for future extension.
            xerr!(return Err(DecodeError::framing("reserved length octet")));
        }

        // Skip superfluous leading zero octets so we only reject lengths
        // that are genuinely too large, not merely encoded wastefully.
        let mut len = 0usize;
        let mut significant = 0;
        for _ in 0..count {
            let octet = source.take_u8()?;
            if octet == 0 && significant == 0 {
                continue
            }
            significant += 1;
            if significant > Self::MAX_LIMBS {
                xerr!(return Err(DecodeError::framing("excessive length")));
            }
            len = (len << 8) | octet as usize;
        }
        Ok((Length::Definite(len), count + 1))
    }

    /// Returns the number of octets of the minimally encoded length.
    pub fn encoded_len(self) -> usize {
        match self {
            Length::Definite(len) if len < 0x80 => 1,
            Length::Definite(len) => {
                8 - (len as u64).leading_zeros() as usize / 8 + 1
            }
            Length::Indefinite => 1,
        }
    }

    /// Writes the minimally encoded length to the given target.
    pub fn write_encoded<W: io::Write + ?Sized>(
        self,
        target: &mut W,
    ) -> Result<(), io::Error> {
        match self {
            Length::Definite(len) => {
                if len < 0x80 {
                    target.write_all(&[len as u8])
                }
                else {
                    let bytes = (len as u64).to_be_bytes();
                    let skip = (len as u64).leading_zeros() as usize / 8;
                    target.write_all(&[0x80 | (8 - skip) as u8])?;
                    target.write_all(&bytes[skip..])
                }
            }
            Length::Indefinite => target.write_all(&[0x80]),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Length::Definite(len) => write!(f, "{}", len),
            Length::Indefinite => f.write_str("indefinite"),
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn take_from(mut data: &[u8]) -> Result<Length, DecodeError> {
        let mut source = Source::new(&mut data);
        Length::take_from(&mut source).map(|(len, _)| len)
    }

    fn encode(len: Length) -> Vec<u8> {
        let mut target = Vec::new();
        len.write_encoded(&mut target).unwrap();
        assert_eq!(target.len(), len.encoded_len());
        target
    }

    #[test]
    fn decode_short_form() {
        assert_eq!(take_from(b"\x00").unwrap(), Length::Definite(0));
        assert_eq!(take_from(b"\x12").unwrap(), Length::Definite(0x12));
        assert_eq!(take_from(b"\x7f").unwrap(), Length::Definite(0x7f));
    }

    #[test]
    fn decode_long_form() {
        assert_eq!(take_from(b"\x81\xf0").unwrap(), Length::Definite(0xf0));
        assert_eq!(
            take_from(b"\x82\xf0\x0e").unwrap(), Length::Definite(0xf00e)
        );

        // BER tolerates non-minimal encodings.
        assert_eq!(take_from(b"\x81\x00").unwrap(), Length::Definite(0));
        assert_eq!(take_from(b"\x82\x00\x0e").unwrap(), Length::Definite(0x0e));
        assert_eq!(
            take_from(b"\x85\x00\x00\x00\x00\x05").unwrap(),
            Length::Definite(5)
        );
    }

    #[test]
    fn decode_indefinite() {
        assert_eq!(take_from(b"\x80").unwrap(), Length::Indefinite);
    }

    #[test]
    fn decode_malformed() {
        assert!(take_from(b"\xff").is_err());
        assert!(take_from(b"\x85\x01\x00\x00\x00\x00").is_err());
        assert!(take_from(b"\x82\x01").is_err());
    }

    #[test]
    fn encode_minimal() {
        assert_eq!(encode(Length::Definite(0)), b"\x00");
        assert_eq!(encode(Length::Definite(0x12)), b"\x12");
        assert_eq!(encode(Length::Definite(0x7f)), b"\x7f");
        assert_eq!(encode(Length::Definite(0x80)), b"\x81\x80");
        assert_eq!(encode(Length::Definite(0xdead)), b"\x82\xde\xad");
        assert_eq!(encode(Length::Definite(0x01_0000)), b"\x83\x01\x00\x00");
        assert_eq!(encode(Length::Indefinite), b"\x80");
    }
}
