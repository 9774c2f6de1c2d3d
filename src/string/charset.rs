//! Character sets of the restricted string types.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{error, fmt};
use std::char::{decode_utf16, from_u32};
use crate::tag::Tag;

/// The character substituted for code points we cannot represent.
const REPLACEMENT: char = '\u{fffd}';


//------------ StringKind ----------------------------------------------------

/// The character set of a character string value.
///
/// Every ASN.1 string type pairs a fixed universal tag with a converter
/// between content octets and characters. The kind is selected when a
/// [`CharacterString`][super::CharacterString] is constructed and drives
/// both conversion directions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StringKind {
    /// PrintableString: a restricted subset of ASCII.
    Printable,

    /// IA5String: all of ASCII.
    Ia5,

    /// TeletexString: octets mapped directly to the first 256 code
    /// points.
    Teletex,

    /// UTF8String: UTF-8 encoded text.
    Utf8,

    /// BMPString: big-endian UTF-16 code units.
    Bmp,

    /// UniversalString: big-endian UCS-4 code points.
    Universal,
}

impl StringKind {
    /// Returns the universal tag of this string type.
    pub fn tag(self) -> Tag {
        match self {
            StringKind::Printable => Tag::PRINTABLE_STRING,
            StringKind::Ia5 => Tag::IA5_STRING,
            StringKind::Teletex => Tag::TELETEX_STRING,
            StringKind::Utf8 => Tag::UTF8_STRING,
            StringKind::Bmp => Tag::BMP_STRING,
            StringKind::Universal => Tag::UNIVERSAL_STRING,
        }
    }

    /// Returns the type name used in error messages.
    pub fn type_name(self) -> &'static str {
        match self {
            StringKind::Printable => "PrintableString",
            StringKind::Ia5 => "IA5String",
            StringKind::Teletex => "TeletexString",
            StringKind::Utf8 => "UTF8String",
            StringKind::Bmp => "BMPString",
            StringKind::Universal => "UniversalString",
        }
    }

    /// Converts content octets into characters.
    pub fn decode_content(
        self,
        data: &[u8],
    ) -> Result<String, CharSetError> {
        match self {
            StringKind::Printable => {
                if data.iter().any(|&octet| !is_printable(octet)) {
                    return Err(CharSetError(
                        "disallowed character in PrintableString"
                    ))
                }
                Ok(data.iter().map(|&octet| char::from(octet)).collect())
            }
            StringKind::Ia5 => {
                if !data.iter().all(u8::is_ascii) {
                    return Err(CharSetError(
                        "non-ASCII octet in IA5String"
                    ))
                }
                Ok(data.iter().map(|&octet| char::from(octet)).collect())
            }
            StringKind::Teletex => {
                Ok(data.iter().map(|&octet| char::from(octet)).collect())
            }
            StringKind::Utf8 => {
                match std::str::from_utf8(data) {
                    Ok(text) => Ok(text.into()),
                    Err(_) => Err(CharSetError("invalid UTF-8")),
                }
            }
            StringKind::Bmp => {
                if data.len() % 2 != 0 {
                    return Err(CharSetError("odd-length BMPString"))
                }
                let units = data.chunks(2).map(|pair| {
                    u16::from_be_bytes([pair[0], pair[1]])
                });
                Ok(decode_utf16(units).map(|unit| {
                    unit.unwrap_or(REPLACEMENT)
                }).collect())
            }
            StringKind::Universal => {
                if data.len() % 4 != 0 {
                    return Err(CharSetError(
                        "UniversalString length not a multiple of four"
                    ))
                }
                Ok(data.chunks(4).map(|quad| {
                    let value = u32::from_be_bytes([
                        quad[0], quad[1], quad[2], quad[3],
                    ]);
                    // Surrogate-range and out-of-range code points have
                    // no representation; substitute rather than fail.
                    from_u32(value).unwrap_or(REPLACEMENT)
                }).collect())
            }
        }
    }

    /// Converts characters into content octets.
    pub fn encode_str(self, text: &str) -> Result<Vec<u8>, CharSetError> {
        match self {
            StringKind::Printable => {
                if !text.bytes().all(is_printable) || !text.is_ascii() {
                    return Err(CharSetError(
                        "disallowed character for PrintableString"
                    ))
                }
                Ok(text.as_bytes().into())
            }
            StringKind::Ia5 => {
                if !text.is_ascii() {
                    return Err(CharSetError(
                        "non-ASCII character for IA5String"
                    ))
                }
                Ok(text.as_bytes().into())
            }
            StringKind::Teletex => {
                text.chars().map(|ch| {
                    if (ch as u32) < 0x100 {
                        Ok(ch as u8)
                    } else {
                        Err(CharSetError(
                            "invalid character for TeletexString"
                        ))
                    }
                }).collect()
            }
            StringKind::Utf8 => Ok(text.as_bytes().into()),
            StringKind::Bmp => {
                let mut data = Vec::with_capacity(text.len() * 2);
                for unit in text.encode_utf16() {
                    data.extend_from_slice(&unit.to_be_bytes());
                }
                Ok(data)
            }
            StringKind::Universal => {
                let mut data = Vec::with_capacity(text.len() * 4);
                for ch in text.chars() {
                    data.extend_from_slice(&(ch as u32).to_be_bytes());
                }
                Ok(data)
            }
        }
    }
}

/// Returns whether an octet is in the PrintableString alphabet.
///
/// That alphabet is letters, digits, space, and the punctuation
/// `' ( ) + , - . / : = ?`.
fn is_printable(octet: u8) -> bool {
    octet.is_ascii_alphanumeric()
        || octet == b' ' || octet == b'\'' || octet == b'(' || octet == b')'
        || octet == b'+' || octet == b',' || octet == b'-' || octet == b'.'
        || octet == b'/' || octet == b':' || octet == b'=' || octet == b'?'
}


//------------ CharSetError --------------------------------------------------

/// A character could not be converted for a string type.
#[derive(Clone, Copy, Debug)]
pub struct CharSetError(pub(crate) &'static str);

impl fmt::Display for CharSetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl error::Error for CharSetError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn printable_alphabet() {
        assert!(StringKind::Printable.encode_str("Test User 1?").is_ok());
        assert!(StringKind::Printable.encode_str("not@printable").is_err());
        assert!(
            StringKind::Printable.decode_content(b"under_score").is_err()
        );
    }

    #[test]
    fn teletex_range() {
        assert_eq!(
            StringKind::Teletex.encode_str("caf\u{e9}").unwrap(),
            b"caf\xe9"
        );
        assert!(StringKind::Teletex.encode_str("\u{100}").is_err());
        assert_eq!(
            StringKind::Teletex.decode_content(b"caf\xe9").unwrap(),
            "caf\u{e9}"
        );
    }

    #[test]
    fn bmp_utf16() {
        assert_eq!(
            StringKind::Bmp.encode_str("Ab").unwrap(),
            b"\x00\x41\x00\x62"
        );
        // Astral characters become surrogate pairs.
        assert_eq!(
            StringKind::Bmp.encode_str("\u{10000}").unwrap(),
            b"\xd8\x00\xdc\x00"
        );
        assert_eq!(
            StringKind::Bmp.decode_content(b"\xd8\x00\xdc\x00").unwrap(),
            "\u{10000}"
        );
        // A lone surrogate half becomes the replacement character.
        assert_eq!(
            StringKind::Bmp.decode_content(b"\xd8\x00").unwrap(),
            "\u{fffd}"
        );
        assert!(StringKind::Bmp.decode_content(b"\x00").is_err());
    }

    #[test]
    fn universal_ucs4() {
        assert_eq!(
            StringKind::Universal.encode_str("A").unwrap(),
            b"\x00\x00\x00\x41"
        );
        assert_eq!(
            StringKind::Universal.encode_str("\u{10000}").unwrap(),
            b"\x00\x01\x00\x00"
        );
        assert_eq!(
            StringKind::Universal
                .decode_content(b"\x00\x01\x00\x00").unwrap(),
            "\u{10000}"
        );
        // Out of range for both UCS-4-as-Unicode and UTF-16.
        assert_eq!(
            StringKind::Universal
                .decode_content(b"\x00\x11\x00\x00").unwrap(),
            "\u{fffd}"
        );
        assert!(StringKind::Universal.decode_content(b"\x00\x00").is_err());
    }
}
