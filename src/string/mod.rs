//! The various types of ASN.1 strings.
//!
//! ASN.1 has a zoo of string types. The octet and bit strings carry raw
//! data while the restricted character string types carry text in one of
//! several character sets. All of them are represented here by one value
//! type per family: [`OctetString`], [`BitString`], and
//! [`CharacterString`] with its [`StringKind`] selector.

pub use self::bit::{BitString, BitStringTemplate};
pub use self::charset::{CharSetError, StringKind};
pub use self::octet::{OctetString, OctetStringTemplate};

mod bit;
mod charset;
mod octet;

use std::{fmt, io};
use bytes::Bytes;
use crate::decode::{DecodeError, Source, Template};
use crate::encode::Encode;
use crate::header::Form;
use crate::tag::Tag;
use crate::value::Value;


//------------ CharacterString -----------------------------------------------

/// A restricted character string of any of the supported kinds.
///
/// A value pairs its text with the [`StringKind`] that determines the
/// tag and the character set. The content octets are produced when the
/// value is constructed, so a value that exists is always encodable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CharacterString {
    /// The kind of string.
    kind: StringKind,

    /// The text carried by the string.
    text: String,

    /// The converted content octets.
    content: Bytes,
}

impl CharacterString {
    /// Creates a new character string of the given kind.
    ///
    /// Fails if the text contains characters the kind cannot carry.
    pub fn new(
        kind: StringKind,
        text: impl Into<String>,
    ) -> Result<Self, CharSetError> {
        let text = text.into();
        let content = kind.encode_str(&text)?.into();
        Ok(CharacterString { kind, text, content })
    }

    /// Creates a PrintableString.
    pub fn printable(
        text: impl Into<String>,
    ) -> Result<Self, CharSetError> {
        Self::new(StringKind::Printable, text)
    }

    /// Creates an IA5String.
    pub fn ia5(text: impl Into<String>) -> Result<Self, CharSetError> {
        Self::new(StringKind::Ia5, text)
    }

    /// Creates a TeletexString.
    pub fn teletex(text: impl Into<String>) -> Result<Self, CharSetError> {
        Self::new(StringKind::Teletex, text)
    }

    /// Creates a UTF8String.
    pub fn utf8(text: impl Into<String>) -> Self {
        // UTF-8 can carry any Rust string.
        match Self::new(StringKind::Utf8, text) {
            Ok(res) => res,
            Err(_) => unreachable!(),
        }
    }

    /// Creates a BMPString.
    pub fn bmp(text: impl Into<String>) -> Self {
        // UTF-16 can carry any Rust string.
        match Self::new(StringKind::Bmp, text) {
            Ok(res) => res,
            Err(_) => unreachable!(),
        }
    }

    /// Creates a UniversalString.
    pub fn universal(text: impl Into<String>) -> Self {
        // UCS-4 can carry any Rust string.
        match Self::new(StringKind::Universal, text) {
            Ok(res) => res,
            Err(_) => unreachable!(),
        }
    }

    /// Returns the kind of the string.
    pub fn kind(&self) -> StringKind {
        self.kind
    }

    /// Returns the text of the string.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Converts the value into its text.
    pub fn into_string(self) -> String {
        self.text
    }
}


//--- Display

impl fmt::Display for CharacterString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}


//--- Encode

impl Encode for CharacterString {
    fn tag(&self) -> Tag {
        self.kind.tag()
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
}


//------------ StringTemplate ------------------------------------------------

/// The template for decoding a restricted character string.
///
/// One constant is provided per string kind, e.g.
/// [`StringTemplate::PRINTABLE`].
#[derive(Clone, Copy, Debug)]
pub struct StringTemplate {
    /// The kind of string decoded by this template.
    kind: StringKind,
}

impl StringTemplate {
    /// Decodes PrintableString values.
    pub const PRINTABLE: Self = StringTemplate {
        kind: StringKind::Printable
    };

    /// Decodes IA5String values.
    pub const IA5: Self = StringTemplate { kind: StringKind::Ia5 };

    /// Decodes TeletexString values.
    pub const TELETEX: Self = StringTemplate { kind: StringKind::Teletex };

    /// Decodes UTF8String values.
    pub const UTF8: Self = StringTemplate { kind: StringKind::Utf8 };

    /// Decodes BMPString values.
    pub const BMP: Self = StringTemplate { kind: StringKind::Bmp };

    /// Decodes UniversalString values.
    pub const UNIVERSAL: Self = StringTemplate {
        kind: StringKind::Universal
    };

    /// Creates a template for the given kind.
    pub fn new(kind: StringKind) -> Self {
        StringTemplate { kind }
    }
}

impl Template for StringTemplate {
    fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == self.kind.tag()
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(self.kind.tag(), source)
    }

    fn decode_implicit(
        &self,
        implicit: Tag,
        source: &mut Source,
    ) -> Result<Value, DecodeError> {
        let res = (|| -> Result<CharacterString, DecodeError> {
            let header = source.take_header()?;
            header.validate(implicit, Form::Primitive)?;
            let len = header.definite_length()?;
            let content = source.take_bytes(len)?;
            let text = self.kind.decode_content(&content).map_err(|err| {
                DecodeError::value(err.0)
            })?;
            Ok(CharacterString { kind: self.kind, text, content })
        })();
        res.map(Value::String).map_err(|err| err.nested(self.type_name()))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::decode_slice;

    #[test]
    fn printable_roundtrip() {
        let cs = CharacterString::printable("Test User 1").unwrap();
        assert_eq!(cs.to_vec(), b"\x13\x0bTest User 1");
        let value = decode_slice(
            &StringTemplate::PRINTABLE, &cs.to_vec()
        ).unwrap();
        assert_eq!(value.as_string().unwrap().as_str(), "Test User 1");
    }

    #[test]
    fn printable_rejects() {
        assert!(CharacterString::printable("not;printable").is_err());
        let err = decode_slice(
            &StringTemplate::PRINTABLE, b"\x13\x01_"
        ).unwrap_err();
        assert_eq!(
            err.to_string(),
            "PrintableString: disallowed character in PrintableString"
        );
    }

    #[test]
    fn utf8_roundtrip() {
        let cs = CharacterString::utf8("gr\u{fc}n \u{10000}");
        let data = cs.to_vec();
        assert_eq!(data[0], 0x0c);
        let value = decode_slice(&StringTemplate::UTF8, &data).unwrap();
        assert_eq!(value.as_string(), Some(&cs));
    }

    #[test]
    fn bmp_roundtrip() {
        let cs = CharacterString::bmp("Ab");
        assert_eq!(cs.to_vec(), b"\x1e\x04\x00\x41\x00\x62");
        let value = decode_slice(
            &StringTemplate::BMP, &cs.to_vec()
        ).unwrap();
        assert_eq!(value.as_string().unwrap().as_str(), "Ab");
    }

    #[test]
    fn universal_replacement() {
        // A code point beyond U+10FFFF decodes to the replacement
        // character instead of failing.
        let value = decode_slice(
            &StringTemplate::UNIVERSAL, b"\x1c\x04\x00\x11\x00\x00"
        ).unwrap();
        assert_eq!(value.as_string().unwrap().as_str(), "\u{fffd}");
    }

    #[test]
    fn tag_mismatch() {
        let err = decode_slice(
            &StringTemplate::IA5, b"\x13\x02hi"
        ).unwrap_err();
        assert_eq!(
            err.to_string(),
            "IA5String: expected tag IA5String, found PrintableString"
        );
    }
}
