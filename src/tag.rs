//! The tag of a BER encoded value.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::{fmt, io};
use crate::decode::{DecodeError, Source};


//------------ Class ---------------------------------------------------------

/// The class of a tag.
///
/// Every ASN.1 tag belongs to one of four classes. The universal class is
/// reserved for the types defined by ASN.1 itself, the other three are
/// available to applications. The class is encoded in the top two bits of
/// the first identifier octet.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    /// The class of the types defined by ASN.1 itself.
    Universal,

    /// The class available for types of a particular application.
    Application,

    /// The class for tags interpreted relative to their enclosing type.
    Context,

    /// The class for private, bilaterally agreed types.
    Private,
}

impl Class {
    /// The bit mask of the class portion of the first identifier octet.
    const MASK: u8 = 0xc0;

    /// Returns the class encoded in the top bits of an identifier octet.
    fn from_octet(octet: u8) -> Self {
        match octet & Self::MASK {
            0x00 => Class::Universal,
            0x40 => Class::Application,
            0x80 => Class::Context,
            _ => Class::Private,
        }
    }

    /// Returns the class bits for the first identifier octet.
    fn to_octet(self) -> u8 {
        match self {
            Class::Universal => 0x00,
            Class::Application => 0x40,
            Class::Context => 0x80,
            Class::Private => 0xc0,
        }
    }
}


//------------ Tag -----------------------------------------------------------

/// The tag of a BER encoded value.
///
/// Each BER encoded value starts with a sequence of one or more octets
/// called the _identifier octets._ They encode the class and number of the
/// value's tag as well as whether the value uses primitive or constructed
/// encoding. The `Tag` type represents the class and number only; the
/// encoding form is kept separately as a [`Form`][crate::header::Form].
///
/// Tags are immutable and compare structurally: two tags are equal if and
/// only if both their class and their number are equal.
///
/// # Limitations
///
/// Tag numbers are limited to the range of `u32`. Identifier octet
/// sequences encoding larger numbers are rejected when decoding.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Tag {
    /// The class of the tag.
    class: Class,

    /// The tag number.
    number: u32,
}

/// # Constants for Often Used Tag Values
///
impl Tag {
    /// The tag marking the end-of-contents octets in indefinite length
    /// values, UNIVERSAL 0.
    pub const END_OF_CONTENTS: Self = Tag::universal(0);

    /// The tag for the BOOLEAN type, UNIVERSAL 1.
    pub const BOOLEAN: Self = Tag::universal(1);

    /// The tag for the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Tag::universal(2);

    /// The tag for the BIT STRING type, UNIVERSAL 3.
    pub const BIT_STRING: Self = Tag::universal(3);

    /// The tag for the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Tag::universal(4);

    /// The tag for the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Tag::universal(5);

    /// The tag for the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Tag::universal(6);

    /// The tag for the ENUMERATED type, UNIVERSAL 10.
    pub const ENUMERATED: Self = Tag::universal(10);

    /// The tag for the UTF8String type, UNIVERSAL 12.
    pub const UTF8_STRING: Self = Tag::universal(12);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Tag::universal(16);

    /// The tag for the SET and SET OF types, UNIVERSAL 17.
    pub const SET: Self = Tag::universal(17);

    /// The tag for the PrintableString type, UNIVERSAL 19.
    pub const PRINTABLE_STRING: Self = Tag::universal(19);

    /// The tag for the TeletexString type, UNIVERSAL 20.
    pub const TELETEX_STRING: Self = Tag::universal(20);

    /// The tag for the IA5String type, UNIVERSAL 22.
    pub const IA5_STRING: Self = Tag::universal(22);

    /// The tag for the UTCTime type, UNIVERSAL 23.
    pub const UTC_TIME: Self = Tag::universal(23);

    /// The tag for the GeneralizedTime type, UNIVERSAL 24.
    pub const GENERALIZED_TIME: Self = Tag::universal(24);

    /// The tag for the UniversalString type, UNIVERSAL 28.
    pub const UNIVERSAL_STRING: Self = Tag::universal(28);

    /// The tag for the BMPString type, UNIVERSAL 30.
    pub const BMP_STRING: Self = Tag::universal(30);

    /// The context specific tag [0].
    pub const CTX_0: Self = Tag::ctx(0);

    /// The context specific tag [1].
    pub const CTX_1: Self = Tag::ctx(1);

    /// The context specific tag [2].
    pub const CTX_2: Self = Tag::ctx(2);

    /// The context specific tag [3].
    pub const CTX_3: Self = Tag::ctx(3);
}

impl Tag {
    /// The lower five bits of the first identifier octet.
    ///
    /// If all of them are set, the tag number follows in subsequent octets
    /// in base 128 with the top bit of every octet but the last set.
    const NUMBER_MASK: u8 = 0x1f;

    /// The continuation bit of the subsequent identifier octets.
    const MORE_MASK: u8 = 0x80;

    /// Creates a new tag from a class and a number.
    pub const fn new(class: Class, number: u32) -> Self {
        Tag { class, number }
    }

    /// Creates a new tag in the universal class with the given number.
    pub const fn universal(number: u32) -> Self {
        Tag::new(Class::Universal, number)
    }

    /// Creates a new tag in the application class with the given number.
    pub const fn application(number: u32) -> Self {
        Tag::new(Class::Application, number)
    }

    /// Creates a new tag in the context specific class.
    pub const fn ctx(number: u32) -> Self {
        Tag::new(Class::Context, number)
    }

    /// Creates a new tag in the private class with the given number.
    pub const fn private(number: u32) -> Self {
        Tag::new(Class::Private, number)
    }

    /// Returns the class of the tag.
    pub fn class(self) -> Class {
        self.class
    }

    /// Returns the number of the tag.
    pub fn number(self) -> u32 {
        self.number
    }

    /// Returns whether this is the end-of-contents marker tag.
    pub fn is_end_of_contents(self) -> bool {
        self == Tag::END_OF_CONTENTS
    }

    /// Takes a tag from the beginning of a source.
    ///
    /// Upon success, returns the tag and whether the identifier octets
    /// announced a constructed value. Fails on truncated input and on tag
    /// numbers beyond the range of `u32`.
    pub fn take_from(
        source: &mut Source,
    ) -> Result<(Self, bool), DecodeError> {
        let first = source.take_u8()?;
        let constructed = first & 0x20 != 0;
        let class = Class::from_octet(first);
        if first & Self::NUMBER_MASK != Self::NUMBER_MASK {
            return Ok((
                Tag::new(class, u32::from(first & Self::NUMBER_MASK)),
                constructed,
            ))
        }

        // High-tag-number form: base 128, big-endian, continuation bit
        // chained until an octet with the top bit clear.
        let mut number = 0u32;
        loop {
            let octet = source.take_u8()?;
            if number > (u32::MAX >> 7) {
                xerr!(return Err(DecodeError::framing(
                    "tag number too large"
                )));
            }
            number = (number << 7) | u32::from(octet & !Self::MORE_MASK);
            if octet & Self::MORE_MASK == 0 {
                return Ok((Tag::new(class, number), constructed))
            }
        }
    }

    /// Returns the number of octets of the encoded form of the tag.
    pub fn encoded_len(self) -> usize {
        if self.number < 0x1f {
            1
        } else if self.number < 0x80 {
            2
        } else if self.number < 0x4000 {
            3
        } else if self.number < 0x20_0000 {
            4
        } else if self.number < 0x1000_0000 {
            5
        } else {
            6
        }
    }

    /// Encodes the tag into a target.
    ///
    /// If `constructed` is `true`, the encoded identifier octets will
    /// announce a value in constructed encoding, primitive otherwise.
    pub fn write_encoded<W: io::Write + ?Sized>(
        self,
        constructed: bool,
        target: &mut W,
    ) -> Result<(), io::Error> {
        let mut first = self.class.to_octet();
        if constructed {
            first |= 0x20;
        }
        if self.number < 0x1f {
            return target.write_all(&[first | self.number as u8])
        }
        let mut buf = [first | Self::NUMBER_MASK, 0, 0, 0, 0, 0];
        let len = self.encoded_len();
        let mut number = self.number;
        for i in (1..len).rev() {
            buf[i] = (number as u8 & !Self::MORE_MASK)
                | if i + 1 == len { 0 } else { Self::MORE_MASK };
            number >>= 7;
        }
        target.write_all(&buf[..len])
    }
}


//--- Display and Debug

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::END_OF_CONTENTS => write!(f, "END-OF-CONTENTS"),
            Tag::BOOLEAN => write!(f, "BOOLEAN"),
            Tag::INTEGER => write!(f, "INTEGER"),
            Tag::BIT_STRING => write!(f, "BIT STRING"),
            Tag::OCTET_STRING => write!(f, "OCTET STRING"),
            Tag::NULL => write!(f, "NULL"),
            Tag::OID => write!(f, "OBJECT IDENTIFIER"),
            Tag::ENUMERATED => write!(f, "ENUMERATED"),
            Tag::UTF8_STRING => write!(f, "UTF8String"),
            Tag::SEQUENCE => write!(f, "SEQUENCE"),
            Tag::SET => write!(f, "SET"),
            Tag::PRINTABLE_STRING => write!(f, "PrintableString"),
            Tag::TELETEX_STRING => write!(f, "TeletexString"),
            Tag::IA5_STRING => write!(f, "IA5String"),
            Tag::UTC_TIME => write!(f, "UTCTime"),
            Tag::GENERALIZED_TIME => write!(f, "GeneralizedTime"),
            Tag::UNIVERSAL_STRING => write!(f, "UniversalString"),
            Tag::BMP_STRING => write!(f, "BMPString"),
            tag => {
                match tag.class {
                    Class::Universal => write!(f, "[UNIVERSAL ")?,
                    Class::Application => write!(f, "[APPLICATION ")?,
                    Class::Context => write!(f, "[")?,
                    Class::Private => write!(f, "[PRIVATE ")?,
                }
                write!(f, "{}]", tag.number)
            }
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn decode(mut data: &[u8]) -> (Tag, bool) {
        let mut source = Source::new(&mut data);
        Tag::take_from(&mut source).unwrap()
    }

    fn encode(tag: Tag, constructed: bool) -> Vec<u8> {
        let mut target = Vec::new();
        tag.write_encoded(constructed, &mut target).unwrap();
        target
    }

    const CLASSES: &[Class] = &[
        Class::Universal, Class::Application, Class::Context, Class::Private,
    ];

    #[test]
    fn low_tag_numbers() {
        for &class in CLASSES {
            for number in 0..0x1f {
                let tag = Tag::new(class, number);
                let data = encode(tag, false);
                assert_eq!(data.len(), 1);
                assert_eq!(decode(&data), (tag, false));
                assert_eq!(tag.encoded_len(), 1);
                assert_eq!(tag.number(), number);
            }
        }
    }

    #[test]
    fn high_tag_numbers() {
        let numbers = [
            0x1fu32, 0x7f, 0x80, 0x3fff, 0x4000, 0x1f_ffff, 0x20_0000,
            u32::MAX,
        ];
        for &class in CLASSES {
            for &number in &numbers {
                let tag = Tag::new(class, number);
                let data = encode(tag, true);
                assert_eq!(data.len(), tag.encoded_len());
                assert_eq!(decode(&data), (tag, true));
            }
        }
    }

    #[test]
    fn constructed_bit() {
        assert_eq!(encode(Tag::SEQUENCE, true), b"\x30");
        assert_eq!(encode(Tag::SEQUENCE, false), b"\x10");
        assert_eq!(encode(Tag::ctx(0), true), b"\xa0");
        assert_eq!(encode(Tag::ctx(0), false), b"\x80");
    }

    #[test]
    fn high_tag_wire_form() {
        // [APPLICATION 31], primitive: 0x5f 0x1f.
        assert_eq!(encode(Tag::application(31), false), b"\x5f\x1f");
        // Context tag 201: 0x9f 0x81 0x49.
        assert_eq!(encode(Tag::ctx(201), false), b"\x9f\x81\x49");
        assert_eq!(decode(b"\x9f\x81\x49"), (Tag::ctx(201), false));
    }

    #[test]
    fn overlong_tag_number() {
        // Five continuation octets push the number past u32::MAX.
        let mut data: &[u8] = b"\x1f\x90\x80\x80\x80\x00";
        let mut source = Source::new(&mut data);
        assert!(Tag::take_from(&mut source).is_err());
    }

    #[test]
    fn truncated_tag() {
        let mut data: &[u8] = b"\x1f\x80";
        let mut source = Source::new(&mut data);
        assert!(Tag::take_from(&mut source).is_err());
    }
}
