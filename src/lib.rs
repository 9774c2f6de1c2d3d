//! Template-driven handling of data in Basic Encoding Rules.
//!
//! This crate decodes and encodes data encoded in BER, the Basic
//! Encoding Rules of ASN.1, as well as its DER subset. It follows a
//! template model: a [`Template`][decode::Template] describes the
//! expected structure of a message and drives decoding from any
//! [`std::io::Read`], producing a tree of [`Value`]s. Each value type
//! implements [`Encode`][encode::Encode] and writes the DER form of
//! itself to any [`std::io::Write`].
//!
//! ```
//! use bertlv::{Boolean, Integer, Sequence, SequenceTemplate};
//! use bertlv::{BooleanTemplate, IntegerTemplate};
//! use bertlv::decode::decode_slice;
//! use bertlv::encode::Encode;
//!
//! let mut seq = Sequence::new();
//! seq.append(Boolean::new(true));
//! seq.append(Integer::from(5i64));
//! let data = seq.to_vec();
//!
//! let template = SequenceTemplate::new()
//!     .add(BooleanTemplate)
//!     .add(IntegerTemplate);
//! let value = decode_slice(&template, &data).unwrap();
//! assert_eq!(value.as_sequence(), Some(&seq));
//! ```
//!
//! Decoding is a strict single pass over the input. It never reads
//! ahead by more than one header, so a value can be taken off a stream
//! that stays open afterwards. Errors carry a breadcrumb trail of the
//! nested type names leading to the failure.

pub use self::any::{Any, AnyTemplate};
pub use self::construct::{
    Element, OfTemplate, Sequence, SequenceTemplate, Set, SetTemplate,
};
pub use self::header::{Form, Header};
pub use self::length::Length;
pub use self::oid::{Oid, OidTemplate};
pub use self::primitive::{
    Boolean, BooleanTemplate, Enumerated, EnumeratedTemplate,
    Integer, IntegerTemplate, Null, NullTemplate,
};
pub use self::string::{
    BitString, BitStringTemplate, CharSetError, CharacterString,
    OctetString, OctetStringTemplate, StringKind, StringTemplate,
};
pub use self::tag::{Class, Tag};
pub use self::time::{
    GeneralizedTime, GeneralizedTimeTemplate, UtcTime, UtcTimeTemplate,
};
pub use self::value::Value;
pub use self::wrap::{Choice, ChoiceTemplate, Explicit, ExplicitTemplate};

#[macro_use] pub mod debug;

pub mod decode;
pub mod encode;

pub mod any;
pub mod construct;
pub mod header;
pub mod oid;
pub mod primitive;
pub mod string;
pub mod tag;
pub mod time;
pub mod value;
pub mod wrap;

mod length;
