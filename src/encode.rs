//! Encoding values in DER.
//!
//! Encoding is the mirror image of decoding: a value recursively asks its
//! children to write themselves to an output stream, prefixing the
//! appropriate header itself. The central item of this module is the
//! [`Encode`] trait implemented by every value type of this crate.
//!
//! Output is always canonical DER as far as framing is concerned: definite
//! lengths in minimal form. Note that a value decoded from BER input that
//! used looser framing will therefore not necessarily re-encode to the
//! identical octets.

use std::io;
use crate::header::{Form, Header};
use crate::length::Length;
use crate::tag::Tag;


//------------ Encode --------------------------------------------------------

/// A type that knows how to encode itself as a single TLV.
///
/// Implementing types provide their default tag, their form, and their
/// content octets; the provided methods derive the full encoding from
/// those, including encoding under an implicit substitute tag as used for
/// context-specific tagging inside SEQUENCE elements.
///
/// On failure part way through writing, the target may be left with a
/// truncated prefix. Callers needing atomicity must buffer, e.g. through
/// [`to_vec`][Self::to_vec].
pub trait Encode {
    /// Returns the default tag of the value.
    fn tag(&self) -> Tag;

    /// Returns the encoding form of the value.
    fn form(&self) -> Form {
        Form::Primitive
    }

    /// Returns the number of content octets the value encodes to.
    fn content_len(&self) -> usize;

    /// Writes the bare content octets to the given target.
    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error>;


    //--- Provided methods

    /// Returns the total number of octets of the encoded value.
    fn encoded_len(&self) -> usize {
        self.encoded_len_as(self.tag())
    }

    /// Returns the total encoded length under an implicit substitute tag.
    fn encoded_len_as(&self, implicit: Tag) -> usize {
        let content_len = self.content_len();
        Header::new(
            implicit, self.form(), Length::Definite(content_len)
        ).encoded_len() + content_len
    }

    /// Writes the complete encoded value to the given target.
    fn write_encoded(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        self.write_encoded_as(self.tag(), target)
    }

    /// Writes the value encoded under an implicit substitute tag.
    ///
    /// The substitute tag replaces the value's own tag while keeping its
    /// form and content. This is _implicit_ tagging; for explicit tagging
    /// wrap the value in an [`Explicit`][crate::wrap::Explicit] instead.
    fn write_encoded_as(
        &self,
        implicit: Tag,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        Header::new(
            implicit, self.form(), Length::Definite(self.content_len())
        ).write_encoded(target)?;
        self.write_content(target)
    }

    /// Returns the complete encoded value as a vec.
    fn to_vec(&self) -> Vec<u8> {
        let mut target = Vec::with_capacity(self.encoded_len());
        self.write_encoded(&mut target).expect(
            "writing to a vec failed"
        );
        target
    }
}

impl<'a, T: Encode + ?Sized> Encode for &'a T {
    fn tag(&self) -> Tag {
        (*self).tag()
    }

    fn form(&self) -> Form {
        (*self).form()
    }

    fn content_len(&self) -> usize {
        (*self).content_len()
    }

    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        (*self).write_content(target)
    }

    fn encoded_len(&self) -> usize {
        (*self).encoded_len()
    }

    fn encoded_len_as(&self, implicit: Tag) -> usize {
        (*self).encoded_len_as(implicit)
    }

    fn write_encoded(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        (*self).write_encoded(target)
    }

    fn write_encoded_as(
        &self,
        implicit: Tag,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        (*self).write_encoded_as(implicit, target)
    }
}


//------------ Helpers -------------------------------------------------------

/// Encodes a value into a new vec.
pub fn to_vec<T: Encode + ?Sized>(value: &T) -> Vec<u8> {
    value.to_vec()
}
