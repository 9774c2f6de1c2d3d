//! The byte-counting input source.
//!
//! This is a private module. Its public items are re-exported by the
//! parent module.

use std::io;
use bytes::Bytes;
use crate::header::Header;
use super::error::DecodeError;


//------------ Source --------------------------------------------------------

/// A byte-counting wrapper around an input stream.
///
/// Decoding proceeds as a single forward pass over a blocking stream; the
/// source keeps count of every octet handed out so that templates for
/// constructed values can verify that their children consumed exactly the
/// number of content octets the header declared, without ever buffering
/// the whole value.
///
/// In addition, the source supports looking ahead by exactly one header.
/// A header obtained through [`peek_header`][Self::peek_header] is parsed
/// from the stream but not charged to the consumed count until it is
/// claimed via [`take_header`][Self::take_header]. This is what makes the
/// non-exceptional tag lookahead for OPTIONAL fields and CHOICE branch
/// selection possible.
///
/// A source is owned exclusively by the decode call that created it; it
/// is not shared and not re-entered.
pub struct Source<'a> {
    /// The underlying stream.
    reader: &'a mut dyn io::Read,

    /// The number of octets read from the stream so far.
    ///
    /// This includes the octets of a header sitting in `ahead`.
    count: u64,

    /// A single octet put back by a failed boundary probe.
    pushback: Option<u8>,

    /// A header that has been parsed but not yet claimed.
    ahead: Option<Header>,
}

impl<'a> Source<'a> {
    /// Creates a new source reading from the given stream.
    pub fn new(reader: &'a mut dyn io::Read) -> Self {
        Source { reader, count: 0, pushback: None, ahead: None }
    }

    /// Returns the number of octets consumed so far.
    ///
    /// A header that has merely been peeked at does not count as
    /// consumed.
    pub fn consumed(&self) -> u64 {
        match self.ahead {
            Some(header) => self.count - header.raw_len() as u64,
            None => self.count,
        }
    }

    /// Takes a single octet from the source.
    pub fn take_u8(&mut self) -> Result<u8, DecodeError> {
        match self.take_u8_opt()? {
            Some(octet) => Ok(octet),
            None => Err(DecodeError::truncated()),
        }
    }

    /// Takes a single octet, returning `None` on a clean end of stream.
    fn take_u8_opt(&mut self) -> Result<Option<u8>, DecodeError> {
        debug_assert!(self.ahead.is_none());
        if let Some(octet) = self.pushback.take() {
            self.count += 1;
            return Ok(Some(octet))
        }
        let mut buf = [0u8];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.count += 1;
                    return Ok(Some(buf[0]))
                }
                Err(ref err)
                    if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Puts a single octet back into the source.
    ///
    /// Only ever used to undo the probe octet of a boundary check.
    fn unread(&mut self, octet: u8) {
        debug_assert!(self.pushback.is_none());
        self.count -= 1;
        self.pushback = Some(octet);
    }

    /// Fills the given buffer completely from the source.
    pub fn take_exact(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        debug_assert!(self.ahead.is_none());
        let mut done = 0;
        if let Some(octet) = self.pushback.take() {
            if buf.is_empty() {
                self.pushback = Some(octet);
                return Ok(())
            }
            buf[0] = octet;
            done = 1;
        }
        while done < buf.len() {
            match self.reader.read(&mut buf[done..]) {
                Ok(0) => {
                    self.count += done as u64;
                    xerr!(return Err(DecodeError::truncated()));
                }
                Ok(n) => done += n,
                Err(ref err)
                    if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    self.count += done as u64;
                    return Err(err.into())
                }
            }
        }
        self.count += done as u64;
        Ok(())
    }

    /// Takes exactly `len` octets from the source.
    ///
    /// The octets are read in bounded chunks so a hostile length octet
    /// cannot trigger a huge upfront allocation.
    pub fn take_bytes(&mut self, len: usize) -> Result<Bytes, DecodeError> {
        const CHUNK: usize = 0x1_0000;
        let mut data = Vec::with_capacity(len.min(CHUNK));
        while data.len() < len {
            let step = (len - data.len()).min(CHUNK);
            let start = data.len();
            data.resize(start + step, 0);
            self.take_exact(&mut data[start..])?;
        }
        Ok(data.into())
    }

    /// Looks at the next header without consuming it.
    ///
    /// Fails with a truncated error if the stream ends before the header.
    pub fn peek_header(&mut self) -> Result<Header, DecodeError> {
        match self.peek_header_opt()? {
            Some(header) => Ok(header),
            None => Err(DecodeError::truncated()),
        }
    }

    /// Looks at the next header without consuming it.
    ///
    /// Returns `None` if the stream ends cleanly right at the value
    /// boundary, which is how callers distinguish the normal end of a
    /// multi-value stream from a value cut short.
    pub fn peek_header_opt(
        &mut self,
    ) -> Result<Option<Header>, DecodeError> {
        if let Some(header) = self.ahead {
            return Ok(Some(header))
        }
        let first = match self.take_u8_opt()? {
            Some(octet) => octet,
            None => return Ok(None),
        };
        self.unread(first);
        let header = Header::take_from(self)?;
        self.ahead = Some(header);
        Ok(Some(header))
    }

    /// Takes the next header from the source.
    pub fn take_header(&mut self) -> Result<Header, DecodeError> {
        if let Some(header) = self.ahead.take() {
            return Ok(header)
        }
        Header::take_from(self)
    }

    /// Takes the next header, returning `None` on a clean end of stream.
    pub fn take_header_opt(
        &mut self,
    ) -> Result<Option<Header>, DecodeError> {
        let res = self.peek_header_opt()?;
        self.ahead = None;
        Ok(res)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::header::Form;
    use crate::length::Length;
    use crate::tag::Tag;

    #[test]
    fn counting() {
        let mut data: &[u8] = b"\x02\x01\x05";
        let mut source = Source::new(&mut data);
        assert_eq!(source.consumed(), 0);
        let header = source.take_header().unwrap();
        assert_eq!(header.tag(), Tag::INTEGER);
        assert_eq!(source.consumed(), 2);
        assert_eq!(source.take_u8().unwrap(), 5);
        assert_eq!(source.consumed(), 3);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut data: &[u8] = b"\x01\x01\xff";
        let mut source = Source::new(&mut data);
        let peeked = source.peek_header().unwrap();
        assert_eq!(peeked.tag(), Tag::BOOLEAN);
        assert_eq!(peeked.form(), Form::Primitive);
        assert_eq!(peeked.length(), Length::Definite(1));
        assert_eq!(source.consumed(), 0);

        // Peeking again returns the cached header.
        assert_eq!(source.peek_header().unwrap(), peeked);
        assert_eq!(source.consumed(), 0);

        assert_eq!(source.take_header().unwrap(), peeked);
        assert_eq!(source.consumed(), 2);
    }

    #[test]
    fn clean_end_of_stream() {
        let mut data: &[u8] = b"";
        let mut source = Source::new(&mut data);
        assert!(source.peek_header_opt().unwrap().is_none());
        assert!(source.take_header().is_err());
    }

    #[test]
    fn truncated_header_is_an_error() {
        // A length octet announcing more octets than there are.
        let mut data: &[u8] = b"\x02\x82";
        let mut source = Source::new(&mut data);
        let err = source.peek_header_opt().unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn take_bytes_truncated() {
        let mut data: &[u8] = b"\x01\x02";
        let mut source = Source::new(&mut data);
        assert!(source.take_bytes(3).is_err());
    }
}
