//! The ASN.1 time types.
//!
//! Both [`UtcTime`] and [`GeneralizedTime`] carry an instant as a
//! [`chrono::DateTime<Utc>`]. Decoding accepts the full BER repertoire
//! of zone designators while encoding always produces the fixed-width
//! GMT form ending in `Z`.

use std::io;
use chrono::{
    DateTime, Datelike, FixedOffset, Local, LocalResult, TimeZone, Utc
};
use crate::decode::{DecodeError, Source, Template};
use crate::encode::Encode;
use crate::header::Form;
use crate::tag::Tag;
use crate::value::Value;


//------------ UtcTime -------------------------------------------------------

/// A UTCTime: an instant with a two-digit year.
///
/// The two-digit year covers 1970 through 2069: on decode, years below
/// 70 land in the 21st century and the rest in the 20th. Values outside
/// that window cannot be represented and must use
/// [`GeneralizedTime`] instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UtcTime(DateTime<Utc>);

impl UtcTime {
    /// Creates a value from an instant.
    ///
    /// # Panics
    ///
    /// Panics if the year is outside 1970 through 2069, the range the
    /// two-digit encoding can carry.
    pub fn new(time: DateTime<Utc>) -> Self {
        assert!(
            (1970..=2069).contains(&time.year()),
            "UTCTime year outside 1970..=2069"
        );
        UtcTime(time)
    }

    /// Returns the instant.
    pub fn to_date_time(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for UtcTime {
    fn from(time: DateTime<Utc>) -> Self {
        UtcTime::new(time)
    }
}

impl Encode for UtcTime {
    fn tag(&self) -> Tag {
        Tag::UTC_TIME
    }

    fn content_len(&self) -> usize {
        13
    }

    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        write!(target, "{}", self.0.format("%y%m%d%H%M%SZ"))
    }
}


//------------ GeneralizedTime -----------------------------------------------

/// A GeneralizedTime: an instant with a four-digit year.
///
/// Fractional seconds in the encoded form are accepted but dropped. An
/// encoded value without a zone designator is interpreted in the local
/// time zone of the decoding host, which is what the standard demands
/// even if it makes the result depend on where it is decoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GeneralizedTime(DateTime<Utc>);

impl GeneralizedTime {
    /// Creates a value from an instant.
    ///
    /// # Panics
    ///
    /// Panics if the year is outside 0 through 9999, the range the
    /// four-digit encoding can carry.
    pub fn new(time: DateTime<Utc>) -> Self {
        assert!(
            (0..=9999).contains(&time.year()),
            "GeneralizedTime year outside 0..=9999"
        );
        GeneralizedTime(time)
    }

    /// Returns the instant.
    pub fn to_date_time(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for GeneralizedTime {
    fn from(time: DateTime<Utc>) -> Self {
        GeneralizedTime::new(time)
    }
}

impl Encode for GeneralizedTime {
    fn tag(&self) -> Tag {
        Tag::GENERALIZED_TIME
    }

    fn content_len(&self) -> usize {
        15
    }

    fn write_content(
        &self,
        target: &mut dyn io::Write,
    ) -> Result<(), io::Error> {
        write!(target, "{}", self.0.format("%Y%m%d%H%M%SZ"))
    }
}


//------------ TimeParser ----------------------------------------------------

/// A positional parser over the ASCII content of a time value.
struct TimeParser<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> TimeParser<'a> {
    fn new(data: &'a [u8]) -> Self {
        TimeParser { data, pos: 0 }
    }

    /// Reads `n` decimal digits as a number.
    fn digits(&mut self, n: usize) -> Result<u32, DecodeError> {
        if self.pos + n > self.data.len() {
            xerr!(return Err(DecodeError::value("time value too short")));
        }
        let mut res = 0;
        for _ in 0..n {
            let octet = self.data[self.pos];
            if !octet.is_ascii_digit() {
                xerr!(return Err(DecodeError::value(
                    "invalid digit in time value"
                )));
            }
            res = res * 10 + u32::from(octet - b'0');
            self.pos += 1;
        }
        Ok(res)
    }

    /// Reads `n` digits and checks they are within an inclusive range.
    fn digits_in(
        &mut self,
        n: usize,
        low: u32,
        high: u32,
        what: &'static str,
    ) -> Result<u32, DecodeError> {
        let res = self.digits(n)?;
        if res < low || res > high {
            xerr!(return Err(DecodeError::value(what)));
        }
        Ok(res)
    }

    /// Returns the next octet without consuming it.
    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Parses everything after the year.
    ///
    /// For generalized time, fractional seconds are skipped. Returns an
    /// error if anything follows the zone designator.
    fn finish(
        mut self,
        year: i32,
        generalized: bool,
    ) -> Result<DateTime<Utc>, DecodeError> {
        let month = self.digits_in(2, 1, 12, "invalid month")?;
        let day = self.digits_in(2, 1, 31, "invalid day")?;
        let hour = self.digits_in(2, 0, 23, "invalid hour")?;
        let minute = self.digits_in(2, 0, 59, "invalid minute")?;
        let second = match self.peek() {
            Some(octet) if octet.is_ascii_digit() => {
                self.digits_in(2, 0, 59, "invalid second")?
            }
            _ => 0,
        };

        if generalized {
            // Skip fractional seconds: a period or comma followed by
            // at least one digit.
            if matches!(self.peek(), Some(b'.') | Some(b',')) {
                self.pos += 1;
                let mut any = false;
                while let Some(octet) = self.peek() {
                    if !octet.is_ascii_digit() {
                        break
                    }
                    self.pos += 1;
                    any = true;
                }
                if !any {
                    xerr!(return Err(DecodeError::value(
                        "empty fractional seconds"
                    )));
                }
            }
        }

        let offset = match self.peek() {
            Some(b'Z') => {
                self.pos += 1;
                Some(0)
            }
            Some(sign @ (b'+' | b'-')) => {
                self.pos += 1;
                let hours = self.digits_in(
                    2, 0, 23, "invalid zone hour offset"
                )?;
                let minutes = self.digits_in(
                    2, 0, 59, "invalid zone minute offset"
                )?;
                let secs = (hours * 3600 + minutes * 60) as i32;
                Some(if sign == b'-' { -secs } else { secs })
            }
            Some(_) => {
                xerr!(return Err(DecodeError::value(
                    "invalid zone designator"
                )));
            }
            None => None,
        };
        if self.pos != self.data.len() {
            xerr!(return Err(DecodeError::value(
                "trailing characters in time value"
            )));
        }

        let res = match offset {
            Some(secs) => {
                let zone = match FixedOffset::east_opt(secs) {
                    Some(zone) => zone,
                    None => {
                        xerr!(return Err(DecodeError::value(
                            "invalid zone offset"
                        )));
                    }
                };
                zone.with_ymd_and_hms(
                    year, month, day, hour, minute, second
                ).map(|time| time.with_timezone(&Utc))
            }
            None => {
                if !generalized {
                    // UTCTime has to say what zone it is in.
                    xerr!(return Err(DecodeError::value(
                        "missing zone designator"
                    )));
                }
                // Without a zone, the value is in local time.
                Local.with_ymd_and_hms(
                    year, month, day, hour, minute, second
                ).map(|time| time.with_timezone(&Utc))
            }
        };
        match res {
            LocalResult::Single(time) => Ok(time),
            _ => Err(DecodeError::value("invalid calendar date")),
        }
    }
}

/// Parses the content of a UTCTime.
fn parse_utc_content(data: &[u8]) -> Result<DateTime<Utc>, DecodeError> {
    let mut parser = TimeParser::new(data);
    let year = parser.digits(2)? as i32;
    let year = if year < 70 { year + 2000 } else { year + 1900 };
    parser.finish(year, false)
}

/// Parses the content of a GeneralizedTime.
fn parse_generalized_content(
    data: &[u8],
) -> Result<DateTime<Utc>, DecodeError> {
    let mut parser = TimeParser::new(data);
    let year = parser.digits(4)? as i32;
    parser.finish(year, true)
}


//------------ UtcTimeTemplate -----------------------------------------------

/// The template for decoding a UTCTime.
#[derive(Clone, Copy, Debug, Default)]
pub struct UtcTimeTemplate;

impl Template for UtcTimeTemplate {
    fn type_name(&self) -> &'static str {
        "UTCTime"
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == Tag::UTC_TIME
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(Tag::UTC_TIME, source)
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
            let content = source.take_bytes(len)?;
            parse_utc_content(&content)
        })();
        res.map(|time| Value::UtcTime(UtcTime(time)))
            .map_err(|err| err.nested(self.type_name()))
    }
}


//------------ GeneralizedTimeTemplate ---------------------------------------

/// The template for decoding a GeneralizedTime.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeneralizedTimeTemplate;

impl Template for GeneralizedTimeTemplate {
    fn type_name(&self) -> &'static str {
        "GeneralizedTime"
    }

    fn tag_match(&self, tag: Tag) -> bool {
        tag == Tag::GENERALIZED_TIME
    }

    fn decode(&self, source: &mut Source) -> Result<Value, DecodeError> {
        self.decode_implicit(Tag::GENERALIZED_TIME, source)
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
            let content = source.take_bytes(len)?;
            parse_generalized_content(&content)
        })();
        res.map(|time| Value::GeneralizedTime(GeneralizedTime(time)))
            .map_err(|err| err.nested(self.type_name()))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::decode_slice;

    fn utc(data: &[u8]) -> DateTime<Utc> {
        let mut full = vec![0x17, data.len() as u8];
        full.extend_from_slice(data);
        match decode_slice(&UtcTimeTemplate, &full).unwrap() {
            Value::UtcTime(time) => time.to_date_time(),
            _ => unreachable!(),
        }
    }

    fn generalized(data: &[u8]) -> DateTime<Utc> {
        let mut full = vec![0x18, data.len() as u8];
        full.extend_from_slice(data);
        match decode_slice(&GeneralizedTimeTemplate, &full).unwrap() {
            Value::GeneralizedTime(time) => time.to_date_time(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn utc_year_window() {
        assert_eq!(
            utc(b"700101000000Z"),
            Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            utc(b"690101000000Z"),
            Utc.with_ymd_and_hms(2069, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            utc(b"991231235959Z"),
            Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn utc_optional_seconds() {
        assert_eq!(
            utc(b"2503171215Z"),
            Utc.with_ymd_and_hms(2025, 3, 17, 12, 15, 0).unwrap()
        );
    }

    #[test]
    fn utc_offsets() {
        assert_eq!(
            utc(b"250317121500+0200"),
            Utc.with_ymd_and_hms(2025, 3, 17, 10, 15, 0).unwrap()
        );
        assert_eq!(
            utc(b"250317121500-0430"),
            Utc.with_ymd_and_hms(2025, 3, 17, 16, 45, 0).unwrap()
        );
    }

    #[test]
    fn utc_requires_zone() {
        let err = decode_slice(
            &UtcTimeTemplate, b"\x17\x0c250317121500"
        ).unwrap_err();
        assert_eq!(err.to_string(), "UTCTime: missing zone designator");
    }

    #[test]
    fn utc_malformed() {
        assert!(
            decode_slice(&UtcTimeTemplate, b"\x17\x037Z0").is_err()
        );
        // Month out of range.
        assert!(decode_slice(
            &UtcTimeTemplate, b"\x17\x0d251317121500Z"
        ).is_err());
        // Trailing characters after the zone.
        assert!(decode_slice(
            &UtcTimeTemplate, b"\x17\x0e250317121500ZZ"
        ).is_err());
    }

    #[test]
    fn generalized_basic() {
        assert_eq!(
            generalized(b"20250317121530Z"),
            Utc.with_ymd_and_hms(2025, 3, 17, 12, 15, 30).unwrap()
        );
    }

    #[test]
    fn generalized_fraction_skipped() {
        assert_eq!(
            generalized(b"20250317121530.5Z"),
            Utc.with_ymd_and_hms(2025, 3, 17, 12, 15, 30).unwrap()
        );
        assert_eq!(
            generalized(b"20250317121530.12345+0100"),
            Utc.with_ymd_and_hms(2025, 3, 17, 11, 15, 30).unwrap()
        );
        assert_eq!(
            generalized(b"20250317121530,25Z"),
            Utc.with_ymd_and_hms(2025, 3, 17, 12, 15, 30).unwrap()
        );
    }

    #[test]
    fn generalized_fraction_malformed() {
        // Only digits may follow the fraction separator.
        assert!(decode_slice(
            &GeneralizedTimeTemplate, b"\x18\x1220250317121530abcZ"
        ).is_err());
        // The separator needs at least one digit.
        assert!(decode_slice(
            &GeneralizedTimeTemplate, b"\x18\x1020250317121530.Z"
        ).is_err());
    }

    #[test]
    #[should_panic(expected = "UTCTime year")]
    fn utc_year_out_of_window() {
        UtcTime::new(Utc.with_ymd_and_hms(2070, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    #[should_panic(expected = "GeneralizedTime year")]
    fn generalized_year_out_of_range() {
        GeneralizedTime::new(
            Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn encode_fixed_width() {
        let time = Utc.with_ymd_and_hms(2025, 3, 17, 12, 15, 30).unwrap();
        assert_eq!(
            UtcTime::new(time).to_vec(),
            b"\x17\x0d250317121530Z"
        );
        assert_eq!(
            GeneralizedTime::new(time).to_vec(),
            b"\x18\x0f20250317121530Z"
        );
    }

    #[test]
    fn roundtrip() {
        let time = Utc.with_ymd_and_hms(1987, 7, 4, 23, 59, 59).unwrap();
        assert_eq!(utc(b"870704235959Z"), time);
        assert_eq!(
            generalized(&GeneralizedTime::new(time).to_vec()[2..]),
            time
        );
    }
}
