//! Structured dates and their strict textual grammar.
//!
//! A time value taken from a CRL is turned into a [`Date`] by first
//! printing it into its generic textual form and then running that text
//! through a strict parser. The text has to follow exactly this layout:
//!
//! ```txt
//! <Month3> <Day> <Hours>:<Minutes>:<Seconds> <Year> GMT
//! ```
//!
//! for instance `May 30 10:23:42 2018 GMT`. The month is one of the
//! English three-letter abbreviations, all other fields are runs of at
//! least one ASCII digit, and every separator is exactly one character.
//!
//! The parser only checks the ranges of the individual fields. It doesn’t
//! know about calendars, so `Feb 30 00:00:00 2000 GMT` is accepted.

use std::{error, fmt};
use std::ops::RangeInclusive;
use std::str::FromStr;
use bytes::{BufMut, BytesMut};
use log::debug;
use crate::error::CrlError;
use crate::x509::Time;


//------------ Date ----------------------------------------------------------

/// A date and time of day in GMT.
///
/// The all-zero value returned by `Date::default()` is what operations
/// leave in their outputs when they fail.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Date {
    /// The month, 1 to 12.
    pub month: u32,

    /// The day of the month, 1 to 31.
    pub day: u32,

    /// The hours, 0 to 23.
    pub hours: u32,

    /// The minutes, 0 to 59.
    pub minutes: u32,

    /// The seconds, 0 to 59.
    pub seconds: u32,

    /// The year.
    pub year: u32,
}

impl Date {
    /// Parses a date from its textual form.
    ///
    /// The text ends at the first NUL byte or at the end of the slice,
    /// whichever comes first. Nothing beyond that is ever looked at.
    pub fn parse(text: &[u8]) -> Result<Self, ParseDateError> {
        let text = match text.iter().position(|&ch| ch == 0) {
            Some(end) => &text[..end],
            None => text,
        };
        Self::parse_text(text)
    }

    /// Parses a date from text that contains no terminator.
    fn parse_text(text: &[u8]) -> Result<Self, ParseDateError> {
        let mut parser = Parser::new(text);
        let month = parser.month()?;
        let day = parser.number(DateField::Day, 1..=31, b' ')?;
        let hours = parser.number(DateField::Hours, 0..=23, b':')?;
        let minutes = parser.number(DateField::Minutes, 0..=59, b':')?;
        let seconds = parser.number(DateField::Seconds, 0..=59, b' ')?;
        let year = parser.number(DateField::Year, 0..=u32::MAX, b' ')?;
        parser.zone()?;
        Ok(Date { month, day, hours, minutes, seconds, year })
    }

    /// Converts a CRL time value into a date.
    ///
    /// The time is printed into an in-memory buffer which is then
    /// terminated and handed to [`Date::parse`].
    pub fn from_time(time: &Time) -> Result<Self, CrlError> {
        let mut buf = BytesMut::with_capacity(32);
        if time.print(&mut buf).is_err() {
            debug!("failed to print time value {:?}", time);
            return Err(CrlError::Failure)
        }
        buf.put_u8(0);
        Self::parse(&buf).map_err(|err| {
            debug!("rejected time value {:?}: {}", time, err);
            CrlError::Failure
        })
    }
}


//--- FromStr

impl FromStr for Date {
    type Err = ParseDateError;

    /// Parses a date from a string.
    ///
    /// Unlike [`Date::parse`], a NUL character is not treated as the end
    /// of the text and makes parsing fail.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_text(s.as_bytes())
    }
}


//--- Display

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day,
            self.hours, self.minutes, self.seconds
        )
    }
}


//------------ Parser --------------------------------------------------------

/// The month abbreviations in order.
const MONTHS: [&[u8]; 12] = [
    b"Jan", b"Feb", b"Mar", b"Apr", b"May", b"Jun",
    b"Jul", b"Aug", b"Sep", b"Oct", b"Nov", b"Dec",
];

/// A single pass scanner over the date text.
///
/// Each step consumes one field plus the separator following it and either
/// advances the position past both or fails. There is no backtracking.
struct Parser<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a [u8]) -> Self {
        Parser { text, pos: 0 }
    }

    /// Returns the not yet consumed part of the text.
    fn rest(&self) -> &'a [u8] {
        self.text.get(self.pos..).unwrap_or_default()
    }

    /// Takes the month and the space after it.
    fn month(&mut self) -> Result<u32, ParseDateError> {
        let rest = self.rest();

        // All twelve entries are checked and a later match replaces an
        // earlier one. The abbreviations are distinct, so at most one of
        // them matches.
        let mut month = None;
        for (index, name) in MONTHS.iter().enumerate() {
            if rest.starts_with(name) {
                month = Some(index as u32 + 1);
            }
        }
        let month = month.ok_or(ParseDateError::new(DateField::Month))?;
        if rest.get(3) != Some(&b' ') {
            return Err(ParseDateError::new(DateField::Month))
        }
        self.pos += 4;
        Ok(month)
    }

    /// Takes a decimal number and the terminator following it.
    ///
    /// At least one digit must be present, the value must fit into a
    /// `u32` and lie within `range`.
    fn number(
        &mut self,
        field: DateField,
        range: RangeInclusive<u32>,
        terminator: u8,
    ) -> Result<u32, ParseDateError> {
        let rest = self.rest();
        let len = rest.iter().take_while(|ch| ch.is_ascii_digit()).count();
        if len == 0 || rest.get(len) != Some(&terminator) {
            return Err(ParseDateError::new(field))
        }
        let mut value = 0u32;
        for &ch in &rest[..len] {
            value = value.checked_mul(10).and_then(|value| {
                value.checked_add(u32::from(ch - b'0'))
            }).ok_or(ParseDateError::new(field))?;
        }
        if !range.contains(&value) {
            return Err(ParseDateError::new(field))
        }
        self.pos += len + 1;
        Ok(value)
    }

    /// Checks that exactly the time zone is left.
    fn zone(&mut self) -> Result<(), ParseDateError> {
        if self.rest() != b"GMT" {
            return Err(ParseDateError::new(DateField::Zone))
        }
        self.pos = self.text.len();
        Ok(())
    }
}


//------------ DateField -----------------------------------------------------

/// The parts of the textual date form.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DateField {
    Month,
    Day,
    Hours,
    Minutes,
    Seconds,
    Year,

    /// The trailing `GMT`.
    Zone,
}

impl DateField {
    pub fn as_str(self) -> &'static str {
        match self {
            DateField::Month => "month",
            DateField::Day => "day",
            DateField::Hours => "hours",
            DateField::Minutes => "minutes",
            DateField::Seconds => "seconds",
            DateField::Year => "year",
            DateField::Zone => "time zone",
        }
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//------------ ParseDateError ------------------------------------------------

/// The textual form of a date was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseDateError {
    field: DateField,
}

impl ParseDateError {
    fn new(field: DateField) -> Self {
        ParseDateError { field }
    }

    /// Returns the field that was found to be invalid.
    pub fn field(self) -> DateField {
        self.field
    }
}

impl From<ParseDateError> for CrlError {
    fn from(_: ParseDateError) -> Self {
        CrlError::Failure
    }
}

impl fmt::Display for ParseDateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid {} in date", self.field)
    }
}

impl error::Error for ParseDateError { }


//------------ Testing. One. Two. Three --------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn date(
        month: u32, day: u32, hours: u32, minutes: u32, seconds: u32,
        year: u32
    ) -> Date {
        Date { month, day, hours, minutes, seconds, year }
    }

    fn field(s: &str) -> DateField {
        Date::from_str(s).unwrap_err().field()
    }

    #[test]
    fn parse_good() {
        assert_eq!(
            Date::from_str("Jan 1 00:00:00 1970 GMT"),
            Ok(date(1, 1, 0, 0, 0, 1970))
        );
        assert_eq!(
            Date::from_str("Dec 31 23:59:59 2099 GMT"),
            Ok(date(12, 31, 23, 59, 59, 2099))
        );
        assert_eq!(
            Date::from_str("May 30 10:23:42 2018 GMT"),
            Ok(date(5, 30, 10, 23, 42, 2018))
        );
        assert_eq!(
            Date::from_str("Jun 07 01:02:03 0 GMT"),
            Ok(date(6, 7, 1, 2, 3, 0))
        );
        assert_eq!(
            Date::from_str("Feb 30 00:00:00 2000 GMT"),
            Ok(date(2, 30, 0, 0, 0, 2000))
        );
        assert_eq!(
            Date::from_str("Sep 9 9:9:9 4294967295 GMT"),
            Ok(date(9, 9, 9, 9, 9, u32::MAX))
        );
    }

    #[test]
    fn every_month() {
        for (index, name) in [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun",
            "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ].iter().enumerate() {
            let text = format!("{} 1 00:00:00 2000 GMT", name);
            assert_eq!(
                Date::from_str(&text).unwrap().month,
                index as u32 + 1
            );
        }
    }

    #[test]
    fn bad_month() {
        assert_eq!(field("jan 1 00:00:00 1970 GMT"), DateField::Month);
        assert_eq!(field("JAN 1 00:00:00 1970 GMT"), DateField::Month);
        assert_eq!(field("Foo 1 00:00:00 1970 GMT"), DateField::Month);
        assert_eq!(field(" Jan 1 00:00:00 1970 GMT"), DateField::Month);
        assert_eq!(field("January 1 00:00:00 1970 GMT"), DateField::Month);
        assert_eq!(field("Jan"), DateField::Month);
        assert_eq!(field("Ja"), DateField::Month);
        assert_eq!(field(""), DateField::Month);
    }

    #[test]
    fn bad_separators() {
        assert_eq!(field("Jan  1 00:00:00 1970 GMT"), DateField::Day);
        assert_eq!(field("Jan 1  00:00:00 1970 GMT"), DateField::Hours);
        assert_eq!(field("Jan 1 00::00:00 1970 GMT"), DateField::Minutes);
        assert_eq!(field("Jan 1 00:00: 00 1970 GMT"), DateField::Seconds);
        assert_eq!(field("Jan 1 00:00:00  1970 GMT"), DateField::Year);
        assert_eq!(field("Jan 1 00:00:00 1970  GMT"), DateField::Zone);
        assert_eq!(field("Jan 1 00-00-00 1970 GMT"), DateField::Hours);
        assert_eq!(field("Jan 1 00:00:00 1970GMT"), DateField::Year);
        assert_eq!(field("Jan\t1 00:00:00 1970 GMT"), DateField::Month);
    }

    #[test]
    fn empty_digit_runs() {
        assert_eq!(field("Jan  00:00:00 1970 GMT"), DateField::Day);
        assert_eq!(field("Jan 1 :00:00 1970 GMT"), DateField::Hours);
        assert_eq!(field("Jan 1 00::00 1970 GMT"), DateField::Minutes);
        assert_eq!(field("Jan 1 00:00: 1970 GMT"), DateField::Seconds);
        assert_eq!(field("Jan 1 00:00:00  GMT"), DateField::Year);
    }

    #[test]
    fn signs_are_not_digits() {
        assert_eq!(field("Jan +1 00:00:00 1970 GMT"), DateField::Day);
        assert_eq!(field("Jan 1 -0:00:00 1970 GMT"), DateField::Hours);
        assert_eq!(field("Jan 1 00:00:00 +1970 GMT"), DateField::Year);
    }

    #[test]
    fn out_of_range() {
        assert_eq!(field("Dec 0 00:00:00 2000 GMT"), DateField::Day);
        assert_eq!(field("Dec 32 00:00:00 2000 GMT"), DateField::Day);
        assert_eq!(field("Dec 31 24:00:00 2000 GMT"), DateField::Hours);
        assert_eq!(field("Dec 31 23:60:00 2000 GMT"), DateField::Minutes);
        assert_eq!(field("Dec 31 23:59:60 2099 GMT"), DateField::Seconds);
        assert_eq!(
            field("Dec 31 23:59:59 4294967296 GMT"), DateField::Year
        );
        assert_eq!(
            field("Dec 99999999999999999999 00:00:00 2000 GMT"),
            DateField::Day
        );
    }

    #[test]
    fn bad_zone() {
        assert_eq!(field("Dec 31 23:59:59 2099 UTC"), DateField::Zone);
        assert_eq!(field("Dec 31 23:59:59 2099 gmt"), DateField::Zone);
        assert_eq!(field("Dec 31 23:59:59 2099 GM"), DateField::Zone);
        assert_eq!(field("Dec 31 23:59:59 2099 GMT "), DateField::Zone);
        assert_eq!(field("Dec 31 23:59:59 2099 GMTX"), DateField::Zone);
        assert_eq!(field("Dec 31 23:59:59 2099 "), DateField::Zone);
        assert_eq!(field("Dec 31 23:59:59 2099 GMT\0"), DateField::Zone);
    }

    #[test]
    fn parse_stops_at_nul() {
        assert_eq!(
            Date::parse(b"Jan 1 00:00:00 1970 GMT\0"),
            Ok(date(1, 1, 0, 0, 0, 1970))
        );
        assert_eq!(
            Date::parse(b"Jan 1 00:00:00 1970 GMT\0trailing junk"),
            Ok(date(1, 1, 0, 0, 0, 1970))
        );
        assert_eq!(
            Date::parse(b"Jan 1 00:00:00 1970 GM\0T").unwrap_err().field(),
            DateField::Zone
        );
        assert_eq!(
            Date::parse(b"Jan 1\0 00:00:00 1970 GMT").unwrap_err().field(),
            DateField::Day
        );
        assert_eq!(
            Date::parse(b"\0").unwrap_err().field(), DateField::Month
        );
    }

    #[test]
    fn mangled_input_never_panics() {
        let good = b"Dec 31 23:59:59 2099 GMT";
        let bytes = [0u8, b' ', b':', b'0', b'9', b'G', b'x', 0xff];
        for len in 0..=good.len() {
            let _ = Date::parse(&good[..len]);
            for pos in 0..len {
                for &byte in &bytes {
                    let mut text = good[..len].to_vec();
                    text[pos] = byte;
                    if let Ok(res) = Date::parse(&text) {
                        assert!((1..=12).contains(&res.month));
                        assert!((1..=31).contains(&res.day));
                        assert!(res.hours <= 23);
                        assert!(res.minutes <= 59);
                        assert!(res.seconds <= 59);
                    }
                }
            }
        }
    }

    #[test]
    fn from_time() {
        assert_eq!(
            Date::from_time(&Time::utc(2018, 5, 30, 10, 23, 42).unwrap()),
            Ok(date(5, 30, 10, 23, 42, 2018))
        );
        assert_eq!(
            Date::from_time(&Time::utc(2021, 3, 5, 9, 7, 3).unwrap()),
            Ok(date(3, 5, 9, 7, 3, 2021))
        );
        assert_eq!(
            Date::from_time(&Time::utc(2099, 12, 31, 23, 59, 59).unwrap()),
            Ok(date(12, 31, 23, 59, 59, 2099))
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            date(3, 5, 9, 7, 3, 2021).to_string(), "2021-03-05T09:07:03Z"
        );
        assert_eq!(Date::default().to_string(), "0000-00-00T00:00:00Z");
    }

    #[test]
    fn error_display() {
        assert_eq!(
            Date::from_str("Dec 31 23:59:60 2099 GMT").unwrap_err()
                .to_string(),
            "invalid seconds in date"
        );
        assert_eq!(
            CrlError::from(ParseDateError::new(DateField::Zone)),
            CrlError::Failure
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_date() {
        let date = date(12, 31, 23, 59, 59, 2099);
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(
            json,
            "{\"month\":12,\"day\":31,\"hours\":23,\"minutes\":59,\
             \"seconds\":59,\"year\":2099}"
        );
        assert_eq!(serde_json::from_str::<Date>(&json).unwrap(), date);
    }
}
