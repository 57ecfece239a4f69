//! Types common to all things X.509.
//!
//! This module contains the handful of X.509 building blocks needed to get
//! at the validity window of a certificate revocation list: distinguished
//! names, which are only skipped, and time values.

use std::fmt;
use bcder::decode;
use bcder::{Oid, Tag};
use bcder::decode::{ContentError, DecodeError, Source};
use chrono::{DateTime, TimeZone, Utc};


//------------ Name ----------------------------------------------------------

/// Skips over an X.500 distinguished name.
///
/// The name is only checked for being a structurally correct, non-empty
/// RDN sequence.
pub fn skip_name<S: decode::Source>(
    cons: &mut decode::Constructed<S>
) -> Result<(), DecodeError<S::Error>> {
    cons.take_sequence(|cons| { // RDNSequence
        let mut empty_sequence = true;
        while let Some(()) = cons.take_opt_set(|cons| {
            empty_sequence = false;
            let mut empty_set = true;
            while let Some(()) = cons.take_opt_sequence(|cons| {
                empty_set = false;
                Oid::skip_in(cons)?;
                if cons.skip_one()?.is_none() {
                    return Err(cons.content_err(
                        "invalid name"
                    ))
                }
                Ok(())
            })? { }
            if empty_set {
                return Err(cons.content_err(
                    "empty relative distinguished name"
                ));
            }
            Ok(())
        })? { }
        if empty_sequence {
            return Err(cons.content_err(
                "empty distinguished name"
            ))
        }
        Ok(())
    })
}


//------------ Time ----------------------------------------------------------

/// A point in time as used by X.509 objects.
///
/// Values are decoded from either a `UTCTime` or a `GeneralizedTime`
/// restricted to the forms required by RFC 5280.
///
/// The `Display` implementation produces the generic textual rendering of
/// a time, e.g., `May 30 10:23:42 2018 GMT`. The day of the month is not
/// padded.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Time(DateTime<Utc>);

impl Time {
    /// Creates a time from its components.
    ///
    /// Returns `None` if the components don’t describe a valid time.
    pub fn utc(
        year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32
    ) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single().map(Time)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive(|tag, prim| {
            match tag {
                Tag::UTC_TIME => Self::from_utc_time(prim),
                Tag::GENERALIZED_TIME => Self::from_generalized_time(prim),
                _ => {
                    Err(prim.content_err(
                        "malformed time value"
                    ))
                }
            }
        })
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        let res = cons.take_opt_primitive_if(
            Tag::UTC_TIME, Self::from_utc_time
        )?;
        if let Some(res) = res {
            return Ok(Some(res))
        }
        cons.take_opt_primitive_if(
            Tag::GENERALIZED_TIME, Self::from_generalized_time
        )
    }

    fn from_utc_time<S: decode::Source>(
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        // RFC 5280 requires the format YYMMDDHHMMSSZ
        let year = read_digits::<_, 2>(prim)? as i32;
        let year = if year >= 50 { year + 1900 }
                   else { year + 2000 };
        Self::from_rest(year, prim)
    }

    fn from_generalized_time<S: decode::Source>(
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        // RFC 5280 requires the format YYYYMMDDHHMMSSZ
        let year = read_digits::<_, 4>(prim)? as i32;
        Self::from_rest(year, prim)
    }

    fn from_rest<S: decode::Source>(
        year: i32, prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let res = (
            year,
            read_digits::<_, 2>(prim)?,
            read_digits::<_, 2>(prim)?,
            read_digits::<_, 2>(prim)?,
            read_digits::<_, 2>(prim)?,
            read_digits::<_, 2>(prim)?,
        );
        if prim.take_u8()? != b'Z' {
            return Err(prim.content_err(
                "malformed time value"
            ))
        }
        Self::from_parts(res).map_err(|err| prim.content_err(err))
    }

    fn from_parts(
        parts: (i32, u32, u32, u32, u32, u32)
    ) -> Result<Self, ContentError> {
        Self::utc(parts.0, parts.1, parts.2, parts.3, parts.4, parts.5)
            .ok_or_else(|| ContentError::from_static("malformed time value"))
    }

    /// Prints the time in its generic textual form into `target`.
    pub fn print(&self, target: &mut impl fmt::Write) -> fmt::Result {
        write!(target, "{} GMT", self.0.format("%b %-d %H:%M:%S %Y"))
    }
}


//--- Display

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.print(f)
    }
}


/// Reads exactly `N` ASCII digits and returns their value.
fn read_digits<S: decode::Source, const N: usize>(
    source: &mut S
) -> Result<u32, DecodeError<S::Error>> {
    let mut res = 0u32;
    for _ in 0..N {
        let ch = source.take_u8()?;
        if !ch.is_ascii_digit() {
            return Err(source.content_err("malformed time value"))
        }
        res = res * 10 + u32::from(ch - b'0');
    }
    Ok(res)
}


//------------ Testing. One. Two. Three --------------------------------------
