//! Certificate Revocation Lists.
//!
//! This module implements decoding of X.509 CRLs as defined in RFC 5280
//! via the type [`Crl`]. Only the parts needed to learn about the validity
//! window of a CRL are kept around: the times of this and the next update.
//! The issuer, the list of revoked certificates and the CRL extensions are
//! checked for being structurally sound and then skipped. The signature is
//! skipped without being checked.
//!
//! ```txt
//! CertificateList  ::=  SEQUENCE  {
//!      tbsCertList          TBSCertList,
//!      signatureAlgorithm   AlgorithmIdentifier,
//!      signatureValue       BIT STRING  }
//!
//! TBSCertList  ::=  SEQUENCE  {
//!      version                 Version OPTIONAL, -- if present, MUST be v2
//!      signature               AlgorithmIdentifier,
//!      issuer                  Name,
//!      thisUpdate              Time,
//!      nextUpdate              Time OPTIONAL,
//!      revokedCertificates     SEQUENCE OF SEQUENCE  { ... } OPTIONAL,
//!      crlExtensions           [0]  EXPLICIT Extensions OPTIONAL }
//! ```

use bcder::decode;
use bcder::{BitString, Mode, Tag};
use bcder::decode::{DecodeError, IntoSource, LimitedSource, Source};
use crate::x509::{skip_name, Time};


//------------ Crl -----------------------------------------------------------

/// A decoded certificate revocation list.
#[derive(Clone, Debug)]
pub struct Crl {
    /// The time this version of the CRL was created.
    this_update: Time,

    /// The time the next version of the CRL is likely to be created.
    next_update: Option<Time>,
}

impl Crl {
    /// Parses a source as a certificate revocation list.
    ///
    /// The source must contain exactly one CRL. Any data following it is
    /// an error.
    pub fn decode<S: IntoSource>(
        source: S
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        let mut source = LimitedSource::new(source.into_source());
        let res = Mode::Der.decode(&mut source, Self::take_from)?;
        source.exhausted()?;
        Ok(res)
    }

    /// Takes an encoded CRL from the beginning of a constructed value.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    /// Parses the content of a certificate revocation list.
    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let tbs = cons.capture_one()?;
        if cons.skip_one()?.is_none() {
            return Err(cons.content_err("missing signature algorithm"))
        }
        BitString::skip_in(cons)?;
        let (this_update, next_update) = tbs.decode(Self::take_tbs_from)
            .map_err(DecodeError::convert)?;
        Ok(Crl { this_update, next_update })
    }

    /// Takes the to-be-signed part of the CRL.
    ///
    /// Returns this and the next update time.
    fn take_tbs_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<(Time, Option<Time>), DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            match cons.take_opt_u8()? {
                None | Some(1) => { } // absent => v1, 1 => v2
                Some(_) => {
                    return Err(cons.content_err("unsupported CRL version"))
                }
            }
            if cons.skip_one()?.is_none() {
                return Err(cons.content_err("missing signature algorithm"))
            }
            skip_name(cons)?;
            let this_update = Time::take_from(cons)?;
            let next_update = Time::take_opt_from(cons)?;

            // revokedCertificates and crlExtensions
            cons.take_opt_sequence(|cons| cons.skip_all())?;
            cons.take_opt_constructed_if(Tag::CTX_0, |cons| cons.skip_all())?;

            Ok((this_update, next_update))
        })
    }

    /// Returns the time this CRL was issued.
    pub fn this_update(&self) -> &Time {
        &self.this_update
    }

    /// Returns the time the next CRL is expected, if present.
    pub fn next_update(&self) -> Option<&Time> {
        self.next_update.as_ref()
    }
}


//------------ Testing. One. Two. Three --------------------------------------
