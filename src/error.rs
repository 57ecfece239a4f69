//! Error handling for CRL handle operations.

use std::{error, fmt};


//------------ CrlError ------------------------------------------------------

/// The ways an operation on a CRL handle can fail.
///
/// Failures are never retried internally and no operation ever returns a
/// partial result: whenever one of these is returned, all outputs of the
/// operation are left in their zeroed state.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CrlError {
    /// A parameter was empty or the handle is not a live CRL handle.
    ///
    /// This covers handles that were never decoded into, have already been
    /// freed, or were rebuilt from foreign bytes.
    InvalidParameter,

    /// The CRL or one of its timestamps could not be processed.
    ///
    /// This is returned if the DER data cannot be decoded, a requested
    /// timestamp is absent, or its textual form is rejected by the date
    /// parser.
    Failure,

    /// The operation ended up in a state it does not expect.
    ///
    /// This is the default so that a path that never explicitly reaches
    /// success can’t be mistaken for one.
    #[default]
    Unexpected,
}

impl CrlError {
    /// Returns a short description of the error kind.
    pub fn as_str(self) -> &'static str {
        match self {
            CrlError::InvalidParameter => "invalid parameter",
            CrlError::Failure => "failure",
            CrlError::Unexpected => "unexpected error",
        }
    }
}

impl fmt::Display for CrlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl error::Error for CrlError { }


//============ Testing =======================================================
