//! Validity windows of certificate revocation lists.
//!
//! A _Certificate Revocation List_ (CRL) tells which certificates issued by
//! a certification authority have been revoked. It is only meaningful for a
//! certain period of time: it states when it was issued (its _last_ or
//! _this update_) and when the next version is due (its _next update_).
//!
//! This crate decodes DER encoded CRLs into a [`CrlTable`] and hands out
//! opaque [`CrlHandle`]s for them. Through a handle, the update times of a
//! CRL can be retrieved as structured [`Date`]s. Handles are checked on
//! every use, so using a handle that was never valid or has been freed
//! fails cleanly instead of touching the wrong data.
//!
//! The crate does not verify CRL signatures nor does it look at the list of
//! revoked certificates.
//!
//! # Features
//!
//! * `serde`: implements `Serialize` and `Deserialize` for [`Date`].
//! * `arbitrary`: implements `arbitrary::Arbitrary` for [`Date`].

pub use self::date::{Date, DateField, ParseDateError};
pub use self::error::CrlError;
pub use self::handle::{CrlHandle, CrlTable, CRL_HANDLE_SIZE};

pub mod crl;
pub mod date;
pub mod error;
pub mod handle;
pub mod x509;
