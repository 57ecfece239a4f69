//! Opaque handles to decoded CRLs.
//!
//! A [`CrlTable`] owns decoded CRLs and hands out [`CrlHandle`]s referring
//! to them. A handle is a small, fixed-size value without any accessible
//! content. It can be copied around freely and even be converted into raw
//! bytes and back, e.g., to pass it through foreign code. Because of that,
//! the table can never trust a handle: every operation first checks that
//! the handle refers to a live record in the table and fails with
//! [`CrlError::InvalidParameter`] otherwise. This catches handles that
//! were never decoded into, have been freed already, belong to some other
//! table or simply are garbage.
//!
//! Each record in the table carries a magic tag that is present only while
//! the record holds a CRL and a seal that is unique across all tables of the
//! process. The
//! handle carries the index of its record and a copy of the seal. Once a
//! record has been released, its tag and seal are scrubbed, so a stale copy
//! of the handle will not match any later record that reuses the slot.
//!
//! ```
//! use crl_dates::{CrlHandle, CrlTable, Date};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let der = std::fs::read("test-data/ca.crl")?;
//! let mut table = CrlTable::new();
//! let mut handle = CrlHandle::default();
//! table.decode_der(&mut handle, &der)?;
//!
//! let mut last = Date::default();
//! let mut next = Date::default();
//! table.get_update_dates(&handle, Some(&mut last), Some(&mut next))?;
//! assert_eq!(last.year, 2021);
//!
//! table.free(&mut handle)?;
//! assert!(!table.is_valid(&handle));
//! # Ok(())
//! # }
//! ```

use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use log::{debug, trace};
use slab::Slab;
use crate::crl::Crl;
use crate::date::Date;
use crate::error::CrlError;


//------------ Constants -----------------------------------------------------

/// The magic tag of a live record.
const CRL_MAGIC: u64 = 0xe8c9_93b1_cca2_4906;

/// The size in bytes of the raw form of a handle.
pub const CRL_HANDLE_SIZE: usize = 16;

// A handle must always fit into its raw form.
const _: () = assert!(mem::size_of::<CrlHandle>() <= CRL_HANDLE_SIZE);

/// The seal for the next record of any table.
///
/// Starts at one so that the zeroed handle never matches.
static NEXT_SEAL: AtomicU64 = AtomicU64::new(1);


//------------ CrlHandle -----------------------------------------------------

/// An opaque handle to a CRL held by a [`CrlTable`].
///
/// The default value is the zeroed handle which is never valid. A handle
/// only becomes valid through [`CrlTable::decode_der`] and stops being
/// valid through [`CrlTable::free`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct CrlHandle {
    /// The index of the record in the table.
    slot: u64,

    /// The seal of the record.
    seal: u64,
}

impl CrlHandle {
    /// Returns the raw form of the handle.
    pub fn to_bytes(self) -> [u8; CRL_HANDLE_SIZE] {
        let mut res = [0u8; CRL_HANDLE_SIZE];
        res[..8].copy_from_slice(&self.slot.to_le_bytes());
        res[8..].copy_from_slice(&self.seal.to_le_bytes());
        res
    }

    /// Creates a handle from its raw form.
    ///
    /// Any sequence of bytes makes a handle. Whether it refers to a CRL
    /// is decided only by the table it is used with.
    pub fn from_bytes(bytes: [u8; CRL_HANDLE_SIZE]) -> Self {
        let mut slot = [0u8; 8];
        let mut seal = [0u8; 8];
        slot.copy_from_slice(&bytes[..8]);
        seal.copy_from_slice(&bytes[8..]);
        CrlHandle {
            slot: u64::from_le_bytes(slot),
            seal: u64::from_le_bytes(seal),
        }
    }

    /// Returns the slot index if it can be one.
    fn index(self) -> Option<usize> {
        usize::try_from(self.slot).ok()
    }
}


//------------ CrlRecord -----------------------------------------------------

/// The private state behind a handle.
#[derive(Debug)]
struct CrlRecord {
    /// The magic tag, `CRL_MAGIC` while the record is live.
    tag: u64,

    /// The seal that a handle must present.
    seal: u64,

    /// The CRL owned by the record.
    crl: Option<Crl>,
}

impl CrlRecord {
    /// Creates a new live record taking ownership of `crl`.
    fn new(crl: Crl, seal: u64) -> Self {
        CrlRecord {
            tag: CRL_MAGIC,
            seal,
            crl: Some(crl),
        }
    }

    /// Returns whether the record is tagged and owns a CRL.
    fn is_valid(&self) -> bool {
        self.tag == CRL_MAGIC && self.crl.is_some()
    }

    /// Drops the CRL and scrubs the record.
    fn release(&mut self) {
        self.crl = None;
        self.tag = 0;
        self.seal = 0;
    }
}


//------------ CrlTable ------------------------------------------------------

/// A collection of decoded CRLs accessible through opaque handles.
///
/// Operations that create or destroy records take `&mut self` while
/// queries take `&self`, so a handle can’t be freed while its dates are
/// being read. Distinct tables share nothing but the source of seals.
#[derive(Debug)]
pub struct CrlTable {
    /// The records.
    records: Slab<CrlRecord>,
}

impl CrlTable {
    /// Creates a new, empty table.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new table with room for `capacity` CRLs.
    pub fn with_capacity(capacity: usize) -> Self {
        CrlTable {
            records: Slab::with_capacity(capacity),
        }
    }

    /// Returns the number of live CRLs in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the table holds no CRLs.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns whether `handle` refers to a live CRL in this table.
    pub fn is_valid(&self, handle: &CrlHandle) -> bool {
        self.record(handle).is_some()
    }

    /// Returns the live record for `handle`.
    fn record(&self, handle: &CrlHandle) -> Option<&CrlRecord> {
        let record = self.records.get(handle.index()?)?;
        if record.is_valid() && record.seal == handle.seal {
            Some(record)
        }
        else {
            None
        }
    }

    /// Returns the CRL for `handle`.
    fn crl(&self, handle: &CrlHandle) -> Result<&Crl, CrlError> {
        self.record(handle).and_then(|record| record.crl.as_ref())
            .ok_or(CrlError::InvalidParameter)
    }

    /// Returns a fresh seal.
    ///
    /// Seals are drawn from a process-wide counter, so a handle from one
    /// table never matches a record of another.
    fn take_seal() -> u64 {
        loop {
            let seal = NEXT_SEAL.fetch_add(1, Ordering::Relaxed);
            if seal != 0 {
                return seal
            }
        }
    }

    /// Decodes a DER encoded CRL and stores it under a new handle.
    ///
    /// The handle is reset to the zeroed handle before anything else
    /// happens, so it is only valid afterwards if the method succeeds.
    /// Fails with [`CrlError::InvalidParameter`] if `der` is empty and with
    /// [`CrlError::Failure`] if it does not contain a CRL.
    pub fn decode_der(
        &mut self, handle: &mut CrlHandle, der: &[u8]
    ) -> Result<(), CrlError> {
        *handle = CrlHandle::default();

        if der.is_empty() {
            return Err(CrlError::InvalidParameter)
        }

        let crl = match Crl::decode(der) {
            Ok(crl) => crl,
            Err(err) => {
                debug!("failed to decode CRL: {}", err);
                return Err(CrlError::Failure)
            }
        };

        let seal = Self::take_seal();
        let slot = self.records.insert(CrlRecord::new(crl, seal));
        *handle = CrlHandle { slot: slot as u64, seal };
        trace!("stored CRL in slot {}", slot);
        Ok(())
    }

    /// Releases the CRL referred to by `handle`.
    ///
    /// On success, the record is scrubbed and `handle` is reset to the
    /// zeroed handle. Freeing a handle that is not valid, including one
    /// that has been freed before, fails with
    /// [`CrlError::InvalidParameter`].
    pub fn free(&mut self, handle: &mut CrlHandle) -> Result<(), CrlError> {
        if !self.is_valid(handle) {
            return Err(CrlError::InvalidParameter)
        }
        let slot = handle.index().ok_or(CrlError::Unexpected)?;
        let mut record = self.records.try_remove(slot).ok_or(
            CrlError::Unexpected
        )?;
        record.release();
        *handle = CrlHandle::default();
        trace!("released CRL in slot {}", slot);
        Ok(())
    }

    /// Returns the last and next update dates of a CRL.
    ///
    /// Each requested output is zeroed first. The last update is
    /// converted before the next update and a failure stops the
    /// conversion. Outputs are only written once all requested dates have
    /// been converted, so if the method fails they are all left zeroed.
    ///
    /// Fails with [`CrlError::InvalidParameter`] if `handle` isn’t valid
    /// and with [`CrlError::Failure`] if a requested date is missing from
    /// the CRL or can’t be converted.
    pub fn get_update_dates(
        &self,
        handle: &CrlHandle,
        mut last: Option<&mut Date>,
        mut next: Option<&mut Date>,
    ) -> Result<(), CrlError> {
        if let Some(last) = last.as_deref_mut() {
            *last = Date::default();
        }
        if let Some(next) = next.as_deref_mut() {
            *next = Date::default();
        }

        let crl = self.crl(handle)?;

        let last_date = if last.is_some() {
            Some(Date::from_time(crl.this_update())?)
        }
        else {
            None
        };
        let next_date = if next.is_some() {
            let time = crl.next_update().ok_or_else(|| {
                debug!("CRL has no next update time");
                CrlError::Failure
            })?;
            Some(Date::from_time(time)?)
        }
        else {
            None
        };

        if let (Some(last), Some(date)) = (last, last_date) {
            *last = date;
        }
        if let (Some(next), Some(date)) = (next, next_date) {
            *next = date;
        }
        Ok(())
    }

    /// Returns the update dates of a CRL.
    ///
    /// The first element is the last update. The second element is the
    /// next update if the CRL has one.
    pub fn update_dates(
        &self, handle: &CrlHandle
    ) -> Result<(Date, Option<Date>), CrlError> {
        let crl = self.crl(handle)?;
        let last = Date::from_time(crl.this_update())?;
        let next = match crl.next_update() {
            Some(time) => Some(Date::from_time(time)?),
            None => None,
        };
        Ok((last, next))
    }
}


//--- Default

impl Default for CrlTable {
    fn default() -> Self {
        Self::new()
    }
}


//------------ Testing. One. Two. Three --------------------------------------
