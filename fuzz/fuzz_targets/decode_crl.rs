#![no_main]

use libfuzzer_sys::fuzz_target;
use crl_dates::{CrlError, CrlHandle, CrlTable, Date};

fuzz_target!(|data: &[u8]| {
    let mut table = CrlTable::new();
    let mut handle = CrlHandle::default();
    if table.decode_der(&mut handle, data).is_err() {
        assert!(!table.is_valid(&handle));
        return
    }

    let mut last = Date::default();
    let mut next = Date::default();
    if table.get_update_dates(
        &handle, Some(&mut last), Some(&mut next)
    ).is_err() {
        assert_eq!(last, Date::default());
        assert_eq!(next, Date::default());
    }

    assert_eq!(table.free(&mut handle), Ok(()));
    assert_eq!(table.free(&mut handle), Err(CrlError::InvalidParameter));
});
