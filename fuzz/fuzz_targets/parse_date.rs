#![no_main]

use libfuzzer_sys::fuzz_target;
use crl_dates::Date;

fuzz_target!(|data: &[u8]| {
    if let Ok(date) = Date::parse(data) {
        assert!((1..=12).contains(&date.month));
        assert!((1..=31).contains(&date.day));
        assert!(date.hours <= 23);
        assert!(date.minutes <= 59);
        assert!(date.seconds <= 59);
    }
});
