// Copyright (c) 2022-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

#[cfg(feature = "chrono")]
use chrono::{TimeZone, Utc};

use crate::{ZipDateTime, ZipDateTimeBuilder};

#[test]
#[cfg(feature = "chrono")]
fn date_conversion_test_chrono() {
    let original_dt = Utc.timestamp_opt(1666544102, 0).unwrap();
    let zip_dt = ZipDateTime::from_chrono(&original_dt);
    let result_dt = zip_dt.as_chrono().single().expect("expected single unique result");
    assert_eq!(result_dt, original_dt);
}

#[test]
fn date_conversion_test() {
    let built = ZipDateTimeBuilder::new().year(2000).month(9).day(8).hour(7).minute(5).second(4).build();

    assert_eq!(2000, built.year());
    assert_eq!(9, built.month());
    assert_eq!(8, built.day());
    assert_eq!(7, built.hour());
    assert_eq!(5, built.minute());
    assert_eq!(4, built.second());
}

#[test]
fn date_fields_pack_time_first() {
    let built = ZipDateTime::from_parts(0x1234, 0x5678);

    assert_eq!(built.time(), 0x1234);
    assert_eq!(built.date(), 0x5678);
    assert_eq!(built.as_dos(), 0x5678_1234);
    assert_eq!(ZipDateTime::from_dos(0x5678_1234), built);
}

#[test]
fn date_clamps_and_rounds() {
    let built = ZipDateTimeBuilder::new().year(1970).month(1).day(1).second(59).build();

    assert_eq!(1980, built.year());
    assert_eq!(58, built.second());
}
