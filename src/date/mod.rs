// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub mod builder;

#[cfg(feature = "chrono")]
use chrono::{DateTime, Datelike, LocalResult, TimeZone, Timelike, Utc};

use self::builder::ZipDateTimeBuilder;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#446
// https://learn.microsoft.com/en-us/windows/win32/api/oleauto/nf-oleauto-dosdatetimetovarianttime

/// An MS-DOS timestamp as stored by a header: the time in the low 16 bits and the date in the high 16 bits.
///
/// Headers store the time field before the date field, so the packed value is exactly the four bytes read from
/// disk interpreted as one little-endian u32.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct ZipDateTime(pub(crate) u32);

impl ZipDateTime {
    /// Constructs a timestamp from its raw time and date fields.
    pub fn from_parts(time: u16, date: u16) -> Self {
        Self(((date as u32) << 16) | time as u32)
    }

    /// Constructs a timestamp from its packed four-byte representation.
    pub fn from_dos(value: u32) -> Self {
        Self(value)
    }

    pub fn as_dos(&self) -> u32 {
        self.0
    }

    /// Returns the raw time field.
    pub fn time(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Returns the raw date field.
    pub fn date(&self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn year(&self) -> i32 {
        (((self.date() & 0xFE00) >> 9) + 1980).into()
    }

    pub fn month(&self) -> u32 {
        ((self.date() & 0x1E0) >> 5).into()
    }

    pub fn day(&self) -> u32 {
        (self.date() & 0x1F).into()
    }

    pub fn hour(&self) -> u32 {
        ((self.time() & 0xF800) >> 11).into()
    }

    pub fn minute(&self) -> u32 {
        ((self.time() & 0x7E0) >> 5).into()
    }

    /// Returns the second of this date & time.
    ///
    /// Note that MS-DOS has a maximum granularity of two seconds.
    pub fn second(&self) -> u32 {
        ((self.time() & 0x1F) << 1).into()
    }

    /// Constructs chrono's [`DateTime`] representation of this date & time.
    ///
    /// Note that this requires the `chrono` feature.
    #[cfg(feature = "chrono")]
    pub fn as_chrono(&self) -> LocalResult<DateTime<Utc>> {
        Utc.with_ymd_and_hms(self.year(), self.month(), self.day(), self.hour(), self.minute(), self.second())
    }

    /// Constructs this date & time from chrono's [`DateTime`] representation.
    ///
    /// Note that this requires the `chrono` feature.
    #[cfg(feature = "chrono")]
    pub fn from_chrono(value: &DateTime<Utc>) -> Self {
        ZipDateTimeBuilder::new()
            .year(value.year())
            .month(value.month())
            .day(value.day())
            .hour(value.hour())
            .minute(value.minute())
            .second(value.second())
            .build()
    }
}

impl From<ZipDateTimeBuilder> for ZipDateTime {
    fn from(builder: ZipDateTimeBuilder) -> Self {
        ZipDateTime::from_parts(builder.time, builder.date)
    }
}

#[cfg(feature = "chrono")]
impl From<DateTime<Utc>> for ZipDateTime {
    fn from(value: DateTime<Utc>) -> Self {
        ZipDateTime::from_chrono(&value)
    }
}
