// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::date::ZipDateTime;

/// A builder for [`ZipDateTime`].
///
/// Out-of-range components are masked to the width of their DOS field.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipDateTimeBuilder {
    pub(crate) date: u16,
    pub(crate) time: u16,
}

impl From<ZipDateTime> for ZipDateTimeBuilder {
    fn from(value: ZipDateTime) -> Self {
        Self { date: value.date(), time: value.time() }
    }
}

impl ZipDateTimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the year. Years before 1980 cannot be represented and are clamped to it.
    pub fn year(mut self, year: i32) -> Self {
        let offset = year.clamp(1980, 1980 + 0x7F) - 1980;
        self.date = (self.date & !0xFE00) | ((offset as u16) << 9);
        self
    }

    pub fn month(mut self, month: u32) -> Self {
        self.date = (self.date & !0x1E0) | (((month & 0xF) as u16) << 5);
        self
    }

    pub fn day(mut self, day: u32) -> Self {
        self.date = (self.date & !0x1F) | (day & 0x1F) as u16;
        self
    }

    pub fn hour(mut self, hour: u32) -> Self {
        self.time = (self.time & !0xF800) | (((hour & 0x1F) as u16) << 11);
        self
    }

    pub fn minute(mut self, minute: u32) -> Self {
        self.time = (self.time & !0x7E0) | (((minute & 0x3F) as u16) << 5);
        self
    }

    /// Sets the second.
    ///
    /// Note that MS-DOS has a maximum granularity of two seconds.
    pub fn second(mut self, second: u32) -> Self {
        self.time = (self.time & !0x1F) | ((second >> 1) & 0x1F) as u16;
        self
    }

    /// Consumes this builder and returns a final [`ZipDateTime`].
    pub fn build(self) -> ZipDateTime {
        self.into()
    }
}
