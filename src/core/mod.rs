// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Byte-exact wire records.
//!
//! Each module defines the fixed-size portion of a record through [`raw!`], alongside functions which read and write
//! the whole record (signature and variable-length trailers included). No interpretation happens at this level;
//! see [`crate::model`] for the resolved forms.

pub mod cdr;
pub mod dd;
pub mod ds;
pub mod edf;
pub mod eocdr;
pub mod lfh;
pub mod zip64;

macro_rules! raw {
    ($name:ident { $($field:ident, $type:ty, $read:expr, $write:expr),* }) => {
        #[allow(unused_imports)]
        use crate::error::Result;
        #[allow(unused_imports)]
        use futures_lite::io::{AsyncRead, AsyncWrite};

        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $name {
            $(pub $field : $type),*
        }

        /// Reads the raw underlying header from the given reader.
        #[tracing::instrument(skip(reader))]
        pub async fn raw_read(mut reader: impl AsyncRead + Unpin) -> Result<$name> {
            Ok($name {
                $($field : $read(&mut reader).await? ),*
            })
        }

        /// Writes the raw underlying header to the given writer.
        #[tracing::instrument(skip(writer, raw))]
        pub async fn raw_write(mut writer: impl AsyncWrite + Unpin, raw: &$name) -> Result<()> {
            $($write(&mut writer, raw.$field).await?;)*
            Ok(())
        }
    }
}

macro_rules! raw_deref {
    ($from:ident, $to:ident) => {
        impl std::ops::Deref for $from {
            type Target = $to;

            fn deref(&self) -> &Self::Target {
                &self.raw
            }
        }

        impl std::ops::DerefMut for $from {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.raw
            }
        }
    };
}

pub(crate) use raw;
pub(crate) use raw_deref;
