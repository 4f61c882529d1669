// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Constants and small value types defined by the ZIP format itself.

pub mod compression;
pub(crate) mod consts;
pub mod encryption;
pub mod flags;
pub(crate) mod signature;
pub(crate) mod version;
