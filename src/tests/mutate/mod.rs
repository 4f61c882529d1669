// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub(crate) mod remove;
pub(crate) mod rename;
pub(crate) mod split;

use crate::mutate::MutationOptions;
use crate::progress::ProgressMonitor;

/// Deterministic, mostly incompressible content for an entry.
pub(crate) fn content(seed: u8, length: usize) -> Vec<u8> {
    (0..length).map(|index| (index as u32).wrapping_mul(31).wrapping_add(seed as u32) as u8).collect()
}

pub(crate) fn defaults() -> (MutationOptions, ProgressMonitor) {
    (MutationOptions::default(), ProgressMonitor::new())
}
