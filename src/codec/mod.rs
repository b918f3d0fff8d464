// Copyright (c) 2024 Mike Tsao

//! Getting tunes in and out: shareable seeds, LMMS patterns, and MIDI files.

/// The most commonly used imports.
pub mod prelude {
    pub use super::SeedError;
}

pub use seed::{decode as decode_seed, encode as encode_seed, SeedError, SEED_TAG, SEED_VERSION};

pub mod midi;
pub mod seed;
pub mod xpt;

/// Turns a title into something that names a file without naming a
/// directory: path separators and control characters become underscores.
fn safe_file_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
