// Copyright (c) 2024 Mike Tsao

//! Engraving support: compiling a tune into a gapless staff, and rendering
//! that staff as text.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{compile, LilyPondRenderer, NotationUnit, Staff};
}

pub use compiler::{compile, NotationUnit, Staff};
pub use lilypond::LilyPondRenderer;

mod compiler;
mod lilypond;
