// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::EditorSettings;
}

pub use mod_serial::ModSerial;
pub use settings::EditorSettings;

mod mod_serial;
mod settings;
