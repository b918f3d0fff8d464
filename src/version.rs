// Copyright (c) 2024 Mike Tsao

//! Build identification for the CLI and for exported files.

/// The version string to show users: a version-control description if the
/// build recorded one, otherwise the crate version.
pub fn app_version() -> &'static str {
    option_env!("GIT_DESCRIBE")
        .or(option_env!("GIT_REV_PARSE"))
        .unwrap_or(env!("CARGO_PKG_VERSION"))
}
