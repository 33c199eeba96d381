//! Crate-level operational errors.
//!
//! This is distinct from [`crate::diagnostics`]: `Error` covers failures in
//! the *host* operations around a compilation (loading a config file,
//! registering a source file, serializing a JSON dump). Diagnostics about
//! the Tau program being compiled (`symbol_collision`, `type_mismatch`, ...)
//! never become an `Error` — they accumulate in the error bag and are
//! returned as data instead, since routing them through `?`/`std::error::Error`
//! would mean a user-code type error aborts the compilation early rather
//! than getting collected alongside every other diagnostic.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("failed to read source file {path}: {source}")]
    SourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize AST dump: {0}")]
    Dump(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
