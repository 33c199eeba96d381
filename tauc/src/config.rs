//! Compiler configuration, loaded from an optional TOML file.
//!
//! A `serde`-mapped struct with `#[serde(default)]` leaves, loaded once at
//! startup and threaded through as plain data rather than globals.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Which warning-class diagnostics are promoted to hard errors.
///
/// Names match [`crate::diagnostics::kind::DiagnosticKind`]'s `name()`
/// strings (currently only `mixed_signedness` and `narrowing_conversion`
/// are warnings; anything else listed here is ignored).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompilerConfig {
    /// Warning kinds to promote to hard errors (exit-code-affecting).
    pub deny: Vec<String>,
    /// Emit `mixed_signedness` warnings at all.
    pub warn_mixed_signedness: bool,
    /// Emit `narrowing_conversion` warnings at all.
    pub warn_narrowing_conversion: bool,
    /// Initial bucket count for newly created scopes.
    pub scope_initial_buckets: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            deny: Vec::new(),
            warn_mixed_signedness: true,
            warn_narrowing_conversion: true,
            scope_initial_buckets: 8,
        }
    }
}

impl CompilerConfig {
    pub fn is_denied(&self, kind_name: &str) -> bool {
        self.deny.iter().any(|d| d == kind_name)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_warns_but_does_not_deny() {
        let cfg = CompilerConfig::default();
        assert!(cfg.warn_mixed_signedness);
        assert!(!cfg.is_denied("mixed_signedness"));
    }

    #[test]
    fn deny_list_matches_by_name() {
        let mut cfg = CompilerConfig::default();
        cfg.deny.push("mixed_signedness".to_string());
        assert!(cfg.is_denied("mixed_signedness"));
        assert!(!cfg.is_denied("narrowing_conversion"));
    }
}
