//! Deterministic run identity.
//!
//! Two runs with identical configurations hash to the same id, which makes
//! exported artifacts content-addressable.

use crate::config::RunConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content hash of a run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for file names and logs.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash a configuration to its run id.
///
/// Serialization is canonical because struct field order is fixed; any
/// change to the config type intentionally changes every id.
pub fn fingerprint(config: &RunConfig) -> RunId {
    let json = serde_json::to_string(config).expect("RunConfig serialization cannot fail");
    RunId(blake3::hash(json.as_bytes()).to_hex().to_string())
}
