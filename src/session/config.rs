use crate::compile::opts::CompileOpts;
use crate::device::catalog::QualityProfile;
use crate::foundation::error::{FxGraphError, FxGraphResult};
use crate::resources::pool::ResourcePoolOpts;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Everything a [`Session`](crate::Session) is configured with.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SessionConfig {
    /// Graph compilation options.
    pub compile: CompileOpts,
    /// Pool prewarm options.
    pub pool: ResourcePoolOpts,
    /// Quality the selected device must serve.
    pub profile: QualityProfile,
    /// Overlay requirement: `Some(true)` demands overlay support.
    pub overlay: Option<bool>,
}

impl SessionConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FxGraphResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FxGraphError::serde(format!("parse session config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FxGraphResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FxGraphError::serde(format!("open session config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
