use crate::foundation::error::{FxGraphError, FxGraphResult, ValidationCode, ValidationError};
use crate::manifest::model::FeatureManifest;
use anyhow::Context as _;
use std::path::Path;

/// One manifest document and the identifier it is reported under.
///
/// A document holds either a single manifest object or an array of manifests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestSource {
    /// File path or other identifier; appears in every validation record.
    pub name: String,
    /// Raw JSON text.
    pub text: String,
}

impl ManifestSource {
    /// Wrap in-memory JSON text.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Wrap an already-built JSON value.
    pub fn from_value(name: impl Into<String>, value: &serde_json::Value) -> Self {
        Self::new(name, value.to_string())
    }

    /// Read one manifest document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> FxGraphResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        Ok(Self::new(path.display().to_string(), text))
    }

    /// Read every `*.json` document in `dir`, sorted by file name.
    pub fn read_dir(dir: impl AsRef<Path>) -> FxGraphResult<Vec<Self>> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("read manifest dir '{}'", dir.display()))?;
        for entry in entries {
            let entry = entry.map_err(|e| FxGraphError::Other(e.into()))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        paths.iter().map(Self::from_path).collect()
    }

    /// Parse the document into manifests.
    ///
    /// Elements of an array document are parsed independently: well-formed manifests are returned
    /// alongside a [`ValidationCode::MalformedManifest`] record for every element that is not.
    pub fn parse(&self) -> (Vec<FeatureManifest>, Vec<ValidationError>) {
        let value: serde_json::Value = match serde_json::from_str(&self.text) {
            Ok(v) => v,
            Err(e) => return (Vec::new(), vec![self.malformed(None, format!("invalid JSON: {e}"))]),
        };

        let (items, indexed) = match value {
            serde_json::Value::Array(items) => (items, true),
            other => (vec![other], false),
        };

        let mut manifests = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for (i, item) in items.into_iter().enumerate() {
            let id = item.get("id").and_then(|v| v.as_str()).map(str::to_owned);
            match serde_json::from_value::<FeatureManifest>(item) {
                Ok(m) => manifests.push(m),
                Err(e) => {
                    let message = if indexed {
                        format!("[{i}]: {e}")
                    } else {
                        e.to_string()
                    };
                    errors.push(self.malformed(id.as_deref(), message));
                }
            }
        }
        (manifests, errors)
    }

    fn malformed(&self, id: Option<&str>, message: String) -> ValidationError {
        ValidationError::new(&self.name, id, ValidationCode::MalformedManifest, message)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/source.rs"]
mod tests;
