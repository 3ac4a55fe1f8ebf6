use crate::foundation::core::Canvas;
use std::fmt;

/// Convenience result type used across fxgraph.
pub type FxGraphResult<T> = Result<T, FxGraphError>;

/// Top-level error taxonomy.
///
/// Each class maps to a different fix: manifests ([`FxGraphError::Validation`]), the timeline
/// ([`FxGraphError::Compile`]) or the available hardware ([`FxGraphError::Resource`]).
#[derive(thiserror::Error, Debug)]
pub enum FxGraphError {
    /// One or more manifests were rejected at load time.
    #[error("manifest validation failed:\n{0}")]
    Validation(#[from] ValidationErrors),

    /// Compilation of a single frame graph failed.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// A required execution resource is unavailable.
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxGraphError {
    /// Build a [`FxGraphError::Validation`] value.
    pub fn validation(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }

    /// Build a [`FxGraphError::Compile`] value.
    pub fn compile(err: CompileError) -> Self {
        Self::Compile(err)
    }

    /// Build a [`FxGraphError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`FxGraphError::Compile`] wrapping [`CompileError::InvalidGraph`].
    pub fn invalid_graph(msg: impl Into<String>) -> Self {
        Self::Compile(CompileError::InvalidGraph(msg.into()))
    }
}

/// Stable, machine-readable manifest validation codes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationCode {
    /// The manifest id is declared by more than one source.
    DuplicateId,
    /// `schemaVersion` is not a supported value.
    UnsupportedSchema,
    /// Declared domain contradicts the id namespace.
    DomainMismatch,
    /// Domain omitted and the id namespace is unknown.
    DomainUnresolved,
    /// A parameter default falls outside its range, or the range is inverted.
    ParameterOutOfRange,
    /// A parameter default does not match its declared type.
    ParameterType,
    /// Declared ports violate the clip-effect contract.
    PortContract,
    /// A port name repeats where names must be unique.
    DuplicatePort,
    /// Pass wiring is inconsistent (unknown names, missing outputs, empty pass list).
    PassStructure,
    /// Passes depend on each other cyclically.
    PassCycle,
    /// A pass kernel is not among the available kernel symbols.
    UnresolvedKernel,
    /// The source document could not be parsed.
    MalformedManifest,
}

impl ValidationCode {
    /// Stable string form, suitable for logs and tooling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateId => "duplicate-id",
            Self::UnsupportedSchema => "unsupported-schema",
            Self::DomainMismatch => "domain-mismatch",
            Self::DomainUnresolved => "domain-unresolved",
            Self::ParameterOutOfRange => "parameter-out-of-range",
            Self::ParameterType => "parameter-type",
            Self::PortContract => "port-contract",
            Self::DuplicatePort => "duplicate-port",
            Self::PassStructure => "pass-structure",
            Self::PassCycle => "pass-cycle",
            Self::UnresolvedKernel => "unresolved-kernel",
            Self::MalformedManifest => "malformed-manifest",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejected-manifest record.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Source file or identifier the manifest came from.
    pub source: String,
    /// Feature id, when the document parsed far enough to know it.
    pub feature_id: Option<String>,
    /// Stable machine-readable code.
    pub code: ValidationCode,
    /// Human-readable detail.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(
        source: impl Into<String>,
        feature_id: Option<&str>,
        code: ValidationCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            feature_id: feature_id.map(str::to_owned),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.feature_id {
            Some(id) => write!(
                f,
                "{}: [{}] {}: {}",
                self.source, self.code, id, self.message
            ),
            None => write!(f, "{}: [{}] {}", self.source, self.code, self.message),
        }
    }
}

/// Every validation error collected by one load.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ValidationErrors {
    /// Errors in deterministic report order.
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Return `true` when nothing was rejected.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate collected errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Errors carrying `code`.
    pub fn with_code(&self, code: ValidationCode) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.code == code)
    }

    pub(crate) fn push(&mut self, e: ValidationError) {
        self.errors.push(e);
    }

    pub(crate) fn extend(&mut self, it: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(it);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// A dependency cycle between passes of one manifest.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("pass dependency cycle between: {}", .passes.join(", "))]
pub struct CycleError {
    /// Names of the passes on the cycle, in declaration order.
    pub passes: Vec<String>,
}

/// Errors that abort compilation of one frame graph.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum CompileError {
    /// A clip applies a feature the registry does not know.
    #[error("clip '{clip_id}' references unresolved feature '{feature_id}'")]
    UnresolvedFeature {
        /// The missing feature id.
        feature_id: String,
        /// The clip carrying the application.
        clip_id: String,
    },

    /// Ports, bindings or parameters do not line up with the manifest contract.
    #[error("contract mismatch in feature '{feature_id}': {detail}")]
    ContractMismatch {
        /// Feature being expanded.
        feature_id: String,
        /// What did not match.
        detail: String,
    },

    /// Passes inside a feature form a cycle.
    #[error("feature '{feature_id}': {cycle}")]
    PassCycle {
        /// Feature whose passes are cyclic.
        feature_id: String,
        /// Offending passes.
        cycle: CycleError,
    },

    /// The assembled graph violates a structural invariant.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// The query time is not a finite number.
    #[error("query time must be finite, got {0}")]
    InvalidTime(f64),
}

impl CompileError {
    pub(crate) fn contract(feature_id: &str, detail: impl Into<String>) -> Self {
        Self::ContractMismatch {
            feature_id: feature_id.to_owned(),
            detail: detail.into(),
        }
    }
}

/// Errors about execution resources.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ResourceError {
    /// No known backend satisfies the requested profile.
    #[error("no compatible device: requires {required}{}", overlay_note(.overlay))]
    NoCompatibleDevice {
        /// Required resolution ceiling.
        required: Canvas,
        /// Overlay requirement as requested (`None` means "don't care").
        overlay: Option<bool>,
    },

    /// A frame buffer would exceed the canvas or the selected device's resolution.
    #[error("image {size} exceeds the {ceiling} ceiling")]
    OversizedImage {
        /// Requested buffer size.
        size: Canvas,
        /// Largest size allowed.
        ceiling: Canvas,
    },
}

fn overlay_note(overlay: &Option<bool>) -> &'static str {
    match overlay {
        Some(true) => " with overlay support",
        _ => "",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
