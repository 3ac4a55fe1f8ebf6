//! Declarative feature manifests.
//!
//! A manifest describes one operation: its external ports, its parameters, and the passes that
//! implement it. Manifests are pure data; validation lives in the registry.

/// The only schema version this crate understands.
pub const SCHEMA_VERSION_1: u32 = 1;

/// Schema versions accepted by the registry. Anything else fails closed.
pub const SUPPORTED_SCHEMA_VERSIONS: &[u32] = &[SCHEMA_VERSION_1];

/// Port name every image-consuming clip effect must use for its primary input.
pub const PRIMARY_INPUT: &str = "source";

/// Largest accepted pass `scale`; passes may render below the canvas resolution, never above it.
pub const MAX_PASS_SCALE: f32 = 1.0;

/// One registrable operation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeatureManifest {
    /// Globally unique id, namespaced with a dotted prefix (e.g. `fx.blur`).
    pub id: String,
    /// Manifest schema version.
    pub schema_version: u32,
    /// Optional declared feature version, used as a secondary registration sort key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Declared domain. When omitted it is inferred from the id namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    /// External input ports.
    #[serde(default)]
    pub inputs: Vec<PortDecl>,
    /// External output ports. The first one is the feature's tail output.
    #[serde(default)]
    pub outputs: Vec<PortDecl>,
    /// Tunable parameters.
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    /// Execution passes in declaration order.
    pub passes: Vec<PassDecl>,
}

impl FeatureManifest {
    /// Domain implied by the id namespace, if the namespace is known.
    pub fn inferred_domain(&self) -> Option<Domain> {
        Domain::infer_from_id(&self.id)
    }

    /// Declared domain, falling back to the inferred one.
    pub fn effective_domain(&self) -> Option<Domain> {
        self.domain.or_else(|| self.inferred_domain())
    }

    /// Look up a declared input port.
    pub fn input(&self, name: &str) -> Option<&PortDecl> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Type of the external input a pass reads as `name`.
    ///
    /// A manifest that declares no inputs still receives the clip image as an implicit
    /// [`PRIMARY_INPUT`].
    pub fn external_input(&self, name: &str) -> Option<PortType> {
        match self.input(name) {
            Some(decl) => Some(decl.ty),
            None if self.inputs.is_empty() && name == PRIMARY_INPUT => Some(PortType::Image),
            None => None,
        }
    }

    /// Look up a declared parameter.
    pub fn parameter(&self, name: &str) -> Option<&ParameterDecl> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// First declared manifest output; spliced into the parent graph when present.
    ///
    /// Without declared outputs the feature compiler falls back to the first output of the last
    /// scheduled pass.
    pub fn primary_output(&self) -> Option<&str> {
        self.outputs.first().map(|o| o.name.as_str())
    }
}

/// Operation domain.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Image operations applied to clips.
    Video,
    /// Audio operations; never spliced into a frame graph.
    Audio,
    /// Engine-internal operations (color transforms, compositors).
    Intrinsic,
}

impl Domain {
    /// Infer a domain from the namespace prefix of `id` (the text before the first `.`).
    pub fn infer_from_id(id: &str) -> Option<Domain> {
        let (prefix, rest) = id.split_once('.')?;
        if rest.is_empty() {
            return None;
        }
        match prefix {
            "fx" | "video" | "color" | "gen" | "transition" => Some(Domain::Video),
            "audio" | "afx" => Some(Domain::Audio),
            "intrinsic" | "core" => Some(Domain::Intrinsic),
            _ => None,
        }
    }

    /// Lowercase name as it appears in manifests.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Intrinsic => "intrinsic",
        }
    }
}

/// Declared external port.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortDecl {
    /// Port name.
    pub name: String,
    /// Port data type.
    #[serde(rename = "type")]
    pub ty: PortType,
}

/// Data carried by a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    /// Color image in the working space.
    Image,
    /// Single-channel matte supplied as a named resource.
    Mask,
    /// Audio buffer.
    Audio,
}

impl PortType {
    /// Lowercase name as it appears in manifests.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Mask => "mask",
            Self::Audio => "audio",
        }
    }
}

/// Parameter value types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// 64-bit float.
    Float,
    /// 64-bit signed integer.
    Int,
    /// Boolean flag.
    Bool,
}

/// A concrete parameter value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
}

impl ParamValue {
    /// Numeric view of the value; `None` for booleans.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Bool(_) => None,
            Self::Int(v) => Some(v as f64),
            Self::Float(v) => Some(v),
        }
    }

    /// Whether this value is acceptable for `ty`. Integers are accepted where floats are expected.
    pub fn conforms_to(self, ty: ParamType) -> bool {
        matches!(
            (self, ty),
            (Self::Bool(_), ParamType::Bool)
                | (Self::Int(_), ParamType::Int)
                | (Self::Int(_), ParamType::Float)
                | (Self::Float(_), ParamType::Float)
        )
    }

    /// Convert a numeric value into the canonical representation of `ty`.
    pub(crate) fn coerce_numeric(v: f64, ty: ParamType) -> Self {
        match ty {
            ParamType::Int => Self::Int(v.round() as i64),
            _ => Self::Float(v),
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// Declared parameter with default and optional numeric range.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDecl {
    /// Parameter name.
    pub name: String,
    /// Value type.
    #[serde(rename = "type")]
    pub ty: ParamType,
    /// Default value; must lie within `[min, max]`.
    pub default: ParamValue,
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ParameterDecl {
    /// Clamp a numeric value into the declared range.
    pub fn clamp(&self, v: f64) -> f64 {
        let v = self.min.map_or(v, |lo| v.max(lo));
        self.max.map_or(v, |hi| v.min(hi))
    }

    /// Whether `v` lies within the declared range.
    pub fn in_range(&self, v: f64) -> bool {
        self.min.is_none_or(|lo| v >= lo) && self.max.is_none_or(|hi| v <= hi)
    }
}

/// One execution step.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PassDecl {
    /// Logical pass name, unique within the manifest.
    pub name: String,
    /// Kernel symbol resolved against the kernel table.
    pub kernel: String,
    /// Named inputs; the first is the primary input.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Named outputs.
    #[serde(default)]
    pub outputs: Vec<String>,
    /// Output resolution relative to the frame canvas.
    #[serde(default = "default_scale")]
    pub scale: f32,
}

impl PassDecl {
    /// Primary input name, if the pass has inputs.
    pub fn primary_input(&self) -> Option<&str> {
        self.inputs.first().map(String::as_str)
    }
}

fn default_scale() -> f32 {
    1.0
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/model.rs"]
mod tests;
