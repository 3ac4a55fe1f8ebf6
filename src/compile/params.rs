use crate::animation::keyframes::Keyframes;
use crate::foundation::error::CompileError;
use crate::manifest::model::{FeatureManifest, ParamType, ParamValue};
use std::collections::BTreeMap;

/// A parameter value supplied by a feature application.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamInput {
    /// Constant value.
    Value(ParamValue),
    /// Numeric value sampled at clip-local time.
    Keyframed(Keyframes),
}

impl From<ParamValue> for ParamInput {
    fn from(v: ParamValue) -> Self {
        Self::Value(v)
    }
}

impl From<f64> for ParamInput {
    fn from(v: f64) -> Self {
        Self::Value(ParamValue::Float(v))
    }
}

/// Overlay `supplied` onto the manifest defaults, sampling keyframes at `local_time`.
///
/// Unknown names and type mismatches fail; numeric values are clamped into the declared range.
pub(crate) fn resolve_params(
    manifest: &FeatureManifest,
    supplied: &BTreeMap<String, ParamInput>,
    local_time: f64,
) -> Result<BTreeMap<String, ParamValue>, CompileError> {
    let mut out: BTreeMap<String, ParamValue> = manifest
        .parameters
        .iter()
        .map(|p| (p.name.clone(), p.default))
        .collect();

    for (name, input) in supplied {
        let Some(decl) = manifest.parameter(name) else {
            return Err(CompileError::contract(
                &manifest.id,
                format!("unknown parameter '{name}'"),
            ));
        };

        let value = match input {
            ParamInput::Value(v) => *v,
            ParamInput::Keyframed(k) => {
                if decl.ty == ParamType::Bool {
                    return Err(CompileError::contract(
                        &manifest.id,
                        format!("parameter '{name}' is a bool and cannot be keyframed"),
                    ));
                }
                k.validate().map_err(|reason| {
                    CompileError::contract(&manifest.id, format!("parameter '{name}': {reason}"))
                })?;
                ParamValue::coerce_numeric(k.sample(local_time), decl.ty)
            }
        };

        if !value.conforms_to(decl.ty) {
            return Err(CompileError::contract(
                &manifest.id,
                format!("parameter '{name}' expects {:?}, got {value}", decl.ty),
            ));
        }

        let value = match value.as_f64() {
            Some(v) if !v.is_finite() => {
                return Err(CompileError::contract(
                    &manifest.id,
                    format!("parameter '{name}' must be finite"),
                ));
            }
            Some(v) if !decl.in_range(v) => {
                let clamped = decl.clamp(v);
                tracing::debug!(
                    feature = %manifest.id,
                    param = %name,
                    requested = v,
                    clamped,
                    "clamped parameter into declared range"
                );
                ParamValue::coerce_numeric(clamped, decl.ty)
            }
            Some(v) => ParamValue::coerce_numeric(v, decl.ty),
            None => value,
        };
        out.insert(name.clone(), value);
    }

    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/compile/params.rs"]
mod tests;
