use crate::foundation::error::{ValidationCode, ValidationError};
use crate::manifest::model::{
    Domain, FeatureManifest, MAX_PASS_SCALE, PRIMARY_INPUT, PortType, SUPPORTED_SCHEMA_VERSIONS,
};
use crate::registry::kernels::KernelTable;
use crate::schedule::scheduler;
use std::collections::{BTreeMap, BTreeSet};

/// Collects every error for one manifest; never stops at the first failure.
struct Collector<'a> {
    source: &'a str,
    feature_id: &'a str,
    errors: Vec<ValidationError>,
}

impl Collector<'_> {
    fn push(&mut self, code: ValidationCode, message: impl Into<String>) {
        self.errors.push(ValidationError::new(
            self.source,
            Some(self.feature_id),
            code,
            message,
        ));
    }
}

/// Validate one manifest against everything except id uniqueness, which needs the whole load.
pub(crate) fn validate_manifest(
    source: &str,
    m: &FeatureManifest,
    kernels: &KernelTable,
) -> Vec<ValidationError> {
    let mut c = Collector {
        source,
        feature_id: &m.id,
        errors: Vec::new(),
    };

    if m.id.trim().is_empty() {
        c.push(ValidationCode::MalformedManifest, "id must be non-empty");
    }

    if !SUPPORTED_SCHEMA_VERSIONS.contains(&m.schema_version) {
        c.push(
            ValidationCode::UnsupportedSchema,
            format!(
                "schemaVersion {} is not supported (supported: {:?})",
                m.schema_version, SUPPORTED_SCHEMA_VERSIONS
            ),
        );
    }

    validate_domain(&mut c, m);
    validate_parameters(&mut c, m);
    validate_ports(&mut c, m);
    validate_passes(&mut c, m);

    for pass in &m.passes {
        if kernels.resolve(&pass.kernel).is_none() {
            c.push(
                ValidationCode::UnresolvedKernel,
                format!(
                    "pass '{}': kernel '{}' is not available",
                    pass.name, pass.kernel
                ),
            );
        }
    }

    c.errors
}

fn validate_domain(c: &mut Collector<'_>, m: &FeatureManifest) {
    match (m.domain, m.inferred_domain()) {
        (Some(declared), Some(inferred)) if declared != inferred => c.push(
            ValidationCode::DomainMismatch,
            format!(
                "declared domain '{}' contradicts '{}' implied by the id namespace",
                declared.as_str(),
                inferred.as_str()
            ),
        ),
        (None, None) => c.push(
            ValidationCode::DomainUnresolved,
            "domain omitted and the id namespace does not imply one",
        ),
        _ => {}
    }
}

fn validate_parameters(c: &mut Collector<'_>, m: &FeatureManifest) {
    let mut seen = BTreeSet::new();
    for p in &m.parameters {
        if !seen.insert(p.name.as_str()) {
            c.push(
                ValidationCode::DuplicatePort,
                format!("parameter '{}' is declared twice", p.name),
            );
        }

        if !p.default.conforms_to(p.ty) {
            c.push(
                ValidationCode::ParameterType,
                format!(
                    "parameter '{}': default {} does not match type {:?}",
                    p.name, p.default, p.ty
                ),
            );
            continue;
        }

        if let (Some(lo), Some(hi)) = (p.min, p.max)
            && lo > hi
        {
            c.push(
                ValidationCode::ParameterOutOfRange,
                format!("parameter '{}': min {lo} exceeds max {hi}", p.name),
            );
            continue;
        }

        if let Some(v) = p.default.as_f64() {
            if !v.is_finite() || !p.in_range(v) {
                c.push(
                    ValidationCode::ParameterOutOfRange,
                    format!(
                        "parameter '{}': default {} outside [{}, {}]",
                        p.name,
                        p.default,
                        fmt_bound(p.min),
                        fmt_bound(p.max)
                    ),
                );
            }
        } else if p.min.is_some() || p.max.is_some() {
            c.push(
                ValidationCode::ParameterType,
                format!("parameter '{}': ranges only apply to numbers", p.name),
            );
        }
    }
}

fn fmt_bound(b: Option<f64>) -> String {
    b.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn validate_ports(c: &mut Collector<'_>, m: &FeatureManifest) {
    for (kind, ports) in [("input", &m.inputs), ("output", &m.outputs)] {
        let mut seen = BTreeSet::new();
        for p in ports {
            if !seen.insert(p.name.as_str()) {
                c.push(
                    ValidationCode::DuplicatePort,
                    format!("{kind} port '{}' is declared twice", p.name),
                );
            }
        }
    }

    // Clip effects: exactly one image input named `source` (masks ride alongside as secondary
    // resources), or no inputs at all for a pure generator.
    if m.effective_domain() != Some(Domain::Video) || m.inputs.is_empty() {
        return;
    }
    let images: Vec<&str> = m
        .inputs
        .iter()
        .filter(|p| p.ty == PortType::Image)
        .map(|p| p.name.as_str())
        .collect();
    let has_foreign = m
        .inputs
        .iter()
        .any(|p| p.ty != PortType::Image && p.ty != PortType::Mask);

    if images != [PRIMARY_INPUT] || has_foreign {
        let actual: Vec<String> = m
            .inputs
            .iter()
            .map(|p| format!("{}:{}", p.name, p.ty.as_str()))
            .collect();
        c.push(
            ValidationCode::PortContract,
            format!(
                "clip effect must declare exactly one image input named '{PRIMARY_INPUT}' \
                 (plus optional mask inputs) or no inputs; found [{}]",
                actual.join(", ")
            ),
        );
    }
}

fn validate_passes(c: &mut Collector<'_>, m: &FeatureManifest) {
    if m.passes.is_empty() {
        c.push(ValidationCode::PassStructure, "manifest declares no passes");
        return;
    }

    let mut pass_names = BTreeSet::new();
    let mut producers = BTreeMap::<&str, &str>::new();
    for pass in &m.passes {
        if !pass_names.insert(pass.name.as_str()) {
            c.push(
                ValidationCode::DuplicatePort,
                format!("pass name '{}' is declared twice", pass.name),
            );
        }

        for (kind, names) in [("input", &pass.inputs), ("output", &pass.outputs)] {
            let mut seen = BTreeSet::new();
            for n in names {
                if !seen.insert(n.as_str()) {
                    c.push(
                        ValidationCode::DuplicatePort,
                        format!("pass '{}': {kind} '{n}' is listed twice", pass.name),
                    );
                }
            }
        }

        if pass.outputs.is_empty() {
            c.push(
                ValidationCode::PassStructure,
                format!("pass '{}' declares no outputs", pass.name),
            );
        }
        if !pass.scale.is_finite() || pass.scale <= 0.0 || pass.scale > MAX_PASS_SCALE {
            c.push(
                ValidationCode::PassStructure,
                format!(
                    "pass '{}': scale {} outside (0, {MAX_PASS_SCALE}]",
                    pass.name, pass.scale
                ),
            );
        }

        for out in &pass.outputs {
            if m.external_input(out).is_some() {
                c.push(
                    ValidationCode::PassStructure,
                    format!(
                        "pass '{}': output '{out}' shadows a manifest input",
                        pass.name
                    ),
                );
            }
            if let Some(prev) = producers.insert(out.as_str(), pass.name.as_str())
                && prev != pass.name
            {
                c.push(
                    ValidationCode::PassStructure,
                    format!(
                        "output '{out}' is produced by both '{prev}' and '{}'",
                        pass.name
                    ),
                );
            }
        }
    }

    for pass in &m.passes {
        for input in &pass.inputs {
            if !producers.contains_key(input.as_str()) && m.external_input(input).is_none() {
                c.push(
                    ValidationCode::PassStructure,
                    format!(
                        "pass '{}': input '{input}' is neither a manifest input nor a sibling output",
                        pass.name
                    ),
                );
            }
        }
    }

    for out in &m.outputs {
        if !producers.contains_key(out.name.as_str()) {
            c.push(
                ValidationCode::PassStructure,
                format!("declared output '{}' is not produced by any pass", out.name),
            );
        }
    }

    if let Err(cycle) = scheduler::order(&m.passes) {
        c.push(ValidationCode::PassCycle, cycle.to_string());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/validate.rs"]
mod tests;
