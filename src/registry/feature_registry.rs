use crate::foundation::error::{ValidationCode, ValidationError, ValidationErrors};
use crate::manifest::model::{Domain, FeatureManifest};
use crate::manifest::source::ManifestSource;
use crate::registry::kernels::{KernelHandle, KernelTable};
use crate::registry::validate::validate_manifest;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A manifest that passed validation, with its load-time resolutions.
#[derive(Clone, Debug)]
pub struct RegisteredFeature {
    /// The immutable manifest.
    pub manifest: Arc<FeatureManifest>,
    /// Source the manifest was loaded from.
    pub source: String,
    /// Declared or inferred domain.
    pub domain: Domain,
    /// Resolved kernel per pass, in declaration order.
    pub kernels: Vec<KernelHandle>,
}

impl RegisteredFeature {
    /// Feature id.
    pub fn id(&self) -> &str {
        &self.manifest.id
    }
}

/// Session-scoped feature registry.
///
/// Append-only within a session; [`FeatureRegistry::reload`] is the only way to drop entries.
/// Entries are kept sorted by id, then declared version, so the internal order never depends on
/// the order sources were supplied in.
#[derive(Clone, Debug, Default)]
pub struct FeatureRegistry {
    kernels: KernelTable,
    entries: Vec<RegisteredFeature>,
    index: BTreeMap<String, usize>,
}

struct Candidate {
    source: String,
    manifest: FeatureManifest,
}

impl FeatureRegistry {
    /// Empty registry validating kernels against `kernels`.
    pub fn new(kernels: KernelTable) -> Self {
        Self {
            kernels,
            entries: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Load `sources`, failing when any manifest is rejected.
    ///
    /// The error carries every rejection, not just the first.
    pub fn load(
        sources: &[ManifestSource],
        kernels: KernelTable,
    ) -> Result<Self, ValidationErrors> {
        let (registry, errors) = Self::load_report(sources, kernels);
        if errors.is_empty() {
            Ok(registry)
        } else {
            Err(errors)
        }
    }

    /// Load `sources`, registering every valid manifest and reporting every rejected one.
    pub fn load_report(
        sources: &[ManifestSource],
        kernels: KernelTable,
    ) -> (Self, ValidationErrors) {
        let mut registry = Self::new(kernels);
        let errors = registry.append(sources);
        (registry, errors)
    }

    /// Drop every entry and load `sources` from scratch.
    pub fn reload(&mut self, sources: &[ManifestSource]) -> ValidationErrors {
        self.entries.clear();
        self.index.clear();
        self.append(sources)
    }

    /// Register the valid manifests from `sources`.
    ///
    /// An id declared more than once across `sources`, or already registered, is rejected with a
    /// single `duplicate-id` error and none of its declarations is registered.
    #[tracing::instrument(skip_all, fields(sources = sources.len()))]
    pub fn append(&mut self, sources: &[ManifestSource]) -> ValidationErrors {
        let mut ordered: Vec<&ManifestSource> = sources.iter().collect();
        ordered.sort_by(|a, b| a.name.cmp(&b.name));

        // Parsing is independent per document; results are collected back in sorted order.
        let parsed: Vec<(Vec<FeatureManifest>, Vec<ValidationError>)> =
            ordered.par_iter().map(|s| s.parse()).collect();

        let mut errors = ValidationErrors::default();
        let mut by_id = BTreeMap::<String, Vec<Candidate>>::new();
        for (src, (manifests, parse_errors)) in ordered.iter().zip(parsed) {
            errors.extend(parse_errors);
            for manifest in manifests {
                by_id.entry(manifest.id.clone()).or_default().push(Candidate {
                    source: src.name.clone(),
                    manifest,
                });
            }
        }

        let mut added = 0usize;
        for (id, candidates) in by_id {
            let mut invalid = false;
            for cand in &candidates {
                let found = validate_manifest(&cand.source, &cand.manifest, &self.kernels);
                invalid |= !found.is_empty();
                errors.extend(found);
            }

            let existing = self.index.get(&id).map(|&i| self.entries[i].source.as_str());
            if existing.is_some() || candidates.len() > 1 {
                let mut srcs: Vec<&str> = candidates.iter().map(|c| c.source.as_str()).collect();
                srcs.sort_unstable();
                srcs.dedup();
                let message = match existing {
                    Some(prev) => format!("id is already registered from '{prev}'"),
                    None => format!("id is declared {} times", candidates.len()),
                };
                errors.push(ValidationError::new(
                    srcs.join(", "),
                    Some(&id),
                    ValidationCode::DuplicateId,
                    message,
                ));
                continue;
            }
            if invalid {
                continue;
            }

            let Some(cand) = candidates.into_iter().next() else {
                continue;
            };
            let Some(domain) = cand.manifest.effective_domain() else {
                continue;
            };
            let kernels = cand
                .manifest
                .passes
                .iter()
                .filter_map(|p| self.kernels.resolve(&p.kernel))
                .collect();
            tracing::debug!(feature = %id, source = %cand.source, "registered feature");
            self.entries.push(RegisteredFeature {
                manifest: Arc::new(cand.manifest),
                source: cand.source,
                domain,
                kernels,
            });
            added += 1;
        }

        if added > 0 {
            self.reindex();
        }
        tracing::debug!(added, rejected = errors.len(), "manifest load finished");
        errors
    }

    fn reindex(&mut self) {
        self.entries.sort_by(|a, b| {
            a.manifest
                .id
                .cmp(&b.manifest.id)
                .then_with(|| a.manifest.version.cmp(&b.manifest.version))
        });
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.manifest.id.clone(), i))
            .collect();
    }

    /// Look up a registered feature.
    pub fn get(&self, id: &str) -> Option<&RegisteredFeature> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    /// Return `true` when `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Registered features in registration order (id, then version).
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredFeature> {
        self.entries.iter()
    }

    /// Number of registered features.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Kernel table used for validation.
    pub fn kernels(&self) -> &KernelTable {
        &self.kernels
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/feature_registry.rs"]
mod tests;
