use std::collections::BTreeMap;

/// Opaque handle to a compiled kernel function, stable for one [`KernelTable`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct KernelHandle(pub u32);

/// Capability exposed by the execution backend: the kernel symbols it has compiled.
pub trait KernelSymbols {
    /// Every available kernel symbol. Order and duplicates do not matter.
    fn kernel_symbols(&self) -> Vec<String>;
}

impl KernelSymbols for [&str] {
    fn kernel_symbols(&self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl KernelSymbols for Vec<String> {
    fn kernel_symbols(&self) -> Vec<String> {
        self.clone()
    }
}

/// Explicit `name -> handle` table, populated once at startup.
///
/// Handles are assigned in sorted-name order so two processes that see the same symbol set agree
/// on every handle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KernelTable {
    by_name: BTreeMap<String, KernelHandle>,
    names: Vec<String>,
}

impl KernelTable {
    /// Build from the backend's symbol capability.
    pub fn from_symbols(symbols: &(impl KernelSymbols + ?Sized)) -> Self {
        Self::from_names(symbols.kernel_symbols())
    }

    /// Build from any list of names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        let by_name = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), KernelHandle(i as u32)))
            .collect();
        Self { by_name, names }
    }

    /// Resolve a kernel reference.
    pub fn resolve(&self, name: &str) -> Option<KernelHandle> {
        self.by_name.get(name).copied()
    }

    /// Symbol name for a handle.
    pub fn name(&self, handle: KernelHandle) -> Option<&str> {
        self.names.get(handle.0 as usize).map(String::as_str)
    }

    /// Number of known kernels.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Return `true` when no kernels are known.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/kernels.rs"]
mod tests;
