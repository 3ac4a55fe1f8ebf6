use crate::foundation::core::Canvas;
use crate::foundation::error::{FxGraphResult, ResourceError};

/// Execution backend families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Software rasterizer; always available.
    Cpu,
    /// Vulkan.
    Vulkan,
    /// Metal.
    Metal,
    /// Direct3D 12.
    Dx12,
}

/// What one execution backend can do.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDeviceCapabilities {
    /// Human-readable device name.
    pub name: String,
    /// Backend family.
    pub backend: BackendKind,
    /// Largest frame the device renders.
    pub max_resolution: Canvas,
    /// Whether the device can present a live overlay.
    pub supports_overlay: bool,
}

/// Requested output quality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QualityProfile {
    /// Quarter-HD previews (960x540).
    Proxy,
    /// 1920x1080.
    #[default]
    Hd,
    /// 3840x2160.
    Uhd,
    /// 4096x2160.
    Dci4k,
    /// Explicit resolution.
    Custom(Canvas),
}

impl QualityProfile {
    /// Resolution a device must reach to serve this profile.
    pub fn resolution(self) -> Canvas {
        match self {
            Self::Proxy => Canvas::new(960, 540),
            Self::Hd => Canvas::new(1920, 1080),
            Self::Uhd => Canvas::new(3840, 2160),
            Self::Dci4k => Canvas::new(4096, 2160),
            Self::Custom(c) => c,
        }
    }
}

/// Lists the devices available on this machine.
pub trait BackendProvider {
    /// Capability descriptors, in the provider's preferred order.
    fn devices(&self) -> Vec<RenderDeviceCapabilities>;
}

impl BackendProvider for [RenderDeviceCapabilities] {
    fn devices(&self) -> Vec<RenderDeviceCapabilities> {
        self.to_vec()
    }
}

impl BackendProvider for Vec<RenderDeviceCapabilities> {
    fn devices(&self) -> Vec<RenderDeviceCapabilities> {
        self.clone()
    }
}

/// Instantiates the backend behind a chosen descriptor.
pub trait BackendFactory {
    /// Backend handle produced by the factory.
    type Backend;

    /// Create the backend for `caps`.
    fn create(&self, caps: &RenderDeviceCapabilities) -> FxGraphResult<Self::Backend>;
}

/// Known devices and the selection policy over them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceCatalog {
    devices: Vec<RenderDeviceCapabilities>,
}

impl DeviceCatalog {
    /// Catalog over explicit descriptors.
    pub fn new(devices: Vec<RenderDeviceCapabilities>) -> Self {
        Self { devices }
    }

    /// Catalog over what `provider` reports.
    pub fn from_provider(provider: &(impl BackendProvider + ?Sized)) -> Self {
        Self::new(provider.devices())
    }

    /// Known devices in catalog order.
    pub fn devices(&self) -> &[RenderDeviceCapabilities] {
        &self.devices
    }

    /// Pick the strongest device that serves `profile`.
    ///
    /// A device qualifies when `profile`'s resolution fits within its ceiling and, for
    /// `overlay == Some(true)`, it supports overlays. Among qualifying devices the largest ceiling
    /// (by pixel count) wins, then overlay support, then catalog order.
    pub fn best_capabilities(
        &self,
        profile: QualityProfile,
        overlay: Option<bool>,
    ) -> Result<RenderDeviceCapabilities, ResourceError> {
        let required = profile.resolution();
        let mut best: Option<&RenderDeviceCapabilities> = None;
        for d in &self.devices {
            if !required.fits_within(d.max_resolution) {
                continue;
            }
            if overlay == Some(true) && !d.supports_overlay {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => {
                    (d.max_resolution.pixel_count(), d.supports_overlay)
                        > (b.max_resolution.pixel_count(), b.supports_overlay)
                }
            };
            if better {
                best = Some(d);
            }
        }

        match best {
            Some(d) => {
                tracing::debug!(device = %d.name, backend = ?d.backend, "selected device");
                Ok(d.clone())
            }
            None => Err(ResourceError::NoCompatibleDevice { required, overlay }),
        }
    }

    /// Select per `profile` and instantiate through `factory`.
    pub fn instantiate<F: BackendFactory>(
        &self,
        factory: &F,
        profile: QualityProfile,
        overlay: Option<bool>,
    ) -> FxGraphResult<F::Backend> {
        let caps = self.best_capabilities(profile, overlay)?;
        factory.create(&caps)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/device/catalog.rs"]
mod tests;
