use crate::foundation::core::{Canvas, ColorSpace, PixelFormat, Rgba};

/// Per-session compile configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CompileOpts {
    /// Frame canvas; pass scales are relative to it.
    pub canvas: Canvas,
    /// Format of intermediate images.
    pub pixel_format: PixelFormat,
    /// Working color space every source is converted into.
    pub working_space: ColorSpace,
    /// Color space of the delivered frame.
    pub deliverable: ColorSpace,
    /// Background used when no video track is active. `None` means opaque black.
    pub fallback: Option<Rgba>,
}

impl Default for CompileOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::new(1920, 1080),
            pixel_format: PixelFormat::Rgba16Float,
            working_space: ColorSpace::AcesCg,
            deliverable: ColorSpace::Rec709,
            fallback: None,
        }
    }
}

impl CompileOpts {
    /// Effective fallback background.
    pub fn fallback_color(&self) -> Rgba {
        self.fallback.unwrap_or(Rgba::BLACK)
    }
}
