/// Image dimensions in pixels.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas from explicit dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count.
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Return `true` when both dimensions fit inside `ceiling`.
    pub fn fits_within(self, ceiling: Canvas) -> bool {
        self.width <= ceiling.width && self.height <= ceiling.height
    }

    /// Scale both dimensions by `factor`, rounding up and never collapsing below one pixel.
    pub fn scaled(self, factor: f32) -> Self {
        if factor == 1.0 {
            return self;
        }
        let scale = |v: u32| -> u32 { ((v as f64) * f64::from(factor)).ceil().max(1.0) as u32 };
        Self {
            width: scale(self.width),
            height: scale(self.height),
        }
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel formats for intermediate images.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum PixelFormat {
    /// Premultiplied RGBA, 8 bits per channel.
    Rgba8Premul,
    /// RGBA half-float, the default working format.
    #[default]
    Rgba16Float,
    /// RGBA single-precision float.
    Rgba32Float,
}

impl PixelFormat {
    /// Bytes occupied by one pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8Premul => 4,
            Self::Rgba16Float => 8,
            Self::Rgba32Float => 16,
        }
    }
}

/// How a color space encodes light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorEncoding {
    /// Scene-linear values.
    Linear,
    /// Display-referred, transfer-function encoded values.
    Display,
}

/// Color spaces known to the compiler.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ColorSpace {
    /// ACEScg (AP1 primaries, linear).
    AcesCg,
    /// Rec.709 primaries, linear.
    LinearRec709,
    /// Rec.2020 primaries, linear.
    LinearRec2020,
    /// sRGB.
    Srgb,
    /// Rec.709 with BT.1886 transfer.
    Rec709,
    /// Display P3.
    DisplayP3,
    /// Rec.2020 with PQ transfer.
    Rec2020Pq,
}

impl ColorSpace {
    /// Encoding class of this space; drives input-transform selection.
    pub fn encoding(self) -> ColorEncoding {
        match self {
            Self::AcesCg | Self::LinearRec709 | Self::LinearRec2020 => ColorEncoding::Linear,
            Self::Srgb | Self::Rec709 | Self::DisplayP3 | Self::Rec2020Pq => {
                ColorEncoding::Display
            }
        }
    }
}

/// Straight (non-premultiplied) linear RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
}

/// Blend modes for layer composites.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum BlendMode {
    /// Source-over.
    #[default]
    Normal,
    /// Multiply.
    Multiply,
    /// Screen.
    Screen,
    /// Overlay.
    Overlay,
    /// Darken.
    Darken,
    /// Lighten.
    Lighten,
    /// Color dodge.
    ColorDodge,
    /// Color burn.
    ColorBurn,
    /// Soft light.
    SoftLight,
    /// Hard light.
    HardLight,
    /// Difference.
    Difference,
    /// Exclusion.
    Exclusion,
    /// Additive.
    Add,
}

impl BlendMode {
    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "colorDodge",
            Self::ColorBurn => "colorBurn",
            Self::SoftLight => "softLight",
            Self::HardLight => "hardLight",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Add => "add",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
