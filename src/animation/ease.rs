/// Easing curve applied to normalized progress between two keyframes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ease {
    /// Constant rate.
    #[default]
    Linear,
    /// Quadratic, slow start.
    InQuad,
    /// Quadratic, slow finish.
    OutQuad,
    /// Quadratic, slow at both ends.
    InOutQuad,
    /// Cubic, slow start.
    InCubic,
    /// Cubic, slow finish.
    OutCubic,
    /// Cubic, slow at both ends.
    InOutCubic,
    /// Hermite `3t^2 - 2t^3`.
    Smoothstep,
}

impl Ease {
    /// Map progress `t` (clamped to `[0, 1]`) through the curve. Endpoints are fixed at 0 and 1.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => power_in(t, 2),
            Self::OutQuad => power_out(t, 2),
            Self::InOutQuad => power_in_out(t, 2),
            Self::InCubic => power_in(t, 3),
            Self::OutCubic => power_out(t, 3),
            Self::InOutCubic => power_in_out(t, 3),
            Self::Smoothstep => t * t * (3.0 - 2.0 * t),
        }
    }
}

fn power_in(t: f64, n: i32) -> f64 {
    t.powi(n)
}

fn power_out(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

// Two half-speed halves joined at (0.5, 0.5).
fn power_in_out(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        power_in(2.0 * t, n) / 2.0
    } else {
        0.5 + power_out(2.0 * t - 1.0, n) / 2.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
