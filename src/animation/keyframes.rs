use crate::animation::ease::Ease;

/// One numeric keyframe in clip-local seconds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Clip-local time of this key, in seconds.
    pub time: f64,
    /// Value at `time`.
    pub value: f64,
    /// Easing applied toward the next key.
    #[serde(default)]
    pub ease: Ease,
}

/// Interpolation strategy between keyframes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterpMode {
    /// Hold the previous key value until the next keyframe.
    Hold,
    /// Interpolate between keyframes using [`Ease`].
    #[default]
    Linear,
}

/// Keyframed numeric parameter track.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Keyframes {
    /// Keys sorted by `time`.
    pub keyframes: Vec<Keyframe>,
    /// Interpolation mode between adjacent keys.
    #[serde(default)]
    pub interp: InterpMode,
}

impl Keyframes {
    /// Check ordering and finiteness. Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.keyframes.is_empty() {
            return Err("keyframes must contain at least one key".to_string());
        }
        if self
            .keyframes
            .iter()
            .any(|k| !k.time.is_finite() || !k.value.is_finite())
        {
            return Err("keyframe times and values must be finite".to_string());
        }
        if !self.keyframes.windows(2).all(|w| w[0].time <= w[1].time) {
            return Err("keyframes must be sorted by time".to_string());
        }
        Ok(())
    }

    /// Sample at clip-local time `t` (seconds). Holds the first/last value outside the keyed span.
    pub fn sample(&self, t: f64) -> f64 {
        let keys = &self.keyframes;
        let Some(first) = keys.first() else {
            return 0.0;
        };

        let idx = keys.partition_point(|k| k.time <= t);
        if idx == 0 {
            return first.value;
        }
        if idx >= keys.len() {
            return keys[keys.len() - 1].value;
        }

        let a = &keys[idx - 1];
        let b = &keys[idx];
        let span = b.time - a.time;
        if span <= 0.0 {
            return a.value;
        }

        match self.interp {
            InterpMode::Hold => a.value,
            InterpMode::Linear => {
                let te = a.ease.apply((t - a.time) / span);
                a.value + (b.value - a.value) * te
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframes.rs"]
mod tests;
