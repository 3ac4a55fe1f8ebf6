//! Read-only editing model consumed by the timeline compiler.
//!
//! Clip ordering and non-overlap within a track are guaranteed by the editor that produced the
//! timeline; the compiler relies on both.

use crate::compile::params::ParamInput;
use crate::foundation::core::{BlendMode, ColorSpace};
use crate::foundation::error::{FxGraphError, FxGraphResult};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Ordered tracks, bottom first.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// Tracks from bottom to top.
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Timeline {
    /// Parse a timeline from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FxGraphResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FxGraphError::serde(format!("parse timeline JSON: {e}")))
    }

    /// Parse a timeline from JSON text.
    pub fn from_json_str(s: &str) -> FxGraphResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| FxGraphError::serde(format!("parse timeline JSON: {e}")))
    }

    /// Parse a timeline from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FxGraphResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FxGraphError::serde(format!("open timeline JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

/// Track media kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Image track; contributes to the frame graph.
    #[default]
    Video,
    /// Audio track; ignored by the frame graph.
    Audio,
}

/// One layer of the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Track id.
    pub id: String,
    /// Media kind.
    #[serde(default)]
    pub kind: TrackKind,
    /// Muted tracks are skipped.
    #[serde(default)]
    pub muted: bool,
    /// How this track blends over the tracks below it.
    #[serde(default)]
    pub blend: BlendMode,
    /// Track opacity, multiplied with the clip opacity.
    #[serde(default = "one")]
    pub opacity: f64,
    /// Clips sorted by start time, non-overlapping.
    #[serde(default)]
    pub clips: Vec<Clip>,
}

impl Track {
    /// Clip covering timeline time `at`, if any. Active ranges are half-open.
    pub fn active_clip(&self, at: f64) -> Option<&Clip> {
        let idx = self.clips.partition_point(|c| c.start_time <= at);
        let clip = self.clips.get(idx.checked_sub(1)?)?;
        clip.is_active(at).then_some(clip)
    }
}

/// A placed media segment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    /// Clip id, reported in compile errors.
    pub id: String,
    /// Media the clip plays.
    pub asset: AssetRef,
    /// Timeline time the clip starts at, in seconds.
    pub start_time: f64,
    /// Length on the timeline, in seconds.
    pub duration: f64,
    /// Offset into the media at `start_time`, in seconds.
    #[serde(default)]
    pub offset: f64,
    /// Clip opacity.
    #[serde(default = "one")]
    pub opacity: f64,
    /// Feature applications, applied in order.
    #[serde(default)]
    pub features: Vec<FeatureApplication>,
    /// Transition running at the head of the clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_in: Option<TransitionSpec>,
}

impl Clip {
    /// Return `true` when `at` lies in `[start_time, start_time + duration)`.
    pub fn is_active(&self, at: f64) -> bool {
        at >= self.start_time && at < self.start_time + self.duration
    }

    /// Clip-local time for timeline time `at`.
    pub fn local_time(&self, at: f64) -> f64 {
        (at - self.start_time) + self.offset
    }

    /// Progress of the incoming transition at `at`, while it runs.
    pub fn transition_progress(&self, at: f64) -> Option<f64> {
        let t = self.transition_in.as_ref()?;
        if t.duration <= 0.0 {
            return None;
        }
        let elapsed = at - self.start_time;
        (elapsed < t.duration).then(|| (elapsed / t.duration).clamp(0.0, 1.0))
    }
}

/// Media reference with its native color space.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    /// Asset id.
    pub id: String,
    /// Native color space of the decoded frames.
    pub color_space: ColorSpace,
}

/// Head transition of a clip.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionSpec {
    /// Length in seconds.
    pub duration: f64,
}

/// One feature applied to a clip.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureApplication {
    /// Registered feature id.
    pub feature_id: String,
    /// Parameter overrides, constant or keyframed.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamInput>,
    /// Named resources bound to the feature's mask inputs: `port -> asset id`.
    #[serde(default)]
    pub resources: BTreeMap<String, String>,
}

impl FeatureApplication {
    /// Application with no overrides.
    pub fn new(feature_id: impl Into<String>) -> Self {
        Self {
            feature_id: feature_id.into(),
            parameters: BTreeMap::new(),
            resources: BTreeMap::new(),
        }
    }
}

fn one() -> f64 {
    1.0
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
