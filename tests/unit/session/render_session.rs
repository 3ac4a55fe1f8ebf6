use super::*;
use crate::device::catalog::BackendKind;
use crate::foundation::core::{Canvas, ColorSpace};
use crate::foundation::error::{FxGraphError, ResourceError};
use crate::registry::kernels::KernelTable;
use crate::timeline::model::{AssetRef, Clip, FeatureApplication, Track, TrackKind};
use serde_json::json;

fn blur_source() -> ManifestSource {
    ManifestSource::from_value(
        "blur.json",
        &json!({
            "id": "fx.blur",
            "schemaVersion": 1,
            "inputs": [{ "name": "source", "type": "image" }],
            "passes": [
                { "name": "down", "kernel": "blurDown", "inputs": ["source"], "outputs": ["half"], "scale": 0.5 },
                { "name": "up", "kernel": "blurUp", "inputs": ["half"], "outputs": ["result"] }
            ]
        }),
    )
}

fn session(max: Canvas) -> Session {
    session_with_canvas(max, Canvas::new(320, 180))
}

fn session_with_canvas(max: Canvas, canvas: Canvas) -> Session {
    let registry = FeatureRegistry::load(
        &[blur_source()],
        KernelTable::from_names(["blurDown", "blurUp"]),
    )
    .unwrap();
    let catalog = DeviceCatalog::new(vec![RenderDeviceCapabilities {
        name: "gpu0".to_string(),
        backend: BackendKind::Metal,
        max_resolution: max,
        supports_overlay: false,
    }]);
    let mut config = SessionConfig::default();
    config.compile.canvas = canvas;
    Session::new(registry, catalog, config)
}

fn timeline() -> Timeline {
    let mut app_clip = Clip {
        id: "c1".to_string(),
        asset: AssetRef {
            id: "shot.mov".to_string(),
            color_space: ColorSpace::Rec709,
        },
        start_time: 0.0,
        duration: 10.0,
        offset: 0.0,
        opacity: 1.0,
        features: Vec::new(),
        transition_in: None,
    };
    app_clip.features.push(FeatureApplication::new("fx.blur"));
    Timeline {
        tracks: vec![Track {
            id: "v1".to_string(),
            kind: TrackKind::Video,
            muted: false,
            blend: Default::default(),
            opacity: 1.0,
            clips: vec![app_clip],
        }],
    }
}

#[test]
fn compile_frame_bundles_device_graph_and_buffers() {
    let s = session(Canvas::new(3840, 2160));
    let frame = s.compile_frame(&timeline(), 1.0).unwrap();
    assert_eq!(frame.device.name, "gpu0");
    assert_eq!(frame.graph.nodes().len(), 5);
    assert_eq!(frame.fingerprint, fingerprint_graph(&frame.graph));
    assert_eq!(frame.resources.len(), frame.plan.slot_count());
    assert_eq!(s.pool_stats().checked_out, frame.plan.slot_count());
    drop(frame);
    assert_eq!(s.pool_stats().checked_out, 0);
}

#[test]
fn repeated_frames_reach_steady_state() {
    let s = session(Canvas::new(3840, 2160));
    let tl = timeline();
    drop(s.compile_frame(&tl, 0.0).unwrap());
    let warm = s.pool_stats().allocations;
    for i in 1..20 {
        let frame = s.compile_frame(&tl, f64::from(i) * 0.25).unwrap();
        drop(frame);
    }
    assert_eq!(s.pool_stats().allocations, warm);
}

#[test]
fn missing_device_fails_before_compiling() {
    let s = session(Canvas::new(1280, 720));
    let err = s.compile_frame(&timeline(), 0.0).unwrap_err();
    assert!(matches!(
        err,
        FxGraphError::Resource(ResourceError::NoCompatibleDevice { .. })
    ));
    assert_eq!(s.pool_stats().allocations, 0);
}

#[test]
fn compile_errors_are_wrapped() {
    let s = session(Canvas::new(3840, 2160));
    let err = s.compile_frame(&timeline(), f64::NAN).unwrap_err();
    assert!(matches!(err, FxGraphError::Compile(_)));
}

#[test]
fn reload_replaces_the_registry() {
    let mut s = session(Canvas::new(3840, 2160));
    let errors = s.reload(&[]);
    assert!(errors.is_empty());
    assert!(s.registry().is_empty());
    let err = s.compile_graph(&timeline(), 0.0).unwrap_err();
    assert!(matches!(err, FxGraphError::Compile(_)));

    assert!(s.reload(&[blur_source()]).is_empty());
    assert!(s.compile_graph(&timeline(), 0.0).is_ok());
}

#[test]
fn canvas_beyond_the_device_is_refused_before_allocating() {
    let s = session_with_canvas(Canvas::new(3840, 2160), Canvas::new(7680, 4320));
    let err = s.compile_frame(&timeline(), 0.0).unwrap_err();
    assert!(matches!(
        err,
        FxGraphError::Resource(ResourceError::OversizedImage { ceiling, .. })
            if ceiling == Canvas::new(3840, 2160)
    ));
    assert_eq!(s.pool_stats().allocations, 0);
}
