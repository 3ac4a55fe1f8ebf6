use super::*;
use crate::foundation::core::{Canvas, ColorSpace, PixelFormat};
use serde_json::json;

#[test]
fn empty_document_yields_defaults() {
    let cfg = SessionConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, SessionConfig::default());
    assert_eq!(cfg.compile.canvas, Canvas::new(1920, 1080));
    assert_eq!(cfg.compile.pixel_format, PixelFormat::Rgba16Float);
    assert_eq!(cfg.compile.working_space, ColorSpace::AcesCg);
    assert_eq!(cfg.compile.deliverable, ColorSpace::Rec709);
    assert_eq!(cfg.profile, QualityProfile::Hd);
    assert_eq!(cfg.overlay, None);
}

#[test]
fn partial_documents_override_fields() {
    let doc = json!({
        "compile": { "canvas": { "width": 3840, "height": 2160 }, "deliverable": "rec2020Pq" },
        "profile": "uhd",
        "overlay": true
    });
    let cfg = SessionConfig::from_reader(doc.to_string().as_bytes()).unwrap();
    assert_eq!(cfg.compile.canvas, Canvas::new(3840, 2160));
    assert_eq!(cfg.compile.deliverable, ColorSpace::Rec2020Pq);
    assert_eq!(cfg.compile.working_space, ColorSpace::AcesCg);
    assert_eq!(cfg.profile, QualityProfile::Uhd);
    assert_eq!(cfg.overlay, Some(true));
}

#[test]
fn unknown_keys_are_rejected() {
    let err = SessionConfig::from_reader(r#"{"compile": {"canvs": {}}}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, FxGraphError::Serde(_)));
}

#[test]
fn from_path_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, r#"{"profile": "proxy"}"#).unwrap();
    assert_eq!(
        SessionConfig::from_path(&path).unwrap().profile,
        QualityProfile::Proxy
    );
    assert!(SessionConfig::from_path(dir.path().join("nope.json")).is_err());
}
