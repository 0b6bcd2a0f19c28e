use std::path::{Path, PathBuf};

use layer_preview::config::Configuration;
use layer_preview::processing::layout::ScaleMode;
use layer_preview::processing::resample::ResampleFilter;

#[test]
fn empty_document_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.window.title, "Layer Preview");
    assert_eq!((cfg.window.width, cfg.window.height), (500, 120));
    assert_eq!(cfg.label.scale_mode, ScaleMode::Fit);
    assert_eq!(cfg.label.filter, ResampleFilter::Nearest);
    assert!(cfg.preview.enabled);
    assert_eq!(cfg.preview.msaa_samples, 1);
    assert!(cfg.preview.layers.is_empty());
    assert!(cfg.validated().is_ok());
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
window:
  title: "Layers"
  width: 800
label:
  image: /pics/a.png
  scale-mode: fill
  filter: catmull-rom
preview:
  enabled: false
  msaa-samples: 4
  shader-dir: /shaders
  layers:
    - /pics/bg.png
    - null
    - /pics/overlay.png
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.window.title, "Layers");
    assert_eq!((cfg.window.width, cfg.window.height), (800, 120));
    assert_eq!(cfg.label.image.as_deref(), Some(Path::new("/pics/a.png")));
    assert_eq!(cfg.label.scale_mode, ScaleMode::Fill);
    assert_eq!(cfg.label.filter, ResampleFilter::CatmullRom);
    assert!(!cfg.preview.enabled);
    assert_eq!(cfg.preview.msaa_samples, 4);
    assert_eq!(cfg.preview.shader_dir, Some(PathBuf::from("/shaders")));
    assert_eq!(
        cfg.preview.layers,
        vec![
            Some(PathBuf::from("/pics/bg.png")),
            None,
            Some(PathBuf::from("/pics/overlay.png")),
        ]
    );
}

#[test]
fn unknown_keys_are_rejected() {
    let yaml = r#"
preview:
  msaa: 4
"#;
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn invalid_msaa_count_fails_validation() {
    let cfg: Configuration = serde_yaml::from_str("preview:\n  msaa-samples: 2\n").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("msaa-samples"));
}

#[test]
fn zero_window_size_fails_validation() {
    let cfg: Configuration = serde_yaml::from_str("window:\n  height: 0\n").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn too_many_layers_fail_validation() {
    let yaml = "preview:\n  layers: [a.png, b.png, c.png, d.png]\n";
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("4 entries"));
}

#[test]
fn label_mode_needs_an_image() {
    let cfg = Configuration::default();
    assert!(cfg.require_label_image().is_err());

    let mut cfg = Configuration::default();
    cfg.label.image = Some(PathBuf::from("x.png"));
    assert_eq!(cfg.require_label_image().unwrap(), Path::new("x.png"));
}

#[test]
fn missing_default_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layer-preview.yaml");
    let cfg = Configuration::load(&path, true).unwrap();
    assert_eq!(cfg.window.width, 500);
    // an explicitly named file must exist
    assert!(Configuration::load(&path, false).is_err());
}

#[test]
fn load_reads_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.yaml");
    std::fs::write(&path, "window:\n  title: From File\n").unwrap();
    let cfg = Configuration::load(&path, false).unwrap();
    assert_eq!(cfg.window.title, "From File");
}
