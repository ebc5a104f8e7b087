use mesh_scatter::config::{GridSpec, MeshConfig};
use mesh_scatter::topology::cell_type::ElementFamily;

#[test]
fn mesh_block_with_defaults() {
    let cfg: MeshConfig = serde_json::from_str(r#"{"type": "Quad8", "nx": 10, "ny": 4, "xmax": 2.0}"#).unwrap();
    assert_eq!(cfg.family, ElementFamily::Quad8);
    assert_eq!(cfg.grid.nx, 10);
    assert_eq!(cfg.grid.ny, 4);
    assert_eq!(cfg.grid.nz, 1);
    assert_eq!(cfg.grid.xmax, 2.0);
    assert_eq!(cfg.grid.ymin, 0.0);
    assert!(cfg.validate().is_ok());
}

#[test]
fn unknown_element_type_is_rejected() {
    let err = serde_json::from_str::<MeshConfig>(r#"{"type": "tri6"}"#).unwrap_err();
    assert!(err.to_string().contains("unsupported element type: tri6"), "{err}");
}

#[test]
fn config_serializes_family_by_name() {
    let cfg = MeshConfig::new(ElementFamily::Hex27, GridSpec::cuboid([1, 2, 3], [0.0; 3], [1.0; 3]));
    let json = serde_json::to_value(&cfg).unwrap();
    assert_eq!(json["type"], "hex27");
    assert_eq!(json["nz"], 3);
    let back: MeshConfig = serde_json::from_value(json).unwrap();
    assert_eq!(back, cfg);
}
