// Host-side tests for reveal asset decoding.

use scene_core::*;

// One triangle (0,0,0) (1,0,0) (0,1,0) with u16 indices, buffer embedded as a
// base64 data URI. No normals, so they must be computed.
const TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [{ "mesh": 0 }],
  "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
  "buffers": [{
    "byteLength": 44,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA="
  }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ]
}"#;

#[test]
fn decodes_embedded_triangle() {
    let mesh = decode_model(TRIANGLE_GLTF.as_bytes()).expect("decode");
    assert_eq!(mesh.positions.len(), 3);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.triangle_count(), 1);
    for n in &mesh.normals {
        assert!((n[2] - 1.0).abs() < 1e-6);
    }
}

#[test]
fn decoded_model_fits_unit_sphere() {
    let mesh = decode_model(TRIANGLE_GLTF.as_bytes()).expect("decode");
    let max_r = mesh
        .positions
        .iter()
        .map(|p| (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt())
        .fold(0.0f32, f32::max);
    assert!((max_r - 1.0).abs() < 1e-5);
}

#[test]
fn mesh_without_primitives_is_empty_model() {
    let json = r#"{ "asset": { "version": "2.0" } }"#;
    assert!(matches!(
        decode_model(json.as_bytes()),
        Err(AssetError::EmptyModel)
    ));
}

#[test]
fn decode_error_is_descriptive() {
    let err = decode_image(&[0u8; 16]).unwrap_err();
    assert!(err.to_string().starts_with("could not decode image"));
}

#[test]
fn slot_reports_presence() {
    let mut model: AssetSlot<ModelMesh> = AssetSlot::Pending;
    let presence = AssetPresence {
        model_ready: model.is_ready(),
        image_ready: false,
    };
    assert_eq!(presence, AssetPresence::default());
    model.settle(decode_model(TRIANGLE_GLTF.as_bytes()));
    assert!(model.is_ready());
    assert_eq!(model.ready().map(|m| m.triangle_count()), Some(1));
}
