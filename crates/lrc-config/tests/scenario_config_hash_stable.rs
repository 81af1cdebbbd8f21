//! Config hash stability.
//!
//! The same effective configuration must always hash the same, whatever the
//! key order in the source files; any value change must change the hash.

use lrc_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
subgraph:
  url: "https://api.example/subgraphs/name/lending"
  page_size: 1000
chain:
  rpc_url: "https://rpc.example/ext/bc/C/rpc"
  batch_size: 100
bisection:
  known_good_block: 3046285
  known_bad_block: 29477025
"#;

const BASE_YAML_REORDERED: &str = r#"
bisection:
  known_bad_block: 29477025
  known_good_block: 3046285
chain:
  batch_size: 100
  rpc_url: "https://rpc.example/ext/bc/C/rpc"
subgraph:
  page_size: 1000
  url: "https://api.example/subgraphs/name/lending"
"#;

const OVERLAY_YAML: &str = r#"
chain:
  batch_size: 25
bisection:
  cooldown_secs: 0
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();

    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn reordered_keys_produce_same_hash() {
    let original = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let reordered = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();

    assert_eq!(
        original.config_hash, reordered.config_hash,
        "reordering keys in YAML must not change the hash"
    );
    assert_eq!(original.canonical_json, reordered.canonical_json);
}

#[test]
fn different_values_produce_different_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, "chain:\n  batch_size: 99\n"]).unwrap();

    assert_ne!(a.config_hash, b.config_hash);
}

#[test]
fn merged_layers_override_and_keep_siblings() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);

    let batch = a
        .config_json
        .pointer("/chain/batch_size")
        .and_then(|v| v.as_u64())
        .unwrap();
    assert_eq!(batch, 25, "overlay should override chain.batch_size");

    let rpc = a
        .config_json
        .pointer("/chain/rpc_url")
        .and_then(|v| v.as_str())
        .unwrap();
    assert_eq!(rpc, "https://rpc.example/ext/bc/C/rpc", "sibling keys survive the merge");
}

#[test]
fn hash_is_64_hex_chars() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();

    assert_eq!(loaded.config_hash.len(), 64);
    assert!(loaded.config_hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn empty_documents_contribute_nothing() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, ""]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}
