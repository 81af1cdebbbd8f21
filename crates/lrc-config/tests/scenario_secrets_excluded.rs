//! Literal credentials must never make it into a hashed configuration.

use lrc_config::load_layered_yaml_from_strings;

fn assert_secret_rejected(docs: &[&str]) {
    let err = load_layered_yaml_from_strings(docs).unwrap_err().to_string();
    assert!(
        err.contains("CONFIG_SECRET_DETECTED"),
        "error should contain CONFIG_SECRET_DETECTED, got: {err}"
    );
    assert!(err.contains("REDACTED"));
}

#[test]
fn keyed_rpc_url_rejected() {
    assert_secret_rejected(&[r#"
chain:
  rpc_url: "https://rpc.example/ext/bc/C/rpc?apikey=0123456789abcdef"
"#]);
}

#[test]
fn token_prefix_rejected_inside_array() {
    assert_secret_rejected(&[r#"
subgraph:
  headers:
    - name: "authorization"
      value: "ghp_0123456789abcdefghij"
"#]);
}

#[test]
fn secret_in_overlay_rejected() {
    let base = r#"
chain:
  rpc_url: "https://rpc.example/ext/bc/C/rpc"
"#;
    let overlay = r#"
chain:
  rpc_url: "https://rpc.example/ext/bc/C/rpc?api_key=sneaky-override"
"#;
    assert_secret_rejected(&[base, overlay]);
}

#[test]
fn plain_urls_accepted() {
    let loaded = load_layered_yaml_from_strings(&[r#"
subgraph:
  url: "https://api.example/subgraphs/name/lending"
partner:
  url: "https://partner.example/api"
"#])
    .unwrap();

    assert!(loaded.canonical_json.contains("partner.example"));
}
