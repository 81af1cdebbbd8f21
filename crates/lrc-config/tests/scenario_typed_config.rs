use lrc_config::{
    load_layered_yaml_from_strings, load_recon_config, LoadedConfig, ReconConfig, ENV_RPC_URL,
};

const MINIMAL: &str = r#"
subgraph:
  url: "https://api.example/subgraphs/name/lending"
chain:
  rpc_url: "https://rpc.example/ext/bc/C/rpc"
"#;

fn loaded(docs: &[&str]) -> LoadedConfig {
    load_layered_yaml_from_strings(docs).unwrap()
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_fill_every_optional_section() {
    let cfg = ReconConfig::from_loaded(&loaded(&[MINIMAL]), no_env).unwrap();

    assert_eq!(cfg.subgraph.page_size, 1000);
    assert_eq!(cfg.chain.batch_size, 100);
    assert_eq!(cfg.bisection.known_good_block, 3_046_285);
    assert_eq!(cfg.bisection.known_bad_block, 29_477_025);
    assert_eq!(cfg.bisection.cooldown_secs, 10);
    assert_eq!(cfg.output.report_dir, "reports");
    assert_eq!(cfg.output.cache_dir, "cache");
    assert!(!cfg.output.include_right_accounts);
    assert_eq!(cfg.http.timeout_secs, 30);
    assert!(cfg.partner.url.is_none());
    assert!(cfg.partner.require_url().is_err());
}

#[test]
fn env_overrides_rpc_url_without_changing_hash() {
    let l = loaded(&[MINIMAL]);
    let cfg = ReconConfig::from_loaded(&l, |k| {
        (k == ENV_RPC_URL).then(|| "https://private.example/rpc".to_string())
    })
    .unwrap();

    assert_eq!(cfg.chain.rpc_url, "https://private.example/rpc");
    assert_eq!(l.config_hash, loaded(&[MINIMAL]).config_hash);
}

#[test]
fn rpc_url_may_come_from_env_only() {
    let yaml = r#"
subgraph:
  url: "https://api.example/subgraphs/name/lending"
"#;
    let l = loaded(&[yaml]);
    assert!(ReconConfig::from_loaded(&l, no_env).is_err());

    let cfg = ReconConfig::from_loaded(&l, |_| Some("http://localhost:8545".to_string())).unwrap();
    assert_eq!(cfg.chain.rpc_url, "http://localhost:8545");
}

#[test]
fn zero_sizes_rejected() {
    for overlay in ["subgraph:\n  page_size: 0\n", "chain:\n  batch_size: 0\n"] {
        let err = ReconConfig::from_loaded(&loaded(&[MINIMAL, overlay]), no_env)
            .unwrap_err()
            .to_string();
        assert!(err.contains("CONFIG_INVALID"), "got: {err}");
    }
}

#[test]
fn bisection_bounds_must_be_ordered() {
    let overlay = r#"
bisection:
  known_good_block: 200
  known_bad_block: 200
"#;
    let err = ReconConfig::from_loaded(&loaded(&[MINIMAL, overlay]), no_env)
        .unwrap_err()
        .to_string();
    assert!(err.contains("known_good_block"), "got: {err}");
}

#[test]
fn unknown_keys_rejected() {
    let overlay = "output:\n  report_dirr: \"out\"\n";
    assert!(ReconConfig::from_loaded(&loaded(&[MINIMAL, overlay]), no_env).is_err());
}

#[test]
fn loads_layered_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let local = dir.path().join("local.yaml");
    std::fs::write(&base, MINIMAL).unwrap();
    std::fs::write(&local, "output:\n  include_right_accounts: true\n").unwrap();

    let base = base.to_string_lossy().into_owned();
    let local = local.to_string_lossy().into_owned();
    let (l, cfg) = load_recon_config(&[base.as_str(), local.as_str()]).unwrap();

    assert!(cfg.output.include_right_accounts);
    assert_eq!(l.config_hash.len(), 64);
}

#[test]
fn missing_file_names_the_path() {
    let err = load_recon_config(&["/definitely/not/here.yaml"])
        .unwrap_err()
        .to_string();
    assert!(err.contains("/definitely/not/here.yaml"), "got: {err}");
}
