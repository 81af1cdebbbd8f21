use assert_cmd::Command;
use predicates::prelude::*;

const BASE_YAML: &str = r#"
subgraph:
  url: "http://127.0.0.1:1/"
chain:
  rpc_url: "http://127.0.0.1:1"
bisection:
  cooldown_secs: 0
"#;

fn lrc(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("lrc").unwrap();
    cmd.current_dir(dir).env_remove("LRC_RPC_URL").env("RUST_LOG", "warn");
    cmd
}

fn write(dir: &std::path::Path, name: &str, body: &str) -> String {
    let p = dir.join(name);
    std::fs::write(&p, body).unwrap();
    p.to_string_lossy().into_owned()
}

#[test]
fn config_hash_prints_hash_then_canonical_json() {
    let dir = tempfile::tempdir().unwrap();
    let base = write(dir.path(), "base.yaml", BASE_YAML);
    let local = write(dir.path(), "local.yaml", "chain:\n  batch_size: 8\n");

    let out = lrc(dir.path())
        .args(["config-hash", &base, &local])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();
    let mut lines = stdout.lines();

    let hash = lines.next().unwrap().strip_prefix("config_hash=").unwrap();
    assert_eq!(hash.len(), 64);
    assert!(lines.next().unwrap().contains("\"batch_size\":8"));
}

#[test]
fn secret_in_config_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write(
        dir.path(),
        "bad.yaml",
        "chain:\n  rpc_url: \"https://rpc.example/ext/bc/C/rpc?apikey=0123456789\"\n",
    );

    lrc(dir.path())
        .args(["config-hash", &bad])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_SECRET_DETECTED"));
}

#[test]
fn unknown_account_mode_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let base = write(dir.path(), "base.yaml", BASE_YAML);

    lrc(dir.path())
        .args(["accounts", "--config", &base, "--mode", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid mode"));
}

#[test]
fn invalid_config_fails_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write(dir.path(), "bad.yaml", "chain:\n  batch_size: 4\n");

    lrc(dir.path())
        .args(["markets", "--config", &bad])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_INVALID"))
        .stdout(predicate::str::contains("run_id=").not());
}

#[test]
fn unreachable_subgraph_fails_the_block() {
    let dir = tempfile::tempdir().unwrap();
    let base = write(dir.path(), "base.yaml", BASE_YAML);

    lrc(dir.path())
        .args(["markets", "--config", &base, "--block", "5"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("block=5"))
        .stderr(predicate::str::contains("fetch subgraph markets at block 5"));
}

#[test]
fn compare_sources_needs_a_partner_url() {
    let dir = tempfile::tempdir().unwrap();
    let base = write(dir.path(), "base.yaml", BASE_YAML);

    lrc(dir.path())
        .args(["compare-sources", "--config", &base, "--block", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("partner.url"));
}
