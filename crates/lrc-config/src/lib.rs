//! lrc-config
//!
//! Layered YAML configuration for the reconciliation runs.
//!
//! Files are merged in order (later overrides earlier, objects merge
//! recursively), canonicalised to compact JSON and hashed with SHA-256 so that
//! every report can name the exact configuration that produced it. The merged
//! document is then decoded into [`ReconConfig`], which rejects unknown keys.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use tracing::debug;

/// Overrides `chain.rpc_url` when set. Keeps keyed RPC endpoints out of YAML.
pub const ENV_RPC_URL: &str = "LRC_RPC_URL";

/// Leaf string values starting with one of these abort the load.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",        // OpenAI style
    "AKIA",       // AWS access key ID
    "-----BEGIN", // PEM private keys
    "ghp_",       // GitHub PAT
    "glpat-",     // GitLab PAT
    "xoxb-",      // Slack bot token
];

/// Query parameters that carry credentials in RPC and GraphQL gateway URLs.
const SECRET_URL_PARAMS: &[&str] = &["apikey=", "api_key=", "api-key=", "token=", "secret="];

// ---------------------------------------------------------------------------
// Layering + hashing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::with_capacity(paths.len());
    for p in paths {
        let raw = fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        // An empty document parses to null; it contributes nothing.
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

/// serde_json's default `Map` is ordered by key, so compact serialization is
/// already canonical with respect to source key order.
fn canonicalize_json(v: &Value) -> Result<String> {
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(s) = v.pointer(&ptr).and_then(Value::as_str) {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
            }
        }
    }
    Ok(())
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                collect_leaf_pointers(vv, &format!("{prefix}/{i}"), out);
            }
        }
        // The root itself is addressed by the empty pointer.
        _ => out.push(prefix.to_string()),
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    if SECRET_PREFIXES.iter().any(|p| t.starts_with(p)) {
        return true;
    }
    let lower = t.to_ascii_lowercase();
    match lower.split_once('?') {
        Some((_, query)) => query
            .split('&')
            .any(|pair| SECRET_URL_PARAMS.iter().any(|p| pair.starts_with(p))),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Typed configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    pub subgraph: SubgraphConfig,
    #[serde(default)]
    pub partner: PartnerConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub bisection: BisectionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubgraphConfig {
    pub url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Only `compare-sources` talks to the partner API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartnerConfig {
    #[serde(default)]
    pub url: Option<String>,
}

impl PartnerConfig {
    pub fn require_url(&self) -> Result<&str> {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => bail!("CONFIG_MISSING partner.url is required for source comparison"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// May be left empty in YAML and supplied through `LRC_RPC_URL`.
    #[serde(default)]
    pub rpc_url: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BisectionConfig {
    #[serde(default = "default_known_good_block")]
    pub known_good_block: u64,
    #[serde(default = "default_known_bad_block")]
    pub known_bad_block: u64,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl Default for BisectionConfig {
    fn default() -> Self {
        Self {
            known_good_block: default_known_good_block(),
            known_bad_block: default_known_bad_block(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    #[serde(default)]
    pub include_right_accounts: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: default_report_dir(),
            cache_dir: default_cache_dir(),
            include_right_accounts: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_page_size() -> usize {
    1000
}
fn default_batch_size() -> usize {
    100
}
fn default_known_good_block() -> u64 {
    3_046_285
}
fn default_known_bad_block() -> u64 {
    29_477_025
}
fn default_cooldown_secs() -> u64 {
    10
}
fn default_report_dir() -> String {
    "reports".to_string()
}
fn default_cache_dir() -> String {
    "cache".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl ReconConfig {
    /// Decode, apply environment overrides, validate.
    ///
    /// `env` is the variable lookup; pass `|k| std::env::var(k).ok()` in
    /// production. Overrides do not change the config hash.
    pub fn from_loaded<F>(loaded: &LoadedConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg: ReconConfig = serde_json::from_value(loaded.config_json.clone())
            .context("CONFIG_INVALID config does not match the expected schema")?;

        if let Some(url) = env(ENV_RPC_URL).filter(|u| !u.trim().is_empty()) {
            debug!("chain.rpc_url taken from {ENV_RPC_URL}");
            cfg.chain.rpc_url = url.trim().to_string();
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.subgraph.url.trim().is_empty() {
            bail!("CONFIG_INVALID subgraph.url must not be empty");
        }
        if self.subgraph.page_size == 0 {
            bail!("CONFIG_INVALID subgraph.page_size must be > 0");
        }
        if self.chain.rpc_url.trim().is_empty() {
            bail!("CONFIG_INVALID chain.rpc_url is empty and {ENV_RPC_URL} is not set");
        }
        if self.chain.batch_size == 0 {
            bail!("CONFIG_INVALID chain.batch_size must be > 0");
        }
        let b = &self.bisection;
        if b.known_good_block >= b.known_bad_block {
            bail!(
                "CONFIG_INVALID bisection.known_good_block ({}) must be below known_bad_block ({})",
                b.known_good_block,
                b.known_bad_block
            );
        }
        Ok(())
    }
}

/// Load, hash and decode the layered files in one step, reading overrides
/// from the process environment.
pub fn load_recon_config(paths: &[&str]) -> Result<(LoadedConfig, ReconConfig)> {
    let loaded = load_layered_yaml(paths)?;
    let cfg = ReconConfig::from_loaded(&loaded, |k| std::env::var(k).ok())?;
    Ok((loaded, cfg))
}
