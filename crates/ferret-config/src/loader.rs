use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Config;

/// Ordered list of config file locations searched from lowest to highest priority.
/// Later files override earlier ones.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("/etc/ferret/config.toml"));

    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("ferret/config.toml"));
    }

    paths.push(PathBuf::from(".ferret/config.toml"));
    paths.push(PathBuf::from("ferret.toml"));

    paths
}

/// Load configuration by merging all discovered TOML files, then applying
/// environment overrides.  `extra` is an explicit path (the `--config` flag)
/// and must exist when given.
pub fn load(extra: Option<&Path>) -> anyhow::Result<Config> {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in config_search_paths() {
        if path.is_file() {
            debug!(path = %path.display(), "loading config layer");
            merge_toml(&mut merged, read_layer(&path)?);
        }
    }

    if let Some(p) = extra {
        debug!(path = %p.display(), "loading explicit config");
        merge_toml(&mut merged, read_layer(p)?);
    }

    let mut config: Config = merged.try_into().context("invalid configuration")?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn read_layer(path: &Path) -> anyhow::Result<toml::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Apply environment overrides on top of the file configuration.
///
/// `lookup` is `std::env::var` in production; tests pass a closure over a map.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(env) = lookup("FERRET_ENV").filter(|v| !v.is_empty()) {
        config.environment = env;
    }
    let level = lookup("FERRET_LOG_LEVEL").or_else(|| lookup("LOG_LEVEL"));
    if let Some(level) = level.filter(|v| !v.is_empty()) {
        config.log.level = normalize_level(&level);
    }
    if let Some(path) = lookup("FERRET_MOCK_RESPONSES").filter(|v| !v.is_empty()) {
        config.model.mock_responses_file = Some(path);
    }
}

/// Lower-case a level name and accept `WARNING`/`warn` spellings alike.
fn normalize_level(level: &str) -> String {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => "warn".into(),
        other => other.to_string(),
    }
}

/// Deep-merge `src` into `dst`; src wins on scalar conflicts.
fn merge_toml(dst: &mut toml::Value, src: toml::Value) {
    match (dst, src) {
        (toml::Value::Table(d), toml::Value::Table(s)) => {
            for (k, v) in s {
                let entry = d.entry(k).or_insert(toml::Value::Table(toml::map::Map::new()));
                merge_toml(entry, v);
            }
        }
        (dst, src) => *dst = src,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
