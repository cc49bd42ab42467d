//! # Dashboard Configuration
//!
//! Settings come from three layers, each overriding the previous one:
//!
//! 1. an optional YAML file,
//! 2. `SILODASH_*` environment variables,
//! 3. command-line flags (applied by [`crate::cli`]).
//!
//! ```yaml
//! bind_addr: "127.0.0.1:9000"
//! dispatch_timeout_ms: 5000
//! stack_size: 0x8000
//! static_dir: ./ui
//! snapshot: ./cluster.yaml
//! ```
//!
//! `stack_size` sets the `may` coroutine stack for request coroutines and
//! the designated context. It accepts decimal or `0x` hex in both the file
//! and the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DISPATCH_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_STACK_SIZE: usize = 0x4000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub bind_addr: String,
    /// Per-dispatch bound; `0` waits forever
    pub dispatch_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_stack_size")]
    pub stack_size: usize,
    /// Serve `Index.html` and `index.min.js` from here instead of the
    /// embedded copies
    pub static_dir: Option<PathBuf>,
    /// Cluster snapshot backing the grain calls
    pub snapshot: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            dispatch_timeout_ms: DEFAULT_DISPATCH_TIMEOUT_MS,
            stack_size: DEFAULT_STACK_SIZE,
            static_dir: None,
            snapshot: None,
        }
    }
}

/// Parse `16384` or `0x4000`.
pub fn parse_stack_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

fn deserialize_stack_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(usize),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => parse_stack_size(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid stack size '{s}'"))),
    }
}

impl DashboardConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed YAML or mistyped fields.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).context("Failed to parse dashboard config")
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml_str(&source).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Load `path` if given, otherwise defaults, then apply the environment.
    ///
    /// # Errors
    ///
    /// Propagates file errors from [`DashboardConfig::from_path`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_path(p)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply `SILODASH_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| env::var(name).ok());
    }

    /// Apply overrides from any variable source. Invalid values are logged
    /// and the current value is kept.
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("SILODASH_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(raw) = lookup("SILODASH_DISPATCH_TIMEOUT_MS") {
            match raw.trim().parse() {
                Ok(ms) => self.dispatch_timeout_ms = ms,
                Err(_) => warn!(
                    var = "SILODASH_DISPATCH_TIMEOUT_MS",
                    value = %raw,
                    "Ignoring invalid dispatch timeout"
                ),
            }
        }
        if let Some(raw) = lookup("SILODASH_STACK_SIZE") {
            match parse_stack_size(&raw) {
                Some(size) => self.stack_size = size,
                None => warn!(
                    var = "SILODASH_STACK_SIZE",
                    value = %raw,
                    "Ignoring invalid stack size"
                ),
            }
        }
        if let Some(dir) = lookup("SILODASH_STATIC_DIR") {
            self.static_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = lookup("SILODASH_SNAPSHOT") {
            self.snapshot = Some(PathBuf::from(path));
        }
    }

    /// `None` when the timeout is disabled.
    #[must_use]
    pub fn dispatch_timeout(&self) -> Option<Duration> {
        (self.dispatch_timeout_ms > 0).then(|| Duration::from_millis(self.dispatch_timeout_ms))
    }
}
