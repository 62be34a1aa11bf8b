// src/config.rs
//! Recorder configuration
//!
//! A `RecorderConfig` is a snapshot taken before `start()`; it is never
//! mutated while a session is recording. Unset options fall back to the
//! documented defaults. `load()` layers an optional config file and
//! `SESSIONSCOPE_*` environment variables on top of those defaults.

use crate::utils::errors::{RecorderError, Result};
use serde::{Deserialize, Serialize};

/// Recorder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Master switch; when false, `start()` is a no-op
    pub enabled: bool,

    /// Eligibility gate: restrict recording to `eligible_roles`
    pub beta_only: bool,

    /// Roles allowed to record when `beta_only` is set
    pub eligible_roles: Vec<String>,

    /// Mouse-move sampling interval passed to the recording engine (ms)
    pub mouse_sample_ms: u64,

    /// Scroll sampling interval passed to the recording engine (ms)
    pub scroll_sample_ms: u64,

    /// Periodic flush interval (ms)
    pub chunk_interval_ms: u64,

    /// UI-event count that forces a flush before the next timer tick
    pub max_events_per_chunk: usize,

    /// Masking rules handed to the recording engine
    pub masking: MaskingRules,

    /// Collection endpoint URL (single POST endpoint, action-discriminated)
    pub endpoint: String,

    /// Path prefix identifying internal API calls worth instrumenting
    pub internal_api_prefix: String,

    /// Application origin for the network hook's same-origin check
    /// (e.g. `https://app.example.com`); None limits instrumentation to
    /// relative URLs
    pub app_origin: Option<String>,

    /// Compress chunk payloads with zstd before POSTing
    pub compress_chunks: bool,

    /// Verbose diagnostics
    pub debug: bool,
}

/// Element masking rules for the recording engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskingRules {
    /// Input `type` attributes whose values are always masked
    pub mask_input_types: Vec<String>,

    /// CSS-selector-style rules: elements to block entirely
    pub block_selectors: Vec<String>,

    /// CSS-selector-style rules: elements whose text is masked
    pub mask_selectors: Vec<String>,

    /// CSS-selector-style rules: elements ignored by the engine
    pub ignore_selectors: Vec<String>,
}

impl Default for MaskingRules {
    fn default() -> Self {
        Self {
            mask_input_types: vec!["password".to_string()],
            block_selectors: Vec::new(),
            mask_selectors: Vec::new(),
            ignore_selectors: Vec::new(),
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            beta_only: true,
            eligible_roles: vec!["beta".to_string(), "admin".to_string()],
            mouse_sample_ms: 50,
            scroll_sample_ms: 150,
            chunk_interval_ms: 10_000,
            max_events_per_chunk: 1000,
            masking: MaskingRules::default(),
            endpoint: "/api/session-recording".to_string(),
            internal_api_prefix: "/api/".to_string(),
            app_origin: None,
            compress_chunks: true,
            debug: false,
        }
    }
}

impl RecorderConfig {
    /// Load configuration: defaults, then an optional file, then
    /// `SESSIONSCOPE_*` environment variables
    pub fn load(file: Option<&str>) -> Result<Self> {
        let defaults = config::Config::try_from(&RecorderConfig::default())
            .map_err(|e| RecorderError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = file {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("SESSIONSCOPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| RecorderError::Config(e.to_string()))?;

        let cfg: RecorderConfig = settings
            .try_deserialize()
            .map_err(|e| RecorderError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(RecorderError::Config("endpoint must not be empty".to_string()));
        }
        if self.chunk_interval_ms == 0 {
            return Err(RecorderError::Config(
                "chunk_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_events_per_chunk == 0 {
            return Err(RecorderError::Config(
                "max_events_per_chunk must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a user with the given role may record under this config
    pub fn role_is_eligible(&self, role: &str) -> bool {
        if !self.beta_only {
            return true;
        }
        self.eligible_roles.iter().any(|r| r == role)
    }
}
