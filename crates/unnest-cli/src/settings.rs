//! Layered run settings.
//!
//! Merge order: built-in defaults, then a JSON settings file, then
//! `UNNEST_*` environment variables, then command-line flags. The merged
//! values are range-validated here; `unnest-core` trusts them.

use crate::cli::Cli;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use unnest_core::ExtractionConfig;

/// Shape of the optional JSON settings file.
///
/// Every field is optional; absent fields keep the value from the layer
/// below. Unknown keys are rejected so a typo cannot silently disable a
/// limit.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    max_extraction_ratio: Option<f64>,
    max_nested_depth: Option<usize>,
    supported_extensions: Option<Vec<String>>,
    preserve_originals: Option<bool>,
    skip_on_error: Option<bool>,
    log_dir: Option<PathBuf>,
    stats_file: Option<PathBuf>,
    progress_indicators: Option<bool>,
}

/// Fully merged settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub max_extraction_ratio: f64,
    pub max_nested_depth: usize,
    pub supported_extensions: Vec<String>,
    pub preserve_originals: bool,
    pub skip_on_error: bool,
    pub log_dir: Option<PathBuf>,
    pub stats_file: Option<PathBuf>,
    pub progress_indicators: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let core = ExtractionConfig::default();
        Self {
            max_extraction_ratio: core.max_extraction_ratio,
            max_nested_depth: core.max_nested_depth,
            supported_extensions: core.supported_extensions,
            preserve_originals: core.preserve_originals,
            skip_on_error: core.skip_on_error,
            log_dir: None,
            stats_file: None,
            progress_indicators: true,
        }
    }
}

impl Settings {
    /// Builds the effective settings for this invocation.
    ///
    /// Reads the settings file named by `--config` (when given), applies
    /// `UNNEST_*` environment variables on top, applies command-line
    /// flags on top of those, and validates the result.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(path) = &cli.config {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file {}", path.display()))?;
            let file: FileSettings = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse settings file {}", path.display()))?;
            settings.apply_file(file);
        }

        settings.apply_env(|name| std::env::var(name).ok())?;
        settings.apply_flags(cli);
        settings.validate()?;
        Ok(settings)
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(ratio) = file.max_extraction_ratio {
            self.max_extraction_ratio = ratio;
        }
        if let Some(depth) = file.max_nested_depth {
            self.max_nested_depth = depth;
        }
        if let Some(extensions) = file.supported_extensions {
            self.supported_extensions = extensions;
        }
        if let Some(preserve) = file.preserve_originals {
            self.preserve_originals = preserve;
        }
        if let Some(skip) = file.skip_on_error {
            self.skip_on_error = skip;
        }
        if let Some(dir) = file.log_dir {
            self.log_dir = Some(dir);
        }
        if let Some(path) = file.stats_file {
            self.stats_file = Some(path);
        }
        if let Some(progress) = file.progress_indicators {
            self.progress_indicators = progress;
        }
    }

    /// Applies `UNNEST_*` overrides from `lookup`.
    ///
    /// Takes the lookup as a closure rather than reading the process
    /// environment directly so tests can drive it without mutating
    /// global state.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup("UNNEST_MAX_RATIO") {
            self.max_extraction_ratio = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid UNNEST_MAX_RATIO value: {raw}"))?;
        }
        if let Some(raw) = lookup("UNNEST_MAX_DEPTH") {
            self.max_nested_depth = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid UNNEST_MAX_DEPTH value: {raw}"))?;
        }
        if let Some(raw) = lookup("UNNEST_EXTENSIONS") {
            self.supported_extensions = raw
                .split(',')
                .map(str::trim)
                .filter(|ext| !ext.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(raw) = lookup("UNNEST_PRESERVE") {
            self.preserve_originals =
                parse_bool(&raw).with_context(|| format!("invalid UNNEST_PRESERVE value: {raw}"))?;
        }
        if let Some(raw) = lookup("UNNEST_SKIP_ON_ERROR") {
            self.skip_on_error = parse_bool(&raw)
                .with_context(|| format!("invalid UNNEST_SKIP_ON_ERROR value: {raw}"))?;
        }
        if let Some(raw) = lookup("UNNEST_PROGRESS") {
            self.progress_indicators =
                parse_bool(&raw).with_context(|| format!("invalid UNNEST_PROGRESS value: {raw}"))?;
        }
        if let Some(raw) = lookup("UNNEST_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("UNNEST_STATS_FILE") {
            self.stats_file = Some(PathBuf::from(raw));
        }
        Ok(())
    }

    fn apply_flags(&mut self, cli: &Cli) {
        if let Some(ratio) = cli.max_ratio {
            self.max_extraction_ratio = ratio;
        }
        if let Some(depth) = cli.max_depth {
            self.max_nested_depth = depth;
        }
        if cli.no_preserve {
            self.preserve_originals = false;
        }
        if cli.fail_fast {
            self.skip_on_error = false;
        }
        if let Some(dir) = &cli.log_dir {
            self.log_dir = Some(dir.clone());
        }
        if let Some(path) = &cli.stats_file {
            self.stats_file = Some(path.clone());
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.max_extraction_ratio.is_finite() || self.max_extraction_ratio < 1.0 {
            bail!(
                "max-ratio must be a finite value of at least 1, got {}",
                self.max_extraction_ratio
            );
        }
        if self.max_nested_depth == 0 {
            bail!("max-depth must be at least 1");
        }
        if self.supported_extensions.is_empty() {
            bail!("at least one supported extension is required");
        }
        Ok(())
    }

    /// Projects the merged settings into the core run configuration.
    pub fn extraction_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            max_extraction_ratio: self.max_extraction_ratio,
            max_nested_depth: self.max_nested_depth,
            supported_extensions: self.supported_extensions.clone(),
            preserve_originals: self.preserve_originals,
            skip_on_error: self.skip_on_error,
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: {other}"),
    }
}
