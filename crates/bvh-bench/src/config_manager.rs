use crate::bench_config::SweepConfig;
use anyhow::{Context, Result};
use std::path::Path;

pub const MODEL_ENV_VAR: &str = "BVH_BENCH_MODEL";
pub const RUN_ENV_VAR: &str = "BVH_BENCH_RUN";

/// Manages the sweep configuration and the environment handed to the benchmark
pub struct ConfigManager {
    config: SweepConfig,
    env_vars: Vec<(String, String)>,
}

impl ConfigManager {
    /// Wrap an already built configuration, loading its env_file if any
    pub fn new(config: SweepConfig) -> Result<Self> {
        config.validate()?;
        let env_vars = match &config.env_file {
            Some(env_file) => Self::parse_env_file(&config.base_dir.join(env_file))?,
            None => Vec::new(),
        };
        Ok(Self { config, env_vars })
    }

    /// Create a new ConfigManager from a TOML config string
    pub fn from_string(config_str: String) -> Result<Self> {
        let config = SweepConfig::from_string(config_str)?;
        Self::new(config)
    }

    /// Get a reference to the underlying configuration
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn into_config(self) -> SweepConfig {
        self.config
    }

    fn parse_env_file(path: &Path) -> Result<Vec<(String, String)>> {
        let iter = dotenvy::from_path_iter(path)
            .with_context(|| format!("Failed to open env file at {}", path.display()))?;
        let mut env_vars = Vec::new();
        for item in iter {
            let (key, value) =
                item.with_context(|| format!("Malformed line in {}", path.display()))?;
            env_vars.push((key, value));
        }
        Ok(env_vars)
    }

    /// Variables loaded from the env_file
    pub fn get_environment_variables(&self) -> &[(String, String)] {
        &self.env_vars
    }

    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.env_vars
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Environment for a single benchmark invocation
    pub fn run_environment(&self, model: &str, index: usize) -> Vec<(String, String)> {
        run_environment(&self.env_vars, model, index)
    }
}

/// Base variables plus the model and zero-padded run index of this invocation
pub fn run_environment(
    base: &[(String, String)],
    model: &str,
    index: usize,
) -> Vec<(String, String)> {
    let mut envs = base.to_vec();
    envs.push((MODEL_ENV_VAR.to_string(), model.to_string()));
    envs.push((RUN_ENV_VAR.to_string(), format!("{:03}", index)));
    envs
}
