use crate::errors::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

pub const DEFAULT_RUNS: usize = 5;
pub const DEFAULT_MODELS: [&str; 4] = ["Cow", "Dragon", "Face", "Car"];

/// Overrides the platform launch script with an explicit program.
///
/// The model name is always appended as the final argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Immutable description of one sweep: which models, how many runs each,
/// and where the benchmark leaves its results.
///
/// All relative paths resolve against `base_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub runs: usize,
    pub models: Vec<String>,
    pub base_dir: PathBuf,
    pub results_dir: PathBuf,
    pub oncetime_filename: String,
    pub totaltime_filename: String,
    pub summary_filename: String,
    pub statistics_dir: PathBuf,
    pub sweep_report_filename: String,
    pub keep_model_summaries: bool,
    pub env_file: Option<PathBuf>,
    pub launcher: Option<LauncherConfig>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            runs: DEFAULT_RUNS,
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            base_dir: PathBuf::from("."),
            results_dir: PathBuf::from("oncetime"),
            oncetime_filename: "oncetime.csv".to_string(),
            totaltime_filename: "totaltime.csv".to_string(),
            summary_filename: "runtime.csv".to_string(),
            statistics_dir: PathBuf::from("statistics"),
            sweep_report_filename: "sweep-summary.json".to_string(),
            keep_model_summaries: true,
            env_file: None,
            launcher: None,
        }
    }
}

impl SweepConfig {
    pub fn from(config: PathBuf) -> BenchResult<SweepConfig> {
        let content = read_to_string(&config).map_err(|e| {
            BenchError::ConfigError(format!("Failed to read {}: {}", config.display(), e))
        })?;
        SweepConfig::from_string(content)
    }

    pub fn from_string(config: String) -> BenchResult<SweepConfig> {
        let config: SweepConfig = toml::from_str(&config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_string(&self) -> BenchResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> BenchResult<()> {
        std::fs::write(path, self.to_string()?)?;
        Ok(())
    }

    /// Reject configurations the sweep cannot honour.
    ///
    /// Model names become directory names under the statistics root, so
    /// anything that could escape it is refused.
    pub fn validate(&self) -> BenchResult<()> {
        if self.runs == 0 {
            return Err(BenchError::ConfigError(
                "runs must be a positive integer".to_string(),
            ));
        }
        if self.models.is_empty() {
            return Err(BenchError::ConfigError(
                "at least one model must be configured".to_string(),
            ));
        }
        for model in &self.models {
            if model.trim().is_empty() {
                return Err(BenchError::ConfigError(
                    "model names must not be empty".to_string(),
                ));
            }
            if model.contains('/') || model.contains('\\') || model == "." || model == ".." {
                return Err(BenchError::ConfigError(format!(
                    "model name '{}' is not a valid directory name",
                    model
                )));
            }
        }
        Ok(())
    }

    pub fn oncetime_path(&self) -> PathBuf {
        self.base_dir
            .join(&self.results_dir)
            .join(&self.oncetime_filename)
    }

    pub fn totaltime_path(&self) -> PathBuf {
        self.base_dir
            .join(&self.results_dir)
            .join(&self.totaltime_filename)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.base_dir.join(&self.summary_filename)
    }

    pub fn statistics_root(&self) -> PathBuf {
        self.base_dir.join(&self.statistics_dir)
    }

    pub fn sweep_report_path(&self) -> PathBuf {
        self.base_dir.join(&self.sweep_report_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SweepConfig::default();
        assert_eq!(config.runs, 5);
        assert_eq!(config.models, vec!["Cow", "Dragon", "Face", "Car"]);
        assert_eq!(
            config.totaltime_path(),
            PathBuf::from("./oncetime/totaltime.csv")
        );
        assert_eq!(config.summary_path(), PathBuf::from("./runtime.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SweepConfig::from_string(
            r#"
runs = 2
models = ["Cow"]
"#
            .to_string(),
        )
        .unwrap();
        assert_eq!(config.runs, 2);
        assert_eq!(config.models, vec!["Cow"]);
        assert_eq!(config.summary_filename, "runtime.csv");
        assert!(config.launcher.is_none());
    }

    #[test]
    fn test_launcher_table() {
        let config = SweepConfig::from_string(
            r#"
models = ["Face"]

[launcher]
program = "bash"
args = ["bench.sh"]
"#
            .to_string(),
        )
        .unwrap();
        let launcher = config.launcher.unwrap();
        assert_eq!(launcher.program, "bash");
        assert_eq!(launcher.args, vec!["bench.sh"]);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = SweepConfig::default();
        config.env_file = Some(PathBuf::from("bench.env"));
        config.launcher = Some(LauncherConfig {
            program: "./custom.sh".to_string(),
            args: vec![],
        });
        let parsed = SweepConfig::from_string(config.to_string().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_zero_runs() {
        let err = SweepConfig::from_string("runs = 0".to_string()).unwrap_err();
        assert!(matches!(err, BenchError::ConfigError(_)));
    }

    #[test]
    fn test_rejects_bad_model_names() {
        for models in [r#"[]"#, r#"[""]"#, r#"["../etc"]"#, r#"["a/b"]"#, r#"[".."]"#] {
            let toml = format!("models = {}", models);
            assert!(
                SweepConfig::from_string(toml).is_err(),
                "models {} should be rejected",
                models
            );
        }
    }
}
