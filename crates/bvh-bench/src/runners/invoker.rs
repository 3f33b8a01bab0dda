use crate::bench_config::{LauncherConfig, SweepConfig};
use crate::config_manager::{run_environment, ConfigManager};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, info, warn};

/// How a benchmark invocation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationOutcome {
    Success,
    ExitCode(i32),
    /// Ended without an exit code, e.g. killed by a signal
    Terminated,
    LaunchFailed(String),
}

impl InvocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationOutcome::Success)
    }

    fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            InvocationOutcome::Success
        } else {
            match status.code() {
                Some(code) => InvocationOutcome::ExitCode(code),
                None => InvocationOutcome::Terminated,
            }
        }
    }
}

impl fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationOutcome::Success => write!(f, "succeeded"),
            InvocationOutcome::ExitCode(code) => write!(f, "exited with status {}", code),
            InvocationOutcome::Terminated => write!(f, "terminated without an exit status"),
            InvocationOutcome::LaunchFailed(e) => write!(f, "could not be launched: {}", e),
        }
    }
}

/// Runs the benchmark for one model and blocks until it is done.
pub trait BenchmarkInvoker {
    fn invoke(&mut self, model: &str, index: usize) -> InvocationOutcome;
}

/// Launches the benchmark through a platform script, or an explicit program
/// when the config carries a launcher.
#[derive(Debug, Clone)]
pub struct ScriptInvoker {
    program: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
    env_vars: Vec<(String, String)>,
}

impl ScriptInvoker {
    /// `powershell -ExecutionPolicy Bypass -File run.ps1` on Windows, `./run.sh` elsewhere.
    pub fn for_host(working_dir: &Path) -> Self {
        let working_dir = absolute_dir(working_dir);
        let (program, args) = if cfg!(windows) {
            (
                PathBuf::from("powershell"),
                vec![
                    "-ExecutionPolicy".to_string(),
                    "Bypass".to_string(),
                    "-File".to_string(),
                    "run.ps1".to_string(),
                ],
            )
        } else {
            (working_dir.join("run.sh"), Vec::new())
        };
        Self {
            program,
            args,
            working_dir,
            env_vars: Vec::new(),
        }
    }

    /// A relative program with a path component resolves against the working
    /// directory; a bare name is looked up on PATH.
    pub fn from_launcher(launcher: &LauncherConfig, working_dir: &Path) -> Self {
        let working_dir = absolute_dir(working_dir);
        let program = PathBuf::from(&launcher.program);
        let program = if program.is_relative() && program.components().count() > 1 {
            working_dir.join(program)
        } else {
            program
        };
        Self {
            program,
            args: launcher.args.clone(),
            working_dir,
            env_vars: Vec::new(),
        }
    }

    pub fn from_config(config: &SweepConfig) -> Self {
        match &config.launcher {
            Some(launcher) => Self::from_launcher(launcher, &config.base_dir),
            None => Self::for_host(&config.base_dir),
        }
    }

    pub fn from_config_manager(manager: &ConfigManager) -> Self {
        Self::from_config(manager.config()).with_env(manager.get_environment_variables().to_vec())
    }

    pub fn with_env(mut self, env_vars: Vec<(String, String)>) -> Self {
        self.env_vars = env_vars;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn command(&self, model: &str, index: usize) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(model)
            .current_dir(&self.working_dir)
            .envs(run_environment(&self.env_vars, model, index));
        cmd
    }
}

/// The child process changes into the working directory before exec, so a
/// program joined onto a relative directory would resolve twice.
fn absolute_dir(dir: &Path) -> PathBuf {
    std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
}

impl BenchmarkInvoker for ScriptInvoker {
    fn invoke(&mut self, model: &str, index: usize) -> InvocationOutcome {
        debug!(
            program = %self.program.display(),
            args = ?self.args,
            model,
            index,
            "launching benchmark"
        );
        let outcome = match self.command(model, index).status() {
            Ok(status) => InvocationOutcome::from_status(status),
            Err(e) => InvocationOutcome::LaunchFailed(e.to_string()),
        };
        if outcome.is_success() {
            info!(model, index, "benchmark exited successfully");
        } else {
            warn!(model, index, %outcome, "benchmark did not succeed");
        }
        outcome
    }
}
