use bvh_bench::{ConfigManager, ScriptInvoker, SweepReport, SweepRunner};
use tracing::{info, warn};

/// Run the configured sweep with the platform launch script and write the
/// JSON report next to the summary.
pub fn run_sweep(manager: ConfigManager) -> SweepReport {
    let invoker = ScriptInvoker::from_config_manager(&manager);
    let config = manager.into_config();
    let report_path = config.sweep_report_path();

    let mut runner = SweepRunner::new(config, invoker);
    let report = runner.run();

    match report.save(&report_path) {
        Ok(()) => info!(path = %report_path.display(), "wrote sweep report"),
        Err(e) => warn!(path = %report_path.display(), error = %e, "could not write sweep report"),
    }
    report
}
