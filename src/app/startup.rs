//! Application startup for the `topicq` binary
//!
//! Parses arguments, merges the configuration file, initialises logging and
//! runs the load driver under the shutdown coordinator.

use crate::app::cli::Args;
use crate::app::driver::{self, DriverPlan, DriverReport};
use crate::core::error_handling::{display_message, log_error_with_context};
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::version::long_version;
use crate::queue::{QueueConfig, QueueManager, QueueResult};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

/// Run the application and map the outcome to a process exit code
pub async fn startup() -> ExitCode {
    let mut args = Args::parse();

    let config_file = args.config_file.clone();
    if let Err(e) = Args::load_config_file(&mut args, config_file).await {
        eprintln!("Error: {}", display_message(&e, "Loading configuration"));
        return ExitCode::FAILURE;
    }

    let use_color = args.use_color();
    if let Err(e) = init_logging(
        args.log_level.as_deref(),
        args.log_format.as_deref(),
        args.log_file_str().as_deref(),
        use_color,
    ) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    log::info!("topicq {} starting", long_version());

    let plan = match DriverPlan::from_args(&args) {
        Ok(plan) => plan,
        Err(e) => {
            log_error_with_context(&e, "Validating arguments");
            eprintln!("Error: {}", display_message(&e, "Validating arguments"));
            return ExitCode::FAILURE;
        }
    };
    log::debug!("Driver plan: {:?}", plan);

    let outcome = ShutdownCoordinator::guard(|coordinator, shutdown_rx| async move {
        run_plan(&coordinator, &plan, shutdown_rx).await
    })
    .await;

    match outcome {
        Ok(report) => {
            print_report(&report, args.json, use_color);
            if report.is_complete() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(130)
            }
        }
        Err(e) => {
            log_error_with_context(&e, "Running queue driver");
            eprintln!("Error: {}", display_message(&e, "Running queue driver"));
            ExitCode::FAILURE
        }
    }
}

async fn run_plan(
    coordinator: &Arc<ShutdownCoordinator>,
    plan: &DriverPlan,
    shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) -> QueueResult<DriverReport> {
    let manager = QueueManager::create(QueueConfig::with_capacity(plan.capacity))?;
    coordinator.register_cleanup(manager.clone());

    let report = driver::run(Arc::clone(&manager), plan, shutdown_rx).await;

    if let Some(dispose) = manager.dispose() {
        log::debug!("Final dispose: {:?}", dispose);
    }
    report
}

fn print_report(report: &DriverReport, json: bool, use_color: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{}", text),
            Err(e) => log::error!("Failed to serialise report: {}", e),
        }
    } else {
        print!("{}", report.render_text(use_color));
    }
}
