//! Window Templates command-line entry point

use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, error, info, warn};
use window_templates::{
    cli::{WindowTemplatesCli, WindowTemplatesCliExecutor},
    config::{PresetStore, Settings},
    logging::{init_logging, LogConfig},
    macos::{SystemDisplayProvider, SystemPermissionProvider},
    services::LayoutOrchestrator,
    Result, WindowTemplatesError,
};

fn init_log(verbose: bool) -> Result<()> {
    let base = if verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };

    init_logging(&base.with_env_overrides()).map_err(|e| {
        WindowTemplatesError::ConfigurationError(format!("Failed to initialize logging: {}", e))
            .into()
    })
}

async fn run(cli: WindowTemplatesCli) -> Result<()> {
    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path).map_err(|e| {
        WindowTemplatesError::ConfigurationError(format!(
            "{}: {}",
            settings_path.display(),
            e
        ))
    })?;
    debug!("Settings loaded from {}", settings_path.display());

    let presets_path = cli
        .presets
        .clone()
        .or_else(|| settings.presets_path.clone())
        .unwrap_or_else(PresetStore::default_path);
    let store = PresetStore::open(&presets_path)?;

    let orchestrator = LayoutOrchestrator::with_system_providers(&settings.orchestrator);
    let mut executor = WindowTemplatesCliExecutor::new(
        store,
        orchestrator,
        Arc::new(SystemPermissionProvider::new()),
        Arc::new(SystemDisplayProvider::new()),
        cli.json,
    );

    tokio::select! {
        result = executor.execute(cli.command) => result,
        _ = signal::ctrl_c() => {
            warn!("Interrupted; windows already moved keep their new frames");
            Err(WindowTemplatesError::Interrupted.into())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = WindowTemplatesCli::parse();
    let json = cli.json;

    if let Err(e) = init_log(cli.verbose) {
        eprintln!("{e:#}");
    }
    info!("Window Templates v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        if json {
            let error_json = serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            });
            println!("{error_json}");
        } else {
            error!("Command failed: {:#}", e);
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}
