use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use switchboard::config;
use switchboard::fabric::RecordingActuator;
use switchboard::platform::{self, trace, AppKind};
use switchboard::telemetry::init_logging;
use tracing::info;

#[derive(Parser)]
#[command(name = "switchboard")]
#[command(about = "Reactive SDN controller apps: learning bridge, proxy ARP, unicast DHCP relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Replay a recorded event trace through one app
    Replay {
        /// Path to switchboard.toml or switchboard.lock
        #[arg(short, long, default_value = "switchboard.toml")]
        config: PathBuf,

        /// App to run: bridge, proxy-arp or unicast-dhcp
        #[arg(short, long)]
        app: AppKind,

        /// Path to the event trace
        #[arg(short, long)]
        trace: PathBuf,

        /// Number of event workers
        #[arg(short, long, default_value_t = 1)]
        workers: usize,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate switchboard.lock from switchboard.toml
    Generate {
        /// Path to switchboard.toml
        #[arg(short, long, default_value = "switchboard.toml")]
        config: PathBuf,

        /// Output path for switchboard.lock
        #[arg(short, long, default_value = "switchboard.lock")]
        output: PathBuf,
    },
    /// Validate switchboard.toml without generating lock file
    Validate {
        /// Path to switchboard.toml
        #[arg(short, long, default_value = "switchboard.toml")]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config { action } => {
            // RUST_LOG only; the file being checked may itself be broken
            init_logging(None);
            match action {
                ConfigAction::Generate { config, output } => cmd_config_generate(&config, &output),
                ConfigAction::Validate { config } => cmd_config_validate(&config),
            }
        }
        Commands::Replay {
            config,
            app,
            trace,
            workers,
        } => cmd_replay(&config, app, &trace, workers),
    };

    if let Err(e) = result {
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}

fn cmd_replay(
    config_path: &PathBuf,
    kind: AppKind,
    trace_path: &PathBuf,
    workers: usize,
) -> Result<(), String> {
    use tokio::runtime::Runtime;

    let cfg = config::load(config_path).map_err(|e| format!("Failed to load config: {}", e))?;
    init_logging(Some(&cfg.logging));

    let validation = config::validate(&cfg);
    validation.print_diagnostics();
    if validation.has_errors() {
        return Err("Validation failed with errors".to_string());
    }

    let trace = trace::load(trace_path).map_err(|e| format!("Failed to load trace: {}", e))?;
    info!(
        "Replaying {} events from {} through {}",
        trace.events.len(),
        trace_path.display(),
        kind
    );

    let actuator = Arc::new(RecordingActuator::verbose());
    let store = Arc::new(config::NetworkConfigStore::new());
    let app = platform::build_app(kind, &cfg, actuator.clone(), store.clone());

    let rt = Runtime::new().map_err(|e| format!("Failed to create runtime: {}", e))?;
    let delivered = rt
        .block_on(platform::replay(
            app.clone(),
            &store,
            &cfg.netcfg,
            trace,
            workers,
        ))
        .map_err(|e| format!("Replay failed: {}", e))?;

    println!("[INFO] {} delivered {} events", app.app_id(), delivered);
    for (name, value) in app.stats().export() {
        println!("{} {}", name, value);
    }
    println!("actuator_calls {}", actuator.calls().len());
    Ok(())
}

fn cmd_config_generate(config_path: &PathBuf, output_path: &PathBuf) -> Result<(), String> {
    println!("[INFO] Loading {}...", config_path.display());

    let cfg = config::load(config_path).map_err(|e| format!("Failed to parse config: {}", e))?;

    let validation = config::validate(&cfg);
    validation.print_diagnostics();

    if validation.has_errors() {
        return Err("Validation failed with errors".to_string());
    }

    let lock_toml =
        config::generate_lock(&cfg).map_err(|e| format!("Failed to serialize lock: {}", e))?;

    let output = format!(
        "# Generated by switchboard - DO NOT EDIT\n# Source: {}\n\n{}",
        config_path.display(),
        lock_toml
    );

    std::fs::write(output_path, output).map_err(|e| format!("Failed to write lock file: {}", e))?;

    println!("[INFO] Generated {}", output_path.display());
    Ok(())
}

fn cmd_config_validate(config_path: &PathBuf) -> Result<(), String> {
    println!("[INFO] Validating {}...", config_path.display());

    let cfg = config::load(config_path).map_err(|e| format!("Failed to parse config: {}", e))?;

    let validation = config::validate(&cfg);
    validation.print_diagnostics();

    if validation.has_errors() {
        Err("Validation failed".to_string())
    } else {
        println!("[INFO] Configuration is valid");
        Ok(())
    }
}
