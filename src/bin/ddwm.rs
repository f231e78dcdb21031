use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ddwm::command::{CmdIo, WmCommand};
use ddwm::common::config::{Config, Settings, config_file, restore_file};
use ddwm::common::log;
use ddwm::layout_engine::{LayoutEngine, Scenario};
use ddwm::sys::native::HeadlessNative;
use tracing::info;

#[derive(Parser)]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the configuration file and report any issues.
    Validate,
    /// Build a scenario, run commands against it and print the result.
    Replay {
        /// TOML file describing monitors, workspaces and windows.
        scenario: PathBuf,

        /// JSON array of commands to run in order.
        #[arg(long, value_name = "PATH")]
        commands: Option<PathBuf>,

        /// File whose contents are piped to every command.
        #[arg(long, value_name = "PATH")]
        stdin: Option<PathBuf>,

        /// Save the resulting state to this file.
        #[arg(long, value_name = "PATH")]
        save: Option<PathBuf>,
    },
    /// Print the status snapshot of a saved state.
    Status {
        /// State file to read (defaults to the restore file).
        #[arg(long, value_name = "PATH")]
        restore: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let opt = Cli::parse();
    log::init_logging();

    let config_path = opt.config.clone().unwrap_or_else(config_file);
    let result = match opt.command {
        Commands::Validate => validate(&config_path),
        Commands::Replay { scenario, commands, stdin, save } => {
            let settings = load_settings(&config_path);
            replay(settings, &scenario, commands.as_deref(), stdin.as_deref(), save.as_deref())
                .await
        }
        Commands::Status { restore } => {
            let settings = load_settings(&config_path);
            status(settings, &restore.unwrap_or_else(restore_file))
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{e:#}");
            process::exit(1);
        }
    }
}

fn load_settings(path: &Path) -> Settings {
    match Config::read_or_default(path) {
        Ok(config) => config.settings,
        Err(e) => {
            eprintln!("{e:#}");
            process::exit(1);
        }
    }
}

fn validate(path: &Path) -> anyhow::Result<bool> {
    let config = Config::read(path)?;
    let issues = config.validate();
    if issues.is_empty() {
        println!("Config validation passed");
    }
    for issue in &issues {
        eprintln!("{issue}");
    }
    Ok(issues.is_empty())
}

async fn replay(
    settings: Settings,
    scenario: &Path,
    commands: Option<&Path>,
    stdin: Option<&Path>,
    save: Option<&Path>,
) -> anyhow::Result<bool> {
    let buf = fs::read_to_string(scenario)
        .with_context(|| format!("reading scenario {}", scenario.display()))?;
    let mut engine = Scenario::parse(&buf)?.build(settings);

    let commands: Vec<WmCommand> = match commands {
        Some(path) => {
            let buf = fs::read_to_string(path)
                .with_context(|| format!("reading commands {}", path.display()))?;
            serde_json::from_str(&buf)?
        }
        None => Vec::new(),
    };
    let stdin = match stdin {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };

    let native = HeadlessNative::new();
    let mut all_ok = true;
    for cmd in &commands {
        let mut io = CmdIo::with_stdin(stdin.clone());
        let ok = engine.execute(cmd, &native, &mut io).await;
        for line in &io.stderr {
            eprintln!("{line}");
        }
        for request in native.take_requests() {
            info!(?request, "native request");
        }
        all_ok &= ok;
    }

    print!("{}", engine.draw_tree());
    println!("{}", serde_json::to_string_pretty(&engine.status_snapshot())?);
    if let Some(path) = save {
        engine.save(path)?;
    }
    Ok(all_ok)
}

fn status(settings: Settings, path: &Path) -> anyhow::Result<bool> {
    let engine = LayoutEngine::load(path, settings)
        .with_context(|| format!("loading state {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&engine.status_snapshot())?);
    Ok(true)
}
