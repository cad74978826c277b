mod app_logic;
mod core;
mod platform_layer;

use crate::app_logic::ExplorerLogic;
use crate::core::{
    ChannelRenamePersistence, ConfigManagerOperations, CoreConfigManager, ExplorerConfig,
    JsonDirStructureSource, RenameIntent, StructureFetchOutcome, ThreadedStructureFetcher,
    load_workspace,
};
use crate::platform_layer::{
    AppEvent, ConsoleShell, PlatformCommand, PlatformEventHandler, PlatformResult, ShellInput,
};

use simplelog::{ColorChoice, Config, SimpleLogger, TermLogger, TerminalMode};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);
const DEFAULT_LOCATION: &str = "/";

/*
 * Installs a logger once for the unit tests. Every test that wants log output
 * calls this first; later calls are no-ops.
 */
#[cfg(test)]
pub fn initialize_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = simplelog::TestLogger::init(log::LevelFilter::Trace, Config::default());
    });
}

fn initialize_app_logging(config: &ExplorerConfig) {
    let level = config.log_level_filter();
    if TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto).is_err()
    {
        let _ = SimpleLogger::init(level, Config::default());
    }
}

// Relative paths in the config are taken relative to the workspace file.
fn resolve_structure_dir(config: &ExplorerConfig, workspace_path: &Path) -> PathBuf {
    if config.structure_dir.is_absolute() {
        return config.structure_dir.clone();
    }
    workspace_path
        .parent()
        .map(|p| p.join(&config.structure_dir))
        .unwrap_or_else(|| config.structure_dir.clone())
}

fn spawn_input_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Main: Failed to read input: {e}");
                    break;
                }
            }
        }
        log::debug!("Main: Input closed.");
    });
    rx
}

/*
 * Stands in for the store side of the rename flow: accepts a persisted name
 * unless it is blank, and reports accepted renames back as events.
 */
fn accept_rename(intent: RenameIntent) -> Option<AppEvent> {
    let new_name = intent.new_name.trim();
    if new_name.is_empty() {
        log::warn!("Main: Rejected blank name for {}.", intent.id);
        return None;
    }
    Some(AppEvent::DatasourceRenamed {
        datasource_id: intent.id,
        new_name: new_name.to_string(),
    })
}

/*
 * Drains the logic's command queue into the shell. Navigation is fed back to
 * the logic as a location change. Returns `false` once the logic asked to quit.
 */
fn process_commands<W: Write>(
    logic: &mut ExplorerLogic,
    shell: &mut ConsoleShell<W>,
) -> PlatformResult<bool> {
    let mut keep_running = true;
    while let Some(command) = logic.try_dequeue_command() {
        shell.execute_command(&command)?;
        match command {
            PlatformCommand::NavigateTo { path } => {
                logic.handle_event(AppEvent::LocationChanged { path });
            }
            PlatformCommand::QuitApplication => keep_running = false,
            _ => {}
        }
    }
    Ok(keep_running)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let config_manager = CoreConfigManager::new();
    let config = match config_manager.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Could not load configuration ({e}); using defaults.");
            ExplorerConfig::default()
        }
    };
    initialize_app_logging(&config);
    log::info!("Main: Starting with {config:?}");

    let workspace_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.workspace_path.clone());
    let initial_location = args.next().unwrap_or_else(|| DEFAULT_LOCATION.to_string());
    let workspace = load_workspace(&workspace_path)?;
    log::info!(
        "Main: Loaded workspace {:?} with {} datasources.",
        workspace_path,
        workspace.datasources.len()
    );

    let (outcome_tx, outcome_rx) = mpsc::channel::<StructureFetchOutcome>();
    let (rename_tx, rename_rx) = mpsc::channel::<RenameIntent>();
    let source = Arc::new(JsonDirStructureSource::new(resolve_structure_dir(
        &config,
        &workspace_path,
    )));
    let mut logic = ExplorerLogic::new(
        workspace,
        &initial_location,
        config.default_expanded,
        Arc::new(ThreadedStructureFetcher::new(source, outcome_tx)),
        Arc::new(ChannelRenamePersistence::new(rename_tx)),
    );

    let stdout = io::stdout();
    let mut shell = ConsoleShell::new(stdout.lock());
    logic.handle_event(AppEvent::ExplorerReady);
    let mut keep_running = process_commands(&mut logic, &mut shell)?;

    let input = spawn_input_reader();
    while keep_running {
        match input.recv_timeout(INPUT_POLL_INTERVAL) {
            Ok(line) => match shell.parse_line(&line) {
                Ok(ShellInput::Event(event)) => logic.handle_event(event),
                Ok(ShellInput::Show) => shell.show()?,
                Ok(ShellInput::Nothing) => {}
                Err(e) => shell.print_error(&e)?,
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                logic.handle_event(AppEvent::QuitRequested);
            }
        }
        while let Ok(outcome) = outcome_rx.try_recv() {
            logic.handle_event(AppEvent::StructureFetchSettled(outcome));
        }
        while let Ok(intent) = rename_rx.try_recv() {
            if let Some(event) = accept_rename(intent) {
                logic.handle_event(event);
            }
        }
        keep_running = process_commands(&mut logic, &mut shell)?;
    }

    logic.on_quit();
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("Main: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
